use anyhow::{anyhow, Result};
use log::info;
use rusqlite::{params, Connection, Row};

use crate::db::{
    helpers::{advance_timestamp, format_datetime, now, parse_datetime},
    models::{
        validation::{validate_camper_age, validate_camper_name},
        Camper, CamperUpdate, NewCamper,
    },
    repositories::{delete_owner, ensure_unmodified, SignupOwner},
    Database, StoreError,
};

pub(crate) const CAMPER_COLUMNS: &str = "campers.id AS id, campers.name AS name, \
     campers.age AS age, campers.created_at AS created_at, campers.updated_at AS updated_at";

pub(crate) fn row_to_camper(row: &Row) -> Result<Camper> {
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(Camper {
        id: row.get("id")?,
        name: row.get("name")?,
        age: row.get("age")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

pub struct CamperRepository<'a> {
    conn: &'a Connection,
}

impl<'a> CamperRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Validates name and age before anything is written.
    pub fn insert(&self, input: &NewCamper) -> Result<Camper> {
        let name = validate_camper_name(input.name.as_deref())?.to_string();
        let age = validate_camper_age(input.age)?;
        let created_at = now();

        self.conn.execute(
            "INSERT INTO campers (name, age, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)",
            params![name, age, format_datetime(&created_at)],
        )?;

        let id = self.conn.last_insert_rowid();
        info!("Registered camper {id}");

        Ok(Camper {
            id,
            name,
            age,
            created_at,
            updated_at: created_at,
        })
    }

    pub fn get(&self, id: i64) -> Result<Option<Camper>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {CAMPER_COLUMNS} FROM campers WHERE id = ?1"))?;

        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_camper(row)?)),
            None => Ok(None),
        }
    }

    pub fn require(&self, id: i64) -> Result<Camper> {
        self.get(id)?
            .ok_or_else(|| StoreError::NotFound { entity: "camper", id }.into())
    }

    pub fn list(&self) -> Result<Vec<Camper>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {CAMPER_COLUMNS} FROM campers ORDER BY id ASC"))?;

        let mut rows = stmt.query([])?;
        let mut campers = Vec::new();
        while let Some(row) = rows.next()? {
            campers.push(row_to_camper(row)?);
        }

        Ok(campers)
    }

    /// Every field present in `changes` goes through its validator again.
    pub fn update(&self, id: i64, changes: &CamperUpdate) -> Result<Camper> {
        if changes.is_empty() {
            return Err(StoreError::EmptyUpdate.into());
        }

        let current = self.require(id)?;
        ensure_unmodified("camper", id, current.updated_at, changes.if_unmodified_since)?;

        let name = match changes.name.as_deref() {
            Some(name) => validate_camper_name(Some(name))?.to_string(),
            None => current.name,
        };
        let age = match changes.age {
            Some(age) => validate_camper_age(age)?,
            None => current.age,
        };
        let updated_at = advance_timestamp(current.updated_at);

        let rows_affected = self.conn.execute(
            "UPDATE campers
             SET name = ?1,
                 age = ?2,
                 updated_at = ?3
             WHERE id = ?4",
            params![name, age, format_datetime(&updated_at), id],
        )?;
        if rows_affected == 0 {
            return Err(anyhow!("Camper {id} vanished during update"));
        }

        Ok(Camper {
            id,
            name,
            age,
            created_at: current.created_at,
            updated_at,
        })
    }
}

impl Database {
    pub async fn create_camper(&self, input: NewCamper) -> Result<Camper> {
        self.transact(move |tx| CamperRepository::new(tx).insert(&input))
            .await
    }

    pub async fn get_camper(&self, id: i64) -> Result<Option<Camper>> {
        self.execute(move |conn| CamperRepository::new(conn).get(id))
            .await
    }

    pub async fn list_campers(&self) -> Result<Vec<Camper>> {
        self.execute(|conn| CamperRepository::new(conn).list()).await
    }

    pub async fn update_camper(&self, id: i64, changes: CamperUpdate) -> Result<Camper> {
        self.transact(move |tx| CamperRepository::new(tx).update(id, &changes))
            .await
    }

    pub async fn delete_camper(&self, id: i64) -> Result<usize> {
        let policy = self.delete_policy();
        self.transact(move |tx| delete_owner(tx, SignupOwner::Camper, id, policy))
            .await
    }
}
