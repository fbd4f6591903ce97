use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::{params, Connection, Row};

use crate::db::{
    models::{validation::validate_signup_time, NewSignup, Signup, SignupInput},
    repositories::SignupOwner,
    Database, StoreError,
};

const SIGNUP_COLUMNS: &str = "signups.id AS id, signups.time AS time, \
     signups.camper_id AS camper_id, signups.activity_id AS activity_id";

fn row_to_signup(row: &Row) -> Result<Signup> {
    Ok(Signup {
        id: row.get("id")?,
        time: row.get("time")?,
        camper_id: row.get("camper_id")?,
        activity_id: row.get("activity_id")?,
    })
}

pub struct SignupRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SignupRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Write a signup. A set `time` is validated first; both endpoints must
    /// exist or the foreign keys reject the row.
    pub fn insert(&self, signup: &NewSignup) -> Result<Signup> {
        let time = signup.time().map(validate_signup_time).transpose()?;

        self.conn
            .execute(
                "INSERT INTO signups (time, camper_id, activity_id) VALUES (?1, ?2, ?3)",
                params![time, signup.camper_id(), signup.activity_id()],
            )
            .with_context(|| {
                format!(
                    "failed to sign up camper {} for activity {}",
                    signup.camper_id(),
                    signup.activity_id()
                )
            })?;

        let id = self.conn.last_insert_rowid();
        info!(
            "Signup {id}: camper {} -> activity {} at {time:?}",
            signup.camper_id(),
            signup.activity_id()
        );

        Ok(Signup {
            id,
            time,
            camper_id: signup.camper_id(),
            activity_id: signup.activity_id(),
        })
    }

    pub fn get(&self, id: i64) -> Result<Option<Signup>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {SIGNUP_COLUMNS} FROM signups WHERE id = ?1"))?;

        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_signup(row)?)),
            None => Ok(None),
        }
    }

    pub fn require(&self, id: i64) -> Result<Signup> {
        self.get(id)?
            .ok_or_else(|| StoreError::NotFound { entity: "signup", id }.into())
    }

    pub fn list(&self) -> Result<Vec<Signup>> {
        self.query_many(
            &format!("SELECT {SIGNUP_COLUMNS} FROM signups ORDER BY id ASC"),
            None,
        )
    }

    /// Signups owned by one camper or one activity.
    pub fn list_for(&self, owner: SignupOwner, id: i64) -> Result<Vec<Signup>> {
        self.query_many(
            &format!(
                "SELECT {SIGNUP_COLUMNS} FROM signups WHERE {} = ?1 ORDER BY id ASC",
                owner.signup_column()
            ),
            Some(id),
        )
    }

    pub fn count_for(&self, owner: SignupOwner, id: i64) -> Result<i64> {
        let count = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM signups WHERE {} = ?1", owner.signup_column()),
            params![id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn delete_for(&self, owner: SignupOwner, id: i64) -> Result<usize> {
        let removed = self.conn.execute(
            &format!("DELETE FROM signups WHERE {} = ?1", owner.signup_column()),
            params![id],
        )?;
        debug!("Removed {removed} signup(s) of {} {id}", owner.entity());
        Ok(removed)
    }

    pub fn update_time(&self, id: i64, time: i64) -> Result<Signup> {
        let time = validate_signup_time(time)?;

        let rows_affected = self.conn.execute(
            "UPDATE signups SET time = ?1 WHERE id = ?2",
            params![time, id],
        )?;
        if rows_affected == 0 {
            return Err(StoreError::NotFound { entity: "signup", id }.into());
        }

        self.require(id)
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM signups WHERE id = ?1", params![id])?;
        if rows_affected == 0 {
            return Err(StoreError::NotFound { entity: "signup", id }.into());
        }
        Ok(())
    }

    fn query_many(&self, sql: &str, id: Option<i64>) -> Result<Vec<Signup>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = match id {
            Some(id) => stmt.query(params![id])?,
            None => stmt.query([])?,
        };

        let mut signups = Vec::new();
        while let Some(row) = rows.next()? {
            signups.push(row_to_signup(row)?);
        }

        Ok(signups)
    }
}

impl Database {
    pub async fn create_signup(&self, input: SignupInput) -> Result<Signup> {
        self.transact(move |tx| SignupRepository::new(tx).insert(&input.into()))
            .await
    }

    pub async fn get_signup(&self, id: i64) -> Result<Option<Signup>> {
        self.execute(move |conn| SignupRepository::new(conn).get(id))
            .await
    }

    pub async fn list_signups(&self) -> Result<Vec<Signup>> {
        self.execute(|conn| SignupRepository::new(conn).list()).await
    }

    pub async fn update_signup_time(&self, id: i64, time: i64) -> Result<Signup> {
        self.transact(move |tx| SignupRepository::new(tx).update_time(id, time))
            .await
    }

    pub async fn delete_signup(&self, id: i64) -> Result<()> {
        self.transact(move |tx| SignupRepository::new(tx).delete(id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{
        models::{NewActivity, NewCamper, ValidationError},
        repositories::{test_connection, ActivityRepository, CamperRepository},
    };

    fn seed(conn: &Connection) -> (i64, i64) {
        let camper = CamperRepository::new(conn)
            .insert(&NewCamper::new("Alex", 12))
            .unwrap();
        let activity = ActivityRepository::new(conn)
            .insert(&NewActivity {
                name: Some("Canoeing".into()),
                difficulty: Some(3),
            })
            .unwrap();
        (camper.id, activity.id)
    }

    #[test]
    fn time_is_validated_on_insert() {
        let conn = test_connection();
        let (camper_id, activity_id) = seed(&conn);
        let repo = SignupRepository::new(&conn);

        for time in [-1, 24] {
            let err = repo
                .insert(&NewSignup::at_hour(camper_id, activity_id, time))
                .unwrap_err();
            assert_eq!(err.downcast_ref::<ValidationError>(), Some(&ValidationError::SignupTime));
        }
        for time in [0, 12, 23] {
            let signup = repo
                .insert(&NewSignup::at_hour(camper_id, activity_id, time))
                .unwrap();
            assert_eq!(signup.time, Some(time));
        }
        assert_eq!(repo.list().unwrap().len(), 3);
    }

    #[test]
    fn time_is_validated_on_update() {
        let conn = test_connection();
        let (camper_id, activity_id) = seed(&conn);
        let repo = SignupRepository::new(&conn);
        let signup = repo
            .insert(&NewSignup::at_hour(camper_id, activity_id, 9))
            .unwrap();

        let err = repo.update_time(signup.id, 24).unwrap_err();
        assert_eq!(err.to_string(), "Time must be an hour between 0 and 23");
        assert_eq!(repo.require(signup.id).unwrap().time, Some(9));

        let moved = repo.update_time(signup.id, 14).unwrap();
        assert_eq!(moved.time, Some(14));
    }

    #[test]
    fn unknown_endpoint_is_rejected_by_foreign_key() {
        let conn = test_connection();
        let (camper_id, _) = seed(&conn);

        let err = SignupRepository::new(&conn)
            .insert(&NewSignup::at_hour(camper_id, 404, 9))
            .unwrap_err();
        let source = err.downcast_ref::<rusqlite::Error>().unwrap();
        assert!(source.to_string().contains("FOREIGN KEY"));
    }

    #[test]
    fn list_and_delete_by_owner() {
        let conn = test_connection();
        let (camper_id, activity_id) = seed(&conn);
        let repo = SignupRepository::new(&conn);
        let first = repo
            .insert(&NewSignup::at_hour(camper_id, activity_id, 9))
            .unwrap();
        let second = repo
            .insert(&NewSignup::at_hour(camper_id, activity_id, 15))
            .unwrap();

        assert_eq!(
            repo.list_for(SignupOwner::Camper, camper_id).unwrap(),
            vec![first.clone(), second]
        );
        assert_eq!(repo.count_for(SignupOwner::Activity, activity_id).unwrap(), 2);

        repo.delete(first.id).unwrap();
        assert_eq!(repo.count_for(SignupOwner::Activity, activity_id).unwrap(), 1);
        assert!(repo.delete(first.id).is_err());

        assert_eq!(repo.delete_for(SignupOwner::Activity, activity_id).unwrap(), 1);
        assert!(repo.list().unwrap().is_empty());
    }
}
