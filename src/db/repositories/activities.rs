use anyhow::{anyhow, Result};
use log::info;
use rusqlite::{params, Connection, Row};

use crate::db::{
    helpers::{advance_timestamp, format_datetime, now, parse_datetime},
    models::{Activity, ActivityUpdate, NewActivity},
    repositories::{delete_owner, ensure_unmodified, SignupOwner},
    Database, StoreError,
};

pub(crate) const ACTIVITY_COLUMNS: &str = "activities.id AS id, activities.name AS name, \
     activities.difficulty AS difficulty, activities.created_at AS created_at, \
     activities.updated_at AS updated_at";

pub(crate) fn row_to_activity(row: &Row) -> Result<Activity> {
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(Activity {
        id: row.get("id")?,
        name: row.get("name")?,
        difficulty: row.get("difficulty")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

pub struct ActivityRepository<'a> {
    conn: &'a Connection,
}

impl<'a> ActivityRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, input: &NewActivity) -> Result<Activity> {
        let created_at = now();
        self.conn.execute(
            "INSERT INTO activities (name, difficulty, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)",
            params![input.name, input.difficulty, format_datetime(&created_at)],
        )?;

        let id = self.conn.last_insert_rowid();
        info!("Created activity {id}");

        Ok(Activity {
            id,
            name: input.name.clone(),
            difficulty: input.difficulty,
            created_at,
            updated_at: created_at,
        })
    }

    pub fn get(&self, id: i64) -> Result<Option<Activity>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities WHERE id = ?1"
        ))?;

        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_activity(row)?)),
            None => Ok(None),
        }
    }

    pub fn require(&self, id: i64) -> Result<Activity> {
        self.get(id)?.ok_or_else(|| {
            StoreError::NotFound {
                entity: "activity",
                id,
            }
            .into()
        })
    }

    pub fn list(&self) -> Result<Vec<Activity>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities ORDER BY id ASC"
        ))?;

        let mut rows = stmt.query([])?;
        let mut activities = Vec::new();
        while let Some(row) = rows.next()? {
            activities.push(row_to_activity(row)?);
        }

        Ok(activities)
    }

    pub fn update(&self, id: i64, changes: &ActivityUpdate) -> Result<Activity> {
        if changes.is_empty() {
            return Err(StoreError::EmptyUpdate.into());
        }

        let current = self.require(id)?;
        ensure_unmodified("activity", id, current.updated_at, changes.if_unmodified_since)?;

        let name = changes.name.clone().or(current.name);
        let difficulty = changes.difficulty.or(current.difficulty);
        let updated_at = advance_timestamp(current.updated_at);

        let rows_affected = self.conn.execute(
            "UPDATE activities
             SET name = ?1,
                 difficulty = ?2,
                 updated_at = ?3
             WHERE id = ?4",
            params![name, difficulty, format_datetime(&updated_at), id],
        )?;
        if rows_affected == 0 {
            return Err(anyhow!("Activity {id} vanished during update"));
        }

        Ok(Activity {
            id,
            name,
            difficulty,
            created_at: current.created_at,
            updated_at,
        })
    }
}

impl Database {
    pub async fn create_activity(&self, input: NewActivity) -> Result<Activity> {
        self.transact(move |tx| ActivityRepository::new(tx).insert(&input))
            .await
    }

    pub async fn get_activity(&self, id: i64) -> Result<Option<Activity>> {
        self.execute(move |conn| ActivityRepository::new(conn).get(id))
            .await
    }

    pub async fn list_activities(&self) -> Result<Vec<Activity>> {
        self.execute(|conn| ActivityRepository::new(conn).list()).await
    }

    pub async fn update_activity(&self, id: i64, changes: ActivityUpdate) -> Result<Activity> {
        self.transact(move |tx| ActivityRepository::new(tx).update(id, &changes))
            .await
    }

    /// Delete an activity, handling its signups per the configured
    /// [`DeletePolicy`](crate::config::DeletePolicy).
    pub async fn delete_activity(&self, id: i64) -> Result<usize> {
        let policy = self.delete_policy();
        self.transact(move |tx| delete_owner(tx, SignupOwner::Activity, id, policy))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::DeletePolicy,
        db::{
            models::{NewCamper, NewSignup},
            repositories::{test_connection, CamperRepository, SignupRepository},
        },
    };

    fn archery() -> NewActivity {
        NewActivity {
            name: Some("Archery".into()),
            difficulty: Some(2),
        }
    }

    #[test]
    fn insert_then_get() {
        let conn = test_connection();
        let repo = ActivityRepository::new(&conn);

        let created = repo.insert(&archery()).unwrap();
        assert_eq!(created.created_at, created.updated_at);
        assert_eq!(repo.get(created.id).unwrap(), Some(created.clone()));
        assert_eq!(repo.list().unwrap(), vec![created]);
        assert_eq!(repo.get(999).unwrap(), None);
    }

    #[test]
    fn update_advances_updated_at_only() {
        let conn = test_connection();
        let repo = ActivityRepository::new(&conn);
        let created = repo.insert(&archery()).unwrap();

        let updated = repo
            .update(
                created.id,
                &ActivityUpdate {
                    difficulty: Some(4),
                    ..ActivityUpdate::default()
                },
            )
            .unwrap();

        assert_eq!(updated.name.as_deref(), Some("Archery"));
        assert_eq!(updated.difficulty, Some(4));
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
        assert_eq!(repo.get(created.id).unwrap(), Some(updated));
    }

    #[test]
    fn stale_update_is_a_conflict() {
        let conn = test_connection();
        let repo = ActivityRepository::new(&conn);
        let created = repo.insert(&archery()).unwrap();

        repo.update(
            created.id,
            &ActivityUpdate {
                name: Some("Field Archery".into()),
                if_unmodified_since: Some(created.updated_at),
                ..ActivityUpdate::default()
            },
        )
        .unwrap();

        let err = repo
            .update(
                created.id,
                &ActivityUpdate {
                    name: Some("Target Archery".into()),
                    if_unmodified_since: Some(created.updated_at),
                    ..ActivityUpdate::default()
                },
            )
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<StoreError>(),
            Some(&StoreError::Conflict {
                entity: "activity",
                id: created.id
            })
        );
    }

    #[test]
    fn empty_update_and_missing_row_are_rejected() {
        let conn = test_connection();
        let repo = ActivityRepository::new(&conn);

        let err = repo.update(1, &ActivityUpdate::default()).unwrap_err();
        assert_eq!(err.downcast_ref::<StoreError>(), Some(&StoreError::EmptyUpdate));

        let err = repo
            .update(
                42,
                &ActivityUpdate {
                    difficulty: Some(1),
                    ..ActivityUpdate::default()
                },
            )
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<StoreError>(),
            Some(&StoreError::NotFound {
                entity: "activity",
                id: 42
            })
        );
    }

    #[test]
    fn delete_respects_policy() {
        let conn = test_connection();
        let activity = ActivityRepository::new(&conn).insert(&archery()).unwrap();
        let camper = CamperRepository::new(&conn)
            .insert(&NewCamper::new("Alex", 12))
            .unwrap();
        SignupRepository::new(&conn)
            .insert(&NewSignup::at_hour(camper.id, activity.id, 9))
            .unwrap();

        let err = delete_owner(&conn, SignupOwner::Activity, activity.id, DeletePolicy::Restrict)
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<StoreError>(),
            Some(&StoreError::InUse {
                entity: "activity",
                id: activity.id,
                signups: 1
            })
        );

        let removed =
            delete_owner(&conn, SignupOwner::Activity, activity.id, DeletePolicy::Cascade).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(ActivityRepository::new(&conn).get(activity.id).unwrap(), None);
        assert!(SignupRepository::new(&conn).list().unwrap().is_empty());
    }
}
