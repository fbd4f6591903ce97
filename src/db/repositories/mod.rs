pub mod activities;
pub mod associations;
pub mod campers;
pub mod signups;

pub use activities::ActivityRepository;
pub use associations::AssociationRepository;
pub use campers::CamperRepository;
pub use signups::SignupRepository;

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::info;
use rusqlite::{params, Connection};

use crate::{config::DeletePolicy, db::StoreError};

/// The side of a signup that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupOwner {
    Camper,
    Activity,
}

impl SignupOwner {
    pub fn entity(self) -> &'static str {
        match self {
            SignupOwner::Camper => "camper",
            SignupOwner::Activity => "activity",
        }
    }

    pub fn table(self) -> &'static str {
        match self {
            SignupOwner::Camper => "campers",
            SignupOwner::Activity => "activities",
        }
    }

    pub fn signup_column(self) -> &'static str {
        match self {
            SignupOwner::Camper => "camper_id",
            SignupOwner::Activity => "activity_id",
        }
    }
}

fn ensure_unmodified(
    entity: &'static str,
    id: i64,
    current: DateTime<Utc>,
    expected: Option<DateTime<Utc>>,
) -> Result<()> {
    match expected {
        Some(expected) if expected != current => Err(StoreError::Conflict { entity, id }.into()),
        _ => Ok(()),
    }
}

/// Delete a camper or activity according to `policy`.
/// Returns the number of signups removed along with it.
fn delete_owner(conn: &Connection, owner: SignupOwner, id: i64, policy: DeletePolicy) -> Result<usize> {
    let signups = SignupRepository::new(conn).count_for(owner, id)?;

    if signups > 0 && policy == DeletePolicy::Restrict {
        return Err(StoreError::InUse {
            entity: owner.entity(),
            id,
            signups,
        }
        .into());
    }

    let removed = if signups > 0 {
        SignupRepository::new(conn).delete_for(owner, id)?
    } else {
        0
    };

    let rows_affected = conn.execute(
        &format!("DELETE FROM {} WHERE id = ?1", owner.table()),
        params![id],
    )?;
    if rows_affected == 0 {
        return Err(StoreError::NotFound {
            entity: owner.entity(),
            id,
        }
        .into());
    }

    info!("Deleted {} {id} and {removed} signup(s)", owner.entity());
    Ok(removed)
}

#[cfg(test)]
pub(crate) fn test_connection() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.pragma_update(None, "foreign_keys", "ON").unwrap();
    crate::db::migrations::run_migrations(&mut conn).unwrap();
    conn
}
