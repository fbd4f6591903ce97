//! Camper data models.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camper {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Display for Camper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Camper: {}, Age: {}", self.name, self.age)
    }
}

/// Input data for registering a camper.
///
/// `name` is optional here so that a missing name reaches the validator and
/// fails with the camper-name message rather than a decoding error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCamper {
    #[serde(default)]
    pub name: Option<String>,
    pub age: i64,
}

impl NewCamper {
    pub fn new(name: impl Into<String>, age: i64) -> Self {
        Self {
            name: Some(name.into()),
            age,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CamperUpdate {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub if_unmodified_since: Option<DateTime<Utc>>,
}

impl CamperUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.age.is_none()
    }
}
