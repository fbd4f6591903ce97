//! Activity data models.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bookable camp activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: i64,
    pub name: Option<String>,
    pub difficulty: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Activity: {}", self.name.as_deref().unwrap_or("None"))
    }
}

/// Input data for creating an activity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewActivity {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub difficulty: Option<i64>,
}

/// Fields to change on an existing activity; `None` leaves a field as is.
///
/// A nullable column can be filled or changed here but not cleared back to NULL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityUpdate {
    pub name: Option<String>,
    pub difficulty: Option<i64>,
    /// Reject the update if the row's `updated_at` no longer matches.
    pub if_unmodified_since: Option<DateTime<Utc>>,
}

impl ActivityUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.difficulty.is_none()
    }
}
