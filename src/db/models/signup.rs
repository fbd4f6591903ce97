//! Signup data models.
//!
//! A signup joins one camper to one activity at an hour of the day. It holds
//! the two foreign keys; campers and activities never point back at it.

use serde::{Deserialize, Serialize};

use super::{Activity, Camper};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signup {
    pub id: i64,
    /// Hour of day. Unset only for signups created through a derived
    /// camper/activity link.
    pub time: Option<i64>,
    pub camper_id: i64,
    pub activity_id: i64,
}

/// A signup that has not been written yet.
///
/// Fields are private: a scheduled signup always carries an hour, and a
/// time-less one can only come from [`NewSignup::link`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSignup {
    camper_id: i64,
    activity_id: i64,
    time: Option<i64>,
}

impl NewSignup {
    pub fn at_hour(camper_id: i64, activity_id: i64, time: i64) -> Self {
        Self {
            camper_id,
            activity_id,
            time: Some(time),
        }
    }

    /// Creator used when a camper and an activity are linked directly.
    /// Leaves `time` unset.
    pub(crate) fn link(camper: &Camper, activity: &Activity) -> Self {
        Self {
            camper_id: camper.id,
            activity_id: activity.id,
            time: None,
        }
    }

    pub fn camper_id(&self) -> i64 {
        self.camper_id
    }

    pub fn activity_id(&self) -> i64 {
        self.activity_id
    }

    pub fn time(&self) -> Option<i64> {
        self.time
    }
}

/// Input data for scheduling a signup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupInput {
    pub camper_id: i64,
    pub activity_id: i64,
    pub time: i64,
}

impl From<SignupInput> for NewSignup {
    fn from(input: SignupInput) -> Self {
        NewSignup::at_hour(input.camper_id, input.activity_id, input.time)
    }
}
