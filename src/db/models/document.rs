//! Serialized views of the camp entities.
//!
//! Campers, activities and signups reference each other in both directions,
//! so a naive serializer would recurse forever. Each document type below
//! nests only summaries, which carry no relationships and no timestamps:
//!
//! - an activity drops its timestamps, `signups[].activity` and
//!   `campers[].activities`
//! - a camper drops its timestamps, `signups[].camper` and
//!   `activities[].campers`
//! - a signup drops `activity.signups` and `camper.signups`

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Activity, Camper, Signup};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub id: i64,
    pub name: Option<String>,
    pub difficulty: Option<i64>,
}

impl From<&Activity> for ActivitySummary {
    fn from(activity: &Activity) -> Self {
        Self {
            id: activity.id,
            name: activity.name.clone(),
            difficulty: activity.difficulty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CamperSummary {
    pub id: i64,
    pub name: String,
    pub age: i64,
}

impl From<&Camper> for CamperSummary {
    fn from(camper: &Camper) -> Self {
        Self {
            id: camper.id,
            name: camper.name.clone(),
            age: camper.age,
        }
    }
}

/// A signup as seen from its activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySignupEntry {
    pub id: i64,
    pub time: Option<i64>,
    pub camper_id: i64,
    pub activity_id: i64,
    pub camper: CamperSummary,
}

/// A signup as seen from its camper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CamperSignupEntry {
    pub id: i64,
    pub time: Option<i64>,
    pub camper_id: i64,
    pub activity_id: i64,
    pub activity: ActivitySummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityDocument {
    pub id: i64,
    pub name: Option<String>,
    pub difficulty: Option<i64>,
    pub signups: Vec<ActivitySignupEntry>,
    pub campers: Vec<CamperSummary>,
}

impl ActivityDocument {
    /// `signups` pairs each of the activity's signups with its camper.
    pub fn assemble(activity: &Activity, signups: &[(Signup, Camper)]) -> Self {
        Self {
            id: activity.id,
            name: activity.name.clone(),
            difficulty: activity.difficulty,
            signups: signups
                .iter()
                .map(|(signup, camper)| ActivitySignupEntry {
                    id: signup.id,
                    time: signup.time,
                    camper_id: signup.camper_id,
                    activity_id: signup.activity_id,
                    camper: camper.into(),
                })
                .collect(),
            campers: signups.iter().map(|(_, camper)| camper.into()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CamperDocument {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub signups: Vec<CamperSignupEntry>,
    pub activities: Vec<ActivitySummary>,
}

impl CamperDocument {
    pub fn assemble(camper: &Camper, signups: &[(Signup, Activity)]) -> Self {
        Self {
            id: camper.id,
            name: camper.name.clone(),
            age: camper.age,
            signups: signups
                .iter()
                .map(|(signup, activity)| CamperSignupEntry {
                    id: signup.id,
                    time: signup.time,
                    camper_id: signup.camper_id,
                    activity_id: signup.activity_id,
                    activity: activity.into(),
                })
                .collect(),
            activities: signups.iter().map(|(_, activity)| activity.into()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignupDocument {
    pub id: i64,
    pub time: Option<i64>,
    pub camper_id: i64,
    pub activity_id: i64,
    pub camper: CamperSummary,
    pub activity: ActivitySummary,
}

impl SignupDocument {
    pub fn assemble(signup: &Signup, camper: &Camper, activity: &Activity) -> Self {
        Self {
            id: signup.id,
            time: signup.time,
            camper_id: signup.camper_id,
            activity_id: signup.activity_id,
            camper: camper.into(),
            activity: activity.into(),
        }
    }
}

impl fmt::Display for SignupDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signup: {}, Time: ", self.id)?;
        match self.time {
            Some(time) => write!(f, "{time}")?,
            None => write!(f, "None")?,
        }
        write!(
            f,
            ", Activity: {}, Camper: {}",
            self.activity.name.as_deref().unwrap_or("None"),
            self.camper.name
        )
    }
}
