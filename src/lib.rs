//! Persistence for a summer camp's activity sign-ups.
//!
//! Campers sign up for activities at an hour of the day. The [`Database`]
//! handle owns the SQLite connection and exposes create/read/update/delete
//! for each entity, the derived camper <-> activity links, and serializable
//! documents with back-references cut.

pub mod config;
pub mod db;

pub use config::{DeletePolicy, StoreConfig};
pub use db::{
    models::{
        validation::{validate_camper_age, validate_camper_name, validate_signup_time},
        Activity, ActivityDocument, ActivityUpdate, Camper, CamperDocument, CamperUpdate,
        NewActivity, NewCamper, Signup, SignupDocument, SignupInput, ValidationError,
    },
    Database, StoreError,
};
