//! Field validators.
//!
//! Each validator hands the value back on success so it can be used inline at
//! the point of assignment. Repositories call them on inserts and on every
//! update that touches the guarded field.

use thiserror::Error;

pub const MIN_CAMPER_AGE: i64 = 8;
pub const MAX_CAMPER_AGE: i64 = 18;
pub const FIRST_HOUR: i64 = 0;
pub const LAST_HOUR: i64 = 23;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Camper must have name.")]
    CamperName,

    #[error("Camper must be between 8 and 18 years old.")]
    CamperAge,

    #[error("Time must be an hour between 0 and 23")]
    SignupTime,
}

pub fn validate_camper_name(name: Option<&str>) -> Result<&str, ValidationError> {
    match name {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(ValidationError::CamperName),
    }
}

pub fn validate_camper_age(age: i64) -> Result<i64, ValidationError> {
    if (MIN_CAMPER_AGE..=MAX_CAMPER_AGE).contains(&age) {
        Ok(age)
    } else {
        Err(ValidationError::CamperAge)
    }
}

pub fn validate_signup_time(time: i64) -> Result<i64, ValidationError> {
    if (FIRST_HOUR..=LAST_HOUR).contains(&time) {
        Ok(time)
    } else {
        Err(ValidationError::SignupTime)
    }
}
