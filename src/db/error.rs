use thiserror::Error;

/// Lookup and write-conflict failures raised by the repositories.
///
/// These travel inside `anyhow::Error`; use `downcast_ref::<StoreError>()` to
/// branch on them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("{entity} {id} was modified since it was read")]
    Conflict { entity: &'static str, id: i64 },

    #[error("{entity} {id} still has {signups} signup(s)")]
    InUse {
        entity: &'static str,
        id: i64,
        signups: i64,
    },

    #[error("No fields to update")]
    EmptyUpdate,
}
