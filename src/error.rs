use thiserror::Error;

use crate::auth::password::PasswordError;

/// Failures surfaced by the store. Lookups report absence as `Ok(None)` or
/// an empty `Vec`; `NotFound` is only returned when a write targets a row
/// that does not exist.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database initialization failed: {0}")]
    Init(#[source] sqlx::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt {entity} row {id}: {reason}")]
    Corrupt {
        entity: &'static str,
        id: i64,
        reason: String,
    },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("time formatting error: {0}")]
    TimeFormat(#[from] time::error::Format),
}

impl StoreError {
    /// A write rejected by a UNIQUE constraint.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StoreError::Database(sqlx::Error::Database(e)) if e.is_unique_violation())
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
