use std::time::Duration;

use thiserror::Error;

/// Failure reported by a [`LedgerStore`](crate::store::LedgerStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// The store refused the payload (constraint violation, conflict, bad filter).
    #[error("rejected by store: {0}")]
    Rejected(String),
    #[error("store error: {0}")]
    Server(String),
    #[error("database error: {0}")]
    Database(#[from] libsql::Error),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// A row did not match the entity shape.
    #[error("malformed row: {0}")]
    Decode(String),
    #[error("store did not respond within {0:?}")]
    Timeout(Duration),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Decode(err.to_string())
    }
}

/// Caller-side validation failure. Never reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
