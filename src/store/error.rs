//! Store error type.

use thiserror::Error;

/// Errors returned by base-store operations.
///
/// The cache layer propagates these verbatim; it never retries and never
/// caches an error.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No row for the requested entity.
    #[error("{kind} with id {id} not found")]
    NotFound { kind: &'static str, id: String },

    /// A uniqueness or version conflict.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure (connection, query, serialization).
    #[error("store failure: {0}")]
    Internal(String),
}

impl StoreError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
