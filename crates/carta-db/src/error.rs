//! Database error types for carta-db.

use carta_core::Snapshot;
use carta_core::errors::CoreError;
use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed or returned data that could not be decoded.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// The facility id is not in the registry.
    #[error("Unknown facility '{0}'")]
    UnknownFacility(String),

    /// The snapshot has never been published.
    #[error("Unknown snapshot '{0}'")]
    UnknownSnapshot(Snapshot),

    /// Imported data violates a store invariant.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Invalid state encountered (e.g., bad data in DB).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A stored value failed core validation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
