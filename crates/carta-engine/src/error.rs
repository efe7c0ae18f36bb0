//! Engine error types for carta-engine.

use carta_core::enums::BenchmarkLevel;
use carta_db::error::DatabaseError;

/// Errors from proximity, benchmark and matrix resolution.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// The origin facility has no valid WGS84 position.
    #[error("invalid origin: {0}")]
    InvalidOrigin(String),

    /// Radius is zero, negative, or not finite.
    #[error("invalid radius {0}: must be a positive, finite number of miles")]
    InvalidRadius(f64),

    /// The facility id is not in the registry.
    #[error("unknown facility '{0}'")]
    UnknownFacility(String),

    /// The snapshot has not been published (or none exist yet).
    #[error("unknown snapshot '{0}'")]
    UnknownSnapshot(String),

    /// No benchmark aggregate exists for the key, or the key is malformed.
    #[error("unknown {level} benchmark key '{key}'")]
    UnknownKey { level: BenchmarkLevel, key: String },

    /// A state or county benchmark was requested without a key.
    #[error("benchmark level '{0}' requires a key")]
    MissingKey(BenchmarkLevel),

    /// A store fetch failed or timed out.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The measure selection is empty, repeats a code, or names a measure
    /// outside the active dictionary.
    #[error("invalid measure selection: {0}")]
    InvalidSelection(String),

    /// A newer request was issued before this one finished.
    #[error("request superseded by a newer request")]
    Superseded,
}

impl From<DatabaseError> for EngineError {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::UnknownFacility(id) => Self::UnknownFacility(id),
            DatabaseError::UnknownSnapshot(s) => Self::UnknownSnapshot(s.to_string()),
            other => Self::UpstreamUnavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_store_errors_keep_their_meaning() {
        let e: EngineError = DatabaseError::UnknownFacility("F9".into()).into();
        assert_eq!(e, EngineError::UnknownFacility("F9".into()));

        let snap = "2024-05-01".parse().unwrap();
        let e: EngineError = DatabaseError::UnknownSnapshot(snap).into();
        assert_eq!(e, EngineError::UnknownSnapshot("2024-05-01".into()));
    }

    #[test]
    fn other_store_errors_are_upstream_failures() {
        let e: EngineError = DatabaseError::Query("boom".into()).into();
        assert!(matches!(e, EngineError::UpstreamUnavailable(msg) if msg.contains("boom")));
    }
}
