//! Cross-cutting error types for Carta.
//!
//! This module defines errors raised while parsing or validating core values.
//! Store errors (`DatabaseError`) and resolution errors (`EngineError`) live in
//! their respective crates. The binary converges everything through `anyhow`.

use thiserror::Error;

/// Errors that can be raised by any Carta crate while building core values.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// Latitude/longitude outside WGS84 bounds or not finite.
    #[error("Invalid coordinates: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    /// A snapshot string that is not an ISO `YYYY-MM-DD` date.
    #[error("Invalid snapshot date '{0}' (expected YYYY-MM-DD)")]
    InvalidSnapshot(String),

    /// An enum string that does not name a known variant.
    #[error("Unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },

    /// Data failed validation (format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),
}
