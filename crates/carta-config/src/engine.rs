//! Matrix engine tuning.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ConfigError;

const fn default_radius_miles() -> f64 {
    10.0
}

const fn default_fetch_timeout_ms() -> u64 {
    5_000
}

const fn default_query_chunk_size() -> usize {
    500
}

const fn default_cache_ttl_secs() -> u64 {
    300
}

const fn default_cache_capacity() -> usize {
    128
}

const fn default_min_reference_population() -> usize {
    1
}

const fn default_include_origin() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Radius used when a command does not pass one.
    #[serde(default = "default_radius_miles")]
    pub default_radius_miles: f64,

    /// Upper bound on each store fetch issued while building a matrix.
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// Maximum facility ids per observation query.
    #[serde(default = "default_query_chunk_size")]
    pub query_chunk_size: usize,

    /// Lifetime of a cached matrix. `0` disables caching.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Maximum number of cached matrices.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// National distribution size below which the market-average
    /// percentile is left empty.
    #[serde(default = "default_min_reference_population")]
    pub min_reference_population: usize,

    /// Whether the origin facility appears in its own proximity results.
    #[serde(default = "default_include_origin")]
    pub include_origin: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_radius_miles: default_radius_miles(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            query_chunk_size: default_query_chunk_size(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_capacity: default_cache_capacity(),
            min_reference_population: default_min_reference_population(),
            include_origin: default_include_origin(),
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Whether matrices should be cached at all.
    #[must_use]
    pub const fn cache_enabled(&self) -> bool {
        self.cache_ttl_secs > 0 && self.cache_capacity > 0
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &str, reason: &str| ConfigError::InvalidValue {
            field: format!("engine.{field}"),
            reason: reason.to_string(),
        };

        if !self.default_radius_miles.is_finite() || self.default_radius_miles < 0.0 {
            return Err(invalid(
                "default_radius_miles",
                "must be a finite, non-negative number",
            ));
        }
        if self.fetch_timeout_ms == 0 {
            return Err(invalid("fetch_timeout_ms", "must be greater than zero"));
        }
        if self.query_chunk_size == 0 {
            return Err(invalid("query_chunk_size", "must be greater than zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = EngineConfig::default();
        assert!((config.default_radius_miles - 10.0).abs() < f64::EPSILON);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(5));
        assert_eq!(config.query_chunk_size, 500);
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.cache_capacity, 128);
        assert_eq!(config.min_reference_population, 1);
        assert!(config.include_origin);
        assert!(config.cache_enabled());
    }

    #[test]
    fn zero_ttl_disables_cache() {
        let config = EngineConfig {
            cache_ttl_secs: 0,
            ..Default::default()
        };
        assert!(!config.cache_enabled());
    }

    #[test]
    fn negative_radius_rejected() {
        let config = EngineConfig {
            default_radius_miles: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_chunk_size_rejected() {
        let config = EngineConfig {
            query_chunk_size: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("engine.query_chunk_size"));
    }
}
