//! Measure store (libSQL) configuration.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

fn default_path() -> String {
    ".carta/carta.db".to_string()
}

/// Default number of attempts for transient remote errors.
const fn default_retry_max_attempts() -> u32 {
    4
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Local database file. `:memory:` opens a throwaway in-memory store.
    #[serde(default = "default_path")]
    pub path: String,

    /// Remote libSQL URL (e.g., `libsql://carta-prod.turso.io`). Takes
    /// precedence over `path` when set together with `auth_token`.
    #[serde(default)]
    pub url: String,

    /// Auth token for the remote database.
    #[serde(default)]
    pub auth_token: String,

    /// Attempts per statement before a transient remote error is surfaced.
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            url: String::new(),
            auth_token: String::new(),
            retry_max_attempts: default_retry_max_attempts(),
        }
    }
}

impl DatabaseConfig {
    /// Check if the config has the minimum required fields for remote access.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        !self.url.is_empty() && !self.auth_token.is_empty()
    }

    /// Check if the store is a throwaway in-memory database.
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.retry_max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "database.retry_max_attempts".into(),
                reason: "must be at least 1".into(),
            });
        }
        if !self.url.is_empty() && self.auth_token.is_empty() {
            return Err(ConfigError::NotConfigured {
                section: "database (url set without auth_token)".into(),
            });
        }
        if self.url.is_empty() && self.path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.path".into(),
                reason: "must not be empty when no remote url is set".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_local_file() {
        let config = DatabaseConfig::default();
        assert!(!config.is_remote());
        assert!(!config.is_in_memory());
        assert_eq!(config.path, ".carta/carta.db");
        assert_eq!(config.retry_max_attempts, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn remote_when_url_and_token_set() {
        let config = DatabaseConfig {
            url: "libsql://carta.turso.io".into(),
            auth_token: "token123".into(),
            ..Default::default()
        };
        assert!(config.is_remote());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn url_without_token_is_not_configured() {
        let config = DatabaseConfig {
            url: "libsql://carta.turso.io".into(),
            ..Default::default()
        };
        assert!(!config.is_remote());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotConfigured { .. })
        ));
    }

    #[test]
    fn zero_retry_attempts_rejected() {
        let config = DatabaseConfig {
            retry_max_attempts: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "database.retry_max_attempts"
        ));
    }
}
