//! Service layer over the Carta store.
//!
//! `CartaService` wraps `CartaDb` (raw database access) together with the
//! store tuning read from configuration. All repo methods are implemented as
//! `impl CartaService` blocks under `repos/`.

use carta_config::DatabaseConfig;

use crate::CartaDb;
use crate::error::DatabaseError;
use crate::retry::RetryConfig;

/// Default maximum number of ids bound into one `IN (...)` query.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

pub struct CartaService {
    db: CartaDb,
    chunk_size: usize,
}

impl CartaService {
    /// Create a new service over a local database.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the libSQL database file, or `":memory:"` for tests.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = CartaDb::open_local(db_path).await?;
        Ok(Self::from_db(db))
    }

    /// Open the store described by configuration: remote when a URL and token
    /// are set, otherwise the local file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn from_config(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let db = if config.is_remote() {
            CartaDb::open_remote(
                &config.url,
                &config.auth_token,
                RetryConfig::with_max_attempts(config.retry_max_attempts),
            )
            .await?
        } else {
            CartaDb::open_local(&config.path).await?
        };
        Ok(Self::from_db(db))
    }

    /// Create from an existing `CartaDb`.
    #[must_use]
    pub const fn from_db(db: CartaDb) -> Self {
        Self {
            db,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Override the number of ids per chunked query (minimum 1).
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &CartaDb {
        &self.db
    }

    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}
