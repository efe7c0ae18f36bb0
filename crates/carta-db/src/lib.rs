//! # carta-db
//!
//! libSQL store for the Carta facility registry, quality-measure dictionary,
//! published measure snapshots and benchmark aggregates.
//!
//! The engine reads through the repository methods on [`service::CartaService`];
//! the only write path is dataset ingestion (`repos::ingest`).
//!
//! Uses the `libsql` crate (C `SQLite` fork, v0.9.29). Local files and
//! `:memory:` stores are opened with [`CartaDb::open_local`]; a remote libSQL
//! server with [`CartaDb::open_remote`].

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod retry;
pub mod service;

use error::DatabaseError;
use libsql::Builder;
use libsql::params::IntoParams;
use retry::{RetryConfig, is_transient_remote_error};

/// Central database handle for all Carta store operations.
pub struct CartaDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    remote: bool,
    retry: RetryConfig,
}

impl CartaDb {
    /// Open a local database at the given path (`:memory:` for a throwaway store).
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let carta_db = Self {
            db,
            conn,
            remote: false,
            retry: RetryConfig::default(),
        };
        carta_db.run_migrations().await?;
        Ok(carta_db)
    }

    /// Open a remote libSQL database.
    ///
    /// Statements against a remote store are retried on transient errors
    /// according to `retry`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the connection cannot be established or
    /// migrations fail.
    pub async fn open_remote(
        url: &str,
        auth_token: &str,
        retry: RetryConfig,
    ) -> Result<Self, DatabaseError> {
        let db = Builder::new_remote(url.to_string(), auth_token.to_string())
            .build()
            .await?;
        let conn = db.connect()?;

        let carta_db = Self {
            db,
            conn,
            remote: true,
            retry,
        };
        carta_db.run_migrations().await?;
        Ok(carta_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Returns whether this handle talks to a remote server.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        self.remote
    }

    /// Run a query, rebuilding its parameters for every retry attempt.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::LibSql` once retries are exhausted or the
    /// error is not transient.
    pub async fn query_with<F, P>(&self, sql: &str, params: F) -> Result<libsql::Rows, DatabaseError>
    where
        F: Fn() -> P,
        P: IntoParams,
    {
        let mut attempt = 1;
        loop {
            match self.conn.query(sql, params()).await {
                Ok(rows) => return Ok(rows),
                Err(e) if self.should_retry(&e, attempt) => {
                    self.backoff(&e, attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Execute a statement, rebuilding its parameters for every retry attempt.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::LibSql` once retries are exhausted or the
    /// error is not transient.
    pub async fn execute_with<F, P>(&self, sql: &str, params: F) -> Result<u64, DatabaseError>
    where
        F: Fn() -> P,
        P: IntoParams,
    {
        let mut attempt = 1;
        loop {
            match self.conn.execute(sql, params()).await {
                Ok(changed) => return Ok(changed),
                Err(e) if self.should_retry(&e, attempt) => {
                    self.backoff(&e, attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn should_retry(&self, e: &libsql::Error, attempt: u32) -> bool {
        self.remote && attempt < self.retry.max_attempts && is_transient_remote_error(e)
    }

    async fn backoff(&self, e: &libsql::Error, attempt: u32) {
        let delay = self.retry.delay_for(attempt);
        tracing::warn!(
            attempt,
            max_attempts = self.retry.max_attempts,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %e,
            "transient libSQL error, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> CartaDb {
        CartaDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;

        let tables = [
            "facilities",
            "facility_locations",
            "quality_measures",
            "snapshots",
            "measure_observations",
            "national_averages",
            "benchmark_aggregates",
        ];
        for table in &tables {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [*table],
                )
                .await
                .unwrap();
            let row = rows.next().await.unwrap();
            assert!(row.is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        // Running migrations twice is a no-op
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn local_handle_is_not_remote() {
        let db = test_db().await;
        assert!(!db.is_remote());
    }

    #[tokio::test]
    async fn execute_with_and_query_with_roundtrip() {
        let db = test_db().await;
        let changed = db
            .execute_with("INSERT INTO snapshots (snapshot) VALUES (?1)", || {
                libsql::params!["2024-05-01"]
            })
            .await
            .unwrap();
        assert_eq!(changed, 1);

        let mut rows = db
            .query_with("SELECT snapshot FROM snapshots", || ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<String>(0).unwrap(), "2024-05-01");
    }

    #[tokio::test]
    async fn constraint_violation_is_not_retried() {
        let db = test_db().await;
        let result = db
            .execute_with(
                "INSERT INTO measure_observations (facility_id, measure_code, snapshot, raw_score) VALUES ('nope', 'nope', 'nope', 1.0)",
                || (),
            )
            .await;
        assert!(matches!(result, Err(DatabaseError::LibSql(_))));
    }

    #[tokio::test]
    async fn percentile_range_is_enforced() {
        let db = test_db().await;
        db.conn()
            .execute_batch(
                "INSERT INTO snapshots VALUES ('2024-05-01');
                 INSERT INTO facilities (id, name, facility_type) VALUES ('F1', 'One', 'hospital');
                 INSERT INTO quality_measures (code, name, direction, category) VALUES ('A', 'A', 'higher_is_better', 'continuous');",
            )
            .await
            .unwrap();
        let result = db
            .conn()
            .execute(
                "INSERT INTO measure_observations VALUES ('F1', 'A', '2024-05-01', 1.0, 1.5)",
                (),
            )
            .await;
        assert!(result.is_err(), "percentile above 1 should be rejected");
    }
}
