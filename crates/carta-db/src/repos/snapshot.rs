//! Snapshot repository: published measure-data dates.

use carta_core::Snapshot;

use crate::error::DatabaseError;
use crate::helpers::parse_snapshot;
use crate::service::CartaService;

impl CartaService {
    /// All published snapshots, newest first.
    pub async fn list_snapshots(&self) -> Result<Vec<Snapshot>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with("SELECT snapshot FROM snapshots ORDER BY snapshot DESC", || ())
            .await?;
        let mut snapshots = Vec::new();
        while let Some(row) = rows.next().await? {
            snapshots.push(parse_snapshot(&row.get::<String>(0)?)?);
        }
        Ok(snapshots)
    }

    /// The most recent snapshot, if any has been published.
    pub async fn latest_snapshot(&self) -> Result<Option<Snapshot>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with("SELECT MAX(snapshot) FROM snapshots", || ())
            .await?;
        let Some(row) = rows.next().await? else {
            return Ok(None);
        };
        row.get::<Option<String>>(0)?
            .map(|s| parse_snapshot(&s))
            .transpose()
    }

    pub async fn snapshot_exists(&self, snapshot: Snapshot) -> Result<bool, DatabaseError> {
        let iso = snapshot.as_iso();
        let mut rows = self
            .db()
            .query_with("SELECT 1 FROM snapshots WHERE snapshot = ?1", || [iso.as_str()])
            .await?;
        Ok(rows.next().await?.is_some())
    }

    /// Fail with `UnknownSnapshot` unless the snapshot has been published.
    pub async fn require_snapshot(&self, snapshot: Snapshot) -> Result<(), DatabaseError> {
        if self.snapshot_exists(snapshot).await? {
            Ok(())
        } else {
            Err(DatabaseError::UnknownSnapshot(snapshot))
        }
    }
}
