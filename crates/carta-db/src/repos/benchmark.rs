//! Benchmark repository: enrollment aggregates per scope and snapshot.

use carta_core::Snapshot;
use carta_core::entities::BenchmarkAggregate;
use carta_core::enums::BenchmarkLevel;

use crate::error::DatabaseError;
use crate::helpers::{get_count, get_opt_string, parse_enum, parse_snapshot};
use crate::service::CartaService;

fn row_to_aggregate(row: &libsql::Row) -> Result<BenchmarkAggregate, DatabaseError> {
    Ok(BenchmarkAggregate {
        level: parse_enum(&row.get::<String>(0)?)?,
        key: get_opt_string(row, 1)?,
        snapshot: parse_snapshot(&row.get::<String>(2)?)?,
        total_count: get_count(row, 3)?,
        dual_eligible_count: get_count(row, 4)?,
        aged_count: get_count(row, 5)?,
        disabled_count: get_count(row, 6)?,
        advantage_count: get_count(row, 7)?,
    })
}

impl CartaService {
    /// Aggregate for one scope in one snapshot.
    ///
    /// `key` must already be in canonical form (see
    /// [`BenchmarkLevel::normalize_key`]); it is ignored for national.
    /// Returns `Ok(None)` when no aggregate row exists.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::UnknownSnapshot` if the snapshot is unpublished.
    pub async fn benchmark_aggregate(
        &self,
        level: BenchmarkLevel,
        key: Option<&str>,
        snapshot: Snapshot,
    ) -> Result<Option<BenchmarkAggregate>, DatabaseError> {
        self.require_snapshot(snapshot).await?;
        let key = if level.requires_key() {
            key.unwrap_or_default()
        } else {
            ""
        };
        let iso = snapshot.as_iso();
        let mut rows = self
            .db()
            .query_with(
                "SELECT level, key, snapshot, total_count, dual_eligible_count,
                        aged_count, disabled_count, advantage_count
                 FROM benchmark_aggregates
                 WHERE level = ?1 AND key = ?2 AND snapshot = ?3",
                || libsql::params![level.as_str(), key, iso.as_str()],
            )
            .await?;
        rows.next()
            .await?
            .map(|row| row_to_aggregate(&row))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use carta_core::enums::BenchmarkLevel;

    use crate::error::DatabaseError;
    use crate::test_support::helpers::{LATEST, seeded_service, snap};

    #[tokio::test]
    async fn national_ignores_key() {
        let svc = seeded_service().await;
        let agg = svc
            .benchmark_aggregate(BenchmarkLevel::National, Some("ZZ"), snap(LATEST))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(agg.level, BenchmarkLevel::National);
        assert_eq!(agg.key, None);
        assert_eq!(agg.total_count, 1_000_000);
    }

    #[tokio::test]
    async fn county_row_found_by_fips() {
        let svc = seeded_service().await;
        let agg = svc
            .benchmark_aggregate(BenchmarkLevel::County, Some("12086"), snap(LATEST))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(agg.key.as_deref(), Some("12086"));
        assert_eq!(agg.dual_eligible_count, 2_500);
    }

    #[tokio::test]
    async fn missing_row_is_none() {
        let svc = seeded_service().await;
        let agg = svc
            .benchmark_aggregate(BenchmarkLevel::State, Some("TX"), snap(LATEST))
            .await
            .unwrap();
        assert!(agg.is_none());
    }

    #[tokio::test]
    async fn unknown_snapshot_is_an_error() {
        let svc = seeded_service().await;
        let err = svc
            .benchmark_aggregate(BenchmarkLevel::National, None, snap("1990-01-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::UnknownSnapshot(_)));
    }
}
