//! Dataset ingestion: the only write path into the store.
//!
//! A dataset is validated up front and then written in a single transaction,
//! so a rejected import leaves the store untouched. Registry rows (facilities,
//! locations, measures) are upserted. Snapshot rows (observations, national
//! averages, benchmark aggregates) are frozen once their snapshot is
//! published: a re-import may repeat them verbatim but never change or extend
//! them.

use std::collections::BTreeSet;

use carta_core::Snapshot;
use carta_core::dataset::{Dataset, ImportSummary};
use carta_core::entities::BenchmarkAggregate;

use crate::error::DatabaseError;
use crate::helpers::{count_to_sql, get_count, parse_snapshot};
use crate::service::CartaService;

fn invalid(msg: impl Into<String>) -> DatabaseError {
    DatabaseError::InvalidData(msg.into())
}

fn validate(dataset: &Dataset) -> Result<Vec<Option<String>>, DatabaseError> {
    for f in &dataset.facilities {
        if f.id.trim().is_empty() || f.name.trim().is_empty() {
            return Err(invalid(format!("facility '{}' needs an id and a name", f.id)));
        }
        if let Some(c) = f.coordinates
            && !c.is_valid()
        {
            return Err(invalid(format!(
                "facility '{}' has invalid coordinates ({}, {})",
                f.id, c.latitude, c.longitude
            )));
        }
    }
    for l in &dataset.locations {
        if !l.coordinates.is_valid() {
            return Err(invalid(format!(
                "location for '{}' has invalid coordinates",
                l.facility_id
            )));
        }
    }
    for m in &dataset.measures {
        if m.code.trim().is_empty() {
            return Err(invalid("measure code must not be empty"));
        }
    }
    for o in &dataset.observations {
        if !o.raw_score.is_finite() {
            return Err(invalid(format!(
                "observation {}/{} has a non-finite raw score",
                o.facility_id, o.measure_code
            )));
        }
        check_percentile(o.percentile, &o.facility_id, &o.measure_code)?;
    }
    for a in &dataset.national_averages {
        if !a.raw_score.is_finite() {
            return Err(invalid(format!(
                "national average {} has a non-finite raw score",
                a.measure_code
            )));
        }
        check_percentile(a.percentile, "national", &a.measure_code)?;
    }
    for b in &dataset.benchmarks {
        let parts = [
            b.dual_eligible_count,
            b.aged_count,
            b.disabled_count,
            b.advantage_count,
        ];
        if parts.iter().any(|&count| count > b.total_count) {
            return Err(invalid(format!(
                "benchmark {} {} at {} has a sub-count above its total {}",
                b.level,
                b.key.as_deref().unwrap_or("-"),
                b.snapshot,
                b.total_count
            )));
        }
    }
    dataset
        .benchmarks
        .iter()
        .map(|b| Ok(b.level.normalize_key(b.key.as_deref())?))
        .collect()
}

fn check_percentile(p: Option<f64>, owner: &str, code: &str) -> Result<(), DatabaseError> {
    match p {
        Some(p) if !(p.is_finite() && (0.0..=1.0).contains(&p)) => Err(invalid(format!(
            "{owner}/{code} percentile {p} is outside [0, 1]"
        ))),
        _ => Ok(()),
    }
}

fn referenced_snapshots(dataset: &Dataset) -> BTreeSet<Snapshot> {
    dataset
        .snapshots
        .iter()
        .copied()
        .chain(dataset.observations.iter().map(|o| o.snapshot))
        .chain(dataset.national_averages.iter().map(|a| a.snapshot))
        .chain(dataset.benchmarks.iter().map(|b| b.snapshot))
        .collect()
}

async fn published_snapshots(
    conn: &libsql::Connection,
) -> Result<BTreeSet<Snapshot>, DatabaseError> {
    let mut rows = conn.query("SELECT snapshot FROM snapshots", ()).await?;
    let mut published = BTreeSet::new();
    while let Some(row) = rows.next().await? {
        published.insert(parse_snapshot(&row.get::<String>(0)?)?);
    }
    Ok(published)
}

/// Stored `(raw_score, percentile)` for a snapshot row, if any.
async fn stored_score(
    conn: &libsql::Connection,
    sql: &str,
    params: impl libsql::params::IntoParams,
) -> Result<Option<(f64, Option<f64>)>, DatabaseError> {
    let mut rows = conn.query(sql, params).await?;
    match rows.next().await? {
        Some(row) => Ok(Some((row.get::<f64>(0)?, row.get::<Option<f64>>(1)?))),
        None => Ok(None),
    }
}

/// Exact comparison: stored REAL values round-trip bit for bit.
#[allow(clippy::float_cmp)]
fn same_score(stored: Option<(f64, Option<f64>)>, raw_score: f64, percentile: Option<f64>) -> bool {
    stored == Some((raw_score, percentile))
}

/// Outcome check for one snapshot row written with `ON CONFLICT DO NOTHING`.
///
/// A skipped row must equal what is stored; a new row must not land in a
/// snapshot that was already published before this import.
fn check_frozen(
    inserted: u64,
    unchanged: bool,
    snapshot: Snapshot,
    published: &BTreeSet<Snapshot>,
    what: &str,
) -> Result<(), DatabaseError> {
    if inserted == 0 && !unchanged {
        return Err(invalid(format!(
            "{what} at {snapshot} conflicts with the stored value"
        )));
    }
    if inserted > 0 && published.contains(&snapshot) {
        return Err(invalid(format!(
            "{what} would extend published snapshot {snapshot}"
        )));
    }
    Ok(())
}

fn benchmark_params(
    b: &BenchmarkAggregate,
    key: Option<&str>,
) -> Result<Vec<libsql::Value>, DatabaseError> {
    Ok(vec![
        b.level.as_str().into(),
        key.unwrap_or_default().into(),
        b.snapshot.as_iso().into(),
        count_to_sql(b.total_count)?.into(),
        count_to_sql(b.dual_eligible_count)?.into(),
        count_to_sql(b.aged_count)?.into(),
        count_to_sql(b.disabled_count)?.into(),
        count_to_sql(b.advantage_count)?.into(),
    ])
}

async fn write_dataset(
    conn: &libsql::Connection,
    dataset: &Dataset,
    snapshots: &BTreeSet<Snapshot>,
    benchmark_keys: &[Option<String>],
) -> Result<(), DatabaseError> {
    let published = published_snapshots(conn).await?;
    for s in snapshots {
        conn.execute(
            "INSERT OR IGNORE INTO snapshots (snapshot) VALUES (?1)",
            [s.as_iso()],
        )
        .await?;
    }

    for f in &dataset.facilities {
        let (lat, lon) = f
            .coordinates
            .map_or((None, None), |c| (Some(c.latitude), Some(c.longitude)));
        conn.execute(
            "INSERT INTO facilities (id, name, network, street, city, state, zip, county_fips,
                                     latitude, longitude, bed_count, facility_type)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT (id) DO UPDATE SET
                name = excluded.name, network = excluded.network,
                street = excluded.street, city = excluded.city, state = excluded.state,
                zip = excluded.zip, county_fips = excluded.county_fips,
                latitude = excluded.latitude, longitude = excluded.longitude,
                bed_count = excluded.bed_count, facility_type = excluded.facility_type",
            libsql::params![
                f.id.as_str(),
                f.name.as_str(),
                f.network.as_deref(),
                f.address.street.as_deref(),
                f.address.city.as_deref(),
                f.address.state.as_deref(),
                f.address.zip.as_deref(),
                f.address.county_fips.as_deref(),
                lat,
                lon,
                f.bed_count.map(i64::from),
                f.facility_type.as_str()
            ],
        )
        .await?;
    }

    for l in &dataset.locations {
        conn.execute(
            "INSERT OR IGNORE INTO facility_locations (facility_id, latitude, longitude)
             VALUES (?1, ?2, ?3)",
            libsql::params![
                l.facility_id.as_str(),
                l.coordinates.latitude,
                l.coordinates.longitude
            ],
        )
        .await?;
    }

    for m in &dataset.measures {
        conn.execute(
            "INSERT INTO quality_measures (code, name, direction, description, category,
                                           sort_position, active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT (code) DO UPDATE SET
                name = excluded.name, direction = excluded.direction,
                description = excluded.description, category = excluded.category,
                sort_position = excluded.sort_position, active = excluded.active",
            libsql::params![
                m.code.as_str(),
                m.name.as_str(),
                m.direction.as_str(),
                m.description.as_deref(),
                m.category.as_str(),
                m.sort_position,
                i64::from(m.active)
            ],
        )
        .await?;
    }

    for o in &dataset.observations {
        let iso = o.snapshot.as_iso();
        let inserted = conn
            .execute(
                "INSERT INTO measure_observations (facility_id, measure_code, snapshot, raw_score, percentile)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (facility_id, measure_code, snapshot) DO NOTHING",
                libsql::params![
                    o.facility_id.as_str(),
                    o.measure_code.as_str(),
                    iso.as_str(),
                    o.raw_score,
                    o.percentile
                ],
            )
            .await?;
        let unchanged = inserted > 0
            || same_score(
                stored_score(
                    conn,
                    "SELECT raw_score, percentile FROM measure_observations
                     WHERE facility_id = ?1 AND measure_code = ?2 AND snapshot = ?3",
                    libsql::params![o.facility_id.as_str(), o.measure_code.as_str(), iso.as_str()],
                )
                .await?,
                o.raw_score,
                o.percentile,
            );
        check_frozen(
            inserted,
            unchanged,
            o.snapshot,
            &published,
            &format!("observation {}/{}", o.facility_id, o.measure_code),
        )?;
    }

    for a in &dataset.national_averages {
        let iso = a.snapshot.as_iso();
        let inserted = conn
            .execute(
                "INSERT INTO national_averages (snapshot, measure_code, raw_score, percentile)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (snapshot, measure_code) DO NOTHING",
                libsql::params![iso.as_str(), a.measure_code.as_str(), a.raw_score, a.percentile],
            )
            .await?;
        let unchanged = inserted > 0
            || same_score(
                stored_score(
                    conn,
                    "SELECT raw_score, percentile FROM national_averages
                     WHERE snapshot = ?1 AND measure_code = ?2",
                    libsql::params![iso.as_str(), a.measure_code.as_str()],
                )
                .await?,
                a.raw_score,
                a.percentile,
            );
        check_frozen(
            inserted,
            unchanged,
            a.snapshot,
            &published,
            &format!("national average {}", a.measure_code),
        )?;
    }

    for (b, key) in dataset.benchmarks.iter().zip(benchmark_keys) {
        let stored_key = key.as_deref().unwrap_or_default();
        let inserted = conn
            .execute(
                "INSERT INTO benchmark_aggregates (level, key, snapshot, total_count,
                                                   dual_eligible_count, aged_count,
                                                   disabled_count, advantage_count)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT (level, key, snapshot) DO NOTHING",
                libsql::params_from_iter(benchmark_params(b, key.as_deref())?),
            )
            .await?;
        let unchanged = inserted > 0
            || stored_counts(conn, b, stored_key).await?
                == Some([
                    b.total_count,
                    b.dual_eligible_count,
                    b.aged_count,
                    b.disabled_count,
                    b.advantage_count,
                ]);
        check_frozen(
            inserted,
            unchanged,
            b.snapshot,
            &published,
            &format!("benchmark {} {}", b.level, key.as_deref().unwrap_or("-")),
        )?;
    }
    Ok(())
}

async fn stored_counts(
    conn: &libsql::Connection,
    b: &BenchmarkAggregate,
    key: &str,
) -> Result<Option<[u64; 5]>, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT total_count, dual_eligible_count, aged_count, disabled_count, advantage_count
             FROM benchmark_aggregates WHERE level = ?1 AND key = ?2 AND snapshot = ?3",
            libsql::params![b.level.as_str(), key, b.snapshot.as_iso()],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some([
            get_count(&row, 0)?,
            get_count(&row, 1)?,
            get_count(&row, 2)?,
            get_count(&row, 3)?,
            get_count(&row, 4)?,
        ])),
        None => Ok(None),
    }
}

impl CartaService {
    /// Validate and write a dataset in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidData` (or `Core`) for data that violates
    /// a store invariant, including any change to or extension of a published
    /// snapshot, or `DatabaseError::LibSql` if a write fails (for example an
    /// observation referencing an unknown facility).
    pub async fn import_dataset(&self, dataset: &Dataset) -> Result<ImportSummary, DatabaseError> {
        let benchmark_keys = validate(dataset)?;
        let snapshots = referenced_snapshots(dataset);

        let tx = self.db().conn().transaction().await?;
        if let Err(e) = write_dataset(&tx, dataset, &snapshots, &benchmark_keys).await {
            tx.rollback().await?;
            return Err(e);
        }
        tx.commit().await?;

        let summary = ImportSummary {
            facilities: dataset.facilities.len() as u64,
            locations: dataset.locations.len() as u64,
            measures: dataset.measures.len() as u64,
            snapshots: snapshots.len() as u64,
            observations: dataset.observations.len() as u64,
            national_averages: dataset.national_averages.len() as u64,
            benchmarks: dataset.benchmarks.len() as u64,
        };
        tracing::info!(?summary, "dataset imported");
        Ok(summary)
    }
}
