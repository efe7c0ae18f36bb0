//! Measure repository: dictionary, per-facility observations and national
//! references for a snapshot.

use std::collections::{BTreeMap, HashMap};

use carta_core::Snapshot;
use carta_core::entities::{MeasureObservation, NationalAverage, QualityMeasure};

use crate::error::DatabaseError;
use crate::helpers::{dedup_preserving_order, get_opt_string, parse_enum, parse_snapshot, placeholders};
use crate::service::CartaService;

fn row_to_measure(row: &libsql::Row) -> Result<QualityMeasure, DatabaseError> {
    Ok(QualityMeasure {
        code: row.get::<String>(0)?,
        name: row.get::<String>(1)?,
        direction: parse_enum(&row.get::<String>(2)?)?,
        description: get_opt_string(row, 3)?,
        category: parse_enum(&row.get::<String>(4)?)?,
        sort_position: row.get::<i32>(5)?,
        active: row.get::<i64>(6)? != 0,
    })
}

fn row_to_observation(row: &libsql::Row) -> Result<MeasureObservation, DatabaseError> {
    Ok(MeasureObservation {
        facility_id: row.get::<String>(0)?,
        measure_code: row.get::<String>(1)?,
        snapshot: parse_snapshot(&row.get::<String>(2)?)?,
        raw_score: row.get::<f64>(3)?,
        percentile: row.get::<Option<f64>>(4)?,
    })
}

impl CartaService {
    /// Measures ordered by sort position, then code.
    pub async fn list_measures(
        &self,
        include_inactive: bool,
    ) -> Result<Vec<QualityMeasure>, DatabaseError> {
        let filter = if include_inactive { "" } else { "WHERE active = 1" };
        let sql = format!(
            "SELECT code, name, direction, description, category, sort_position, active
             FROM quality_measures {filter}
             ORDER BY sort_position, code"
        );
        let mut rows = self.db().query_with(&sql, || ()).await?;
        let mut measures = Vec::new();
        while let Some(row) = rows.next().await? {
            measures.push(row_to_measure(&row)?);
        }
        Ok(measures)
    }

    /// The active measure dictionary in default column order.
    pub async fn measure_dictionary(&self) -> Result<Vec<QualityMeasure>, DatabaseError> {
        self.list_measures(false).await
    }

    /// Observations for the given facilities in one snapshot.
    ///
    /// Ids are queried in chunks of [`CartaService::chunk_size`]; the merged
    /// result follows input facility order, then measure code. A facility
    /// without a row for a measure simply has no entry.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::UnknownSnapshot` if the snapshot is unpublished.
    pub async fn observations(
        &self,
        facility_ids: &[String],
        snapshot: Snapshot,
    ) -> Result<Vec<MeasureObservation>, DatabaseError> {
        self.require_snapshot(snapshot).await?;
        if facility_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids = dedup_preserving_order(facility_ids);
        let position: HashMap<&str, usize> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();
        let iso = snapshot.as_iso();
        let mut observations = Vec::new();

        for chunk in ids.chunks(self.chunk_size()) {
            let sql = format!(
                "SELECT facility_id, measure_code, snapshot, raw_score, percentile
                 FROM measure_observations
                 WHERE snapshot = ?1 AND facility_id IN ({})
                 ORDER BY facility_id, measure_code",
                placeholders(2, chunk.len())
            );
            let mut params: Vec<libsql::Value> = Vec::with_capacity(chunk.len() + 1);
            params.push(iso.as_str().into());
            params.extend(chunk.iter().map(|id| libsql::Value::from(id.as_str())));

            let mut rows = self
                .db()
                .query_with(&sql, || libsql::params_from_iter(params.clone()))
                .await?;
            while let Some(row) = rows.next().await? {
                observations.push(row_to_observation(&row)?);
            }
        }

        observations.sort_by(|a, b| {
            let pa = position.get(a.facility_id.as_str()).copied().unwrap_or(usize::MAX);
            let pb = position.get(b.facility_id.as_str()).copied().unwrap_or(usize::MAX);
            pa.cmp(&pb).then_with(|| a.measure_code.cmp(&b.measure_code))
        });
        tracing::debug!(
            facilities = ids.len(),
            observations = observations.len(),
            %snapshot,
            "fetched observations"
        );
        Ok(observations)
    }

    /// Stored national averages for a snapshot, ordered by measure code.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::UnknownSnapshot` if the snapshot is unpublished.
    pub async fn national_averages(
        &self,
        snapshot: Snapshot,
    ) -> Result<Vec<NationalAverage>, DatabaseError> {
        self.require_snapshot(snapshot).await?;
        let iso = snapshot.as_iso();
        let mut rows = self
            .db()
            .query_with(
                "SELECT snapshot, measure_code, raw_score, percentile
                 FROM national_averages WHERE snapshot = ?1
                 ORDER BY measure_code",
                || [iso.as_str()],
            )
            .await?;

        let mut averages = Vec::new();
        while let Some(row) = rows.next().await? {
            averages.push(NationalAverage {
                snapshot: parse_snapshot(&row.get::<String>(0)?)?,
                measure_code: row.get::<String>(1)?,
                raw_score: row.get::<f64>(2)?,
                percentile: row.get::<Option<f64>>(3)?,
            });
        }
        Ok(averages)
    }

    /// Every raw score recorded for each measure in a snapshot, ascending.
    ///
    /// This is the reference distribution that derived values are ranked
    /// against. Measures without any observation map to an empty list. Codes
    /// are queried in chunks of [`CartaService::chunk_size`].
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::UnknownSnapshot` if the snapshot is unpublished.
    pub async fn national_distribution(
        &self,
        snapshot: Snapshot,
        codes: &[String],
    ) -> Result<BTreeMap<String, Vec<f64>>, DatabaseError> {
        self.require_snapshot(snapshot).await?;
        let mut distribution: BTreeMap<String, Vec<f64>> =
            codes.iter().map(|c| (c.clone(), Vec::new())).collect();
        if codes.is_empty() {
            return Ok(distribution);
        }

        let codes = dedup_preserving_order(codes);
        let iso = snapshot.as_iso();
        for chunk in codes.chunks(self.chunk_size()) {
            let sql = format!(
                "SELECT measure_code, raw_score FROM measure_observations
                 WHERE snapshot = ?1 AND measure_code IN ({})
                 ORDER BY measure_code, raw_score",
                placeholders(2, chunk.len())
            );
            let mut params: Vec<libsql::Value> = Vec::with_capacity(chunk.len() + 1);
            params.push(iso.as_str().into());
            params.extend(chunk.iter().map(|c| libsql::Value::from(c.as_str())));

            let mut rows = self
                .db()
                .query_with(&sql, || libsql::params_from_iter(params.clone()))
                .await?;
            while let Some(row) = rows.next().await? {
                let code = row.get::<String>(0)?;
                let score = row.get::<f64>(1)?;
                distribution.entry(code).or_default().push(score);
            }
        }
        Ok(distribution)
    }
}
