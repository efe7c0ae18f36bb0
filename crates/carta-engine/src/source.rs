//! Read-only store seams the engine resolves against.
//!
//! The engine never talks to libSQL directly. `CartaService` implements all
//! three traits; tests substitute in-memory sources.

use std::collections::BTreeMap;

use carta_core::Snapshot;
use carta_core::entities::{
    BenchmarkAggregate, BoundingBox, Facility, FacilityLocation, MeasureObservation,
    NationalAverage, QualityMeasure,
};
use carta_core::enums::BenchmarkLevel;
use carta_db::service::CartaService;

use crate::error::EngineError;

/// Facility registry access.
#[allow(async_fn_in_trait)]
pub trait FacilitySource {
    /// Load one facility; `UnknownFacility` if absent.
    async fn facility(&self, id: &str) -> Result<Facility, EngineError>;

    /// Load facilities in input order, skipping unknown ids.
    async fn facilities(&self, ids: &[String]) -> Result<Vec<Facility>, EngineError>;

    /// Location rows (primary and additional) inside the box. A facility may
    /// appear more than once; rows outside the box are dropped by the caller.
    async fn locations_within(
        &self,
        bbox: &BoundingBox,
    ) -> Result<Vec<FacilityLocation>, EngineError>;
}

/// Measure dictionary, snapshots and observations.
#[allow(async_fn_in_trait)]
pub trait MeasureSource {
    async fn dictionary(&self) -> Result<Vec<QualityMeasure>, EngineError>;

    async fn latest_snapshot(&self) -> Result<Option<Snapshot>, EngineError>;

    async fn snapshot_exists(&self, snapshot: Snapshot) -> Result<bool, EngineError>;

    /// At most one observation per (facility, measure); `UnknownSnapshot` if
    /// the snapshot is unpublished.
    async fn observations(
        &self,
        facility_ids: &[String],
        snapshot: Snapshot,
    ) -> Result<Vec<MeasureObservation>, EngineError>;

    async fn national_averages(
        &self,
        snapshot: Snapshot,
    ) -> Result<Vec<NationalAverage>, EngineError>;

    /// All raw scores per measure for the snapshot.
    async fn national_distribution(
        &self,
        snapshot: Snapshot,
        codes: &[String],
    ) -> Result<BTreeMap<String, Vec<f64>>, EngineError>;
}

/// Benchmark aggregates.
#[allow(async_fn_in_trait)]
pub trait BenchmarkSource {
    /// `key` is canonical (see `BenchmarkLevel::normalize_key`).
    async fn aggregate(
        &self,
        level: BenchmarkLevel,
        key: Option<&str>,
        snapshot: Snapshot,
    ) -> Result<Option<BenchmarkAggregate>, EngineError>;
}

// ---------------------------------------------------------------------------
// libSQL store
// ---------------------------------------------------------------------------

impl FacilitySource for CartaService {
    async fn facility(&self, id: &str) -> Result<Facility, EngineError> {
        Ok(self.get_facility(id).await?)
    }

    async fn facilities(&self, ids: &[String]) -> Result<Vec<Facility>, EngineError> {
        Ok(self.get_facilities(ids).await?)
    }

    async fn locations_within(
        &self,
        bbox: &BoundingBox,
    ) -> Result<Vec<FacilityLocation>, EngineError> {
        Ok(self.location_candidates(bbox).await?)
    }
}

impl MeasureSource for CartaService {
    async fn dictionary(&self) -> Result<Vec<QualityMeasure>, EngineError> {
        Ok(self.measure_dictionary().await?)
    }

    async fn latest_snapshot(&self) -> Result<Option<Snapshot>, EngineError> {
        Ok(Self::latest_snapshot(self).await?)
    }

    async fn snapshot_exists(&self, snapshot: Snapshot) -> Result<bool, EngineError> {
        Ok(Self::snapshot_exists(self, snapshot).await?)
    }

    async fn observations(
        &self,
        facility_ids: &[String],
        snapshot: Snapshot,
    ) -> Result<Vec<MeasureObservation>, EngineError> {
        Ok(Self::observations(self, facility_ids, snapshot).await?)
    }

    async fn national_averages(
        &self,
        snapshot: Snapshot,
    ) -> Result<Vec<NationalAverage>, EngineError> {
        Ok(Self::national_averages(self, snapshot).await?)
    }

    async fn national_distribution(
        &self,
        snapshot: Snapshot,
        codes: &[String],
    ) -> Result<BTreeMap<String, Vec<f64>>, EngineError> {
        Ok(Self::national_distribution(self, snapshot, codes).await?)
    }
}

impl BenchmarkSource for CartaService {
    async fn aggregate(
        &self,
        level: BenchmarkLevel,
        key: Option<&str>,
        snapshot: Snapshot,
    ) -> Result<Option<BenchmarkAggregate>, EngineError> {
        Ok(self.benchmark_aggregate(level, key, snapshot).await?)
    }
}
