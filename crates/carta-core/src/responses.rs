//! CLI response types returned as JSON by `carta` commands.
//!
//! `carta matrix` and `carta benchmark` return [`crate::matrix::ComparisonMatrix`]
//! and [`crate::entities::BenchmarkReport`] directly; the list-style commands
//! wrap their payload here.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{ProximityResult, QualityMeasure};
use crate::snapshot::Snapshot;

/// Response from `carta nearby`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NearbyResponse {
    pub origin_facility_id: String,
    pub radius_miles: f64,
    pub results: Vec<ProximityResult>,
}

/// Response from `carta measures`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct MeasuresResponse {
    pub measures: Vec<QualityMeasure>,
}

/// Response from `carta snapshots`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SnapshotsResponse {
    pub latest: Option<Snapshot>,
    /// Newest first.
    pub snapshots: Vec<Snapshot>,
}
