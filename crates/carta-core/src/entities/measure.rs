use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{Direction, SourceCategory};
use crate::snapshot::Snapshot;

/// A quality measure in the dictionary.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct QualityMeasure {
    pub code: String,
    pub name: String,
    pub direction: Direction,
    #[serde(default)]
    pub description: Option<String>,
    pub category: SourceCategory,
    /// Default column position; lower sorts first.
    pub sort_position: i32,
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

/// One facility's score for one measure in one snapshot.
///
/// A missing observation means "no data", never a zero score.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct MeasureObservation {
    pub facility_id: String,
    pub measure_code: String,
    pub snapshot: Snapshot,
    pub raw_score: f64,
    /// Standing in [0, 1] against the national distribution; `None` when the
    /// reference population is too small for a fair comparison.
    #[serde(default)]
    pub percentile: Option<f64>,
}

/// Raw score and percentile carried by a reference row cell.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ReferenceValue {
    pub raw_score: f64,
    pub percentile: Option<f64>,
}

/// Stored national average for one measure in one snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NationalAverage {
    pub snapshot: Snapshot,
    pub measure_code: String,
    pub raw_score: f64,
    #[serde(default)]
    pub percentile: Option<f64>,
}

impl NationalAverage {
    #[must_use]
    pub const fn value(&self) -> ReferenceValue {
        ReferenceValue {
            raw_score: self.raw_score,
            percentile: self.percentile,
        }
    }
}
