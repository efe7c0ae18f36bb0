//! Comparison matrix returned by the matrix builder.
//!
//! Rows and columns are plain vectors so serialization order is stable and two
//! builds over the same inputs serialize identically.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{BenchmarkReport, QualityMeasure};
use crate::enums::{Classification, Direction, FacilityType, SourceCategory};
use crate::snapshot::Snapshot;

/// Identity of a matrix row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowKey {
    Facility { id: String },
    MarketAverage,
    NationalAverage,
}

impl RowKey {
    #[must_use]
    pub fn facility(id: impl Into<String>) -> Self {
        Self::Facility { id: id.into() }
    }

    #[must_use]
    pub const fn is_reference(&self) -> bool {
        matches!(self, Self::MarketAverage | Self::NationalAverage)
    }
}

/// A measure column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MeasureColumn {
    pub code: String,
    pub name: String,
    pub direction: Direction,
    pub category: SourceCategory,
}

impl From<&QualityMeasure> for MeasureColumn {
    fn from(m: &QualityMeasure) -> Self {
        Self {
            code: m.code.clone(),
            name: m.name.clone(),
            direction: m.direction,
            category: m.category,
        }
    }
}

/// One (row, column) value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MatrixCell {
    pub raw_score: Option<f64>,
    pub percentile: Option<f64>,
    pub classification: Classification,
}

impl MatrixCell {
    /// A cell with no observation.
    pub const EMPTY: Self = Self {
        raw_score: None,
        percentile: None,
        classification: Classification::NoData,
    };
}

/// A facility or reference row, with cells aligned to the matrix columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MatrixRow {
    pub key: RowKey,
    pub label: String,
    /// Distance from the focal facility (facility rows only).
    pub distance_miles: Option<f64>,
    pub facility_type: Option<FacilityType>,
    /// Set on a market-average row computed without any competitors.
    #[serde(default)]
    pub degenerate: bool,
    pub cells: Vec<MatrixCell>,
}

/// Focal facility vs. competitors vs. market and national references.
///
/// Row order: focal, competitors by distance, market average, national average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ComparisonMatrix {
    pub focal_facility_id: String,
    pub snapshot: Snapshot,
    pub radius_miles: f64,
    pub facility_type: Option<FacilityType>,
    pub columns: Vec<MeasureColumn>,
    pub rows: Vec<MatrixRow>,
    #[serde(default)]
    pub benchmark: Option<BenchmarkReport>,
}

impl ComparisonMatrix {
    #[must_use]
    pub fn column_index(&self, code: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.code == code)
    }

    #[must_use]
    pub fn row(&self, key: &RowKey) -> Option<&MatrixRow> {
        self.rows.iter().find(|r| &r.key == key)
    }

    /// Look up the cell for a row and measure code.
    #[must_use]
    pub fn cell(&self, key: &RowKey, code: &str) -> Option<&MatrixCell> {
        let col = self.column_index(code)?;
        self.row(key)?.cells.get(col)
    }

    /// Competitor rows in distance order.
    pub fn competitors(&self) -> impl Iterator<Item = &MatrixRow> {
        self.rows
            .iter()
            .skip(1)
            .filter(|r| !r.key.is_reference())
    }
}
