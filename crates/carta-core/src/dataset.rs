//! Import dataset shape consumed by `carta import`.
//!
//! The external ingestion process exports the registry, measure dictionary and
//! published snapshots as one JSON document in this shape. Every section is
//! optional so partial refreshes (e.g. a new snapshot only) are possible.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{
    BenchmarkAggregate, Facility, FacilityLocation, MeasureObservation, NationalAverage,
    QualityMeasure,
};
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Dataset {
    #[serde(default)]
    pub facilities: Vec<Facility>,
    #[serde(default)]
    pub locations: Vec<FacilityLocation>,
    #[serde(default)]
    pub measures: Vec<QualityMeasure>,
    #[serde(default)]
    pub snapshots: Vec<Snapshot>,
    #[serde(default)]
    pub observations: Vec<MeasureObservation>,
    #[serde(default)]
    pub national_averages: Vec<NationalAverage>,
    #[serde(default)]
    pub benchmarks: Vec<BenchmarkAggregate>,
}

/// Row counts written by an import.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ImportSummary {
    pub facilities: u64,
    pub locations: u64,
    pub measures: u64,
    pub snapshots: u64,
    pub observations: u64,
    pub national_averages: u64,
    pub benchmarks: u64,
}
