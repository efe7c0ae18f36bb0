//! Entity structs for the Carta domain.
//!
//! Each entity maps to a table in the libSQL store (see `carta-db` migrations).
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema` for JSON
//! output and schema validation.

mod benchmark;
mod facility;
mod measure;

pub use benchmark::{BenchmarkAggregate, BenchmarkPercentages, BenchmarkReport, BenchmarkSelector};
pub use facility::{
    Address, BoundingBox, Coordinates, Facility, FacilityLocation, ProximityResult,
};
pub use measure::{MeasureObservation, NationalAverage, QualityMeasure, ReferenceValue};
