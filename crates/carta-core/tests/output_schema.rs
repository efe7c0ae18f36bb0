//! JsonSchema contract tests for the shapes handed to callers.
//!
//! Each output type is serialized, validated against its schemars-generated
//! schema, and deserialized back.

use pretty_assertions::assert_eq;
use schemars::schema_for;

use carta_core::Snapshot;
use carta_core::dataset::Dataset;
use carta_core::entities::*;
use carta_core::enums::*;
use carta_core::matrix::*;
use carta_core::responses::NearbyResponse;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! contract {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );

            let recovered: $ty = serde_json::from_value(instance).unwrap();
            assert_eq!(recovered, val);
        }
    };
}

fn snapshot() -> Snapshot {
    Snapshot::from_ymd(2024, 5, 1).unwrap()
}

fn miami_general() -> Facility {
    Facility {
        id: "100001".into(),
        name: "Miami General".into(),
        network: Some("Coastal Health".into()),
        address: Address {
            street: Some("1 Bayfront Ave".into()),
            city: Some("Miami".into()),
            state: Some("FL".into()),
            zip: Some("33131".into()),
            county_fips: Some("12086".into()),
        },
        coordinates: Some(Coordinates::new(25.7617, -80.1918).unwrap()),
        bed_count: Some(320),
        facility_type: FacilityType::Hospital,
    }
}

fn benchmark_report(total: u64) -> BenchmarkReport {
    BenchmarkReport {
        aggregate: BenchmarkAggregate {
            level: BenchmarkLevel::County,
            key: Some("12086".into()),
            snapshot: snapshot(),
            total_count: total,
            dual_eligible_count: 0,
            aged_count: 0,
            disabled_count: 0,
            advantage_count: 0,
        },
        percentages: BenchmarkPercentages::default(),
    }
}

contract!(
    nearby_response_contract,
    NearbyResponse,
    NearbyResponse {
        origin_facility_id: "100001".into(),
        radius_miles: 10.0,
        results: vec![ProximityResult {
            facility: miami_general(),
            distance_miles: 0.0,
        }],
    }
);

contract!(
    benchmark_report_contract,
    BenchmarkReport,
    benchmark_report(0)
);

contract!(
    matrix_contract,
    ComparisonMatrix,
    ComparisonMatrix {
        focal_facility_id: "100001".into(),
        snapshot: snapshot(),
        radius_miles: 10.0,
        facility_type: Some(FacilityType::Hospital),
        columns: vec![MeasureColumn {
            code: "READM_30".into(),
            name: "30-day readmission".into(),
            direction: Direction::LowerIsBetter,
            category: SourceCategory::Continuous,
        }],
        rows: vec![
            MatrixRow {
                key: RowKey::facility("100001"),
                label: "Miami General".into(),
                distance_miles: Some(0.0),
                facility_type: Some(FacilityType::Hospital),
                degenerate: false,
                cells: vec![MatrixCell {
                    raw_score: Some(14.2),
                    percentile: Some(0.61),
                    classification: Classification::Neutral,
                }],
            },
            MatrixRow {
                key: RowKey::MarketAverage,
                label: "Market average".into(),
                distance_miles: None,
                facility_type: None,
                degenerate: true,
                cells: vec![MatrixCell::EMPTY],
            },
        ],
        benchmark: Some(benchmark_report(1_200)),
    }
);

contract!(
    dataset_contract,
    Dataset,
    Dataset {
        facilities: vec![miami_general()],
        locations: vec![FacilityLocation {
            facility_id: "100001".into(),
            coordinates: Coordinates::new(25.77, -80.2).unwrap(),
        }],
        measures: vec![QualityMeasure {
            code: "READM_30".into(),
            name: "30-day readmission".into(),
            direction: Direction::LowerIsBetter,
            description: None,
            category: SourceCategory::Continuous,
            sort_position: 1,
            active: true,
        }],
        snapshots: vec![snapshot()],
        observations: vec![MeasureObservation {
            facility_id: "100001".into(),
            measure_code: "READM_30".into(),
            snapshot: snapshot(),
            raw_score: 14.2,
            percentile: None,
        }],
        national_averages: vec![NationalAverage {
            snapshot: snapshot(),
            measure_code: "READM_30".into(),
            raw_score: 15.0,
            percentile: Some(0.5),
        }],
        benchmarks: vec![benchmark_report(10).aggregate],
    }
);

#[test]
fn missing_percentile_serializes_as_null_not_zero() {
    let json = serde_json::to_value(MatrixCell::EMPTY).unwrap();
    assert!(json["percentile"].is_null());
    assert!(json["raw_score"].is_null());
    assert_eq!(json["classification"], "no_data");
}
