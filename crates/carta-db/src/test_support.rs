//! Shared test fixtures for carta-db and downstream crates.
//!
//! The fixture is a small Miami market: an origin facility, competitors at
//! 2.3, 9.9 and 10.1 miles, a facility in Orlando and one without any
//! position, scored on three active measures across two snapshots.

pub mod helpers {
    use carta_core::Snapshot;
    use carta_core::dataset::Dataset;
    use carta_core::entities::{
        Address, BenchmarkAggregate, Coordinates, Facility, FacilityLocation, MeasureObservation,
        NationalAverage, QualityMeasure,
    };
    use carta_core::enums::{BenchmarkLevel, Direction, FacilityType, SourceCategory};

    use crate::service::CartaService;

    /// Downtown Miami.
    pub const MIAMI: (f64, f64) = (25.7617, -80.1918);
    pub const LATEST: &str = "2024-05-01";
    pub const EARLIER: &str = "2024-02-01";

    /// Miles per degree of latitude on the 3958.8-mile sphere.
    const MILES_PER_DEGREE: f64 = 3958.8 * std::f64::consts::PI / 180.0;

    pub fn snap(s: &str) -> Snapshot {
        s.parse().unwrap()
    }

    /// A point `miles` due north (negative: south) of Miami.
    pub fn miami_offset(miles: f64) -> Coordinates {
        Coordinates {
            latitude: MIAMI.0 + miles / MILES_PER_DEGREE,
            longitude: MIAMI.1,
        }
    }

    fn facility(
        id: &str,
        name: &str,
        facility_type: FacilityType,
        coordinates: Option<Coordinates>,
        county_fips: &str,
    ) -> Facility {
        Facility {
            id: id.to_string(),
            name: name.to_string(),
            network: Some("Sunrise Health".to_string()),
            address: Address {
                street: None,
                city: Some("Miami".to_string()),
                state: Some("FL".to_string()),
                zip: None,
                county_fips: Some(county_fips.to_string()),
            },
            coordinates,
            bed_count: Some(120),
            facility_type,
        }
    }

    fn measure(
        code: &str,
        direction: Direction,
        category: SourceCategory,
        sort_position: i32,
        active: bool,
    ) -> QualityMeasure {
        QualityMeasure {
            code: code.to_string(),
            name: format!("{code} measure"),
            direction,
            description: None,
            category,
            sort_position,
            active,
        }
    }

    fn obs(facility: &str, code: &str, snapshot: &str, raw: f64, pct: Option<f64>) -> MeasureObservation {
        MeasureObservation {
            facility_id: facility.to_string(),
            measure_code: code.to_string(),
            snapshot: snap(snapshot),
            raw_score: raw,
            percentile: pct,
        }
    }

    fn national(code: &str, raw: f64, pct: Option<f64>) -> NationalAverage {
        NationalAverage {
            snapshot: snap(LATEST),
            measure_code: code.to_string(),
            raw_score: raw,
            percentile: pct,
        }
    }

    fn aggregate(level: BenchmarkLevel, key: Option<&str>, counts: [u64; 5]) -> BenchmarkAggregate {
        BenchmarkAggregate {
            level,
            key: key.map(String::from),
            snapshot: snap(LATEST),
            total_count: counts[0],
            dual_eligible_count: counts[1],
            aged_count: counts[2],
            disabled_count: counts[3],
            advantage_count: counts[4],
        }
    }

    pub fn fixture_dataset() -> Dataset {
        use FacilityType::{Hospital, SkilledNursing};

        let mut origin = facility(
            "F-ORIGIN",
            "Biscayne Care Center",
            SkilledNursing,
            Some(miami_offset(0.0)),
            "12086",
        );
        origin.address.street = Some("100 Biscayne Blvd".to_string());

        let mut orlando = facility("F-ORLANDO", "Lake Eola Nursing", SkilledNursing, None, "12095");
        orlando.coordinates = Some(Coordinates {
            latitude: 28.5383,
            longitude: -81.3792,
        });
        orlando.address.city = Some("Orlando".to_string());

        let mut nowhere = facility("F-NOWHERE", "Unmapped Home", SkilledNursing, None, "12086");
        nowhere.bed_count = None;

        Dataset {
            facilities: vec![
                origin,
                facility("F-NEAR", "Coral Way Rehab", SkilledNursing, Some(miami_offset(2.3)), "12086"),
                facility("F-MID", "Hialeah Gardens Hospital", Hospital, Some(miami_offset(-9.9)), "12086"),
                facility("F-FAR", "Kendall Health", SkilledNursing, Some(miami_offset(10.1)), "12086"),
                orlando,
                nowhere,
            ],
            locations: vec![FacilityLocation {
                facility_id: "F-NEAR".to_string(),
                coordinates: miami_offset(-5.0),
            }],
            measures: vec![
                measure("STAR", Direction::HigherIsBetter, SourceCategory::RatingScale, 1, true),
                measure("FALLS", Direction::LowerIsBetter, SourceCategory::Continuous, 2, true),
                measure("REHOSP", Direction::LowerIsBetter, SourceCategory::Continuous, 3, true),
                measure("RETIRED", Direction::HigherIsBetter, SourceCategory::Continuous, 4, false),
            ],
            snapshots: vec![snap(EARLIER), snap(LATEST)],
            observations: vec![
                obs("F-ORIGIN", "STAR", LATEST, 4.0, Some(0.9)),
                obs("F-NEAR", "STAR", LATEST, 3.0, Some(0.3)),
                obs("F-MID", "STAR", LATEST, 3.0, Some(0.3)),
                obs("F-FAR", "STAR", LATEST, 5.0, Some(1.0)),
                obs("F-ORLANDO", "STAR", LATEST, 2.0, Some(0.1)),
                obs("F-NOWHERE", "STAR", LATEST, 1.0, Some(0.0)),
                obs("F-ORIGIN", "FALLS", LATEST, 2.0, Some(0.8)),
                obs("F-NEAR", "FALLS", LATEST, 4.0, Some(0.5)),
                obs("F-FAR", "FALLS", LATEST, 1.0, Some(0.95)),
                obs("F-ORLANDO", "FALLS", LATEST, 6.0, Some(0.2)),
                obs("F-ORIGIN", "REHOSP", LATEST, 20.0, None),
                obs("F-NEAR", "REHOSP", LATEST, 18.0, Some(0.6)),
                obs("F-MID", "REHOSP", LATEST, 22.0, Some(0.4)),
                obs("F-FAR", "REHOSP", LATEST, 15.0, Some(0.9)),
                obs("F-ORIGIN", "STAR", EARLIER, 3.0, Some(0.5)),
            ],
            national_averages: vec![
                national("STAR", 3.0, Some(0.5)),
                national("FALLS", 3.25, Some(0.5)),
                national("REHOSP", 18.75, None),
            ],
            benchmarks: vec![
                aggregate(BenchmarkLevel::National, None, [1_000_000, 200_000, 850_000, 150_000, 480_000]),
                aggregate(BenchmarkLevel::State, Some("FL"), [80_000, 16_000, 70_000, 10_000, 44_000]),
                aggregate(BenchmarkLevel::County, Some("12086"), [10_000, 2_500, 8_000, 2_000, 6_000]),
                aggregate(BenchmarkLevel::County, Some("12087"), [0, 0, 0, 0, 0]),
            ],
        }
    }

    /// Create an empty in-memory service.
    pub async fn test_service() -> CartaService {
        CartaService::new_local(":memory:").await.unwrap()
    }

    /// Create an in-memory service loaded with [`fixture_dataset`].
    pub async fn seeded_service() -> CartaService {
        let svc = test_service().await;
        svc.import_dataset(&fixture_dataset()).await.unwrap();
        svc
    }
}
