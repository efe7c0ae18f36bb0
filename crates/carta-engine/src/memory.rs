//! In-memory store used by engine unit tests.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use carta_core::Snapshot;
use carta_core::dataset::Dataset;
use carta_core::entities::{
    Address, BenchmarkAggregate, BoundingBox, Coordinates, Facility, FacilityLocation,
    MeasureObservation, NationalAverage, QualityMeasure,
};
use carta_core::enums::{BenchmarkLevel, Direction, FacilityType, SourceCategory};

use crate::error::EngineError;
use crate::source::{BenchmarkSource, FacilitySource, MeasureSource};

pub struct MemorySource {
    data: Dataset,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl MemorySource {
    pub fn new(data: Dataset) -> Self {
        Self {
            data,
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Every fetch sleeps for `delay` before answering.
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of fetches served so far.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    /// FOCAL plus F1 (~1 mi) and F2 (~2 mi), measures A and B.
    ///
    /// F1 has A only; F2 has both.
    pub fn two_measure_market() -> Self {
        let snapshot = snapshot();
        let facility = |id: &str, latitude: f64| Facility {
            id: id.to_string(),
            name: format!("Facility {id}"),
            network: None,
            address: Address::default(),
            coordinates: Some(Coordinates {
                latitude,
                longitude: 10.0,
            }),
            bed_count: None,
            facility_type: FacilityType::SkilledNursing,
        };
        let measure = |code: &str, sort_position| QualityMeasure {
            code: code.to_string(),
            name: format!("Measure {code}"),
            direction: Direction::HigherIsBetter,
            description: None,
            category: SourceCategory::Continuous,
            sort_position,
            active: true,
        };
        let obs = |facility: &str, code: &str, raw_score, percentile| MeasureObservation {
            facility_id: facility.to_string(),
            measure_code: code.to_string(),
            snapshot,
            raw_score,
            percentile: Some(percentile),
        };

        Self::new(Dataset {
            facilities: vec![
                facility("FOCAL", 10.0),
                facility("F1", 10.015),
                facility("F2", 10.03),
            ],
            locations: vec![],
            measures: vec![measure("A", 1), measure("B", 2)],
            snapshots: vec![snapshot],
            observations: vec![
                obs("FOCAL", "A", 50.0, 0.6),
                obs("FOCAL", "B", 60.0, 0.5),
                obs("F1", "A", 90.0, 0.9),
                obs("F2", "A", 40.0, 0.4),
                obs("F2", "B", 70.0, 0.7),
            ],
            national_averages: vec![
                NationalAverage {
                    snapshot,
                    measure_code: "A".into(),
                    raw_score: 55.0,
                    percentile: Some(0.5),
                },
                NationalAverage {
                    snapshot,
                    measure_code: "B".into(),
                    raw_score: 60.0,
                    percentile: None,
                },
            ],
            benchmarks: vec![BenchmarkAggregate {
                level: BenchmarkLevel::National,
                key: None,
                snapshot,
                total_count: 100,
                dual_eligible_count: 20,
                aged_count: 85,
                disabled_count: 15,
                advantage_count: 48,
            }],
        })
    }

    async fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn require(&self, snapshot: Snapshot) -> Result<(), EngineError> {
        if self.data.snapshots.contains(&snapshot) {
            Ok(())
        } else {
            Err(EngineError::UnknownSnapshot(snapshot.to_string()))
        }
    }
}

pub fn snapshot() -> Snapshot {
    Snapshot::from_ymd(2024, 5, 1).unwrap()
}

impl FacilitySource for MemorySource {
    async fn facility(&self, id: &str) -> Result<Facility, EngineError> {
        self.touch().await;
        self.data
            .facilities
            .iter()
            .find(|f| f.id == id)
            .cloned()
            .ok_or_else(|| EngineError::UnknownFacility(id.to_string()))
    }

    async fn facilities(&self, ids: &[String]) -> Result<Vec<Facility>, EngineError> {
        self.touch().await;
        Ok(ids
            .iter()
            .filter_map(|id| self.data.facilities.iter().find(|f| &f.id == id).cloned())
            .collect())
    }

    async fn locations_within(
        &self,
        bbox: &BoundingBox,
    ) -> Result<Vec<FacilityLocation>, EngineError> {
        self.touch().await;
        let primary = self.data.facilities.iter().filter_map(|f| {
            f.coordinates.map(|coordinates| FacilityLocation {
                facility_id: f.id.clone(),
                coordinates,
            })
        });
        Ok(primary
            .chain(self.data.locations.iter().cloned())
            .filter(|l| bbox.contains(l.coordinates))
            .collect())
    }
}

impl MeasureSource for MemorySource {
    async fn dictionary(&self) -> Result<Vec<QualityMeasure>, EngineError> {
        self.touch().await;
        let mut measures: Vec<_> = self.data.measures.iter().filter(|m| m.active).cloned().collect();
        measures.sort_by(|a, b| {
            a.sort_position
                .cmp(&b.sort_position)
                .then_with(|| a.code.cmp(&b.code))
        });
        Ok(measures)
    }

    async fn latest_snapshot(&self) -> Result<Option<Snapshot>, EngineError> {
        self.touch().await;
        Ok(self.data.snapshots.iter().max().copied())
    }

    async fn snapshot_exists(&self, snapshot: Snapshot) -> Result<bool, EngineError> {
        self.touch().await;
        Ok(self.data.snapshots.contains(&snapshot))
    }

    async fn observations(
        &self,
        facility_ids: &[String],
        snapshot: Snapshot,
    ) -> Result<Vec<MeasureObservation>, EngineError> {
        self.touch().await;
        self.require(snapshot)?;
        Ok(facility_ids
            .iter()
            .flat_map(|id| {
                self.data
                    .observations
                    .iter()
                    .filter(move |o| &o.facility_id == id && o.snapshot == snapshot)
            })
            .cloned()
            .collect())
    }

    async fn national_averages(
        &self,
        snapshot: Snapshot,
    ) -> Result<Vec<NationalAverage>, EngineError> {
        self.touch().await;
        self.require(snapshot)?;
        Ok(self
            .data
            .national_averages
            .iter()
            .filter(|n| n.snapshot == snapshot)
            .cloned()
            .collect())
    }

    async fn national_distribution(
        &self,
        snapshot: Snapshot,
        codes: &[String],
    ) -> Result<BTreeMap<String, Vec<f64>>, EngineError> {
        self.touch().await;
        self.require(snapshot)?;
        let mut out: BTreeMap<String, Vec<f64>> =
            codes.iter().map(|c| (c.clone(), Vec::new())).collect();
        for o in &self.data.observations {
            if o.snapshot == snapshot
                && let Some(scores) = out.get_mut(&o.measure_code)
            {
                scores.push(o.raw_score);
            }
        }
        for scores in out.values_mut() {
            scores.sort_by(f64::total_cmp);
        }
        Ok(out)
    }
}

impl BenchmarkSource for MemorySource {
    async fn aggregate(
        &self,
        level: BenchmarkLevel,
        key: Option<&str>,
        snapshot: Snapshot,
    ) -> Result<Option<BenchmarkAggregate>, EngineError> {
        self.touch().await;
        self.require(snapshot)?;
        Ok(self
            .data
            .benchmarks
            .iter()
            .find(|b| b.level == level && b.key.as_deref() == key && b.snapshot == snapshot)
            .cloned())
    }
}
