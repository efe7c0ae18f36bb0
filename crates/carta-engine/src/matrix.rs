//! Matrix builder: focal facility vs. competitors vs. market and national
//! references, with per-column classification.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::future::Future;
use std::time::Duration;

use carta_config::EngineConfig;
use carta_core::Snapshot;
use carta_core::entities::{
    BenchmarkReport, BenchmarkSelector, Facility, MeasureObservation, NationalAverage,
    ProximityResult, QualityMeasure, ReferenceValue,
};
use carta_core::enums::FacilityType;
use carta_core::matrix::{ComparisonMatrix, MatrixCell, MatrixRow, MeasureColumn, RowKey};

use crate::benchmark::{canonical_key, resolve_benchmark};
use crate::cache::{CacheKey, MatrixCache, NoopCache};
use crate::classify::classify_column;
use crate::error::EngineError;
use crate::market::market_value;
use crate::proximity::{resolve_nearby, validate_radius};
use crate::source::{BenchmarkSource, FacilitySource, MeasureSource};

pub const MARKET_AVERAGE_LABEL: &str = "Market average";
pub const NATIONAL_AVERAGE_LABEL: &str = "National average";

/// Builder tuning, usually taken from `EngineConfig`.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Upper bound on each leaf fetch.
    pub fetch_timeout: Duration,
    pub min_reference_population: usize,
    /// Whether `nearby` lists the origin itself at distance 0.
    pub include_origin: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for EngineOptions {
    fn from(config: &EngineConfig) -> Self {
        Self {
            fetch_timeout: config.fetch_timeout(),
            min_reference_population: config.min_reference_population,
            include_origin: config.include_origin,
        }
    }
}

/// Arguments of one matrix build.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixRequest {
    pub focal_facility_id: String,
    pub radius_miles: f64,
    /// Restricts competitors; the focal facility is always row 0.
    pub facility_type: Option<FacilityType>,
    /// `None` selects the latest published snapshot.
    pub snapshot: Option<Snapshot>,
    /// Ordered column codes; `None` selects the whole active dictionary.
    pub measures: Option<Vec<String>>,
    pub benchmark: Option<BenchmarkSelector>,
}

impl MatrixRequest {
    #[must_use]
    pub fn new(focal_facility_id: impl Into<String>, radius_miles: f64) -> Self {
        Self {
            focal_facility_id: focal_facility_id.into(),
            radius_miles,
            facility_type: None,
            snapshot: None,
            measures: None,
            benchmark: None,
        }
    }

    #[must_use]
    pub const fn with_facility_type(mut self, facility_type: FacilityType) -> Self {
        self.facility_type = Some(facility_type);
        self
    }

    #[must_use]
    pub const fn with_snapshot(mut self, snapshot: Snapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    #[must_use]
    pub fn with_measures<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.measures = Some(codes.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_benchmark(mut self, selector: BenchmarkSelector) -> Self {
        self.benchmark = Some(selector);
        self
    }
}

/// Orchestrates proximity, observation, reference and benchmark fetches.
///
/// Holds no per-build state; the injected cache is the only thing shared
/// between builds.
pub struct MatrixBuilder<S, C = NoopCache> {
    source: S,
    cache: C,
    options: EngineOptions,
}

impl<S> MatrixBuilder<S, NoopCache> {
    pub fn uncached(source: S, options: EngineOptions) -> Self {
        Self::new(source, NoopCache, options)
    }
}

impl<S, C> MatrixBuilder<S, C> {
    pub const fn new(source: S, cache: C, options: EngineOptions) -> Self {
        Self {
            source,
            cache,
            options,
        }
    }

    pub const fn source(&self) -> &S {
        &self.source
    }

    pub const fn options(&self) -> &EngineOptions {
        &self.options
    }
}

impl<S, C> MatrixBuilder<S, C>
where
    S: FacilitySource + MeasureSource + BenchmarkSource,
    C: MatrixCache,
{
    /// Facilities within `radius_miles` of a registered facility.
    ///
    /// # Errors
    ///
    /// `UnknownFacility`, `InvalidRadius`, `InvalidOrigin`, or
    /// `UpstreamUnavailable`.
    pub async fn nearby(
        &self,
        facility_id: &str,
        radius_miles: f64,
    ) -> Result<Vec<ProximityResult>, EngineError> {
        self.nearby_with_origin(facility_id, radius_miles, self.options.include_origin)
            .await
    }

    /// [`nearby`](Self::nearby) with the origin's inclusion chosen per call.
    ///
    /// # Errors
    ///
    /// Same as [`nearby`](Self::nearby).
    #[tracing::instrument(skip(self))]
    pub async fn nearby_with_origin(
        &self,
        facility_id: &str,
        radius_miles: f64,
        include_origin: bool,
    ) -> Result<Vec<ProximityResult>, EngineError> {
        validate_radius(radius_miles)?;
        let timeout = self.options.fetch_timeout;
        let origin = within(timeout, "facility", self.source.facility(facility_id)).await?;
        within(
            timeout,
            "proximity",
            resolve_nearby(&self.source, &origin, radius_miles, include_origin),
        )
        .await
    }

    /// Benchmark report for a selector at `snapshot` (latest if `None`).
    ///
    /// # Errors
    ///
    /// `MissingKey`, `UnknownKey`, `UnknownSnapshot`, or
    /// `UpstreamUnavailable`.
    #[tracing::instrument(skip(self, selector), fields(selector = %selector))]
    pub async fn benchmark(
        &self,
        selector: &BenchmarkSelector,
        snapshot: Option<Snapshot>,
    ) -> Result<BenchmarkReport, EngineError> {
        canonical_key(selector)?;
        let timeout = self.options.fetch_timeout;
        let snapshot = self.resolve_snapshot(snapshot).await?;
        within(
            timeout,
            "benchmark",
            resolve_benchmark(&self.source, selector, snapshot),
        )
        .await
    }

    /// Build the comparison matrix for `request`.
    ///
    /// # Errors
    ///
    /// Any leaf failure propagates unchanged; a build never partially
    /// succeeds.
    #[tracing::instrument(
        skip(self, request),
        fields(focal = %request.focal_facility_id, radius = request.radius_miles)
    )]
    pub async fn build(&self, request: &MatrixRequest) -> Result<ComparisonMatrix, EngineError> {
        validate_radius(request.radius_miles)?;
        let benchmark = request
            .benchmark
            .as_ref()
            .map(|selector| {
                canonical_key(selector).map(|key| BenchmarkSelector {
                    level: selector.level,
                    key,
                })
            })
            .transpose()?;

        let timeout = self.options.fetch_timeout;
        let (focal, snapshot, dictionary) = tokio::try_join!(
            within(
                timeout,
                "facility",
                self.source.facility(&request.focal_facility_id)
            ),
            self.resolve_snapshot(request.snapshot),
            within(timeout, "measure dictionary", self.source.dictionary()),
        )?;
        let measures = select_measures(&dictionary, request.measures.as_deref())?;
        let codes: Vec<String> = measures.iter().map(|m| m.code.clone()).collect();

        let key = CacheKey {
            focal_facility_id: focal.id.clone(),
            radius_bits: request.radius_miles.to_bits(),
            facility_type: request.facility_type,
            snapshot,
            measures: codes.clone(),
            benchmark: benchmark.clone(),
        };
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(%snapshot, "matrix cache hit");
            return Ok(hit);
        }

        let (nearby, national, distribution, report) = tokio::try_join!(
            within(
                timeout,
                "proximity",
                resolve_nearby(&self.source, &focal, request.radius_miles, false)
            ),
            within(
                timeout,
                "national averages",
                self.source.national_averages(snapshot)
            ),
            within(
                timeout,
                "national distribution",
                self.source.national_distribution(snapshot, &codes)
            ),
            async {
                match &benchmark {
                    Some(selector) => within(
                        timeout,
                        "benchmark",
                        resolve_benchmark(&self.source, selector, snapshot),
                    )
                    .await
                    .map(Some),
                    None => Ok(None),
                }
            },
        )?;

        let competitors: Vec<ProximityResult> = nearby
            .into_iter()
            .filter(|r| {
                request
                    .facility_type
                    .is_none_or(|t| r.facility.facility_type == t)
            })
            .collect();

        let mut ids = Vec::with_capacity(competitors.len() + 1);
        ids.push(focal.id.clone());
        ids.extend(competitors.iter().map(|r| r.facility.id.clone()));
        let observations = within(
            timeout,
            "observations",
            self.source.observations(&ids, snapshot),
        )
        .await?;

        let matrix = assemble(Assembly {
            focal: &focal,
            competitors: &competitors,
            measures: &measures,
            observations: &observations,
            national: &national,
            distribution: &distribution,
            min_population: self.options.min_reference_population,
            radius_miles: request.radius_miles,
            facility_type: request.facility_type,
            snapshot,
            benchmark: report,
        });
        tracing::debug!(
            rows = matrix.rows.len(),
            columns = matrix.columns.len(),
            %snapshot,
            "built comparison matrix"
        );
        self.cache.put(key, matrix.clone());
        Ok(matrix)
    }

    /// Explicit snapshot if published, otherwise the latest.
    async fn resolve_snapshot(&self, requested: Option<Snapshot>) -> Result<Snapshot, EngineError> {
        let timeout = self.options.fetch_timeout;
        match requested {
            Some(snapshot) => {
                if within(timeout, "snapshot", self.source.snapshot_exists(snapshot)).await? {
                    Ok(snapshot)
                } else {
                    Err(EngineError::UnknownSnapshot(snapshot.to_string()))
                }
            }
            None => within(timeout, "latest snapshot", self.source.latest_snapshot())
                .await?
                .ok_or_else(|| EngineError::UnknownSnapshot("latest".to_string())),
        }
    }
}

/// Run one leaf fetch under its own timeout.
async fn within<T, F>(timeout: Duration, what: &str, fetch: F) -> Result<T, EngineError>
where
    F: Future<Output = Result<T, EngineError>>,
{
    if let Ok(result) = tokio::time::timeout(timeout, fetch).await {
        result
    } else {
        tracing::warn!(fetch = what, ?timeout, "store fetch timed out");
        Err(EngineError::UpstreamUnavailable(format!(
            "{what} fetch timed out after {}ms",
            timeout.as_millis()
        )))
    }
}

/// Columns in caller order, or the whole dictionary in its own order.
fn select_measures(
    dictionary: &[QualityMeasure],
    selection: Option<&[String]>,
) -> Result<Vec<QualityMeasure>, EngineError> {
    let Some(selection) = selection else {
        return Ok(dictionary.to_vec());
    };
    if selection.is_empty() {
        return Err(EngineError::InvalidSelection(
            "at least one measure code is required".to_string(),
        ));
    }
    let by_code: HashMap<&str, &QualityMeasure> =
        dictionary.iter().map(|m| (m.code.as_str(), m)).collect();
    let mut seen = HashSet::new();
    let mut unknown = Vec::new();
    let mut selected = Vec::with_capacity(selection.len());
    for code in selection {
        if !seen.insert(code.as_str()) {
            return Err(EngineError::InvalidSelection(format!(
                "measure '{code}' selected more than once"
            )));
        }
        match by_code.get(code.as_str()) {
            Some(m) => selected.push((*m).clone()),
            None => unknown.push(code.as_str()),
        }
    }
    if unknown.is_empty() {
        Ok(selected)
    } else {
        Err(EngineError::InvalidSelection(format!(
            "unknown measure codes: {}",
            unknown.join(", ")
        )))
    }
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

struct Assembly<'a> {
    focal: &'a Facility,
    competitors: &'a [ProximityResult],
    measures: &'a [QualityMeasure],
    observations: &'a [MeasureObservation],
    national: &'a [NationalAverage],
    distribution: &'a BTreeMap<String, Vec<f64>>,
    min_population: usize,
    radius_miles: f64,
    facility_type: Option<FacilityType>,
    snapshot: Snapshot,
    benchmark: Option<BenchmarkReport>,
}

/// Cells without classification, one `Option<ReferenceValue>` per column.
type RawRow = Vec<Option<ReferenceValue>>;

fn assemble(a: Assembly<'_>) -> ComparisonMatrix {
    let scores: HashMap<(&str, &str), ReferenceValue> = a
        .observations
        .iter()
        .map(|o| {
            (
                (o.facility_id.as_str(), o.measure_code.as_str()),
                ReferenceValue {
                    raw_score: o.raw_score,
                    percentile: o.percentile,
                },
            )
        })
        .collect();
    let facility_row = |id: &str| -> RawRow {
        a.measures
            .iter()
            .map(|m| scores.get(&(id, m.code.as_str())).copied())
            .collect()
    };

    let focal_values = facility_row(&a.focal.id);
    let competitor_values: Vec<RawRow> = a
        .competitors
        .iter()
        .map(|r| facility_row(&r.facility.id))
        .collect();

    let degenerate = a.competitors.is_empty();
    let market_values: RawRow = if degenerate {
        focal_values.clone()
    } else {
        a.measures
            .iter()
            .enumerate()
            .map(|(col, m)| {
                let dist = a.distribution.get(&m.code).map_or(&[][..], Vec::as_slice);
                market_value(
                    competitor_values
                        .iter()
                        .map(|row| row[col].map(|v| v.raw_score)),
                    dist,
                    m.direction,
                    a.min_population,
                )
            })
            .collect()
    };

    let national_by_code: HashMap<&str, ReferenceValue> = a
        .national
        .iter()
        .map(|n| (n.measure_code.as_str(), n.value()))
        .collect();
    let national_values: RawRow = a
        .measures
        .iter()
        .map(|m| national_by_code.get(m.code.as_str()).copied())
        .collect();

    let mut rows = Vec::with_capacity(a.competitors.len() + 3);
    rows.push(shell(
        RowKey::facility(&a.focal.id),
        a.focal.name.clone(),
        Some(0.0),
        Some(a.focal.facility_type),
        false,
    ));
    for r in a.competitors {
        rows.push(shell(
            RowKey::facility(&r.facility.id),
            r.facility.name.clone(),
            Some(r.distance_miles),
            Some(r.facility.facility_type),
            false,
        ));
    }
    rows.push(shell(
        RowKey::MarketAverage,
        MARKET_AVERAGE_LABEL.to_string(),
        None,
        None,
        degenerate,
    ));
    rows.push(shell(
        RowKey::NationalAverage,
        NATIONAL_AVERAGE_LABEL.to_string(),
        None,
        None,
        false,
    ));

    let mut values: Vec<RawRow> = Vec::with_capacity(rows.len());
    values.push(focal_values);
    values.extend(competitor_values);
    values.push(market_values);
    values.push(national_values);

    let ranked: Vec<bool> = rows.iter().map(|r| !r.degenerate).collect();
    for col in 0..a.measures.len() {
        let percentiles: Vec<Option<f64>> = values
            .iter()
            .map(|row| row[col].and_then(|v| v.percentile))
            .collect();
        let classes = classify_column(&percentiles, &ranked);
        for ((row, raw), class) in rows.iter_mut().zip(&values).zip(classes) {
            row.cells.push(MatrixCell {
                raw_score: raw[col].map(|v| v.raw_score),
                percentile: raw[col].and_then(|v| v.percentile),
                classification: class,
            });
        }
    }

    ComparisonMatrix {
        focal_facility_id: a.focal.id.clone(),
        snapshot: a.snapshot,
        radius_miles: a.radius_miles,
        facility_type: a.facility_type,
        columns: a.measures.iter().map(MeasureColumn::from).collect(),
        rows,
        benchmark: a.benchmark,
    }
}

fn shell(
    key: RowKey,
    label: String,
    distance_miles: Option<f64>,
    facility_type: Option<FacilityType>,
    degenerate: bool,
) -> MatrixRow {
    MatrixRow {
        key,
        label,
        distance_miles,
        facility_type,
        degenerate,
        cells: Vec::new(),
    }
}
