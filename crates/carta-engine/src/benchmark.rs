//! Benchmark hierarchy resolution: national, state and county enrollment
//! aggregates with derived percentages.

use carta_core::Snapshot;
use carta_core::entities::{
    BenchmarkAggregate, BenchmarkPercentages, BenchmarkReport, BenchmarkSelector,
};

use crate::error::EngineError;
use crate::source::BenchmarkSource;

/// Shares of the total population. All `None` when the total is zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percentages(aggregate: &BenchmarkAggregate) -> BenchmarkPercentages {
    if aggregate.total_count == 0 {
        return BenchmarkPercentages::default();
    }
    let total = aggregate.total_count as f64;
    let share = |count: u64| Some(count as f64 / total);
    BenchmarkPercentages {
        dual_eligible_pct: share(aggregate.dual_eligible_count),
        aged_pct: share(aggregate.aged_count),
        disabled_pct: share(aggregate.disabled_count),
        advantage_pct: share(aggregate.advantage_count),
    }
}

/// Canonical key for the selector.
///
/// # Errors
///
/// `MissingKey` when a keyed level has none, `UnknownKey` when it is malformed.
pub fn canonical_key(selector: &BenchmarkSelector) -> Result<Option<String>, EngineError> {
    let level = selector.level;
    let raw = selector.key.as_deref().map(str::trim).filter(|k| !k.is_empty());
    if level.requires_key() && raw.is_none() {
        return Err(EngineError::MissingKey(level));
    }
    level.normalize_key(raw).map_err(|_| EngineError::UnknownKey {
        level,
        key: raw.unwrap_or_default().to_string(),
    })
}

/// Resolve a selector against an already-validated snapshot.
///
/// # Errors
///
/// `MissingKey`, `UnknownKey` (malformed key or no aggregate row), or a
/// source failure.
pub async fn resolve_benchmark<S: BenchmarkSource>(
    source: &S,
    selector: &BenchmarkSelector,
    snapshot: Snapshot,
) -> Result<BenchmarkReport, EngineError> {
    let key = canonical_key(selector)?;
    let aggregate = source
        .aggregate(selector.level, key.as_deref(), snapshot)
        .await?
        .ok_or_else(|| EngineError::UnknownKey {
            level: selector.level,
            key: key.clone().unwrap_or_default(),
        })?;
    let percentages = percentages(&aggregate);
    Ok(BenchmarkReport {
        aggregate,
        percentages,
    })
}

#[cfg(test)]
mod tests {
    use carta_core::enums::BenchmarkLevel;

    use super::*;

    fn aggregate(total: u64, dual: u64) -> BenchmarkAggregate {
        BenchmarkAggregate {
            level: BenchmarkLevel::County,
            key: Some("12086".into()),
            snapshot: "2024-05-01".parse().unwrap(),
            total_count: total,
            dual_eligible_count: dual,
            aged_count: total / 2,
            disabled_count: 0,
            advantage_count: total,
        }
    }

    #[test]
    fn zero_population_yields_null_percentages() {
        let p = percentages(&aggregate(0, 0));
        assert_eq!(p, BenchmarkPercentages::default());
        assert!(p.dual_eligible_pct.is_none());
        assert!(p.advantage_pct.is_none());
    }

    #[test]
    fn shares_are_fractions_of_total() {
        let p = percentages(&aggregate(200, 50));
        assert_eq!(p.dual_eligible_pct, Some(0.25));
        assert_eq!(p.aged_pct, Some(0.5));
        assert_eq!(p.disabled_pct, Some(0.0));
        assert_eq!(p.advantage_pct, Some(1.0));
    }

    #[test]
    fn keys_are_validated_per_level() {
        assert_eq!(canonical_key(&BenchmarkSelector::national()), Ok(None));
        assert_eq!(
            canonical_key(&BenchmarkSelector::state("fl")),
            Ok(Some("FL".into()))
        );
        assert_eq!(
            canonical_key(&BenchmarkSelector {
                level: BenchmarkLevel::County,
                key: None,
            }),
            Err(EngineError::MissingKey(BenchmarkLevel::County))
        );
        assert_eq!(
            canonical_key(&BenchmarkSelector::county("Dade")),
            Err(EngineError::UnknownKey {
                level: BenchmarkLevel::County,
                key: "Dade".into(),
            })
        );
    }
}
