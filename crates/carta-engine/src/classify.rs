//! Per-column best/worst classification of matrix cells.
//!
//! Classification looks at percentiles only, so it is direction-agnostic:
//! percentiles already encode "better" as higher.

use carta_core::enums::Classification;

/// Classify one column.
///
/// `percentiles[i]` is row `i`'s percentile; `ranked[i]` says whether row `i`
/// takes part in best/worst. A present value on an unranked row is
/// `Neutral`; an absent value is always `NoData`.
///
/// Among ranked rows with a value: the maximum is `Best`, the minimum is
/// `Worst`, the rest `Neutral`. A single ranked value, or all ranked values
/// equal, gives `Neutral` throughout.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn classify_column(percentiles: &[Option<f64>], ranked: &[bool]) -> Vec<Classification> {
    let candidates: Vec<f64> = percentiles
        .iter()
        .zip(ranked)
        .filter_map(|(p, &r)| if r { *p } else { None })
        .collect();

    let spread = if candidates.len() < 2 {
        None
    } else {
        let max = candidates.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = candidates.iter().copied().fold(f64::INFINITY, f64::min);
        (max > min).then_some((min, max))
    };

    percentiles
        .iter()
        .zip(ranked)
        .map(|(p, &r)| match (p, spread) {
            (None, _) => Classification::NoData,
            (Some(v), Some((min, max))) if r => {
                if *v == max {
                    Classification::Best
                } else if *v == min {
                    Classification::Worst
                } else {
                    Classification::Neutral
                }
            }
            (Some(_), _) => Classification::Neutral,
        })
        .collect()
}
