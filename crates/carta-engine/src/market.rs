//! Market (peer-group) averages and percentile ranking of derived values.

use carta_core::entities::ReferenceValue;
use carta_core::enums::Direction;

/// Mid-rank percentile of `value` within `distribution`, in [0, 1].
///
/// Values equal to `value` count half. For lower-is-better measures a lower
/// score ranks higher. Returns `None` when the distribution holds fewer than
/// `min_population` scores (or is empty).
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::float_cmp)]
pub fn percentile_rank(
    value: f64,
    distribution: &[f64],
    direction: Direction,
    min_population: usize,
) -> Option<f64> {
    let n = distribution.len();
    if n == 0 || n < min_population {
        return None;
    }
    let (mut better, mut equal) = (0usize, 0usize);
    for &score in distribution {
        if score == value {
            equal += 1;
        } else if match direction {
            Direction::HigherIsBetter => score < value,
            Direction::LowerIsBetter => score > value,
        } {
            better += 1;
        }
    }
    let rank = (better as f64 + equal as f64 / 2.0) / n as f64;
    Some(rank.clamp(0.0, 1.0))
}

/// Arithmetic mean of the present scores, in input order.
///
/// Absent scores are excluded from the denominator. `None` when nothing is
/// present.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean_of_present<I>(scores: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = scores
        .into_iter()
        .flatten()
        .fold((0.0_f64, 0usize), |(sum, count), s| (sum + s, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Market average for one measure over competitor scores.
///
/// The percentile is the mean's standing in the national distribution.
#[must_use]
pub fn market_value<I>(
    competitor_scores: I,
    distribution: &[f64],
    direction: Direction,
    min_population: usize,
) -> Option<ReferenceValue>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let raw_score = mean_of_present(competitor_scores)?;
    Some(ReferenceValue {
        raw_score,
        percentile: percentile_rank(raw_score, distribution, direction, min_population),
    })
}
