use std::time::Duration;

const PERCENT_DIVISOR: u64 = 100;

/// Nearest-rank index: `ceil(p / 100 * n) - 1`, clamped to `[0, n - 1]`.
pub(crate) fn nearest_rank_index(len: usize, percentile: u64) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let n = u64::try_from(len).unwrap_or(u64::MAX);
    let rank = percentile
        .saturating_mul(n)
        .saturating_add(PERCENT_DIVISOR.saturating_sub(1))
        .checked_div(PERCENT_DIVISOR)
        .unwrap_or(0);
    let index = usize::try_from(rank.saturating_sub(1)).unwrap_or(usize::MAX);
    Some(index.min(len.saturating_sub(1)))
}

/// Value at `percentile` of an ascending slice, without interpolation.
pub(crate) fn percentile<T: Copy>(sorted: &[T], percentile: u64) -> Option<T> {
    let index = nearest_rank_index(sorted.len(), percentile)?;
    sorted.get(index).copied()
}

/// The two central positions of an ascending slice (equal for odd lengths).
fn central_pair<T: Copy>(sorted: &[T]) -> Option<(T, T)> {
    let len = sorted.len();
    if len == 0 {
        return None;
    }
    let upper = len.checked_div(2).unwrap_or(0);
    let lower = if len.checked_rem(2) == Some(0) {
        upper.saturating_sub(1)
    } else {
        upper
    };
    Some((*sorted.get(lower)?, *sorted.get(upper)?))
}

pub(crate) fn median_duration(sorted: &[Duration]) -> Option<Duration> {
    let (lower, upper) = central_pair(sorted)?;
    let sum = lower.checked_add(upper)?;
    sum.checked_div(2)
}

#[expect(clippy::float_arithmetic, reason = "median of an even count can be fractional")]
pub(crate) fn median_bytes(sorted: &[u64]) -> Option<f64> {
    let (lower, upper) = central_pair(sorted)?;
    let sum = u128::from(lower).saturating_add(u128::from(upper));
    Some(sum as f64 / 2.0)
}

pub(crate) fn mean_duration(values: &[Duration]) -> Option<Duration> {
    if values.is_empty() {
        return None;
    }
    let total_nanos = values
        .iter()
        .fold(0u128, |acc, value| acc.saturating_add(value.as_nanos()));
    let count = u128::try_from(values.len()).unwrap_or(u128::MAX);
    let mean_nanos = total_nanos.checked_div(count)?;
    Some(Duration::from_nanos(
        u64::try_from(mean_nanos).unwrap_or(u64::MAX),
    ))
}

#[expect(clippy::float_arithmetic, reason = "mean byte count is fractional")]
pub(crate) fn mean_bytes(values: &[u64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let total = values
        .iter()
        .fold(0u128, |acc, value| acc.saturating_add(u128::from(*value)));
    Some(total as f64 / values.len() as f64)
}
