use std::collections::BTreeMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::engine::RequestOutcome;

/// Completions per whole second since `run_start`.
#[must_use]
pub fn responses_per_second(outcomes: &[RequestOutcome], run_start: Instant) -> BTreeMap<u64, u64> {
    let mut buckets = BTreeMap::new();
    for outcome in outcomes {
        let second = outcome
            .end_time
            .saturating_duration_since(run_start)
            .as_secs();
        let slot = buckets.entry(second).or_insert(0u64);
        *slot = slot.saturating_add(1);
    }
    buckets
}

/// The target shape: round `i` contributes its whole batch at second
/// `floor(i * wait_time)`.
#[must_use]
pub fn expected_requests_per_second(
    requests_per_second: usize,
    num_times: usize,
    wait_time: Duration,
) -> BTreeMap<u64, u64> {
    let batch = u64::try_from(requests_per_second).unwrap_or(u64::MAX);
    let mut buckets = BTreeMap::new();
    for round_index in 0..num_times {
        let offset = u32::try_from(round_index)
            .ok()
            .and_then(|index| wait_time.checked_mul(index))
            .unwrap_or(Duration::MAX);
        let slot = buckets.entry(offset.as_secs()).or_insert(0u64);
        *slot = slot.saturating_add(batch);
    }
    buckets
}

/// One point of the latency-over-time view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyPoint {
    /// Completion time relative to the run start.
    pub completed_at: Duration,
    pub latency: Duration,
}

/// Latencies ordered by completion time.
#[must_use]
pub fn latency_timeline(outcomes: &[RequestOutcome], run_start: Instant) -> Vec<LatencyPoint> {
    let mut points: Vec<LatencyPoint> = outcomes
        .iter()
        .map(|outcome| LatencyPoint {
            completed_at: outcome.end_time.saturating_duration_since(run_start),
            latency: outcome.latency,
        })
        .collect();
    points.sort_by_key(|point| point.completed_at);
    points
}
