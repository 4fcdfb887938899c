//! Summary statistics over a run's outcomes.
//!
//! Everything here is a pure function of its inputs. Empty inputs yield
//! `None` for every distribution instead of zero placeholders, so an empty
//! run can never pass for a fast one.
mod buckets;
mod distribution;


use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::engine::RequestOutcome;

pub use buckets::{
    LatencyPoint, expected_requests_per_second, latency_timeline, responses_per_second,
};

const P90: u64 = 90;
const P95: u64 = 95;
const P99: u64 = 99;

/// Which outcomes feed the latency distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LatencyScope {
    #[default]
    All,
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SummaryOptions {
    pub ttfb_only: bool,
    pub latency_scope: LatencyScope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyStats {
    pub mean: Duration,
    pub median: Duration,
    pub min: Duration,
    pub max: Duration,
    pub p90: Duration,
    pub p95: Duration,
    pub p99: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeStats {
    pub mean: f64,
    pub median: f64,
    pub min: u64,
    pub max: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    pub total_requests: u64,
    pub total_success: u64,
    pub total_failures: u64,
    /// Wall clock of the whole run, inter-round waits included.
    pub total_duration: Duration,
    pub achieved_rps: f64,
    /// `None` when no outcome was in scope.
    pub latency: Option<LatencyStats>,
    /// `None` in TTFB mode or when no outcome carried a size.
    pub response_size: Option<SizeStats>,
}

/// Summarises `outcomes`, counting every outcome's latency.
#[must_use]
pub fn summarize(
    outcomes: &[RequestOutcome],
    run_start: Instant,
    run_end: Instant,
    ttfb_only: bool,
) -> Statistics {
    summarize_with(
        outcomes,
        run_start,
        run_end,
        SummaryOptions {
            ttfb_only,
            latency_scope: LatencyScope::All,
        },
    )
}

#[must_use]
pub fn summarize_with(
    outcomes: &[RequestOutcome],
    run_start: Instant,
    run_end: Instant,
    options: SummaryOptions,
) -> Statistics {
    let total_duration = run_end.saturating_duration_since(run_start);
    let total_requests = u64::try_from(outcomes.len()).unwrap_or(u64::MAX);
    let total_success = u64::try_from(outcomes.iter().filter(|outcome| outcome.success).count())
        .unwrap_or(u64::MAX);
    let total_failures = total_requests.saturating_sub(total_success);

    let latencies: Vec<Duration> = outcomes
        .iter()
        .filter(|outcome| match options.latency_scope {
            LatencyScope::All => true,
            LatencyScope::Success => outcome.success,
        })
        .map(|outcome| outcome.latency)
        .collect();

    let response_size = if options.ttfb_only {
        None
    } else {
        let sizes: Vec<u64> = outcomes
            .iter()
            .filter_map(|outcome| outcome.response_size)
            .collect();
        size_stats(sizes)
    };

    Statistics {
        total_requests,
        total_success,
        total_failures,
        total_duration,
        achieved_rps: achieved_rps(total_requests, total_duration),
        latency: latency_stats(latencies),
        response_size,
    }
}

#[expect(clippy::float_arithmetic, reason = "requests per second is a rate")]
fn achieved_rps(total_requests: u64, total_duration: Duration) -> f64 {
    if total_duration.is_zero() {
        return 0.0;
    }
    total_requests as f64 / total_duration.as_secs_f64()
}

fn latency_stats(mut latencies: Vec<Duration>) -> Option<LatencyStats> {
    latencies.sort_unstable();
    Some(LatencyStats {
        mean: distribution::mean_duration(&latencies)?,
        median: distribution::median_duration(&latencies)?,
        min: *latencies.first()?,
        max: *latencies.last()?,
        p90: distribution::percentile(&latencies, P90)?,
        p95: distribution::percentile(&latencies, P95)?,
        p99: distribution::percentile(&latencies, P99)?,
    })
}

fn size_stats(mut sizes: Vec<u64>) -> Option<SizeStats> {
    sizes.sort_unstable();
    Some(SizeStats {
        mean: distribution::mean_bytes(&sizes)?,
        median: distribution::median_bytes(&sizes)?,
        min: *sizes.first()?,
        max: *sizes.last()?,
    })
}
