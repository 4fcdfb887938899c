//! Rate-controlled batch dispatch: fixed-size bursts at fixed intervals.
mod dispatch;
mod issuer;
mod policy;
mod scheduler;
mod types;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use tokio::time::Instant;
use tracing::info;

use crate::error::RunConfigError;
use crate::shutdown::{ShutdownReceiver, shutdown_channel};
use crate::stats::{Statistics, SummaryOptions, summarize_with};

pub use dispatch::Dispatcher;
pub use issuer::{IssuedResponse, RequestIssuer, ResponseMode};
pub use policy::SuccessPolicy;
pub use scheduler::Scheduler;
pub use types::{
    DEFAULT_NUM_TIMES, DEFAULT_REQUEST_TIMEOUT, DEFAULT_REQUESTS_PER_SECOND, DEFAULT_WAIT_TIME,
    RequestOutcome, RequestSpec, RoundResult, RunConfig, RunOutput,
};

/// Statistics plus the raw outcomes they were computed from.
#[derive(Debug, Clone)]
pub struct LoadTestReport {
    pub statistics: Statistics,
    /// Run-level outcome sequence in round order.
    pub outcomes: Vec<RequestOutcome>,
    pub run_start: Instant,
    pub run_end: Instant,
    pub cancelled: bool,
}

/// Runs a complete load test without external cancellation.
///
/// # Errors
///
/// Returns an error when `config` is invalid; no request is sent in that case.
pub async fn run_load_test(
    config: &RunConfig,
    issuer: Arc<dyn RequestIssuer>,
) -> Result<LoadTestReport, RunConfigError> {
    let (_shutdown_tx, mut shutdown_rx) = shutdown_channel();
    run_load_test_with_shutdown(config, issuer, &mut shutdown_rx).await
}

/// Runs a complete load test, stopping between rounds once `shutdown_rx`
/// fires.
///
/// # Errors
///
/// Returns an error when `config` is invalid; no request is sent in that case.
pub async fn run_load_test_with_shutdown(
    config: &RunConfig,
    issuer: Arc<dyn RequestIssuer>,
    shutdown_rx: &mut ShutdownReceiver,
) -> Result<LoadTestReport, RunConfigError> {
    config.validate()?;
    info!(
        "Starting load test: {} {} x{} rounds, {} requests per round, {:?} apart",
        config.request.method,
        config.request.url,
        config.num_times,
        config.requests_per_second,
        config.wait_time
    );

    let dispatcher = Dispatcher::new(config, issuer);
    let scheduler = Scheduler::new(dispatcher, config.num_times, config.wait_time);
    let output = scheduler.run(shutdown_rx).await;

    let run_start = output.run_start;
    let run_end = output.run_end;
    let cancelled = output.cancelled;
    let outcomes = output.into_outcomes();

    let statistics = summarize_with(
        &outcomes,
        run_start,
        run_end,
        SummaryOptions {
            ttfb_only: config.ttfb_only,
            latency_scope: config.latency_scope,
        },
    );
    info!(
        "Load test finished: {} requests, {} failed, {:?}",
        statistics.total_requests, statistics.total_failures, statistics.total_duration
    );

    Ok(LoadTestReport {
        statistics,
        outcomes,
        run_start,
        run_end,
        cancelled,
    })
}
