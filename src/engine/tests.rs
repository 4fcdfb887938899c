use super::*;
use crate::args::HttpMethod;
use crate::error::RequestError;
use crate::shutdown::shutdown_channel;
use async_trait::async_trait;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Sleeps `latency` per call; every `fail_every`-th call fails to connect.
struct MockIssuer {
    latency: Duration,
    status: u16,
    fail_every: Option<usize>,
    response_size: u64,
    calls: AtomicUsize,
}

impl MockIssuer {
    const fn new(latency: Duration) -> Self {
        Self {
            latency,
            status: 200,
            fail_every: None,
            response_size: 64,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RequestIssuer for MockIssuer {
    async fn issue(
        &self,
        _request: &RequestSpec,
        mode: ResponseMode,
    ) -> Result<IssuedResponse, RequestError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        tokio::time::sleep(self.latency).await;
        if let Some(every) = self.fail_every
            && call.checked_rem(every) == Some(0)
        {
            return Err(RequestError::Connect("refused".to_owned()));
        }
        Ok(IssuedResponse {
            status: self.status,
            response_size: match mode {
                ResponseMode::Ttfb => None,
                ResponseMode::Full => Some(self.response_size),
            },
        })
    }
}

fn run_paused_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

fn config(requests_per_second: usize, num_times: usize) -> Result<RunConfig, String> {
    let request =
        RequestSpec::new("http://localhost/", HttpMethod::Get).map_err(|err| err.to_string())?;
    let mut config = RunConfig::new(request);
    config.requests_per_second = requests_per_second;
    config.num_times = num_times;
    Ok(config)
}

fn round_starts(report: &LoadTestReport) -> Vec<Duration> {
    let mut starts: Vec<Duration> = report
        .outcomes
        .iter()
        .map(|outcome| outcome.start_time.saturating_duration_since(report.run_start))
        .collect();
    starts.dedup();
    starts
}

#[test]
fn run_issues_every_request_of_every_round() -> Result<(), String> {
    run_paused_test(async {
        let issuer = Arc::new(MockIssuer::new(Duration::from_millis(50)));
        let report = run_load_test(&config(4, 3)?, issuer.clone())
            .await
            .map_err(|err| err.to_string())?;

        if report.outcomes.len() != 12 || issuer.calls() != 12 {
            return Err(format!(
                "Expected 12 outcomes, got {} ({} calls)",
                report.outcomes.len(),
                issuer.calls()
            ));
        }
        if report.statistics.total_requests != 12 || report.cancelled {
            return Err(format!("Unexpected report: {:?}", report.statistics));
        }
        let sequence: Vec<u64> = report
            .outcomes
            .iter()
            .map(|outcome| outcome.sequence_index)
            .collect();
        if sequence != (0u64..12).collect::<Vec<_>>() {
            return Err(format!("Sequence indices not global: {:?}", sequence));
        }
        let rounds: Vec<usize> = report
            .outcomes
            .iter()
            .map(|outcome| outcome.round_index)
            .collect();
        if rounds != vec![0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2] {
            return Err(format!("Unexpected round indices: {:?}", rounds));
        }
        Ok(())
    })
}

#[test]
fn rounds_start_one_interval_apart() -> Result<(), String> {
    run_paused_test(async {
        let issuer = Arc::new(MockIssuer::new(Duration::from_millis(100)));
        let report = run_load_test(&config(3, 4)?, issuer)
            .await
            .map_err(|err| err.to_string())?;

        let starts = round_starts(&report);
        let expected: Vec<Duration> = (0u64..4).map(Duration::from_secs).collect();
        if starts != expected {
            return Err(format!("Unexpected round starts: {:?}", starts));
        }
        // No trailing wait after the last round.
        let total = report.statistics.total_duration;
        if total != Duration::from_millis(3100) {
            return Err(format!("Unexpected total duration {:?}", total));
        }
        Ok(())
    })
}

#[test]
fn overrunning_round_is_followed_immediately() -> Result<(), String> {
    run_paused_test(async {
        let issuer = Arc::new(MockIssuer::new(Duration::from_millis(1500)));
        let report = run_load_test(&config(2, 3)?, issuer)
            .await
            .map_err(|err| err.to_string())?;

        let starts = round_starts(&report);
        let expected = vec![
            Duration::ZERO,
            Duration::from_millis(1500),
            Duration::from_millis(3000),
        ];
        if starts != expected {
            return Err(format!("Unexpected round starts: {:?}", starts));
        }
        Ok(())
    })
}

#[test]
fn zero_wait_runs_rounds_back_to_back() -> Result<(), String> {
    run_paused_test(async {
        let issuer = Arc::new(MockIssuer::new(Duration::from_millis(10)));
        let mut config = config(2, 3)?;
        config.wait_time = Duration::ZERO;
        let report = run_load_test(&config, issuer)
            .await
            .map_err(|err| err.to_string())?;

        if report.statistics.total_duration != Duration::from_millis(30) {
            return Err(format!(
                "Unexpected duration {:?}",
                report.statistics.total_duration
            ));
        }
        Ok(())
    })
}

#[test]
fn single_large_round() -> Result<(), String> {
    run_paused_test(async {
        let issuer = Arc::new(MockIssuer::new(Duration::from_millis(20)));
        let report = run_load_test(&config(100, 1)?, issuer)
            .await
            .map_err(|err| err.to_string())?;

        if report.statistics.total_requests != 100 || report.statistics.total_success != 100 {
            return Err(format!("Unexpected counts: {:?}", report.statistics));
        }
        // All requests are in flight together, so the round takes one latency.
        if report.statistics.total_duration != Duration::from_millis(20) {
            return Err(format!(
                "Unexpected duration {:?}",
                report.statistics.total_duration
            ));
        }
        Ok(())
    })
}

#[test]
fn failures_are_recorded_without_aborting() -> Result<(), String> {
    run_paused_test(async {
        let mut issuer = MockIssuer::new(Duration::from_millis(10));
        issuer.fail_every = Some(3);
        let issuer = Arc::new(issuer);
        let report = run_load_test(&config(5, 5)?, issuer)
            .await
            .map_err(|err| err.to_string())?;

        let stats = &report.statistics;
        if stats.total_requests != 25 || stats.total_failures != 8 || stats.total_success != 17 {
            return Err(format!("Unexpected counts: {:?}", stats));
        }
        let connect_errors = report
            .outcomes
            .iter()
            .filter(|outcome| matches!(outcome.error, Some(RequestError::Connect(_))))
            .count();
        if connect_errors != 8 {
            return Err(format!("Expected 8 connect errors, got {}", connect_errors));
        }
        Ok(())
    })
}

#[test]
fn invalid_config_sends_nothing() -> Result<(), String> {
    run_paused_test(async {
        let issuer = Arc::new(MockIssuer::new(Duration::from_millis(10)));
        let result = run_load_test(&config(0, 5)?, issuer.clone()).await;
        if result.is_ok() {
            return Err("Expected zero batch size to be rejected".to_owned());
        }
        let result = run_load_test(&config(5, 0)?, issuer.clone()).await;
        if !matches!(result, Err(RunConfigError::ZeroRounds)) {
            return Err("Expected zero rounds to be rejected".to_owned());
        }
        if issuer.calls() != 0 {
            return Err(format!("Issued {} requests for invalid config", issuer.calls()));
        }
        Ok(())
    })
}

#[test]
fn strict_policy_marks_other_statuses_failed() -> Result<(), String> {
    run_paused_test(async {
        let mut issuer = MockIssuer::new(Duration::from_millis(10));
        issuer.status = 404;
        let issuer = Arc::new(issuer);

        let lenient = run_load_test(&config(2, 1)?, issuer.clone())
            .await
            .map_err(|err| err.to_string())?;
        if lenient.statistics.total_failures != 0 {
            return Err("Any response should count as success by default".to_owned());
        }

        let mut strict = config(2, 1)?;
        strict.success_policy = SuccessPolicy::Status2xx;
        let report = run_load_test(&strict, issuer)
            .await
            .map_err(|err| err.to_string())?;
        let all_rejected = report.outcomes.iter().all(|outcome| {
            !outcome.success
                && outcome.status == Some(404)
                && outcome.error == Some(RequestError::UnexpectedStatus { status: 404 })
        });
        if !all_rejected {
            return Err(format!("Unexpected outcomes: {:?}", report.outcomes));
        }
        Ok(())
    })
}

#[test]
fn slow_requests_time_out() -> Result<(), String> {
    run_paused_test(async {
        let issuer = Arc::new(MockIssuer::new(Duration::from_secs(30)));
        let mut config = config(3, 1)?;
        config.request_timeout = Duration::from_secs(2);
        let report = run_load_test(&config, issuer)
            .await
            .map_err(|err| err.to_string())?;

        let all_timed_out = report.outcomes.iter().all(|outcome| {
            outcome.error == Some(RequestError::Timeout)
                && outcome.latency == Duration::from_secs(2)
        });
        if !all_timed_out || report.statistics.total_failures != 3 {
            return Err(format!("Unexpected outcomes: {:?}", report.outcomes));
        }
        Ok(())
    })
}

#[test]
fn full_mode_keeps_response_sizes() -> Result<(), String> {
    run_paused_test(async {
        let issuer = Arc::new(MockIssuer::new(Duration::from_millis(10)));
        let mut full = config(2, 2)?;
        full.ttfb_only = false;
        let report = run_load_test(&full, issuer.clone())
            .await
            .map_err(|err| err.to_string())?;
        if report
            .statistics
            .response_size
            .map(|sizes| (sizes.min, sizes.max))
            != Some((64, 64))
        {
            return Err(format!("Unexpected size stats: {:?}", report.statistics));
        }

        let ttfb = run_load_test(&config(2, 2)?, issuer)
            .await
            .map_err(|err| err.to_string())?;
        if ttfb.outcomes.iter().any(|outcome| outcome.response_size.is_some()) {
            return Err("TTFB outcomes must not carry sizes".to_owned());
        }
        Ok(())
    })
}

#[test]
fn shutdown_before_start_runs_nothing() -> Result<(), String> {
    run_paused_test(async {
        let issuer = Arc::new(MockIssuer::new(Duration::from_millis(10)));
        let (shutdown_tx, mut shutdown_rx) = shutdown_channel();
        shutdown_tx
            .send(())
            .map_err(|err| format!("send failed: {}", err))?;

        let report = run_load_test_with_shutdown(&config(5, 5)?, issuer.clone(), &mut shutdown_rx)
            .await
            .map_err(|err| err.to_string())?;
        if !report.cancelled || !report.outcomes.is_empty() || issuer.calls() != 0 {
            return Err(format!("Unexpected cancelled report: {:?}", report.statistics));
        }
        if report.statistics.latency.is_some() {
            return Err("Empty run must not report latency".to_owned());
        }
        Ok(())
    })
}

#[test]
fn shutdown_during_wait_keeps_completed_rounds() -> Result<(), String> {
    run_paused_test(async {
        let issuer = Arc::new(MockIssuer::new(Duration::from_millis(100)));
        let (shutdown_tx, mut shutdown_rx) = shutdown_channel();
        let config = config(4, 5)?;

        let run = run_load_test_with_shutdown(&config, issuer, &mut shutdown_rx);
        let cancel = async {
            tokio::time::sleep(Duration::from_millis(1500)).await;
            drop(shutdown_tx.send(()));
        };
        let (report, ()) = tokio::join!(run, cancel);
        let report = report.map_err(|err| err.to_string())?;

        if !report.cancelled || report.outcomes.len() != 8 {
            return Err(format!(
                "Expected two completed rounds, got {} outcomes (cancelled {})",
                report.outcomes.len(),
                report.cancelled
            ));
        }
        if report.statistics.total_duration != Duration::from_millis(1500) {
            return Err(format!(
                "Unexpected duration {:?}",
                report.statistics.total_duration
            ));
        }
        Ok(())
    })
}
