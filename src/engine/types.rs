use std::time::Duration;

use tokio::time::Instant;
use url::Url;

use crate::args::HttpMethod;
use crate::error::{RequestError, RunConfigError};
use crate::stats::LatencyScope;

use super::policy::SuccessPolicy;

/// Original defaults: 10 requests per round, 5 rounds, 1s apart.
pub const DEFAULT_REQUESTS_PER_SECOND: usize = 10;
pub const DEFAULT_NUM_TIMES: usize = 5;
pub const DEFAULT_WAIT_TIME: Duration = Duration::from_secs(1);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// What to send on every request of the run.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub url: Url,
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl RequestSpec {
    /// Parses the target URL. Only `http` and `https` targets are accepted.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL is malformed or uses another scheme.
    pub fn new(url: &str, method: HttpMethod) -> Result<Self, RunConfigError> {
        let parsed = Url::parse(url).map_err(|err| RunConfigError::InvalidUrl {
            url: url.to_owned(),
            reason: err.to_string(),
        })?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(RunConfigError::UnsupportedScheme {
                    scheme: other.to_owned(),
                });
            }
        }
        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(RunConfigError::InvalidUrl {
                url: url.to_owned(),
                reason: "missing host".to_owned(),
            });
        }
        Ok(Self {
            url: parsed,
            method,
            headers: Vec::new(),
            body: None,
        })
    }

    #[must_use]
    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Option<serde_json::Value>) -> Self {
        self.body = body;
        self
    }
}

/// Immutable snapshot of one load test execution.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub request: RequestSpec,
    /// Batch size: requests fired concurrently per round.
    pub requests_per_second: usize,
    /// Number of rounds.
    pub num_times: usize,
    /// Target spacing between round starts.
    pub wait_time: Duration,
    pub ttfb_only: bool,
    pub request_timeout: Duration,
    pub success_policy: SuccessPolicy,
    pub latency_scope: LatencyScope,
}

impl RunConfig {
    #[must_use]
    pub const fn new(request: RequestSpec) -> Self {
        Self {
            request,
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            num_times: DEFAULT_NUM_TIMES,
            wait_time: DEFAULT_WAIT_TIME,
            ttfb_only: true,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            success_policy: SuccessPolicy::AnyResponse,
            latency_scope: LatencyScope::All,
        }
    }

    /// Checks the invariants the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), RunConfigError> {
        if self.requests_per_second == 0 {
            return Err(RunConfigError::ZeroRequestsPerSecond);
        }
        if self.num_times == 0 {
            return Err(RunConfigError::ZeroRounds);
        }
        if self.request_timeout.is_zero() {
            return Err(RunConfigError::ZeroRequestTimeout);
        }
        for (name, value) in &self.request.headers {
            reqwest::header::HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
                RunConfigError::InvalidHeader {
                    name: name.clone(),
                    reason: err.to_string(),
                }
            })?;
            reqwest::header::HeaderValue::from_str(value).map_err(|err| {
                RunConfigError::InvalidHeader {
                    name: name.clone(),
                    reason: err.to_string(),
                }
            })?;
        }
        Ok(())
    }

    /// Total number of requests a completed run issues.
    #[must_use]
    pub const fn total_requests(&self) -> usize {
        self.requests_per_second.saturating_mul(self.num_times)
    }
}

/// One completed or failed request attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOutcome {
    /// Position within the whole run: round-major, then issue order.
    pub sequence_index: u64,
    pub round_index: usize,
    pub start_time: Instant,
    pub end_time: Instant,
    /// Time to first byte in TTFB mode, time to full body otherwise.
    pub latency: Duration,
    pub success: bool,
    pub status: Option<u16>,
    pub response_size: Option<u64>,
    pub error: Option<RequestError>,
}

impl RequestOutcome {
    #[must_use]
    pub fn succeeded(
        sequence_index: u64,
        round_index: usize,
        start_time: Instant,
        end_time: Instant,
        status: u16,
        response_size: Option<u64>,
    ) -> Self {
        Self {
            sequence_index,
            round_index,
            start_time,
            end_time,
            latency: end_time.saturating_duration_since(start_time),
            success: true,
            status: Some(status),
            response_size,
            error: None,
        }
    }

    #[must_use]
    pub fn failed(
        sequence_index: u64,
        round_index: usize,
        start_time: Instant,
        end_time: Instant,
        status: Option<u16>,
        error: RequestError,
    ) -> Self {
        Self {
            sequence_index,
            round_index,
            start_time,
            end_time,
            latency: end_time.saturating_duration_since(start_time),
            success: false,
            status,
            response_size: None,
            error: Some(error),
        }
    }
}

/// Outcomes of one burst, in issue order.
#[derive(Debug, Clone)]
pub struct RoundResult {
    pub round_index: usize,
    pub outcomes: Vec<RequestOutcome>,
    pub round_start: Instant,
    pub round_end: Instant,
}

impl RoundResult {
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.round_end.saturating_duration_since(self.round_start)
    }

    #[must_use]
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|outcome| !outcome.success).count()
    }
}

/// Everything the scheduler produced for one run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub rounds: Vec<RoundResult>,
    pub run_start: Instant,
    pub run_end: Instant,
    /// Set when a shutdown signal stopped the run before the last round.
    pub cancelled: bool,
}

impl RunOutput {
    /// Concatenates the per-round outcome lists in round order.
    #[must_use]
    pub fn into_outcomes(self) -> Vec<RequestOutcome> {
        let total = self
            .rounds
            .iter()
            .fold(0usize, |acc, round| acc.saturating_add(round.outcomes.len()));
        let mut outcomes = Vec::with_capacity(total);
        for round in self.rounds {
            outcomes.extend(round.outcomes);
        }
        outcomes
    }
}
