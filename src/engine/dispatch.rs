use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::time::{Instant, timeout};
use tracing::debug;

use super::issuer::{RequestIssuer, ResponseMode};
use super::policy::SuccessPolicy;
use super::types::{RequestOutcome, RequestSpec, RoundResult, RunConfig};
use crate::error::RequestError;

/// Fires one burst of concurrent requests and waits for all of them.
pub struct Dispatcher {
    issuer: Arc<dyn RequestIssuer>,
    request: Arc<RequestSpec>,
    batch_size: usize,
    mode: ResponseMode,
    request_timeout: Duration,
    policy: SuccessPolicy,
}

struct Attempt {
    issuer: Arc<dyn RequestIssuer>,
    request: Arc<RequestSpec>,
    mode: ResponseMode,
    request_timeout: Duration,
    policy: SuccessPolicy,
    round_index: usize,
    sequence_index: u64,
}

impl Dispatcher {
    #[must_use]
    pub fn new(config: &RunConfig, issuer: Arc<dyn RequestIssuer>) -> Self {
        Self {
            issuer,
            request: Arc::new(config.request.clone()),
            batch_size: config.requests_per_second,
            mode: ResponseMode::from_ttfb_only(config.ttfb_only),
            request_timeout: config.request_timeout,
            policy: config.success_policy,
        }
    }

    #[must_use]
    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Launches `batch_size` requests at once and resolves when every one of
    /// them has an outcome. Failed requests never abort the round.
    ///
    /// `sequence_offset` is the number of requests issued by earlier rounds.
    pub async fn dispatch_round(&self, round_index: usize, sequence_offset: u64) -> RoundResult {
        let round_start = Instant::now();

        let sequence_indices: Vec<u64> = (0..self.batch_size)
            .map(|slot| sequence_offset.saturating_add(u64::try_from(slot).unwrap_or(u64::MAX)))
            .collect();

        let handles: Vec<_> = sequence_indices
            .iter()
            .map(|&sequence_index| {
                let attempt = Attempt {
                    issuer: Arc::clone(&self.issuer),
                    request: Arc::clone(&self.request),
                    mode: self.mode,
                    request_timeout: self.request_timeout,
                    policy: self.policy,
                    round_index,
                    sequence_index,
                };
                tokio::spawn(attempt.run())
            })
            .collect();

        let joined = join_all(handles).await;

        let outcomes = joined
            .into_iter()
            .zip(sequence_indices)
            .map(|(result, sequence_index)| match result {
                Ok(outcome) => outcome,
                Err(err) => RequestOutcome::failed(
                    sequence_index,
                    round_index,
                    round_start,
                    Instant::now(),
                    None,
                    RequestError::TaskFailed(err.to_string()),
                ),
            })
            .collect();

        RoundResult {
            round_index,
            outcomes,
            round_start,
            round_end: Instant::now(),
        }
    }
}

impl Attempt {
    async fn run(self) -> RequestOutcome {
        let start_time = Instant::now();
        let result = timeout(
            self.request_timeout,
            self.issuer.issue(&self.request, self.mode),
        )
        .await;
        let end_time = Instant::now();

        let response = match result {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => return self.failure(start_time, end_time, None, err),
            Err(_elapsed) => {
                return self.failure(start_time, end_time, None, RequestError::Timeout);
            }
        };

        if let Err(err) = self.policy.check(response.status) {
            return self.failure(start_time, end_time, Some(response.status), err);
        }

        let response_size = match self.mode {
            ResponseMode::Ttfb => None,
            ResponseMode::Full => response.response_size,
        };
        RequestOutcome::succeeded(
            self.sequence_index,
            self.round_index,
            start_time,
            end_time,
            response.status,
            response_size,
        )
    }

    fn failure(
        &self,
        start_time: Instant,
        end_time: Instant,
        status: Option<u16>,
        error: RequestError,
    ) -> RequestOutcome {
        debug!(
            "Request {} (round {}) failed: {}",
            self.sequence_index, self.round_index, error
        );
        RequestOutcome::failed(
            self.sequence_index,
            self.round_index,
            start_time,
            end_time,
            status,
            error,
        )
    }
}
