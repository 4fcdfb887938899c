use std::time::Duration;

use tokio::sync::broadcast::error::TryRecvError;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use super::dispatch::Dispatcher;
use super::types::{RoundResult, RunOutput};
use crate::shutdown::ShutdownReceiver;

/// Drives `num_times` rounds, spacing round starts `wait_time` apart.
///
/// Correction is per interval only: a round that overruns `wait_time` is
/// followed immediately by the next one, and the lost time is never
/// recovered later.
pub struct Scheduler {
    dispatcher: Dispatcher,
    num_times: usize,
    wait_time: Duration,
}

enum WaitOutcome {
    Elapsed,
    Cancelled,
}

impl Scheduler {
    #[must_use]
    pub const fn new(dispatcher: Dispatcher, num_times: usize, wait_time: Duration) -> Self {
        Self {
            dispatcher,
            num_times,
            wait_time,
        }
    }

    /// Runs every round in order. Cancellation is observed before each round
    /// and during the inter-round wait; a round in flight always resolves.
    pub async fn run(&self, shutdown_rx: &mut ShutdownReceiver) -> RunOutput {
        let run_start = Instant::now();
        let mut rounds: Vec<RoundResult> = Vec::with_capacity(self.num_times);
        let mut sequence_offset: u64 = 0;
        let mut cancelled = false;

        for round_index in 0..self.num_times {
            if shutdown_requested(shutdown_rx) {
                info!("Shutdown requested; stopping before round {}", round_index);
                cancelled = true;
                break;
            }

            let round_wall_start = Instant::now();
            let round = self
                .dispatcher
                .dispatch_round(round_index, sequence_offset)
                .await;
            let elapsed = Instant::now().saturating_duration_since(round_wall_start);
            debug!(
                "Round {} resolved {} requests in {:?} ({} failed)",
                round_index,
                round.outcomes.len(),
                elapsed,
                round.failures()
            );

            sequence_offset = sequence_offset
                .saturating_add(u64::try_from(round.outcomes.len()).unwrap_or(u64::MAX));
            rounds.push(round);

            let is_last = round_index.saturating_add(1) >= self.num_times;
            if is_last {
                break;
            }

            if elapsed >= self.wait_time {
                if !self.wait_time.is_zero() {
                    warn!(
                        "Round {} took {:?}, longer than the {:?} interval; starting next round immediately",
                        round_index, elapsed, self.wait_time
                    );
                }
                continue;
            }

            let Some(deadline) = round_wall_start.checked_add(self.wait_time) else {
                continue;
            };
            if let WaitOutcome::Cancelled = wait_until(deadline, shutdown_rx).await {
                info!("Shutdown requested; stopping after round {}", round_index);
                cancelled = true;
                break;
            }
        }

        RunOutput {
            rounds,
            run_start,
            run_end: Instant::now(),
            cancelled,
        }
    }
}

fn shutdown_requested(shutdown_rx: &mut ShutdownReceiver) -> bool {
    match shutdown_rx.try_recv() {
        Ok(()) | Err(TryRecvError::Lagged(_)) => true,
        Err(TryRecvError::Empty | TryRecvError::Closed) => false,
    }
}

async fn wait_until(deadline: Instant, shutdown_rx: &mut ShutdownReceiver) -> WaitOutcome {
    let shutdown = async {
        // A closed channel has no one left to cancel the run.
        match shutdown_rx.recv().await {
            Ok(()) | Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => {}
            Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                std::future::pending::<()>().await;
            }
        }
    };
    tokio::select! {
        () = sleep_until(deadline) => WaitOutcome::Elapsed,
        () = shutdown => WaitOutcome::Cancelled,
    }
}
