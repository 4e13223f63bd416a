//! Fixed-cadence round loop.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use super::dispatcher::RoundDispatcher;
use super::report::SummaryReporter;
use crate::prometheus;

/// Where the scheduler loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerPhase {
    Idle,
    Dispatching,
    Summarizing,
    Waiting,
    /// Left the loop after a shutdown request or the round limit
    Stopped,
}

impl fmt::Display for SchedulerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerPhase::Idle => write!(f, "idle"),
            SchedulerPhase::Dispatching => write!(f, "dispatching"),
            SchedulerPhase::Summarizing => write!(f, "summarizing"),
            SchedulerPhase::Waiting => write!(f, "waiting"),
            SchedulerPhase::Stopped => write!(f, "stopped"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub round_size: usize,
    /// Pause measured from round completion; cycle time is round time plus this
    pub inter_round_delay: Duration,
    /// Stop after this many rounds; `None` runs until shutdown
    pub max_rounds: Option<u64>,
}

pub struct RoundScheduler {
    dispatcher: Arc<RoundDispatcher>,
    reporter: Arc<dyn SummaryReporter>,
    config: SchedulerConfig,
    phase_tx: watch::Sender<SchedulerPhase>,
}

impl RoundScheduler {
    pub fn new(
        dispatcher: Arc<RoundDispatcher>,
        reporter: Arc<dyn SummaryReporter>,
        config: SchedulerConfig,
    ) -> Self {
        let (phase_tx, _) = watch::channel(SchedulerPhase::Idle);
        Self { dispatcher, reporter, config, phase_tx }
    }

    pub fn phase(&self) -> SchedulerPhase {
        *self.phase_tx.borrow()
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<SchedulerPhase> {
        self.phase_tx.subscribe()
    }

    fn set_phase(&self, phase: SchedulerPhase) {
        self.phase_tx.send_replace(phase);
    }

    /// Run rounds until `shutdown` flips to `true` (or `max_rounds` is hit).
    ///
    /// A round that has started always runs to completion and its summary is
    /// reported; shutdown only interrupts the pause between rounds. Returns
    /// the number of rounds completed.
    pub async fn run_forever(&self, mut shutdown: watch::Receiver<bool>) -> u64 {
        let mut completed = 0u64;

        tracing::info!(
            "Round scheduler started: {} probes/round, {}s between rounds",
            self.config.round_size,
            self.config.inter_round_delay.as_secs()
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            self.set_phase(SchedulerPhase::Dispatching);
            let summary = self.dispatcher.run_round(self.config.round_size).await;

            self.set_phase(SchedulerPhase::Summarizing);
            self.reporter.report(&summary);
            prometheus::record_round(&summary);
            completed += 1;

            if self.config.max_rounds.is_some_and(|max| completed >= max) || *shutdown.borrow() {
                break;
            }

            self.set_phase(SchedulerPhase::Waiting);
            if self.pause(&mut shutdown).await {
                break;
            }
        }

        self.set_phase(SchedulerPhase::Stopped);
        tracing::info!("Round scheduler stopped after {} rounds", completed);
        completed
    }

    /// Sleep out the inter-round delay. Returns `true` if shutdown was requested.
    async fn pause(&self, shutdown: &mut watch::Receiver<bool>) -> bool {
        let sleep = tokio::time::sleep(self.config.inter_round_delay);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                () = &mut sleep => return false,
                changed = shutdown.changed() => match changed {
                    Ok(()) if *shutdown.borrow() => return true,
                    Ok(()) => continue,
                    // Nobody can signal anymore; finish the pause normally
                    Err(_) => {
                        (&mut sleep).await;
                        return false;
                    },
                },
            }
        }
    }
}
