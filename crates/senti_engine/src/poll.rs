use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use senti_core::{PollOutcome, ProgressSnapshot, ResultsEnvelope};
use senti_logging::{senti_debug, senti_trace, senti_warn};
use tokio_util::sync::CancellationToken;

use crate::AnalysisApi;

/// Fixed-interval polling budget. Each tick waits `interval`, then samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_ticks: u32,
}

impl PollSettings {
    /// 200 ms x 1500, roughly five minutes.
    pub fn progress() -> Self {
        Self {
            interval: Duration::from_millis(200),
            max_ticks: 1500,
        }
    }

    /// 100 ms x 15.
    pub fn results() -> Self {
        Self {
            interval: Duration::from_millis(100),
            max_ticks: 15,
        }
    }
}

/// Receives every successfully fetched progress sample.
pub trait ProgressSink: Send + Sync {
    fn publish(&self, snapshot: ProgressSnapshot);
}

/// Runs `fut` unless `cancel` fires first.
async fn unless_cancelled<F: Future>(cancel: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        output = fut => Some(output),
    }
}

pub struct ProgressPoller {
    api: Arc<dyn AnalysisApi>,
    settings: PollSettings,
}

impl ProgressPoller {
    pub fn new(api: Arc<dyn AnalysisApi>, settings: PollSettings) -> Self {
        Self { api, settings }
    }

    /// Sample progress until the backend reports `completed`, the budget runs
    /// out or `cancel` fires. Failed samples are skipped.
    pub async fn run(&self, cancel: &CancellationToken, sink: &dyn ProgressSink) -> PollOutcome {
        let mut answered = false;
        for tick in 1..=self.settings.max_ticks {
            if unless_cancelled(cancel, tokio::time::sleep(self.settings.interval))
                .await
                .is_none()
            {
                return PollOutcome::Cancelled;
            }
            let Some(result) = unless_cancelled(cancel, self.api.fetch_progress()).await else {
                return PollOutcome::Cancelled;
            };
            match result {
                Ok(snapshot) => {
                    answered = true;
                    senti_trace!(
                        "progress tick={} aggregate={} completed={}",
                        tick,
                        snapshot.aggregate_percent(),
                        snapshot.completed
                    );
                    sink.publish(snapshot);
                    if snapshot.completed {
                        senti_debug!("progress reported completion after {} ticks", tick);
                        return PollOutcome::Ready;
                    }
                }
                Err(err) => senti_warn!("Progress polling error on tick {}: {}", tick, err),
            }
        }
        senti_warn!(
            "Progress polling gave up after {} ticks",
            self.settings.max_ticks
        );
        if answered {
            PollOutcome::Timeout
        } else {
            PollOutcome::Error
        }
    }
}

/// What the results poller saw last.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsPoll {
    pub outcome: PollOutcome,
    /// Number of ticks that ran, including the final one.
    pub ticks: u32,
    /// The ready body, present only for [`PollOutcome::Ready`].
    pub envelope: Option<ResultsEnvelope>,
}

pub struct ResultsPoller {
    api: Arc<dyn AnalysisApi>,
    settings: PollSettings,
}

impl ResultsPoller {
    pub fn new(api: Arc<dyn AnalysisApi>, settings: PollSettings) -> Self {
        Self { api, settings }
    }

    /// Sample results until `status` is no longer `"processing"`, the budget
    /// runs out or `cancel` fires.
    pub async fn run(&self, cancel: &CancellationToken) -> ResultsPoll {
        let mut answered = false;
        let mut ticks = 0;
        while ticks < self.settings.max_ticks {
            if unless_cancelled(cancel, tokio::time::sleep(self.settings.interval))
                .await
                .is_none()
            {
                return cancelled(ticks);
            }
            ticks += 1;
            let Some(result) = unless_cancelled(cancel, self.api.fetch_results()).await else {
                return cancelled(ticks);
            };
            match result {
                Ok(envelope) if !envelope.is_processing() => {
                    senti_debug!("results ready after {} ticks", ticks);
                    return ResultsPoll {
                        outcome: PollOutcome::Ready,
                        ticks,
                        envelope: Some(envelope),
                    };
                }
                Ok(_) => {
                    answered = true;
                    senti_trace!("results still processing, attempt {}", ticks);
                }
                Err(err) => senti_warn!("Results polling error on tick {}: {}", ticks, err),
            }
        }
        senti_warn!("Results polling timed out after {} ticks", ticks);
        ResultsPoll {
            outcome: if answered {
                PollOutcome::Timeout
            } else {
                PollOutcome::Error
            },
            ticks,
            envelope: None,
        }
    }
}

fn cancelled(ticks: u32) -> ResultsPoll {
    ResultsPoll {
        outcome: PollOutcome::Cancelled,
        ticks,
        envelope: None,
    }
}
