//! Cycle scheduler
//!
//! Runs ranking cycles back to back until the cancellation token fires:
//! fetch the chain configuration, process every chain concurrently, sleep
//! `cycle_interval_seconds`. A failed configuration fetch evicts the cached
//! configuration and is retried straight away, with a back-off sleep once
//! the consecutive failure count exceeds `config_failure_threshold`.
//!
//! Cancellation only stops the next cycle from starting; a cycle in flight
//! always runs to completion.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::Config;
use crate::processor::{ChainProcessor, ChainReport};
use crate::registry::ChainConfigSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    Running,
    Stopping,
}

#[derive(Debug, Clone, Serialize)]
pub struct CycleSummary {
    pub cycle_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub chains: Vec<ChainReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStatus {
    pub state: SchedulerState,
    pub cycles_completed: u64,
    pub consecutive_config_failures: u32,
    pub last_config_error: Option<String>,
    pub last_cycle: Option<CycleSummary>,
}

#[derive(Debug, Default)]
struct Progress {
    cycles_completed: u64,
    consecutive_config_failures: u32,
    last_config_error: Option<String>,
    last_cycle: Option<CycleSummary>,
}

/// Result of a single pass through the loop body
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    Completed(CycleSummary),
    ConfigUnavailable {
        consecutive_failures: u32,
        /// Delay before the next attempt, `None` means retry immediately
        backoff: Option<Duration>,
    },
}

pub struct CycleScheduler {
    config: Arc<Config>,
    source: Arc<dyn ChainConfigSource>,
    processor: Arc<ChainProcessor>,
    progress: RwLock<Progress>,
    cancel: CancellationToken,
}

impl CycleScheduler {
    pub fn new(
        config: Arc<Config>,
        source: Arc<dyn ChainConfigSource>,
        processor: Arc<ChainProcessor>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            source,
            processor,
            progress: RwLock::new(Progress::default()),
            cancel,
        }
    }

    pub fn state(&self) -> SchedulerState {
        if self.cancel.is_cancelled() {
            SchedulerState::Stopping
        } else {
            SchedulerState::Running
        }
    }

    pub async fn status(&self) -> SchedulerStatus {
        let progress = self.progress.read().await;
        SchedulerStatus {
            state: self.state(),
            cycles_completed: progress.cycles_completed,
            consecutive_config_failures: progress.consecutive_config_failures,
            last_config_error: progress.last_config_error.clone(),
            last_cycle: progress.last_cycle.clone(),
        }
    }

    pub async fn run(&self) {
        info!(
            "Scheduler started: {}s cycle interval, back-off of {}s after {} consecutive config failures",
            self.config.cycle_interval_seconds,
            self.config.config_failure_backoff_seconds,
            self.config.config_failure_threshold
        );

        while !self.cancel.is_cancelled() {
            let pause = match self.run_cycle().await {
                CycleOutcome::Completed(_) => Some(self.config.cycle_interval()),
                CycleOutcome::ConfigUnavailable { backoff, .. } => backoff,
            };

            if let Some(duration) = pause {
                if !self.sleep_unless_cancelled(duration).await {
                    break;
                }
            }
        }

        let cycles = self.progress.read().await.cycles_completed;
        info!("Scheduler stopped after {} cycles", cycles);
    }

    /// One pass of the loop body, without the trailing sleep
    pub async fn run_cycle(&self) -> CycleOutcome {
        let cycle_id = Uuid::new_v4();
        let span = info_span!("cycle", id = %cycle_id);

        async {
            let chains = match self.source.get_chain_config().await {
                Ok(chains) => chains,
                Err(e) => return self.record_config_failure(e).await,
            };

            {
                let mut progress = self.progress.write().await;
                progress.consecutive_config_failures = 0;
                progress.last_config_error = None;
            }

            let started_at = Utc::now();
            let started = Instant::now();

            let handles: Vec<_> = chains
                .into_iter()
                .map(|chain| {
                    let processor = self.processor.clone();
                    let identifier = chain.identifier.clone();
                    let handle = tokio::spawn(
                        async move { processor.process(&chain).await }.in_current_span(),
                    );
                    (identifier, handle)
                })
                .collect();

            let (identifiers, handles): (Vec<String>, Vec<_>) = handles.into_iter().unzip();
            let mut reports = Vec::with_capacity(identifiers.len());
            for (identifier, result) in identifiers.into_iter().zip(join_all(handles).await) {
                match result {
                    Ok(report) => reports.push(report),
                    Err(e) => error!("Processing of {} network aborted: {}", identifier, e),
                }
            }

            let elapsed = started.elapsed();
            info!(
                "Cycle completed in {:.2}s ({} networks)",
                elapsed.as_secs_f64(),
                reports.len()
            );

            let summary = CycleSummary {
                cycle_id,
                started_at,
                finished_at: Utc::now(),
                duration_ms: elapsed.as_millis() as u64,
                chains: reports,
            };

            let mut progress = self.progress.write().await;
            progress.cycles_completed += 1;
            progress.last_cycle = Some(summary.clone());

            CycleOutcome::Completed(summary)
        }
        .instrument(span)
        .await
    }

    async fn record_config_failure(&self, err: anyhow::Error) -> CycleOutcome {
        let consecutive_failures = {
            let mut progress = self.progress.write().await;
            progress.consecutive_config_failures += 1;
            progress.last_config_error = Some(format!("{:#}", err));
            progress.consecutive_config_failures
        };

        warn!(
            "Failed to fetch chain configuration (attempt {}): {:#}",
            consecutive_failures, err
        );

        if let Err(e) = self.source.invalidate().await {
            error!("Failed to clear cached chain configuration: {:#}", e);
        }

        let backoff = if consecutive_failures > self.config.config_failure_threshold {
            let backoff = self.config.config_failure_backoff();
            warn!(
                "{} consecutive configuration failures, backing off for {}s",
                consecutive_failures,
                backoff.as_secs()
            );
            Some(backoff)
        } else {
            None
        };

        CycleOutcome::ConfigUnavailable {
            consecutive_failures,
            backoff,
        }
    }

    /// Returns `false` when the sleep was cut short by cancellation
    async fn sleep_unless_cancelled(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }
}
