// Cycle scheduler: configuration failures, back-off and shutdown
mod common;

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use common::fixtures::*;
use ranker::endpoint::Protocol;
use ranker::registry::{ChainConfigSource, ChainEndpoints};
use ranker::scheduler::{CycleOutcome, CycleScheduler, SchedulerState};

/// Fails the first `failures` fetches, then serves `chains`
struct FlakySource {
    failures: usize,
    chains: Vec<ChainEndpoints>,
    fetches: AtomicUsize,
    invalidations: AtomicUsize,
    /// Cancelled on the first successful fetch when set
    stop_on_success: Option<CancellationToken>,
}

impl FlakySource {
    fn new(failures: usize) -> Self {
        Self {
            failures,
            chains: Vec::new(),
            fetches: AtomicUsize::new(0),
            invalidations: AtomicUsize::new(0),
            stop_on_success: None,
        }
    }
}

#[async_trait]
impl ChainConfigSource for FlakySource {
    async fn get_chain_config(&self) -> anyhow::Result<Vec<ChainEndpoints>> {
        let attempt = self.fetches.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            anyhow::bail!("registry returned 502 (attempt {})", attempt + 1);
        }
        if let Some(token) = &self.stop_on_success {
            token.cancel();
        }
        Ok(self.chains.clone())
    }

    async fn invalidate(&self) -> anyhow::Result<()> {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn scheduler_for(source: Arc<FlakySource>, cancel: CancellationToken) -> CycleScheduler {
    let config = test_config();
    let (store, _) = memory_store();
    let processor = Arc::new(processor_with(
        config.clone(),
        Arc::new(ScriptedTransport::new()),
        store,
    ));
    CycleScheduler::new(Arc::new(config), source, processor, cancel)
}

#[tokio::test]
async fn test_backoff_starts_after_fifth_consecutive_failure() {
    let source = Arc::new(FlakySource::new(6));
    let scheduler = scheduler_for(source.clone(), CancellationToken::new());

    for attempt in 1..=6u32 {
        match scheduler.run_cycle().await {
            CycleOutcome::ConfigUnavailable {
                consecutive_failures,
                backoff,
            } => {
                assert_eq!(consecutive_failures, attempt);
                if attempt <= 5 {
                    assert_eq!(backoff, None, "no back-off on attempt {}", attempt);
                } else {
                    assert_eq!(backoff, Some(Duration::from_secs(5)));
                }
            }
            CycleOutcome::Completed(_) => panic!("attempt {} should fail", attempt),
        }
        assert_eq!(source.invalidations.load(Ordering::SeqCst), attempt as usize);
    }

    assert!(matches!(scheduler.run_cycle().await, CycleOutcome::Completed(_)));

    let status = scheduler.status().await;
    assert_eq!(status.consecutive_config_failures, 0);
    assert_eq!(status.last_config_error, None);
    assert_eq!(status.cycles_completed, 1);
    assert_eq!(source.invalidations.load(Ordering::SeqCst), 6);
}

#[tokio::test(start_paused = true)]
async fn test_run_loop_sleeps_only_for_the_backoff() {
    let cancel = CancellationToken::new();
    let mut flaky = FlakySource::new(6);
    flaky.stop_on_success = Some(cancel.clone());
    let source = Arc::new(flaky);
    let scheduler = scheduler_for(source.clone(), cancel.clone());

    let started = tokio::time::Instant::now();
    scheduler.run().await;
    let elapsed = started.elapsed();

    // One 5s back-off after the sixth failure; the post-cycle sleep is cut
    // short because the successful fetch requested shutdown.
    assert!(elapsed >= Duration::from_secs(5), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(10), "elapsed {:?}", elapsed);
    assert_eq!(source.fetches.load(Ordering::SeqCst), 7);
    assert_eq!(source.invalidations.load(Ordering::SeqCst), 6);

    let status = scheduler.status().await;
    assert_eq!(status.state, SchedulerState::Stopping);
    assert_eq!(status.cycles_completed, 1);
    assert_eq!(status.consecutive_config_failures, 0);
}

#[tokio::test(start_paused = true)]
async fn test_every_failure_past_threshold_backs_off() {
    let cancel = CancellationToken::new();
    let mut flaky = FlakySource::new(8);
    flaky.stop_on_success = Some(cancel.clone());
    let source = Arc::new(flaky);
    let scheduler = scheduler_for(source.clone(), cancel);

    let started = tokio::time::Instant::now();
    scheduler.run().await;
    let elapsed = started.elapsed();

    // Failures 6, 7 and 8 each back off
    assert!(elapsed >= Duration::from_secs(15), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(20), "elapsed {:?}", elapsed);
    assert_eq!(source.invalidations.load(Ordering::SeqCst), 8);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_interrupts_cycle_sleep() {
    let cancel = CancellationToken::new();
    let source = Arc::new(FlakySource::new(0));
    let scheduler = Arc::new(scheduler_for(source.clone(), cancel.clone()));

    let runner = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.run().await })
    };

    // Let a few 5s cycles pass, then stop during a sleep
    tokio::time::sleep(Duration::from_secs(12)).await;
    cancel.cancel();
    runner.await.unwrap();

    assert_eq!(source.fetches.load(Ordering::SeqCst), 3);
    assert_eq!(scheduler.status().await.cycles_completed, 3);
}

#[tokio::test]
async fn test_cycle_processes_every_chain() {
    let transport = Arc::new(ScriptedTransport::new());
    for (i, base) in ["https://a", "https://b", "https://c"].iter().enumerate() {
        transport.rest_node(base, 100 + i as u64, 10);
    }

    let chains: Vec<ChainEndpoints> = ["EVMOS", "OSMOSIS", "COSMOSHUB"]
        .iter()
        .map(|id| ChainEndpoints {
            identifier: id.to_string(),
            rest: vec!["https://a".into(), "https://b".into(), "https://c".into()],
            jrpc: Vec::new(),
            web3: Vec::new(),
        })
        .collect();

    let mut flaky = FlakySource::new(0);
    flaky.chains = chains;

    let config = test_config();
    let (store, _) = memory_store();
    let processor = Arc::new(processor_with(config.clone(), transport, store.clone()));
    let scheduler = CycleScheduler::new(
        Arc::new(config),
        Arc::new(flaky),
        processor,
        CancellationToken::new(),
    );

    let CycleOutcome::Completed(summary) = scheduler.run_cycle().await else {
        panic!("cycle should complete");
    };
    assert_eq!(summary.chains.len(), 3);

    for chain in ["EVMOS", "OSMOSIS", "COSMOSHUB"] {
        assert_eq!(
            store.ranked_endpoints(chain, Protocol::Rest).await.unwrap(),
            vec!["https://c", "https://b", "https://a"]
        );
    }
}
