//! Per-chain probing, ranking and publication
//!
//! For one chain every configured endpoint of every protocol is probed in its
//! own task. The processor waits for the REST group, then JSON-RPC, then Web3,
//! ranks each group's collector and publishes the best three URLs. A group
//! with fewer than three valid records leaves the previous publication alone.

use futures::future::join_all;
use futures::FutureExt;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::constants::ranking::PUBLISHED_SLOTS;
use crate::endpoint::{EndpointRecord, ProbeOutcome, Protocol, ResultCollector};
use crate::probes::{ProbeKind, Prober};
use crate::registry::ChainEndpoints;
use crate::store::SharedStore;

#[derive(Debug, Clone, Serialize)]
pub struct ProtocolReport {
    pub protocol: Protocol,
    /// Endpoints probed
    pub probed: usize,
    /// Records in the collector, failure sentinels included
    pub recorded: usize,
    pub valid: usize,
    /// URLs written to ranks 1-3, empty when publication was skipped
    pub published: Vec<String>,
}

impl ProtocolReport {
    pub fn was_published(&self) -> bool {
        !self.published.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChainReport {
    pub chain: String,
    pub duration_ms: u64,
    pub protocols: Vec<ProtocolReport>,
}

impl ChainReport {
    pub fn protocol(&self, protocol: Protocol) -> Option<&ProtocolReport> {
        self.protocols.iter().find(|report| report.protocol == protocol)
    }
}

/// Probes for one protocol of one chain, in flight
struct ProbeGroup {
    collector: Arc<ResultCollector>,
    tasks: Vec<(String, JoinHandle<()>)>,
}

impl ProbeGroup {
    fn protocol(&self) -> Protocol {
        self.collector.protocol()
    }

    /// Wait for every probe in the group. A task that died without
    /// recording still leaves a failure sentinel behind.
    async fn join(self) -> Arc<ResultCollector> {
        let (urls, handles): (Vec<String>, Vec<JoinHandle<()>>) = self.tasks.into_iter().unzip();

        for (url, result) in urls.into_iter().zip(join_all(handles).await) {
            if let Err(e) = result {
                error!("{} probe task for {} failed: {}", self.collector.protocol(), url, e);
                self.collector
                    .record(ProbeOutcome::Failed {
                        url,
                        reason: e.to_string(),
                    })
                    .await;
            }
        }

        self.collector
    }
}

pub struct ChainProcessor {
    config: Arc<Config>,
    prober: Prober,
    store: Arc<SharedStore>,
}

impl ChainProcessor {
    pub fn new(config: Arc<Config>, prober: Prober, store: Arc<SharedStore>) -> Self {
        Self {
            config,
            prober,
            store,
        }
    }

    pub async fn process(&self, chain: &ChainEndpoints) -> ChainReport {
        let started = Instant::now();
        let rest_kind = self.config.rest_probe_kind(&chain.identifier);

        info!(
            "Processing {} network ({} rest, {} jrpc, {} web3, {:?})",
            chain.identifier,
            chain.rest.len(),
            chain.jrpc.len(),
            chain.web3.len(),
            rest_kind
        );

        let groups = [
            self.spawn_probes(rest_kind, &chain.rest),
            self.spawn_probes(ProbeKind::Jrpc, &chain.jrpc),
            self.spawn_probes(ProbeKind::Web3, &chain.web3),
        ];

        let mut collectors = Vec::with_capacity(groups.len());
        for group in groups {
            let probed = group.tasks.len();
            debug!("Waiting for {} {} probes of {}", probed, group.protocol(), chain.identifier);
            collectors.push((probed, group.join().await));
        }

        let mut protocols = Vec::with_capacity(collectors.len());
        for (probed, collector) in collectors {
            let protocol = collector.protocol();
            let ranked = collector.drain_ranked().await;
            let published = self.publish(&chain.identifier, protocol, &ranked).await;

            protocols.push(ProtocolReport {
                protocol,
                probed,
                recorded: ranked.len(),
                valid: ranked.iter().filter(|record| !record.is_failed()).count(),
                published,
            });
        }

        let report = ChainReport {
            chain: chain.identifier.clone(),
            duration_ms: started.elapsed().as_millis() as u64,
            protocols,
        };

        info!(
            "Finished processing {} network in {}ms",
            report.chain, report.duration_ms
        );

        report
    }

    fn spawn_probes(&self, kind: ProbeKind, urls: &[String]) -> ProbeGroup {
        let collector = Arc::new(ResultCollector::with_capacity(kind.protocol(), urls.len()));

        let tasks = urls
            .iter()
            .map(|url| {
                let prober = self.prober.clone();
                let collector = collector.clone();
                let target = url.clone();

                let handle = tokio::spawn(async move {
                    let outcome = AssertUnwindSafe(prober.probe(kind, &target))
                        .catch_unwind()
                        .await
                        .unwrap_or_else(|_| ProbeOutcome::Failed {
                            url: target.clone(),
                            reason: "probe panicked".to_string(),
                        });
                    collector.record(outcome).await;
                });

                (url.clone(), handle)
            })
            .collect();

        ProbeGroup { collector, tasks }
    }

    /// Write the best three distinct valid URLs to ranks 1-3. Returns the
    /// published URLs, or an empty list when publication was skipped.
    async fn publish(&self, chain: &str, protocol: Protocol, ranked: &[EndpointRecord]) -> Vec<String> {
        let mut selected: Vec<&EndpointRecord> = Vec::with_capacity(PUBLISHED_SLOTS);
        for record in ranked.iter().filter(|record| !record.is_failed()) {
            if !selected.contains(&record) {
                selected.push(record);
            }
        }

        if selected.len() < PUBLISHED_SLOTS {
            if !ranked.is_empty() {
                warn!(
                    "{} {}: only {} healthy endpoints, keeping previous ranking",
                    chain,
                    protocol,
                    selected.len()
                );
            }
            return Vec::new();
        }

        let urls: Vec<String> = selected
            .iter()
            .take(PUBLISHED_SLOTS)
            .map(|record| record.url.clone())
            .collect();

        let fallback = (protocol == Protocol::Web3).then_some(self.config.web3_fallback_url.as_str());

        if let Err(e) = self
            .store
            .publish_ranking(chain, protocol, &urls, fallback)
            .await
        {
            error!("Failed to publish {} {} ranking: {}", chain, protocol, e);
            return Vec::new();
        }

        info!("{} {} ranking: {}", chain, protocol, urls.join(", "));
        urls
    }
}
