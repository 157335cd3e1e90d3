//! Append-only, concurrency-safe list of probe results for one
//! (chain, protocol) pair within one cycle

use tokio::sync::Mutex;
use tracing::debug;

use super::{sort_best_first, EndpointRecord, ProbeOutcome, Protocol};

pub struct ResultCollector {
    protocol: Protocol,
    records: Mutex<Vec<EndpointRecord>>,
}

impl ResultCollector {
    pub fn new(protocol: Protocol) -> Self {
        Self {
            protocol,
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn with_capacity(protocol: Protocol, capacity: usize) -> Self {
        Self {
            protocol,
            records: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Append the record carried by `outcome`. Returns `false` when the
    /// endpoint was excluded and nothing was appended.
    pub async fn record(&self, outcome: ProbeOutcome) -> bool {
        let url = outcome.url().to_string();
        match outcome.into_record() {
            Some(record) => {
                self.records.lock().await.push(record);
                true
            }
            None => {
                debug!("{} endpoint {} excluded from ranking", self.protocol, url);
                false
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    /// Take every record out of the collector, best first.
    ///
    /// Callers must only do this after every contributing probe finished.
    pub async fn drain_ranked(&self) -> Vec<EndpointRecord> {
        let mut records = std::mem::take(&mut *self.records.lock().await);
        sort_best_first(&mut records);
        records
    }
}
