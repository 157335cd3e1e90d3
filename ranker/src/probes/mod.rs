//! Protocol-specific endpoint health checks
//!
//! Four strategies share one contract: given an endpoint URL, perform a
//! bounded-time check and return exactly one [`ProbeOutcome`]. Errors are
//! captured here and never reach the caller.
//!
//! - REST, height-reporting: tendermint latest block, records real height
//! - REST, latency-only: auth params, records height `0`
//! - JSON-RPC: tx-indexing precondition, then node status
//! - Web3: `eth_blockNumber`

mod jrpc;
mod rest;
mod transport;
pub mod types;
mod web3;

pub use transport::{HttpReply, HttpTransport, ReqwestTransport};

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::constants::defaults;
use crate::endpoint::{ProbeOutcome, Protocol};
use crate::errors::ProbeError;

/// Which health check to run against an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    RestLatestBlock,
    RestLatencyOnly,
    Jrpc,
    Web3,
}

impl ProbeKind {
    pub fn protocol(&self) -> Protocol {
        match self {
            ProbeKind::RestLatestBlock | ProbeKind::RestLatencyOnly => Protocol::Rest,
            ProbeKind::Jrpc => Protocol::Jrpc,
            ProbeKind::Web3 => Protocol::Web3,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProbeTimeouts {
    /// Routine status checks
    pub status: Duration,
    /// JSON-RPC transaction-indexing precondition
    pub tx_index_check: Duration,
}

impl Default for ProbeTimeouts {
    fn default() -> Self {
        Self {
            status: Duration::from_secs(defaults::PROBE_TIMEOUT_SECONDS),
            tx_index_check: Duration::from_secs(defaults::TX_INDEX_CHECK_TIMEOUT_SECONDS),
        }
    }
}

#[derive(Clone)]
pub struct Prober {
    transport: Arc<dyn HttpTransport>,
    timeouts: ProbeTimeouts,
}

impl Prober {
    pub fn new(transport: Arc<dyn HttpTransport>, timeouts: ProbeTimeouts) -> Self {
        Self {
            transport,
            timeouts,
        }
    }

    pub async fn probe(&self, kind: ProbeKind, url: &str) -> ProbeOutcome {
        let outcome = match kind {
            ProbeKind::RestLatestBlock => self.probe_rest_latest_block(url).await,
            ProbeKind::RestLatencyOnly => self.probe_rest_latency_only(url).await,
            ProbeKind::Jrpc => self.probe_jrpc(url).await,
            ProbeKind::Web3 => self.probe_web3(url).await,
        };

        match &outcome {
            ProbeOutcome::Healthy(record) => debug!(
                "{} {} healthy at height {} ({:.3}s)",
                kind.protocol(),
                url,
                record.height,
                record.latency
            ),
            ProbeOutcome::Failed { reason, .. } => {
                debug!("{} {} failed: {}", kind.protocol(), url, reason)
            }
            ProbeOutcome::Excluded { reason, .. } => {
                debug!("{} {} excluded: {}", kind.protocol(), url, reason)
            }
        }

        outcome
    }
}

/// Join an endpoint base URL and a request path
pub(crate) fn endpoint_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

fn failed(url: &str, err: ProbeError) -> ProbeOutcome {
    ProbeOutcome::Failed {
        url: url.to_string(),
        reason: err.to_string(),
    }
}
