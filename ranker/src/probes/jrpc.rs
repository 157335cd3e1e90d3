//! Tendermint JSON-RPC probe
//!
//! Downstream transaction-status queries need `/tx` lookups, so a node is
//! only usable when transaction indexing is on. The probe first asks for a
//! transaction that never exists and inspects the error payload, then reads
//! `/status` for height and the `tx_index` flag.

use std::time::Duration;

use super::types::{parse_height, StatusResponse, TxLookupResponse};
use super::{endpoint_url, failed, Prober};
use crate::constants::{paths, probes};
use crate::endpoint::{EndpointRecord, ProbeOutcome};
use crate::errors::ProbeError;

enum JrpcCheck {
    Usable { height: i64, latency: Duration },
    Unusable(String),
}

impl Prober {
    pub(super) async fn probe_jrpc(&self, url: &str) -> ProbeOutcome {
        match self.check_jrpc(url).await {
            Ok(JrpcCheck::Usable { height, latency }) => {
                ProbeOutcome::Healthy(EndpointRecord::measured(url, height, latency))
            }
            Ok(JrpcCheck::Unusable(reason)) => ProbeOutcome::Excluded {
                url: url.to_string(),
                reason,
            },
            Err(e) => failed(url, e),
        }
    }

    async fn check_jrpc(&self, url: &str) -> Result<JrpcCheck, ProbeError> {
        if self.tx_indexing_disabled(url).await? {
            return Ok(JrpcCheck::Unusable(
                probes::INDEXING_DISABLED_MARKER.to_string(),
            ));
        }

        let target = endpoint_url(url, paths::JRPC_STATUS);

        let reply = self
            .transport
            .get(&target, self.timeouts.status)
            .await?
            .ensure_success(&target)?;

        let status: StatusResponse = reply.json(&target)?;

        let raw_height = status
            .latest_block_height()
            .ok_or_else(|| ProbeError::MissingField {
                url: target.clone(),
                field: "result.sync_info.latest_block_height",
            })?;

        let height = parse_height(raw_height).ok_or_else(|| ProbeError::Parse {
            url: target.clone(),
            reason: format!("invalid block height {}", raw_height),
        })?;

        Ok(match status.tx_index() {
            Some("on") => JrpcCheck::Usable {
                height,
                latency: reply.latency,
            },
            Some(other) => JrpcCheck::Unusable(format!("tx_index is '{}'", other)),
            None => JrpcCheck::Unusable("tx_index not reported".to_string()),
        })
    }

    /// Tendermint answers unknown-hash lookups with an error payload, often
    /// with a non-2xx status, so the status code is not checked here.
    async fn tx_indexing_disabled(&self, url: &str) -> Result<bool, ProbeError> {
        let target = format!(
            "{}?hash={}",
            endpoint_url(url, paths::JRPC_TX),
            probes::UNKNOWN_TX_HASH
        );

        let reply = self
            .transport
            .get(&target, self.timeouts.tx_index_check)
            .await?;

        let lookup: TxLookupResponse = reply.json(&target)?;

        Ok(lookup
            .error_data()
            .is_some_and(|data| data.contains(probes::INDEXING_DISABLED_MARKER)))
    }
}
