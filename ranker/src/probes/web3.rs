//! EVM JSON-RPC probe

use serde_json::json;
use std::time::Duration;

use super::types::{parse_hex_quantity, BlockNumberResponse};
use super::{failed, Prober};
use crate::endpoint::{EndpointRecord, ProbeOutcome};
use crate::errors::ProbeError;

impl Prober {
    pub(super) async fn probe_web3(&self, url: &str) -> ProbeOutcome {
        match self.fetch_block_number(url).await {
            Ok((height, latency)) => {
                ProbeOutcome::Healthy(EndpointRecord::measured(url, height, latency))
            }
            Err(e) => failed(url, e),
        }
    }

    async fn fetch_block_number(&self, url: &str) -> Result<(i64, Duration), ProbeError> {
        let request_body = json!({
            "jsonrpc": "2.0",
            "method": "eth_blockNumber",
            "params": [],
            "id": 1
        });

        let reply = self
            .transport
            .post_json(url, &request_body, self.timeouts.status)
            .await?
            .ensure_success(url)?;

        let parsed: BlockNumberResponse = reply.json(url)?;

        let result = parsed.result.ok_or_else(|| ProbeError::MissingField {
            url: url.to_string(),
            field: "result",
        })?;

        let height = parse_hex_quantity(&result).ok_or_else(|| ProbeError::Parse {
            url: url.to_string(),
            reason: format!("invalid block number '{}'", result),
        })?;

        Ok((height, reply.latency))
    }
}
