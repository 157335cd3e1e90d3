//! Cosmos REST probes

use std::time::Duration;

use super::types::{parse_height, LatestBlockResponse};
use super::{endpoint_url, failed, Prober};
use crate::constants::{paths, probes::LATENCY_ONLY_HEIGHT};
use crate::endpoint::{EndpointRecord, ProbeOutcome};
use crate::errors::ProbeError;

impl Prober {
    pub(super) async fn probe_rest_latest_block(&self, url: &str) -> ProbeOutcome {
        match self.fetch_latest_block_height(url).await {
            Ok((height, latency)) => {
                ProbeOutcome::Healthy(EndpointRecord::measured(url, height, latency))
            }
            Err(e) => failed(url, e),
        }
    }

    /// Reachability only; every endpoint reports height 0 so ranking falls
    /// through to latency.
    pub(super) async fn probe_rest_latency_only(&self, url: &str) -> ProbeOutcome {
        let target = endpoint_url(url, paths::REST_AUTH_PARAMS);

        let result = match self.transport.get(&target, self.timeouts.status).await {
            Ok(reply) => reply.ensure_success(&target),
            Err(e) => Err(e),
        };

        match result {
            Ok(reply) => ProbeOutcome::Healthy(EndpointRecord::measured(
                url,
                LATENCY_ONLY_HEIGHT,
                reply.latency,
            )),
            Err(e) => failed(url, e),
        }
    }

    async fn fetch_latest_block_height(&self, url: &str) -> Result<(i64, Duration), ProbeError> {
        let target = endpoint_url(url, paths::REST_LATEST_BLOCK);

        let reply = self
            .transport
            .get(&target, self.timeouts.status)
            .await?
            .ensure_success(&target)?;

        let parsed: LatestBlockResponse = reply.json(&target)?;

        let raw_height = parsed.height().ok_or_else(|| ProbeError::MissingField {
            url: target.clone(),
            field: "block.header.height",
        })?;

        let height = parse_height(raw_height).ok_or_else(|| ProbeError::Parse {
            url: target.clone(),
            reason: format!("invalid block height {}", raw_height),
        })?;

        Ok((height, reply.latency))
    }
}
