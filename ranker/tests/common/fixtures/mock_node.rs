//! Mock node server for probe tests
//!
//! Serves the Cosmos REST, Tendermint RPC and EVM JSON-RPC routes the probes
//! hit, without requiring a real node.

use serde_json::json;
use std::time::Duration;
use wiremock::{
    matchers::{body_partial_json, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use ranker::constants::{paths, probes};

pub struct MockNodeServer {
    pub server: MockServer,
    pub base_url: String,
}

impl MockNodeServer {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();
        Self { server, base_url }
    }

    /// Cosmos REST node at `height`
    pub async fn mock_rest_latest_block(&self, height: u64) {
        Mock::given(method("GET"))
            .and(path(paths::REST_LATEST_BLOCK))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "block_id": { "hash": "C0FFEE" },
                "block": {
                    "header": {
                        "chain_id": "evmos_9001-2",
                        "height": height.to_string()
                    }
                }
            })))
            .mount(&self.server)
            .await;
    }

    /// Cosmos REST node whose latest block carries no height
    pub async fn mock_rest_block_without_height(&self) {
        Mock::given(method("GET"))
            .and(path(paths::REST_LATEST_BLOCK))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "block_id": { "hash": "C0FFEE" },
                "block": { "header": { "chain_id": "evmos_9001-2" } }
            })))
            .mount(&self.server)
            .await;
    }

    /// Cosmos REST node answering the auth params route only
    pub async fn mock_rest_params(&self) {
        Mock::given(method("GET"))
            .and(path(paths::REST_AUTH_PARAMS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "params": { "max_memo_characters": "256" }
            })))
            .mount(&self.server)
            .await;
    }

    /// Tendermint RPC node with the given `tx_index` setting
    pub async fn mock_jrpc(&self, height: u64, tx_index: &str) {
        self.mock_tx_not_found().await;

        Mock::given(method("GET"))
            .and(path(paths::JRPC_STATUS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": -1,
                "result": {
                    "node_info": {
                        "network": "evmos_9001-2",
                        "other": { "tx_index": tx_index, "rpc_address": "tcp://0.0.0.0:26657" }
                    },
                    "sync_info": {
                        "latest_block_height": height.to_string(),
                        "catching_up": false
                    }
                }
            })))
            .mount(&self.server)
            .await;
    }

    /// Tendermint RPC node that reports disabled transaction indexing
    pub async fn mock_jrpc_indexing_disabled(&self, height: u64) {
        self.mock_tx_lookup(json!({
            "jsonrpc": "2.0",
            "id": -1,
            "error": {
                "code": -32603,
                "message": "Internal error",
                "data": "transaction indexing is disabled"
            }
        }))
        .await;

        Mock::given(method("GET"))
            .and(path(paths::JRPC_STATUS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {
                    "node_info": { "other": { "tx_index": "off" } },
                    "sync_info": { "latest_block_height": height.to_string() }
                }
            })))
            .mount(&self.server)
            .await;
    }

    /// Tendermint RPC node whose `/status` has no `node_info.other.tx_index`
    pub async fn mock_jrpc_without_tx_index(&self, height: u64) {
        self.mock_tx_not_found().await;

        Mock::given(method("GET"))
            .and(path(paths::JRPC_STATUS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": -1,
                "result": {
                    "node_info": { "network": "evmos_9001-2", "other": {} },
                    "sync_info": { "latest_block_height": height.to_string() }
                }
            })))
            .mount(&self.server)
            .await;
    }

    /// Tendermint RPC node that answers the tx lookup but fails `/status`
    pub async fn mock_jrpc_status_unavailable(&self) {
        self.mock_tx_not_found().await;

        Mock::given(method("GET"))
            .and(path(paths::JRPC_STATUS))
            .respond_with(ResponseTemplate::new(503))
            .mount(&self.server)
            .await;
    }

    async fn mock_tx_not_found(&self) {
        self.mock_tx_lookup(json!({
            "jsonrpc": "2.0",
            "id": -1,
            "error": {
                "code": -32603,
                "message": "Internal error",
                "data": format!("tx ({}) not found", probes::UNKNOWN_TX_HASH)
            }
        }))
        .await;
    }

    async fn mock_tx_lookup(&self, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(paths::JRPC_TX))
            .and(query_param("hash", probes::UNKNOWN_TX_HASH))
            .respond_with(ResponseTemplate::new(500).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// EVM node answering `eth_blockNumber` with `block_number`
    pub async fn mock_web3(&self, block_number: u64) {
        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_partial_json(json!({ "method": "eth_blockNumber" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": format!("{:#x}", block_number)
            })))
            .mount(&self.server)
            .await;
    }

    /// EVM node returning a JSON-RPC error instead of a result
    pub async fn mock_web3_error(&self) {
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": { "code": -32000, "message": "header not found" }
            })))
            .mount(&self.server)
            .await;
    }

    /// Every request fails with 500
    pub async fn mock_unhealthy(&self) {
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(500))
            .mount(&self.server)
            .await;
    }

    /// Every request answers only after `delay`
    pub async fn mock_slow(&self, delay: Duration) {
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200).set_delay(delay))
            .mount(&self.server)
            .await;
    }
}
