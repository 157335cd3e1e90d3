//! In-process transport with scripted replies
//!
//! Replies are keyed by the exact request URL and carry a fixed latency, so
//! ranking outcomes are deterministic. Unknown URLs fail like a refused
//! connection.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use ranker::constants::{paths, probes};
use ranker::errors::ProbeError;
use ranker::probes::{HttpReply, HttpTransport};

#[derive(Debug, Clone)]
enum Script {
    Reply(HttpReply),
    Panic,
}

#[derive(Default)]
pub struct ScriptedTransport {
    scripts: RwLock<HashMap<String, Script>>,
    requests: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn reply(&self, url: &str, status: u16, body: Value, latency_ms: u64) {
        self.scripts.write().unwrap().insert(
            url.to_string(),
            Script::Reply(HttpReply {
                status,
                body: body.to_string(),
                latency: Duration::from_millis(latency_ms),
            }),
        );
    }

    /// Any request to `url` panics inside the transport
    pub fn panic_on(&self, url: &str) {
        self.scripts
            .write()
            .unwrap()
            .insert(url.to_string(), Script::Panic);
    }

    pub fn rest_node(&self, base: &str, height: u64, latency_ms: u64) {
        self.reply(
            &format!("{}{}", base, paths::REST_LATEST_BLOCK),
            200,
            json!({ "block": { "header": { "height": height.to_string() } } }),
            latency_ms,
        );
    }

    pub fn rest_params_node(&self, base: &str, latency_ms: u64) {
        self.reply(
            &format!("{}{}", base, paths::REST_AUTH_PARAMS),
            200,
            json!({ "params": {} }),
            latency_ms,
        );
    }

    pub fn jrpc_node(&self, base: &str, height: u64, latency_ms: u64) {
        self.reply(
            &tx_lookup_url(base),
            500,
            json!({ "error": { "code": -32603, "data": "tx not found" } }),
            latency_ms,
        );
        self.jrpc_status(base, height, "on", latency_ms);
    }

    pub fn jrpc_indexing_disabled_node(&self, base: &str, height: u64) {
        self.reply(
            &tx_lookup_url(base),
            500,
            json!({ "error": { "code": -32603, "data": probes::INDEXING_DISABLED_MARKER } }),
            5,
        );
        self.jrpc_status(base, height, "off", 5);
    }

    fn jrpc_status(&self, base: &str, height: u64, tx_index: &str, latency_ms: u64) {
        self.reply(
            &format!("{}{}", base, paths::JRPC_STATUS),
            200,
            json!({
                "result": {
                    "node_info": { "other": { "tx_index": tx_index } },
                    "sync_info": { "latest_block_height": height.to_string() }
                }
            }),
            latency_ms,
        );
    }

    pub fn web3_node(&self, base: &str, block_number: u64, latency_ms: u64) {
        self.reply(
            base,
            200,
            json!({ "jsonrpc": "2.0", "id": 1, "result": format!("{:#x}", block_number) }),
            latency_ms,
        );
    }

    fn answer(&self, url: &str) -> Result<HttpReply, ProbeError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let script = self.scripts.read().unwrap().get(url).cloned();
        match script {
            Some(Script::Reply(reply)) => Ok(reply),
            Some(Script::Panic) => panic!("scripted transport panic for {}", url),
            None => Err(ProbeError::Transport {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            }),
        }
    }
}

pub fn tx_lookup_url(base: &str) -> String {
    format!("{}{}?hash={}", base, paths::JRPC_TX, probes::UNKNOWN_TX_HASH)
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(&self, url: &str, _deadline: Duration) -> Result<HttpReply, ProbeError> {
        self.answer(url)
    }

    async fn post_json(
        &self,
        url: &str,
        _body: &Value,
        _deadline: Duration,
    ) -> Result<HttpReply, ProbeError> {
        self.answer(url)
    }
}
