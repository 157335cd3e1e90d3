//! Response structures for the probed APIs
//!
//! Every field is optional so a partially populated response still decodes
//! and the probe can tell "absent" apart from "malformed".

use serde::Deserialize;
use serde_json::Value;

/// Cosmos REST `GET /cosmos/base/tendermint/v1beta1/blocks/latest`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LatestBlockResponse {
    pub block: Option<Block>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Block {
    pub header: Option<BlockHeader>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockHeader {
    pub height: Option<Value>,
}

impl LatestBlockResponse {
    pub fn height(&self) -> Option<&Value> {
        self.block.as_ref()?.header.as_ref()?.height.as_ref()
    }
}

/// Tendermint RPC `GET /tx?hash=...` error envelope
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TxLookupResponse {
    pub error: Option<RpcErrorPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RpcErrorPayload {
    pub data: Option<Value>,
}

impl TxLookupResponse {
    pub fn error_data(&self) -> Option<&str> {
        self.error.as_ref()?.data.as_ref()?.as_str()
    }
}

/// Tendermint RPC `GET /status`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusResponse {
    pub result: Option<StatusResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusResult {
    pub node_info: Option<NodeInfo>,
    pub sync_info: Option<SyncInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeInfo {
    pub other: Option<NodeInfoOther>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeInfoOther {
    pub tx_index: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncInfo {
    pub latest_block_height: Option<Value>,
}

impl StatusResponse {
    pub fn latest_block_height(&self) -> Option<&Value> {
        self.result
            .as_ref()?
            .sync_info
            .as_ref()?
            .latest_block_height
            .as_ref()
    }

    pub fn tx_index(&self) -> Option<&str> {
        self.result
            .as_ref()?
            .node_info
            .as_ref()?
            .other
            .as_ref()?
            .tx_index
            .as_deref()
    }
}

/// EVM JSON-RPC `eth_blockNumber` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockNumberResponse {
    pub result: Option<String>,
}

/// Heights arrive as decimal strings from Cosmos APIs, but accept plain
/// numbers too.
pub fn parse_height(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
    .filter(|height| *height >= 0)
}

/// Parse an `0x`-prefixed quantity as returned by EVM JSON-RPC
pub fn parse_hex_quantity(value: &str) -> Option<i64> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))?;
    if digits.is_empty() {
        return None;
    }
    i64::from_str_radix(digits, 16).ok()
}
