//! Probe results and their ordering
//!
//! An [`EndpointRecord`] is the immutable outcome of one health check. Records
//! for one (chain, protocol) pair are gathered in a [`ResultCollector`] while
//! probes run, then ordered with [`compare_health`] once every probe finished.

mod collector;
mod ranking;

pub use collector::ResultCollector;
pub use ranking::{compare_health, sort_best_first};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::probes::SENTINEL;

/// Protocol family of a probed endpoint, also the publication key segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Rest,
    Jrpc,
    Web3,
}

impl Protocol {
    pub const ALL: [Protocol; 3] = [Protocol::Rest, Protocol::Jrpc, Protocol::Web3];

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Rest => "rest",
            Protocol::Jrpc => "jrpc",
            Protocol::Web3 => "web3",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rest" => Ok(Protocol::Rest),
            "jrpc" => Ok(Protocol::Jrpc),
            "web3" => Ok(Protocol::Web3),
            other => Err(format!("Unknown protocol: {}", other)),
        }
    }
}

/// One probe measurement.
///
/// `height == -1` marks a failed or unusable endpoint and always comes with
/// `latency == -1`. Height `0` is a real value used by latency-only probes.
/// Two records are equal when their URLs match; ordering lives in
/// [`compare_health`], not in `Ord`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointRecord {
    pub url: String,
    pub height: i64,
    pub latency: f64,
}

impl EndpointRecord {
    pub fn new(url: impl Into<String>, height: i64, latency: f64) -> Self {
        Self {
            url: url.into(),
            height,
            latency,
        }
    }

    /// Successful measurement at `height` taking `latency`
    pub fn measured(url: impl Into<String>, height: i64, latency: Duration) -> Self {
        Self::new(url, height, latency.as_secs_f64())
    }

    /// Failure sentinel
    pub fn failed(url: impl Into<String>) -> Self {
        Self::new(url, SENTINEL, SENTINEL as f64)
    }

    pub fn is_failed(&self) -> bool {
        self.height == SENTINEL
    }

    pub fn has_known_latency(&self) -> bool {
        self.latency != SENTINEL as f64
    }
}

impl PartialEq for EndpointRecord {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for EndpointRecord {}

/// Tagged result of a single probe run.
///
/// Probes never return errors. The chain processor appends `Healthy` records
/// and failure sentinels to the collector and drops `Excluded` endpoints.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    Healthy(EndpointRecord),
    Failed { url: String, reason: String },
    Excluded { url: String, reason: String },
}

impl ProbeOutcome {
    pub fn url(&self) -> &str {
        match self {
            ProbeOutcome::Healthy(record) => &record.url,
            ProbeOutcome::Failed { url, .. } | ProbeOutcome::Excluded { url, .. } => url,
        }
    }

    /// Record to append, `None` for excluded endpoints
    pub fn into_record(self) -> Option<EndpointRecord> {
        match self {
            ProbeOutcome::Healthy(record) => Some(record),
            ProbeOutcome::Failed { url, .. } => Some(EndpointRecord::failed(url)),
            ProbeOutcome::Excluded { .. } => None,
        }
    }
}
