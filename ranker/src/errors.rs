//! Custom error types for the endpoint ranker
//!
//! Probe errors never leave the probe module; they are logged and folded into
//! a failure sentinel. Registry errors bubble up to the cycle scheduler, which
//! applies the configuration failure-recovery policy.

use std::fmt;

/// Why a single health-check request did not produce a measurement
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeError {
    /// Connection could not be established or the request failed mid-flight
    Transport { url: String, reason: String },

    /// Request exceeded its deadline
    Timeout { url: String, timeout_ms: u128 },

    /// Endpoint answered with a non-success HTTP status
    Status { url: String, status: u16 },

    /// Response body could not be decoded
    Parse { url: String, reason: String },

    /// Response decoded but the expected field is absent
    MissingField { url: String, field: &'static str },
}

/// Failures of the chain configuration provider
#[derive(Debug)]
pub enum RegistryError {
    /// Request to the registry origin failed
    Request { url: String, reason: String },

    /// Registry answered with a non-success HTTP status
    Status { url: String, status: u16 },

    /// Registry content could not be decoded
    Decode { path: String, reason: String },

    /// Registry returned no chain configuration at all
    Empty,
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Transport { url, reason } => {
                write!(f, "Request to {} failed: {}", url, reason)
            }
            ProbeError::Timeout { url, timeout_ms } => {
                write!(f, "Request to {} timed out after {}ms", url, timeout_ms)
            }
            ProbeError::Status { url, status } => {
                write!(f, "{} answered with HTTP {}", url, status)
            }
            ProbeError::Parse { url, reason } => {
                write!(f, "Invalid response from {}: {}", url, reason)
            }
            ProbeError::MissingField { url, field } => {
                write!(f, "Response from {} has no '{}'", url, field)
            }
        }
    }
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Request { url, reason } => {
                write!(f, "Registry request to {} failed: {}", url, reason)
            }
            RegistryError::Status { url, status } => {
                write!(f, "Registry {} answered with HTTP {}", url, status)
            }
            RegistryError::Decode { path, reason } => {
                write!(f, "Failed to decode registry entry '{}': {}", path, reason)
            }
            RegistryError::Empty => write!(f, "Registry returned no chain configuration"),
        }
    }
}

impl std::error::Error for ProbeError {}
impl std::error::Error for RegistryError {}
