//! Reusable test utilities:
//! - Mock endpoint servers (REST, Tendermint RPC, EVM RPC, GitHub registry)
//! - A scripted in-process transport for deterministic latency and failures
//! - Test configuration and store builders, including a store that fails
//!   selected writes

// Each integration test binary uses a different subset of the fixtures
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod failing_backend;
pub mod mock_node;
pub mod mock_registry;
pub mod scripted_transport;
pub mod test_config;

pub use failing_backend::{failing_store, FailingBackend};
pub use mock_node::MockNodeServer;
pub use mock_registry::MockRegistryServer;
pub use scripted_transport::ScriptedTransport;
pub use test_config::*;
