//! Configuration and store builders for tests

use std::sync::Arc;

use ranker::config::{Config, StoreBackendKind};
use ranker::probes::{HttpTransport, Prober};
use ranker::store::{MemoryBackend, SharedStore};
use ranker::ChainProcessor;

pub const FALLBACK_URL: &str = "https://fallback-evm.example.com";

/// Defaults with an in-memory store, no web server and a recognisable
/// Web3 fallback URL
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.store.backend = StoreBackendKind::Memory;
    config.web.enabled = false;
    config.web3_fallback_url = FALLBACK_URL.to_string();
    config.resolve_environment_defaults();
    config
}

/// Shared store over a memory backend the test can inspect
pub fn memory_store() -> (Arc<SharedStore>, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::new());
    let store = Arc::new(SharedStore::new(backend.clone(), ""));
    (store, backend)
}

pub fn processor_with(
    config: Config,
    transport: Arc<dyn HttpTransport>,
    store: Arc<SharedStore>,
) -> ChainProcessor {
    let prober = Prober::new(transport, config.probe_timeouts());
    ChainProcessor::new(Arc::new(config), prober, store)
}
