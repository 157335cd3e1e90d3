// File: ranker/src/config/mod.rs
pub mod manager;
pub use manager::ConfigManager;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{defaults, store};
use crate::probes::{ProbeKind, ProbeTimeouts};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub environment: String,
    pub cycle_interval_seconds: u64,
    pub config_failure_threshold: u32,
    pub config_failure_backoff_seconds: u64,
    pub probe_timeout_seconds: u64,
    pub tx_index_check_timeout_seconds: u64,
    /// Chains whose REST API has no tendermint latest-block route and are
    /// ranked by latency alone. Matched case-insensitively.
    pub latency_only_rest_chains: Vec<String>,
    /// Written to rank 0 of `web3` whenever Web3 rankings are published
    pub web3_fallback_url: String,
    pub store: StoreConfig,
    pub registry: RegistryConfig,
    pub web: WebConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackendKind {
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackendKind,
    pub database_path: String,
    /// Resolved from `environment` when not set explicitly
    pub key_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub repository: String,
    /// Resolved from `environment` when not set explicitly
    pub branch: String,
    pub api_base_url: String,
    pub chain_config_path: String,
    pub cache_ttl_hours: u64,
    pub request_timeout_seconds: u64,
    // Populated from the GITHUB_KEY environment variable
    #[serde(skip)]
    pub github_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            cycle_interval_seconds: defaults::CYCLE_INTERVAL_SECONDS,
            config_failure_threshold: defaults::CONFIG_FAILURE_THRESHOLD,
            config_failure_backoff_seconds: defaults::CONFIG_FAILURE_BACKOFF_SECONDS,
            probe_timeout_seconds: defaults::PROBE_TIMEOUT_SECONDS,
            tx_index_check_timeout_seconds: defaults::TX_INDEX_CHECK_TIMEOUT_SECONDS,
            latency_only_rest_chains: defaults::LATENCY_ONLY_REST_CHAINS
                .iter()
                .map(|chain| chain.to_string())
                .collect(),
            web3_fallback_url: defaults::WEB3_FALLBACK_URL.to_string(),
            store: StoreConfig::default(),
            registry: RegistryConfig::default(),
            web: WebConfig::default(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackendKind::Sqlite,
            database_path: defaults::DATABASE_PATH.to_string(),
            key_prefix: String::new(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            repository: defaults::REGISTRY_REPOSITORY.to_string(),
            branch: String::new(),
            api_base_url: defaults::REGISTRY_API_BASE_URL.to_string(),
            chain_config_path: defaults::REGISTRY_CHAIN_CONFIG_PATH.to_string(),
            cache_ttl_hours: defaults::REGISTRY_CACHE_TTL_HOURS,
            request_timeout_seconds: defaults::REGISTRY_REQUEST_TIMEOUT_SECONDS,
            github_token: None,
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: defaults::WEB_HOST.to_string(),
            port: defaults::WEB_PORT,
        }
    }
}

impl Config {
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Fill values derived from the environment that were left empty
    pub fn resolve_environment_defaults(&mut self) {
        if self.store.key_prefix.is_empty() && self.is_production() {
            self.store.key_prefix = store::PRODUCTION_PREFIX.to_string();
        }
        if self.registry.branch.is_empty() {
            self.registry.branch = if self.is_production() {
                "production".to_string()
            } else {
                "main".to_string()
            };
        }
    }

    pub fn cycle_interval(&self) -> Duration {
        Duration::from_secs(self.cycle_interval_seconds)
    }

    pub fn config_failure_backoff(&self) -> Duration {
        Duration::from_secs(self.config_failure_backoff_seconds)
    }

    pub fn probe_timeouts(&self) -> ProbeTimeouts {
        ProbeTimeouts {
            status: Duration::from_secs(self.probe_timeout_seconds),
            tx_index_check: Duration::from_secs(self.tx_index_check_timeout_seconds),
        }
    }

    /// REST probe variant for a chain, driven by `latency_only_rest_chains`
    pub fn rest_probe_kind(&self, chain: &str) -> ProbeKind {
        let latency_only = self
            .latency_only_rest_chains
            .iter()
            .any(|listed| listed.eq_ignore_ascii_case(chain));

        if latency_only {
            ProbeKind::RestLatencyOnly
        } else {
            ProbeKind::RestLatestBlock
        }
    }
}

impl RegistryConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_hours * 3600)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}
