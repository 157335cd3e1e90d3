//! Shared key-value store for published rankings and cached configuration.
//!
//! Downstream consumers read `{prefix}{CHAIN}|{protocol}|{rank}` to find the
//! best known endpoint of a chain. Rank 0 is reserved for the Web3 safety
//! net; ranks 1-3 are primary, secondary and tertiary.
//!
//! The module is organized into:
//! - `SharedStore` - the operations the ranker and consumers use
//! - `KvBackend` - the storage seam
//! - `sqlite` / `memory` - backend implementations

mod memory;
mod sqlite;

pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::{StoreBackendKind, StoreConfig};
use crate::constants::{ranking, store as keys};
use crate::endpoint::Protocol;

/// Raw key-value storage with optional expiry
#[async_trait]
pub trait KvBackend: Send + Sync {
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;

    /// Write every entry without expiry, or none of them
    async fn set_many(&self, entries: &[(String, String)]) -> Result<()>;

    /// Expired entries read as absent
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn delete(&self, key: &str) -> Result<()>;
}

pub struct SharedStore {
    backend: Arc<dyn KvBackend>,
    prefix: String,
}

impl SharedStore {
    pub fn new(backend: Arc<dyn KvBackend>, prefix: impl Into<String>) -> Self {
        Self {
            backend,
            prefix: prefix.into(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()), "")
    }

    pub async fn from_config(config: &StoreConfig) -> Result<Self> {
        let backend: Arc<dyn KvBackend> = match config.backend {
            StoreBackendKind::Sqlite => Arc::new(
                SqliteBackend::new(&config.database_path)
                    .await
                    .with_context(|| format!("Failed to open store at {}", config.database_path))?,
            ),
            StoreBackendKind::Memory => Arc::new(MemoryBackend::new()),
        };

        info!(
            "Shared store ready: {:?} backend, key prefix '{}'",
            config.backend, config.key_prefix
        );

        Ok(Self::new(backend, config.key_prefix.clone()))
    }

    pub fn endpoint_key(&self, chain: &str, protocol: Protocol, rank: u8) -> String {
        format!(
            "{}{}|{}|{}",
            self.prefix,
            chain.to_uppercase(),
            protocol.as_str(),
            rank
        )
    }

    pub fn chain_config_key(&self) -> String {
        format!("{}{}", self.prefix, keys::CHAIN_CONFIG_KEY)
    }

    pub async fn set_endpoint(
        &self,
        chain: &str,
        protocol: Protocol,
        rank: u8,
        url: &str,
    ) -> Result<()> {
        let key = self.endpoint_key(chain, protocol, rank);
        debug!("Publishing {} = {}", key, url);
        self.backend.set(&key, url, None).await
    }

    /// Replace the published ranking of a (chain, protocol) pair in one
    /// write. `urls` fill ranks 1.., `fallback` goes to rank 0.
    pub async fn publish_ranking(
        &self,
        chain: &str,
        protocol: Protocol,
        urls: &[String],
        fallback: Option<&str>,
    ) -> Result<()> {
        let mut entries = Vec::with_capacity(urls.len() + 1);
        if let Some(fallback) = fallback {
            entries.push((
                self.endpoint_key(chain, protocol, ranking::FALLBACK_RANK),
                fallback.to_string(),
            ));
        }
        for (slot, url) in urls.iter().enumerate() {
            entries.push((
                self.endpoint_key(chain, protocol, slot as u8 + 1),
                url.clone(),
            ));
        }

        debug!("Publishing {} {} ranking ({} slots)", chain, protocol, entries.len());
        self.backend.set_many(&entries).await
    }

    pub async fn get_endpoint(
        &self,
        chain: &str,
        protocol: Protocol,
        rank: u8,
    ) -> Result<Option<String>> {
        let key = self.endpoint_key(chain, protocol, rank);
        Ok(self.backend.get(&key).await?.filter(|url| !url.is_empty()))
    }

    /// Primary, secondary and tertiary URLs that are currently published
    pub async fn ranked_endpoints(&self, chain: &str, protocol: Protocol) -> Result<Vec<String>> {
        let mut urls = Vec::with_capacity(ranking::PUBLISHED_SLOTS);
        for rank in 1..=ranking::PUBLISHED_SLOTS as u8 {
            if let Some(url) = self.get_endpoint(chain, protocol, rank).await? {
                urls.push(url);
            }
        }
        Ok(urls)
    }

    pub async fn set_chain_config(&self, data: &Value, ttl: Duration) -> Result<()> {
        let serialized =
            serde_json::to_string(data).context("Failed to serialize chain configuration")?;
        self.backend
            .set(&self.chain_config_key(), &serialized, Some(ttl))
            .await
    }

    pub async fn get_chain_config(&self) -> Result<Option<Value>> {
        match self.backend.get(&self.chain_config_key()).await? {
            Some(raw) => {
                let value = serde_json::from_str(&raw)
                    .context("Cached chain configuration is not valid JSON")?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub async fn clear_chain_config(&self) -> Result<()> {
        self.backend.delete(&self.chain_config_key()).await
    }
}
