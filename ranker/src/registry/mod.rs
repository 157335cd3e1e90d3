//! Chain configuration provider
//!
//! Chain endpoint lists come from a remote registry of chain documents and
//! are cached in the shared store for `registry.cache_ttl_hours`. The cycle
//! scheduler only sees [`ChainConfigSource`]: fetch the current list, or
//! drop the cache after a failed fetch so the next attempt goes to origin.

mod github;

pub use github::GithubRegistry;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::errors::RegistryError;
use crate::store::SharedStore;

/// Endpoint lists of one chain for the current cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEndpoints {
    /// Upper-cased chain identifier, also the publication key
    pub identifier: String,
    pub rest: Vec<String>,
    pub jrpc: Vec<String>,
    pub web3: Vec<String>,
}

impl ChainEndpoints {
    pub fn endpoint_count(&self) -> usize {
        self.rest.len() + self.jrpc.len() + self.web3.len()
    }
}

/// Origin of raw chain documents
#[async_trait]
pub trait ChainRegistry: Send + Sync {
    async fn fetch_chain_documents(&self) -> Result<Vec<Value>, RegistryError>;
}

/// What the cycle scheduler consumes
#[async_trait]
pub trait ChainConfigSource: Send + Sync {
    async fn get_chain_config(&self) -> Result<Vec<ChainEndpoints>>;

    /// Evict any cached configuration
    async fn invalidate(&self) -> Result<()>;
}

/// Registry documents cached in the shared store
pub struct ChainConfigProvider {
    registry: Arc<dyn ChainRegistry>,
    store: Arc<SharedStore>,
    ttl: Duration,
}

impl ChainConfigProvider {
    pub fn new(registry: Arc<dyn ChainRegistry>, store: Arc<SharedStore>, ttl: Duration) -> Self {
        Self {
            registry,
            store,
            ttl,
        }
    }

    async fn load_documents(&self) -> Result<Vec<Value>> {
        if let Some(Value::Array(cached)) = self.store.get_chain_config().await? {
            if !cached.is_empty() {
                debug!("Using cached chain configuration ({} documents)", cached.len());
                return Ok(cached);
            }
        }

        info!("Fetching chain configuration from registry");
        let documents = self.registry.fetch_chain_documents().await?;
        if documents.is_empty() {
            return Err(RegistryError::Empty.into());
        }

        self.store
            .set_chain_config(&Value::Array(documents.clone()), self.ttl)
            .await?;
        info!("Cached {} chain documents", documents.len());

        Ok(documents)
    }
}

#[async_trait]
impl ChainConfigSource for ChainConfigProvider {
    async fn get_chain_config(&self) -> Result<Vec<ChainEndpoints>> {
        let documents = self.load_documents().await?;
        let chains = parse_chain_endpoints(&documents);
        if chains.is_empty() {
            return Err(RegistryError::Empty.into());
        }
        Ok(chains)
    }

    async fn invalidate(&self) -> Result<()> {
        self.store.clear_chain_config().await
    }
}

#[derive(Debug, Deserialize)]
struct ChainDocument {
    #[serde(default)]
    prefix: Option<String>,
    #[serde(default)]
    configurations: Vec<NetworkConfiguration>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NetworkConfiguration {
    #[serde(default)]
    configuration_type: String,
    #[serde(default)]
    identifier: String,
    #[serde(default)]
    rest: EndpointList,
    #[serde(default)]
    jrpc: EndpointList,
    #[serde(default)]
    web3: EndpointList,
}

/// Some documents carry a single string where a list is expected; a lone
/// string in `rest` is not a usable endpoint list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EndpointList {
    Many(Vec<String>),
    Single(String),
}

impl Default for EndpointList {
    fn default() -> Self {
        EndpointList::Many(Vec::new())
    }
}

impl EndpointList {
    fn into_urls(self) -> Vec<String> {
        match self {
            EndpointList::Many(urls) => urls
                .into_iter()
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty())
                .collect(),
            EndpointList::Single(_) => Vec::new(),
        }
    }
}

/// Derive per-chain endpoint lists from registry documents, using each
/// document's mainnet configuration. Documents that cannot be used are
/// skipped with a warning.
pub fn parse_chain_endpoints(documents: &[Value]) -> Vec<ChainEndpoints> {
    let mut chains: Vec<ChainEndpoints> = Vec::with_capacity(documents.len());

    for document in documents {
        let parsed: ChainDocument = match serde_json::from_value(document.clone()) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Skipping malformed chain document: {}", e);
                continue;
            }
        };

        let label = parsed.prefix.clone().unwrap_or_else(|| "<unknown>".to_string());

        let Some(mainnet) = parsed
            .configurations
            .into_iter()
            .find(|c| c.configuration_type == "mainnet")
        else {
            warn!("Chain {} has no mainnet configuration, skipping", label);
            continue;
        };

        let identifier = mainnet.identifier.trim().to_uppercase();
        if identifier.is_empty() {
            warn!("Chain {} mainnet configuration has no identifier, skipping", label);
            continue;
        }

        if chains.iter().any(|c| c.identifier == identifier) {
            warn!("Duplicate chain identifier {}, keeping the first", identifier);
            continue;
        }

        chains.push(ChainEndpoints {
            identifier,
            rest: mainnet.rest.into_urls(),
            jrpc: mainnet.jrpc.into_urls(),
            web3: mainnet.web3.into_urls(),
        });
    }

    chains
}
