//! Chain registry hosted in a GitHub repository
//!
//! The git tree of the configured branch is listed recursively; every blob
//! whose path contains `chain_config_path` is fetched as raw JSON.

use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::ChainRegistry;
use crate::config::RegistryConfig;
use crate::errors::RegistryError;

const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";

#[derive(Debug, Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeEntry>,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    url: String,
}

pub struct GithubRegistry {
    client: HttpClient,
    config: RegistryConfig,
}

impl GithubRegistry {
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryError> {
        let client = HttpClient::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| RegistryError::Request {
                url: config.api_base_url.clone(),
                reason: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, config })
    }

    fn tree_url(&self) -> String {
        format!(
            "{}/repos/{}/git/trees/{}?recursive=1",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.repository,
            self.config.branch
        )
    }

    fn request(&self, url: &str, accept: &str) -> reqwest::RequestBuilder {
        let request = self
            .client
            .get(url)
            .header(ACCEPT, accept)
            .header(USER_AGENT, concat!("ranker/", env!("CARGO_PKG_VERSION")));

        match &self.config.github_token {
            Some(token) => request.header(AUTHORIZATION, format!("token {}", token)),
            None => request,
        }
    }

    async fn get_bytes(&self, url: &str, accept: &str) -> Result<Vec<u8>, RegistryError> {
        let response = self
            .request(url, accept)
            .send()
            .await
            .map_err(|e| RegistryError::Request {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(RegistryError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| RegistryError::Request {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(body.to_vec())
    }

    async fn fetch_document(&self, entry: &TreeEntry) -> Result<Value, RegistryError> {
        debug!("Fetching registry entry {}", entry.path);
        let body = self.get_bytes(&entry.url, RAW_MEDIA_TYPE).await?;
        serde_json::from_slice(&body).map_err(|e| RegistryError::Decode {
            path: entry.path.clone(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl ChainRegistry for GithubRegistry {
    async fn fetch_chain_documents(&self) -> Result<Vec<Value>, RegistryError> {
        let tree_url = self.tree_url();
        let body = self.get_bytes(&tree_url, JSON_MEDIA_TYPE).await?;

        let tree: TreeResponse =
            serde_json::from_slice(&body).map_err(|e| RegistryError::Decode {
                path: tree_url.clone(),
                reason: e.to_string(),
            })?;

        let entries: Vec<&TreeEntry> = tree
            .tree
            .iter()
            .filter(|entry| {
                entry.path.contains(&self.config.chain_config_path) && entry.kind != "tree"
            })
            .collect();

        info!(
            "Registry {}@{} lists {} chain configuration files",
            self.config.repository,
            self.config.branch,
            entries.len()
        );

        try_join_all(entries.into_iter().map(|entry| self.fetch_document(entry))).await
    }
}
