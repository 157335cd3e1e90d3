// File: ranker/src/config/manager.rs
use super::Config;
use anyhow::{anyhow, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{info, warn};

use crate::constants::env;

pub struct ConfigManager {
    current_config: Arc<Config>,
}

impl ConfigManager {
    pub async fn new(config_dir: String) -> Result<Self> {
        let config = Self::load_configuration(&config_dir).await?;
        Ok(Self {
            current_config: Arc::new(config),
        })
    }

    pub fn from_config(config: Config) -> Self {
        Self {
            current_config: Arc::new(config),
        }
    }

    pub fn get_current_config(&self) -> Arc<Config> {
        self.current_config.clone()
    }

    async fn load_configuration(config_dir: &str) -> Result<Config> {
        let main_config_path = format!("{}/main.toml", config_dir);

        let mut config: Config = if Path::new(&main_config_path).exists() {
            let main_config_content = fs::read_to_string(&main_config_path)
                .await
                .map_err(|e| anyhow!("Failed to read main config {}: {}", main_config_path, e))?;

            toml::from_str(&main_config_content)
                .map_err(|e| anyhow!("Failed to parse main config: {}", e))?
        } else {
            warn!(
                "No config file at {}, running with built-in defaults",
                main_config_path
            );
            Config::default()
        };

        Self::apply_environment(&mut config, |name| std::env::var(name).ok());
        config.resolve_environment_defaults();
        Self::validate(&config)?;

        info!(
            "Configuration loaded: environment {}, {}s cycle interval, {} latency-only REST chains",
            config.environment,
            config.cycle_interval_seconds,
            config.latency_only_rest_chains.len()
        );

        Ok(config)
    }

    /// Overlay values taken from environment variables
    fn apply_environment(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(environment) = lookup(env::ENVIRONMENT).filter(|v| !v.is_empty()) {
            config.environment = environment;
        }

        config.registry.github_token = lookup(env::GITHUB_KEY).filter(|v| !v.is_empty());
        if config.registry.github_token.is_none() {
            warn!(
                "{} not set, registry requests will be unauthenticated and rate limited",
                env::GITHUB_KEY
            );
        }
    }

    fn validate(config: &Config) -> Result<()> {
        if config.probe_timeout_seconds == 0 || config.tx_index_check_timeout_seconds == 0 {
            return Err(anyhow!("Probe timeouts must be at least one second"));
        }
        if config.web3_fallback_url.trim().is_empty() {
            return Err(anyhow!("web3_fallback_url must not be empty"));
        }
        if config.registry.repository.split('/').count() != 2 {
            return Err(anyhow!(
                "registry.repository must look like 'owner/name', got '{}'",
                config.registry.repository
            ));
        }
        Ok(())
    }
}
