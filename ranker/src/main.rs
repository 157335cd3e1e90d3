// File: ranker/src/main.rs
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use ranker::constants::env;
use ranker::probes::{Prober, ReqwestTransport};
use ranker::web::{start_web_server, AppState};
use ranker::{
    ChainConfigProvider, ChainProcessor, ConfigManager, CycleScheduler, GithubRegistry,
    SharedStore,
};

const DEFAULT_LOG_DIRECTIVES: &str = "ranker=info,tower_http=warn,hyper=warn,reqwest=warn,sqlx=warn";

/// `RUST_LOG` when set, otherwise the default directives
fn log_filter(rust_log: Option<&str>) -> Result<EnvFilter> {
    let directives = match rust_log {
        Some(value) if !value.trim().is_empty() => value,
        _ => DEFAULT_LOG_DIRECTIVES,
    };
    EnvFilter::try_new(directives).with_context(|| format!("Invalid log filter '{}'", directives))
}

#[tokio::main]
async fn main() -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    fmt().with_env_filter(log_filter(rust_log.as_deref())?).init();

    info!("Starting endpoint ranker");

    let config_dir = std::env::var(env::CONFIG_DIR).unwrap_or_else(|_| "config".to_string());
    let config_manager = ConfigManager::new(config_dir).await?;
    let config = config_manager.get_current_config();

    let store = Arc::new(SharedStore::from_config(&config.store).await?);

    let registry = Arc::new(GithubRegistry::new(config.registry.clone())?);
    let provider = Arc::new(ChainConfigProvider::new(
        registry,
        store.clone(),
        config.registry.cache_ttl(),
    ));
    info!(
        "Chain registry: {}@{} ({}h cache)",
        config.registry.repository, config.registry.branch, config.registry.cache_ttl_hours
    );

    let client = reqwest::Client::builder()
        .build()
        .context("Failed to create HTTP client")?;
    let prober = Prober::new(
        Arc::new(ReqwestTransport::new(client)),
        config.probe_timeouts(),
    );
    let processor = Arc::new(ChainProcessor::new(config.clone(), prober, store.clone()));

    let cancel = CancellationToken::new();
    let scheduler = Arc::new(CycleScheduler::new(
        config.clone(),
        provider,
        processor,
        cancel.clone(),
    ));

    let signal_token = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_token.cancel();
    });

    let web_handle = if config.web.enabled {
        let state = AppState::new(config.clone(), scheduler.clone(), store.clone());
        let web_cancel = cancel.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = start_web_server(state, web_cancel).await {
                error!("Status API failed: {:#}", e);
            }
        }))
    } else {
        info!("Status API disabled");
        None
    };

    scheduler.run().await;

    // The scheduler only returns once cancelled; make sure the server follows.
    cancel.cancel();
    if let Some(handle) = web_handle {
        if let Err(e) = handle.await {
            warn!("Status API task ended abnormally: {}", e);
        }
    }

    info!("Endpoint ranker stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, finishing the current cycle");
}
