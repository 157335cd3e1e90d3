// File: ranker/src/web/server.rs
use anyhow::Result;
use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::web::{handlers, AppState};

/// Serve the status API until `cancel` fires
pub async fn start_web_server(state: AppState, cancel: CancellationToken) -> Result<()> {
    let addr = format!("{}:{}", state.config.web.host, state.config.web.port);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Status API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await?;

    info!("Status API stopped");
    Ok(())
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/status", get(handlers::get_status))
        .route(
            "/api/endpoints/{chain}/{protocol}",
            get(handlers::get_published_endpoints),
        )
        .with_state(state)
        .layer(create_cors_layer())
        .layer(TraceLayer::new_for_http())
}

fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}
