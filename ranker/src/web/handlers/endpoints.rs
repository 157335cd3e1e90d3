// Published ranking lookup

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use tracing::error;

use super::common::{api_error, ApiResponse, ApiResult};
use crate::constants::ranking::FALLBACK_RANK;
use crate::endpoint::Protocol;
use crate::web::AppState;

#[derive(Debug, Serialize)]
pub struct PublishedEndpoints {
    pub chain: String,
    pub protocol: Protocol,
    /// Rank 0 safety net, only ever written for web3
    pub fallback: Option<String>,
    /// Primary, secondary and tertiary, in rank order
    pub ranked: Vec<String>,
}

pub async fn get_published_endpoints(
    Path((chain, protocol)): Path<(String, String)>,
    State(state): State<AppState>,
) -> ApiResult<PublishedEndpoints> {
    let protocol: Protocol = protocol
        .parse()
        .map_err(|e: String| api_error(StatusCode::BAD_REQUEST, e))?;
    let chain = chain.to_uppercase();

    let lookup = async {
        let fallback = state
            .store
            .get_endpoint(&chain, protocol, FALLBACK_RANK)
            .await?;
        let ranked = state.store.ranked_endpoints(&chain, protocol).await?;
        anyhow::Ok((fallback, ranked))
    };

    match lookup.await {
        Ok((fallback, ranked)) => Ok(Json(ApiResponse::success(PublishedEndpoints {
            chain,
            protocol,
            fallback,
            ranked,
        }))),
        Err(e) => {
            error!("Failed to read published {} {} endpoints: {}", chain, protocol, e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}
