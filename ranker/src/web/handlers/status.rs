// Scheduler status endpoint

use axum::{extract::State, response::Json};

use super::common::{ApiResponse, ApiResult};
use crate::scheduler::SchedulerStatus;
use crate::web::AppState;

/// Lifecycle state, failure counter and the last completed cycle
pub async fn get_status(State(state): State<AppState>) -> ApiResult<SchedulerStatus> {
    Ok(Json(ApiResponse::success(state.scheduler.status().await)))
}
