//! Session cleanup handler.

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, Json};
use printpoint_core::models::CleanupRequest;

#[utoipa::path(
    post,
    path = "/api/cleanup",
    tag = "documents",
    request_body = CleanupRequest,
    responses(
        (status = 200, description = "Artifacts invalidated"),
        (status = 400, description = "Malformed basename", body = ErrorResponse)
    )
)]
pub async fn cleanup(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CleanupRequest>,
) -> Result<Json<serde_json::Value>, HttpAppError> {
    state.cache.invalidate(&req.base_name).await?;
    tracing::info!(basename = %req.base_name, "session artifacts invalidated");
    Ok(Json(serde_json::json!({ "success": true })))
}
