//! Cost quote handler.

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, Json};
use printpoint_core::models::{ColorMode, CostRequest, CostResponse, PaperSize};
use printpoint_core::AppError;
use printpoint_processing::calculate_cost;

#[utoipa::path(
    post,
    path = "/api/cost",
    tag = "cost",
    request_body = CostRequest,
    responses(
        (status = 200, description = "Quote computed; page references past the rendered document are ignored", body = CostResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 422, description = "No cached pages for basename", body = ErrorResponse)
    )
)]
pub async fn calculate(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CostRequest>,
) -> Result<Json<CostResponse>, HttpAppError> {
    let paper = PaperSize::parse(&req.paper)
        .ok_or_else(|| AppError::InvalidInput(format!("invalid paper size: {}", req.paper)))?;
    let color = ColorMode::parse(&req.color)
        .ok_or_else(|| AppError::InvalidInput(format!("invalid color mode: {}", req.color)))?;

    let breakdown = calculate_cost(
        state.cache.as_ref(),
        paper,
        &req.base_name,
        color,
        &req.pages,
        req.copies,
    )
    .await?;

    Ok(Json(CostResponse {
        success: true,
        total_cost: breakdown.total_cost,
        used_sections: breakdown.used_sections,
        total_pages: breakdown.total_pages,
    }))
}
