//! Ledger handlers: create, update, list.

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, Json};
use printpoint_core::models::{
    Transaction, TransactionCreateResponse, TransactionDraft, TransactionStatus,
    TransactionUpdateRequest,
};

#[utoipa::path(
    post,
    path = "/api/transactions",
    tag = "transactions",
    request_body = TransactionDraft,
    responses(
        (status = 200, description = "Transaction recorded", body = TransactionCreateResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse)
    )
)]
pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(draft): ValidatedJson<TransactionDraft>,
) -> Result<Json<TransactionCreateResponse>, HttpAppError> {
    let validated = draft.validate()?;
    let id = state.transactions.create(&validated).await?;
    tracing::info!(id, "transaction recorded");
    Ok(Json(TransactionCreateResponse { success: true, id }))
}

#[utoipa::path(
    put,
    path = "/api/transactions",
    tag = "transactions",
    request_body = TransactionUpdateRequest,
    responses(
        (status = 200, description = "Transaction overwritten"),
        (status = 500, description = "Persistence failed", body = ErrorResponse)
    )
)]
pub async fn update(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<TransactionUpdateRequest>,
) -> Result<Json<serde_json::Value>, HttpAppError> {
    let amount = req.clamped_amount();
    let status = req
        .status
        .as_deref()
        .map(TransactionStatus::parse_or_pending)
        .unwrap_or(TransactionStatus::Pending);

    state
        .transactions
        .update_amount_status(req.id, amount, status)
        .await?;
    tracing::info!(id = req.id, amount, status = %status, "transaction updated");
    Ok(Json(serde_json::json!({ "success": true })))
}

#[utoipa::path(
    get,
    path = "/api/transactions",
    tag = "transactions",
    responses(
        (status = 200, description = "All transactions, newest first", body = [Transaction])
    )
)]
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<Transaction>>, HttpAppError> {
    let all = state.transactions.list().await?;
    Ok(Json(all))
}
