//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use printpoint_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Printpoint API",
        version = "0.1.0",
        description = "Self-service print kiosk backend: PDF upload with letter/legal preview rendering, ink-usage based cost quoting, and a print-job ledger."
    ),
    paths(
        handlers::document_upload::upload_document,
        handlers::cost::calculate,
        handlers::cleanup::cleanup,
        handlers::transactions::create,
        handlers::transactions::update,
        handlers::transactions::list,
    ),
    components(schemas(
        models::wire::UploadResponse,
        models::wire::PageImages,
        models::wire::CostRequest,
        models::wire::CostResponse,
        models::wire::CleanupRequest,
        models::wire::TransactionCreateResponse,
        models::wire::TransactionUpdateRequest,
        models::Transaction,
        models::TransactionDraft,
        models::TransactionStatus,
        models::PaperSize,
        models::ColorMode,
        error::ErrorResponse,
    )),
    tags(
        (name = "documents", description = "PDF upload and session cleanup"),
        (name = "cost", description = "Print cost quoting"),
        (name = "transactions", description = "Print-job ledger")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
