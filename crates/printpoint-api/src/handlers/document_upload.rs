//! PDF upload handler. Receives one multipart PDF, stores it as the
//! transient incoming file, and runs the full conversion pipeline before
//! responding.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    Json,
};
use printpoint_core::models::{PageImages, UploadResponse};
use printpoint_core::AppError;

const PDF_CONTENT_TYPE: &str = "application/pdf";

#[utoipa::path(
    post,
    path = "/api/documents",
    tag = "documents",
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "PDF converted and cached", body = UploadResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Conversion failed", body = ErrorResponse)
    )
)]
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let mut pdf_bytes = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::BadRequest(format!("malformed multipart body: {}", err)))?
    {
        let is_file = matches!(field.name(), Some("file") | Some("document") | None);
        if !is_file {
            continue;
        }

        let content_type = field.content_type().map(str::to_owned);
        let file_name = field.file_name().map(str::to_owned);
        let looks_like_pdf = content_type.as_deref() == Some(PDF_CONTENT_TYPE)
            || file_name
                .as_deref()
                .is_some_and(|name| name.to_lowercase().ends_with(".pdf"));
        if !looks_like_pdf {
            return Err(AppError::InvalidInput(format!(
                "only PDF uploads are accepted, got content type {:?}",
                content_type.as_deref().unwrap_or("unknown")
            ))
            .into());
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|err| AppError::BadRequest(format!("failed to read upload: {}", err)))?;
        if bytes.is_empty() {
            return Err(AppError::InvalidInput("uploaded file is empty".to_string()).into());
        }
        if bytes.len() > state.config.max_upload_size_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "upload exceeds {} bytes",
                state.config.max_upload_size_bytes
            ))
            .into());
        }
        pdf_bytes = Some(bytes);
        break;
    }

    let pdf_bytes = pdf_bytes
        .ok_or_else(|| AppError::InvalidInput("no PDF file in upload".to_string()))?;

    // Basenames are server-generated so they are always filesystem-safe.
    let basename = uuid::Uuid::new_v4().simple().to_string();
    let incoming = state.cache.incoming_pdf_path(&basename);
    let original_bytes = pdf_bytes.len();
    tokio::fs::write(&incoming, &pdf_bytes).await.map_err(AppError::Io)?;

    tracing::info!(basename, original_bytes, "stored incoming PDF");

    let outcome = state.converter.convert(&basename).await?;

    Ok(Json(UploadResponse {
        success: true,
        images: PageImages {
            letter: outcome.letter_urls,
            legal: outcome.legal_urls,
        },
        total_pages: outcome.total_pages,
        original_size: outcome.original_size.as_str().to_string(),
        base_name: basename,
    }))
}
