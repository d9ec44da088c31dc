//! Route configuration and setup.

use crate::api_doc;
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use printpoint_core::models::PaperSize;
use printpoint_core::Config;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Multipart framing overhead allowed on top of the PDF size limit.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Setup all application routes.
pub fn setup_routes(config: &Config, state: AppState) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let body_limit = config.max_upload_size_bytes + MULTIPART_OVERHEAD_BYTES;

    let api_routes = Router::new()
        .route("/api/documents", post(handlers::document_upload::upload_document))
        .route("/api/cost", post(handlers::cost::calculate))
        .route("/api/cleanup", post(handlers::cleanup::cleanup))
        .route(
            "/api/transactions",
            post(handlers::transactions::create)
                .put(handlers::transactions::update)
                .get(handlers::transactions::list),
        )
        .route("/api/openapi.json", get(serve_openapi))
        .route("/health", get(handlers::health::readiness_check))
        .route("/health/live", get(handlers::health::liveness_check));

    // Only the rendered pages are public; normalized PDFs, the transient
    // upload, and the staging area live outside these two directories.
    let previews = Router::new()
        .nest_service(
            "/previews/letter",
            ServeDir::new(config.cache_root().join(PaperSize::Letter.as_str())),
        )
        .nest_service(
            "/previews/legal",
            ServeDir::new(config.cache_root().join(PaperSize::Legal.as_str())),
        );

    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(64)
        .max(1);

    let app = api_routes
        .merge(previews)
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

async fn serve_openapi() -> impl IntoResponse {
    Json(api_doc::get_openapi_spec())
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins.contains(&"*".to_string()) {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins: Result<Vec<HeaderValue>, _> =
            config.cors_origins.iter().map(|o| o.parse()).collect();
        CorsLayer::new()
            .allow_origin(origins.unwrap_or_default())
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}
