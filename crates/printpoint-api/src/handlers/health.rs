//! Health probes.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Run an async check with timeout; returns "healthy", "timeout", or
/// "{prefix}: {error}".
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

#[derive(serde::Serialize)]
struct HealthCheckResponse {
    status: String,
    database: String,
    cache: String,
}

/// Liveness probe: the process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Readiness probe: ledger database reachable and cache root writable.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = run_check(
        Duration::from_secs(2),
        async {
            state
                .transactions
                .list()
                .await
                .map(|_| ())
                .map_err(|e| e.to_string())
        },
        "database",
    )
    .await;

    let cache = run_check(
        Duration::from_secs(2),
        async {
            let probe = state.config.cache_root().join(".health");
            tokio::fs::write(&probe, b"ok")
                .await
                .map_err(|e| e.to_string())?;
            tokio::fs::remove_file(&probe)
                .await
                .map_err(|e| e.to_string())
        },
        "cache",
    )
    .await;

    let healthy = database == "healthy" && cache == "healthy";
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthCheckResponse {
            status: if healthy { "ready" } else { "degraded" }.to_string(),
            database,
            cache,
        }),
    )
}
