//! Application setup and initialization.

pub mod database;
pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use printpoint_cache::LocalPageCache;
use printpoint_core::Config;
use printpoint_db::TransactionRepository;
use printpoint_processing::{Converter, Rasterizer};
use std::sync::Arc;

/// Initialize the whole application: cache layout, database, services,
/// router.
pub async fn initialize_app(config: Config) -> Result<(AppState, axum::Router)> {
    let cache = Arc::new(
        LocalPageCache::new(
            config.cache_root().to_path_buf(),
            config.preview_base_url.clone(),
        )
        .await
        .context("failed to initialize page cache")?,
    );

    let pool = database::setup_database(&config).await?;
    let transactions = TransactionRepository::new(pool);

    let rasterizer = Rasterizer::new(config.engine_path.clone(), config.render_dpi);
    let converter = Converter::new(cache.clone(), rasterizer);

    let state = AppState {
        config: config.clone(),
        cache,
        converter,
        transactions,
    };

    let router = routes::setup_routes(&config, state.clone())?;
    Ok((state, router))
}
