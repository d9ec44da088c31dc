//! Database setup.

use anyhow::{Context, Result};
use printpoint_core::Config;
use sqlx::SqlitePool;

/// Open the ledger pool and run migrations.
pub async fn setup_database(config: &Config) -> Result<SqlitePool> {
    let pool = printpoint_db::connect(&config.database_url, config.db_max_connections)
        .await
        .context("Database setup failed")?;
    Ok(pool)
}
