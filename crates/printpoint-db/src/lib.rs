//! Ledger persistence. One repository over one `transactions` table, backed
//! by SQLite via sqlx.

pub mod transactions;

pub use transactions::TransactionRepository;

use printpoint_core::AppError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Open the ledger pool and run pending migrations.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|err| AppError::Database(format!("invalid database url: {}", err)))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .map_err(|err| AppError::Database(format!("failed to connect: {}", err)))?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|err| AppError::Database(format!("migration failed: {}", err)))?;

    tracing::info!(database_url, "ledger database ready");
    Ok(pool)
}
