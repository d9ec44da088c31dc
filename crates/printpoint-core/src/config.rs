//! Configuration module
//!
//! Env-driven configuration for the kiosk API and the conversion pipeline:
//! server port, CORS, cache root, rasterization engine binary, database URL,
//! and upload limits.

use std::env;
use std::path::{Path, PathBuf};

const SERVER_PORT: u16 = 4000;
const MAX_UPLOAD_SIZE_MB: usize = 50;
const DB_MAX_CONNECTIONS: u32 = 5;
const RENDER_DPI: u32 = 72;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    /// Root directory that owns the cache partitions, staging area, and
    /// normalized-PDF side files.
    pub cache_root: PathBuf,
    /// Base URL clients use to reach rendered page images.
    pub preview_base_url: String,
    /// Rasterization engine binary (poppler's pdftoppm or compatible).
    pub engine_path: String,
    pub render_dpi: u32,
    pub database_url: String,
    pub db_max_connections: u32,
    pub max_upload_size_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let max_upload_size_mb = env::var("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|_| MAX_UPLOAD_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_UPLOAD_SIZE_MB);

        Ok(Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            cache_root: env::var("CACHE_ROOT")
                .unwrap_or_else(|_| "./cache".to_string())
                .into(),
            preview_base_url: env::var("PREVIEW_BASE_URL")
                .unwrap_or_else(|_| "/previews".to_string()),
            engine_path: env::var("ENGINE_PATH").unwrap_or_else(|_| "pdftoppm".to_string()),
            render_dpi: env::var("RENDER_DPI")
                .unwrap_or_else(|_| RENDER_DPI.to_string())
                .parse()
                .unwrap_or(RENDER_DPI),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://printpoint.db?mode=rwc".to_string()),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| DB_MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(DB_MAX_CONNECTIONS),
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
        })
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }
}
