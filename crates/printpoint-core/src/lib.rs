//! Core types for the printpoint kiosk: errors, configuration, domain models,
//! and page-selection parsing.

pub mod config;
pub mod error;
pub mod models;
pub mod pages;

pub use config::Config;
pub use error::{AppError, ErrorMetadata};
