//! Application state shared by all handlers.

use printpoint_cache::PageCache;
use printpoint_core::Config;
use printpoint_db::TransactionRepository;
use printpoint_processing::Converter;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub cache: Arc<dyn PageCache>,
    pub converter: Converter,
    pub transactions: TransactionRepository,
}
