//! Cache abstraction trait.

use async_trait::async_trait;
use printpoint_core::models::PaperSize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use thiserror::Error;

/// Cache operation errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Invalid basename: {0}")]
    InvalidBasename(String),

    #[error("Publish failed: {0}")]
    PublishFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CacheResult<T> = Result<T, CacheError>;

impl From<CacheError> for printpoint_core::AppError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::InvalidBasename(name) => {
                printpoint_core::AppError::InvalidInput(format!("invalid basename: {}", name))
            }
            CacheError::PublishFailed(msg) => printpoint_core::AppError::Conversion(msg),
            CacheError::Io(err) => printpoint_core::AppError::Io(err),
        }
    }
}

/// A rendered page image present in a cache partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPage {
    /// 1-based page index extracted from the filename.
    pub page_index: u32,
    /// Filename within the partition, `{basename}_{index}.png`.
    pub file_name: String,
    /// Absolute path to the image file.
    pub path: PathBuf,
}

/// The injected cache-store abstraction.
///
/// Partitions are shared process-wide state; callers rely on the
/// one-basename-per-session convention plus a fresh [`clear`](Self::clear)
/// on every upload rather than any in-process locking.
#[async_trait]
pub trait PageCache: Send + Sync {
    /// Best-effort removal of every rendered page in a partition.
    /// Individual deletion failures are swallowed.
    async fn clear(&self, paper: PaperSize) -> CacheResult<()>;

    /// Delete every artifact belonging to a basename: `{basename}_`-prefixed
    /// pages in both partitions, legacy `{basename}-`-prefixed pages, and
    /// the normalized-PDF side files.
    async fn invalidate(&self, basename: &str) -> CacheResult<()>;

    /// Every page cached for a basename, sorted ascending by page index.
    /// A missing partition directory is an empty result, not an error.
    async fn list(&self, paper: PaperSize, basename: &str) -> CacheResult<Vec<CachedPage>>;

    /// List the pages cached for a basename whose index is in `pages`,
    /// sorted ascending by page index. A missing partition directory is an
    /// empty result, not an error.
    async fn lookup(
        &self,
        paper: PaperSize,
        basename: &str,
        pages: &BTreeSet<u32>,
    ) -> CacheResult<Vec<CachedPage>>;

    /// Move a fully rasterized staging directory into the live partition.
    /// Returns the published pages sorted ascending by index.
    async fn publish_staged(
        &self,
        paper: PaperSize,
        basename: &str,
    ) -> CacheResult<Vec<CachedPage>>;

    /// Remove the whole staging area for a basename (abort path).
    async fn discard_staged(&self, basename: &str) -> CacheResult<()>;

    /// Staging directory the rasterizer writes into for one variant.
    /// Created on demand.
    async fn staging_dir(&self, paper: PaperSize, basename: &str) -> CacheResult<PathBuf>;

    /// Where the normalized PDF for a variant lives.
    fn normalized_pdf_path(&self, paper: PaperSize, basename: &str) -> PathBuf;

    /// Where the transient source PDF for an upload lives.
    fn incoming_pdf_path(&self, basename: &str) -> PathBuf;

    /// Public URL for a cached page file.
    fn page_url(&self, paper: PaperSize, file_name: &str) -> String;
}

/// Basenames are opaque tokens that become filename prefixes; restrict them
/// to a filesystem-safe charset before any path is built from them.
pub fn validate_basename(basename: &str) -> CacheResult<()> {
    if basename.is_empty()
        || !basename
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(CacheError::InvalidBasename(basename.to_string()));
    }
    Ok(())
}

/// Extract the trailing 1-based page index from a canonical cached filename.
/// Returns `None` for files that do not belong to `basename`.
pub fn parse_page_index(file_name: &str, basename: &str) -> Option<u32> {
    let rest = file_name.strip_prefix(basename)?.strip_prefix('_')?;
    rest.strip_suffix(".png")?.parse().ok()
}
