//! Rendered-page cache for the kiosk.
//!
//! Two paper-size partitions of rendered page images plus the normalized-PDF
//! side files and the transient upload area, all under one cache root. The
//! store is injected behind the [`PageCache`] trait so request handlers never
//! touch the filesystem layout directly.

mod local;
mod traits;

pub use local::LocalPageCache;
pub use traits::{
    parse_page_index, validate_basename, CacheError, CacheResult, CachedPage, PageCache,
};
