//! Destructive grayscale conversion of cached page images. The color
//! original is replaced in place; there is no way back short of
//! re-converting the source PDF.

use anyhow::{Context, Result};
use std::path::Path;
use tempfile::NamedTempFile;

/// Convert one PNG to 8-bit grayscale, replacing the file atomically.
/// Converting an already-gray image is a no-op in effect.
pub fn convert_to_grayscale(path: &Path) -> Result<()> {
    let img = image::open(path)
        .with_context(|| format!("failed to open page image {}", path.display()))?;
    let gray = img.into_luma8();

    let parent = path
        .parent()
        .context("page image has no parent directory")?;
    let tmp = NamedTempFile::new_in(parent).context("failed to create staging file")?;
    gray.save_with_format(tmp.path(), image::ImageFormat::Png)
        .context("failed to encode grayscale image")?;
    tmp.persist(path)
        .with_context(|| format!("failed to replace page image {}", path.display()))?;
    Ok(())
}
