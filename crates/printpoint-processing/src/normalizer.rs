//! PDF normalization: rewrite every page of a source PDF into a fixed
//! target geometry, stretching content independently on X and Y to exactly
//! fill the target rectangle.

use anyhow::{Context, Result};
use lopdf::{Document, Object, ObjectId};
use printpoint_core::models::PaperSize;
use std::path::Path;

/// Smallest dimension a source page is allowed to contribute to a scale
/// factor. Zero or NaN dimensions are sanitized up to this.
const MIN_DIMENSION_PT: f64 = 1.0;

/// What an upload looks like before conversion: page count and the first
/// page's media box, for the size heuristic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfInfo {
    pub page_count: u32,
    pub first_page_width: f64,
    pub first_page_height: f64,
}

impl PdfInfo {
    /// Best-effort classification of the source's native size, used only to
    /// pre-select a UI default.
    pub fn original_size(&self) -> PaperSize {
        PaperSize::classify(self.first_page_width, self.first_page_height)
    }
}

/// Read page count and first-page dimensions without modifying the source.
pub fn inspect(source: &Path) -> Result<PdfInfo> {
    let doc = Document::load(source)
        .with_context(|| format!("failed to load PDF {}", source.display()))?;
    let pages = doc.get_pages();
    let page_count = pages.len() as u32;
    anyhow::ensure!(page_count > 0, "PDF has no pages");

    let (&_, &first_id) = pages.iter().next().expect("non-empty page map");
    let (width, height) = media_box(&doc, first_id).unwrap_or((612.0, 792.0));

    Ok(PdfInfo {
        page_count,
        first_page_width: width,
        first_page_height: height,
    })
}

/// Rewrite `source` so every page has the target paper geometry, writing the
/// result to `output`. Returns the page count. Any page failure aborts the
/// whole variant; the caller must not rasterize a partially written output.
pub fn normalize_to_paper(source: &Path, output: &Path, paper: PaperSize) -> Result<u32> {
    let (target_w, target_h) = paper.dimensions();
    let mut doc = Document::load(source)
        .with_context(|| format!("failed to load PDF {}", source.display()))?;

    let pages: Vec<(u32, ObjectId)> = doc.get_pages().into_iter().collect();
    anyhow::ensure!(!pages.is_empty(), "PDF has no pages");

    for (page_num, page_id) in &pages {
        embed_page(&mut doc, *page_id, target_w, target_h)
            .with_context(|| format!("failed to normalize page {}", page_num))?;
    }

    doc.save(output)
        .with_context(|| format!("failed to save normalized PDF {}", output.display()))?;

    Ok(pages.len() as u32)
}

/// Wrap one page's content in a transform that maps its media box onto the
/// target rectangle, then reset the media box itself.
fn embed_page(doc: &mut Document, page_id: ObjectId, target_w: f64, target_h: f64) -> Result<()> {
    let (src_x, src_y, src_w, src_h) = media_box_rect(doc, page_id).unwrap_or((0.0, 0.0, 612.0, 792.0));

    let src_w = sanitize_dimension(src_w);
    let src_h = sanitize_dimension(src_h);
    // Intentionally non-uniform: stretch to fill, not letterbox.
    let sx = target_w / src_w;
    let sy = target_h / src_h;

    let content = doc
        .get_page_content(page_id)
        .context("failed to read page content")?;

    let mut wrapped = format!(
        "q\n{:.6} 0 0 {:.6} {:.6} {:.6} cm\n",
        sx,
        sy,
        -src_x * sx,
        -src_y * sy
    )
    .into_bytes();
    wrapped.extend_from_slice(&content);
    wrapped.extend_from_slice(b"\nQ");

    doc.change_page_content(page_id, wrapped)
        .context("failed to rewrite page content")?;

    let page_dict = doc
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .context("page object is not a dictionary")?;
    page_dict.set(
        "MediaBox",
        vec![
            0.into(),
            0.into(),
            Object::from(target_w as i64),
            Object::from(target_h as i64),
        ],
    );
    // A stale CropBox would undo the geometry change in viewers.
    page_dict.remove(b"CropBox");

    Ok(())
}

fn sanitize_dimension(dim: f64) -> f64 {
    if !dim.is_finite() || dim < MIN_DIMENSION_PT {
        MIN_DIMENSION_PT
    } else {
        dim
    }
}

/// Width and height of a page's media box.
fn media_box(doc: &Document, page_id: ObjectId) -> Option<(f64, f64)> {
    media_box_rect(doc, page_id).map(|(_, _, w, h)| (w, h))
}

/// Resolve a page's media box to (x, y, width, height), following the
/// Parent chain for inherited boxes.
fn media_box_rect(doc: &Document, page_id: ObjectId) -> Option<(f64, f64, f64, f64)> {
    let mut current = page_id;
    for _ in 0..8 {
        let dict = match doc.get_object(current) {
            Ok(Object::Dictionary(d)) => d,
            _ => return None,
        };
        if let Ok(obj) = dict.get(b"MediaBox") {
            let arr = match obj {
                Object::Array(arr) => arr,
                Object::Reference(id) => match doc.get_object(*id) {
                    Ok(Object::Array(arr)) => arr,
                    _ => return None,
                },
                _ => return None,
            };
            if arr.len() < 4 {
                return None;
            }
            let values: Vec<f64> = arr.iter().take(4).filter_map(as_number).collect();
            if values.len() < 4 {
                return None;
            }
            let (x1, y1, x2, y2) = (values[0], values[1], values[2], values[3]);
            return Some((x1, y1, x2 - x1, y2 - y1));
        }
        match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => current = *parent_id,
            _ => return None,
        }
    }
    None
}

fn as_number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}
