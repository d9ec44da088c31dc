//! Ink-usage scanning. A page image is split into 12 horizontal bands and a
//! band counts as "used" when any of its pixels is not a neutral gray. The
//! count drives the ink surcharge in the cost model; band granularity keeps
//! the estimate stable against minor rendering artifacts.

use anyhow::{Context, Result};
use image::RgbImage;
use std::path::Path;

pub const BAND_COUNT: u32 = 12;

/// Count the used bands of one page image.
pub fn scan_used_bands(path: &Path) -> Result<u32> {
    let img = image::open(path)
        .with_context(|| format!("failed to open page image {}", path.display()))?
        .into_rgb8();
    Ok(count_used_bands(&img))
}

fn count_used_bands(img: &RgbImage) -> u32 {
    let (width, height) = img.dimensions();
    if height == 0 || width == 0 {
        return 0;
    }

    let band_height = (height / BAND_COUNT).max(1);
    let mut used = 0;
    for band in 0..BAND_COUNT {
        let start = band * band_height;
        if start >= height {
            break;
        }
        // The last band absorbs the integer-division remainder.
        let end = if band == BAND_COUNT - 1 {
            height
        } else {
            ((band + 1) * band_height).min(height)
        };
        if band_has_ink(img, start, end) {
            used += 1;
        }
    }
    used
}

fn band_has_ink(img: &RgbImage, start_row: u32, end_row: u32) -> bool {
    for y in start_row..end_row {
        for x in 0..img.width() {
            let p = img.get_pixel(x, y);
            if p[0] != p[1] || p[1] != p[2] {
                return true;
            }
        }
    }
    false
}
