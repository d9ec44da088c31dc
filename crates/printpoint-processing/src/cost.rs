//! Cost quoting. Resolves the selected pages against the cache, applies the
//! grayscale transform for bw quotes, scans ink usage, and prices the job.
//!
//! Quoting mutates the cached page files in place when the mode is bw, so a
//! later color quote on the same basename requires a fresh upload.

use crate::{coverage, grayscale};
use printpoint_cache::{validate_basename, PageCache};
use printpoint_core::models::{ColorMode, PaperSize};
use printpoint_core::pages::{parse_page_spec_exact, select_by_mode, PageSelection};
use printpoint_core::AppError;

const BASE_COST_COLOR: f64 = 10.0;
const BASE_COST_BW: f64 = 5.0;
const INK_SURCHARGE_PER_BAND: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostBreakdown {
    pub total_cost: i64,
    pub used_sections: u32,
    pub total_pages: u32,
}

/// Quote a print job against the cached rendering of `basename`.
///
/// Per-page scanning is sequential on purpose; each page is a full decoded
/// pixel buffer and the kiosk hardware is memory-constrained.
pub async fn calculate_cost(
    cache: &dyn PageCache,
    paper: PaperSize,
    basename: &str,
    color: ColorMode,
    pages_spec: &str,
    copies: u32,
) -> Result<CostBreakdown, AppError> {
    validate_basename(basename)?;
    if copies == 0 {
        return Err(AppError::InvalidInput(
            "copies must be at least 1".to_string(),
        ));
    }

    let cached = cache.list(paper, basename).await?;
    if cached.is_empty() {
        return Err(AppError::CacheMiss(format!(
            "no rendered pages for '{}' on {} paper",
            basename, paper
        )));
    }
    let cached_pages = cached.last().map(|p| p.page_index).unwrap_or(0);

    let selection = resolve_selection(pages_spec, cached_pages);
    if selection.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "no valid page numbers in '{}'",
            pages_spec
        )));
    }

    let matched = cache.lookup(paper, basename, &selection.pages).await?;
    if matched.is_empty() {
        return Err(AppError::CacheMiss(format!(
            "selected pages not cached for '{}' on {} paper",
            basename, paper
        )));
    }

    let mut used_sections = 0;
    for page in &matched {
        let path = page.path.clone();
        let bands = tokio::task::spawn_blocking(move || -> anyhow::Result<u32> {
            if color == ColorMode::Bw {
                grayscale::convert_to_grayscale(&path)?;
            }
            coverage::scan_used_bands(&path)
        })
        .await
        .map_err(|err| AppError::Internal(format!("scan task panicked: {}", err)))??;
        used_sections += bands;
    }

    let total_pages = matched.len() as u32;
    let total_cost = price(color, total_pages, used_sections, copies);

    tracing::debug!(
        basename,
        paper = %paper,
        color = ?color,
        total_pages,
        used_sections,
        copies,
        total_cost,
        "computed cost quote"
    );

    Ok(CostBreakdown {
        total_cost,
        used_sections,
        total_pages,
    })
}

/// Price a job from its scanned usage. The ink surcharge applies only to
/// color jobs; bw jobs pay the flat per-page rate regardless of usage.
fn price(color: ColorMode, pages: u32, used_sections: u32, copies: u32) -> i64 {
    let base_per_page = match color {
        ColorMode::Color => BASE_COST_COLOR,
        ColorMode::Bw => BASE_COST_BW,
    };
    let surcharge = match color {
        ColorMode::Color => f64::from(used_sections) * INK_SURCHARGE_PER_BAND,
        ColorMode::Bw => 0.0,
    };
    ((base_per_page * f64::from(pages) + surcharge) * f64::from(copies)).round() as i64
}

/// The pages field carries either a mode shortcut (all/odd/even) or a
/// page-spec string; both resolve against the highest cached page index.
/// References to pages past that index are dropped, not clamped, so the
/// quote only ever covers pages the request literally named.
fn resolve_selection(pages_spec: &str, total_pages: u32) -> PageSelection {
    select_by_mode(pages_spec.trim(), total_pages)
        .unwrap_or_else(|| parse_page_spec_exact(pages_spec, total_pages))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_color_no_ink() {
        assert_eq!(price(ColorMode::Color, 3, 0, 2), 60);
    }

    #[test]
    fn test_price_bw_suppresses_surcharge() {
        assert_eq!(price(ColorMode::Bw, 3, 4, 2), 30);
    }

    #[test]
    fn test_price_color_with_surcharge_rounds() {
        // (10*1 + 0.5*3) * 1 = 11.5 rounds to 12.
        assert_eq!(price(ColorMode::Color, 1, 3, 1), 12);
    }

    #[test]
    fn test_resolve_selection_spec_and_modes() {
        let spec = resolve_selection("1, 3,5-7", 10);
        assert_eq!(
            spec.pages.into_iter().collect::<Vec<_>>(),
            vec![1, 3, 5, 6, 7]
        );
        let odd = resolve_selection("odd", 5);
        assert_eq!(odd.pages.into_iter().collect::<Vec<_>>(), vec![1, 3, 5]);
        let all = resolve_selection("all", 3);
        assert_eq!(all.pages.len(), 3);
    }

    #[test]
    fn test_resolve_selection_garbage_is_empty() {
        assert!(resolve_selection("x,y", 10).is_empty());
        assert!(resolve_selection("", 10).is_empty());
    }

    mod with_cache {
        use super::*;
        use image::{Rgb, RgbImage};
        use printpoint_cache::LocalPageCache;
        use tempfile::tempdir;

        async fn cache_with_pages(
            root: &std::path::Path,
            colored_pages: &[bool],
        ) -> LocalPageCache {
            let cache = LocalPageCache::new(root.to_path_buf(), "/previews".to_string())
                .await
                .unwrap();
            for (i, colored) in colored_pages.iter().enumerate() {
                let mut img = RgbImage::from_pixel(60, 120, Rgb([255, 255, 255]));
                if *colored {
                    img.put_pixel(5, 5, Rgb([220, 30, 30]));
                }
                let path = root
                    .join(PaperSize::Letter.as_str())
                    .join(format!("doc_{}.png", i + 1));
                img.save(path).unwrap();
            }
            cache
        }

        #[tokio::test]
        async fn test_color_quote_includes_surcharge() {
            let dir = tempdir().unwrap();
            // One band inked on each of two pages.
            let cache = cache_with_pages(dir.path(), &[true, true]).await;

            let quote = calculate_cost(&cache, PaperSize::Letter, "doc", ColorMode::Color, "1,2", 2)
                .await
                .unwrap();
            assert_eq!(quote.total_pages, 2);
            assert_eq!(quote.used_sections, 2);
            // (10*2 + 0.5*2) * 2 = 42
            assert_eq!(quote.total_cost, 42);
        }

        #[tokio::test]
        async fn test_bw_quote_converts_pages_and_skips_surcharge() {
            let dir = tempdir().unwrap();
            let cache = cache_with_pages(dir.path(), &[true]).await;

            let quote = calculate_cost(&cache, PaperSize::Letter, "doc", ColorMode::Bw, "1", 3)
                .await
                .unwrap();
            // The grayscale transform ran first, so the colored pixel no
            // longer counts as ink.
            assert_eq!(quote.used_sections, 0);
            assert_eq!(quote.total_cost, 15);
        }

        #[tokio::test]
        async fn test_unmatched_basename_is_cache_miss() {
            let dir = tempdir().unwrap();
            let cache = cache_with_pages(dir.path(), &[true]).await;

            let err = calculate_cost(&cache, PaperSize::Letter, "ghost", ColorMode::Color, "1", 1)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::CacheMiss(_)));
        }

        #[tokio::test]
        async fn test_out_of_range_pages_are_not_charged() {
            let dir = tempdir().unwrap();
            let cache = cache_with_pages(dir.path(), &[false, false]).await;

            // Page 99 does not exist, so only page 1 is priced.
            let quote = calculate_cost(&cache, PaperSize::Letter, "doc", ColorMode::Color, "1,99", 1)
                .await
                .unwrap();
            assert_eq!(quote.total_pages, 1);
            assert_eq!(quote.total_cost, 10);

            // A range is trimmed to the cached pages it overlaps.
            let quote = calculate_cost(&cache, PaperSize::Letter, "doc", ColorMode::Color, "1-99", 1)
                .await
                .unwrap();
            assert_eq!(quote.total_pages, 2);
            assert_eq!(quote.total_cost, 20);
        }

        #[tokio::test]
        async fn test_wholly_out_of_range_spec_is_invalid() {
            let dir = tempdir().unwrap();
            let cache = cache_with_pages(dir.path(), &[false, false]).await;

            let err = calculate_cost(&cache, PaperSize::Letter, "doc", ColorMode::Color, "5-99", 1)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::InvalidInput(_)));
        }

        #[tokio::test]
        async fn test_mode_shortcut_selects_by_parity() {
            let dir = tempdir().unwrap();
            let cache = cache_with_pages(dir.path(), &[false, false, false]).await;

            let quote = calculate_cost(&cache, PaperSize::Letter, "doc", ColorMode::Bw, "odd", 1)
                .await
                .unwrap();
            assert_eq!(quote.total_pages, 2);
            assert_eq!(quote.total_cost, 10);
        }
    }
}
