//! Page-selection parsing.
//!
//! Turns a user page-spec string (`"1-3, 5, 9-7"`) into a validated,
//! deduplicated, ordered set of page numbers, together with the canonical
//! (clamped, swap-corrected) form of the spec for display.

use std::collections::BTreeSet;

/// The result of parsing a page spec against a document of N pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection {
    /// Selected page numbers, deduplicated, ascending. All values lie in
    /// `[1, total_pages]`. Empty means "no selection" and is terminal for
    /// the caller.
    pub pages: BTreeSet<u32>,
    /// The spec string rewritten with clamped endpoints and corrected
    /// ranges, comma-joined. Written back as the displayed selection.
    pub canonical: String,
}

impl PageSelection {
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Comma-joined page list, ascending (the form the cost endpoint takes).
    pub fn to_page_list(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Parse a page-spec string against a document of `total_pages` pages.
///
/// Grammar: comma-separated tokens, each a single integer or `a-b`. Tokens
/// matching neither shape are silently dropped. Endpoints are clamped into
/// `[1, total_pages]`; reversed ranges are swapped before expansion.
pub fn parse_page_spec(spec: &str, total_pages: u32) -> PageSelection {
    let mut pages = BTreeSet::new();
    let mut canonical_tokens = Vec::new();

    if total_pages == 0 {
        return PageSelection {
            pages,
            canonical: String::new(),
        };
    }

    for token in spec.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if let Some((lhs, rhs)) = token.split_once('-') {
            let (Ok(a), Ok(b)) = (lhs.trim().parse::<u32>(), rhs.trim().parse::<u32>()) else {
                continue;
            };
            let a = clamp_page(a, total_pages);
            let b = clamp_page(b, total_pages);
            let (lo, hi) = if a > b { (b, a) } else { (a, b) };
            pages.extend(lo..=hi);
            if lo == hi {
                canonical_tokens.push(lo.to_string());
            } else {
                canonical_tokens.push(format!("{}-{}", lo, hi));
            }
        } else {
            let Ok(n) = token.parse::<u32>() else {
                continue;
            };
            canonical_tokens.push(clamp_page(n, total_pages).to_string());
            pages.insert(clamp_page(n, total_pages));
        }
    }

    PageSelection {
        pages,
        canonical: canonical_tokens.join(","),
    }
}

/// Same grammar as [`parse_page_spec`], but references outside
/// `[1, total_pages]` are dropped rather than clamped. Ranges are
/// intersected with the document; a range lying wholly outside it
/// contributes nothing. Used where a charge or lookup must cover only
/// pages the caller literally named.
pub fn parse_page_spec_exact(spec: &str, total_pages: u32) -> PageSelection {
    let mut pages = BTreeSet::new();
    let mut canonical_tokens = Vec::new();

    if total_pages == 0 {
        return PageSelection {
            pages,
            canonical: String::new(),
        };
    }

    for token in spec.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if let Some((lhs, rhs)) = token.split_once('-') {
            let (Ok(a), Ok(b)) = (lhs.trim().parse::<u32>(), rhs.trim().parse::<u32>()) else {
                continue;
            };
            let (lo, hi) = if a > b { (b, a) } else { (a, b) };
            let lo = lo.max(1);
            let hi = hi.min(total_pages);
            if lo > hi {
                continue;
            }
            pages.extend(lo..=hi);
            if lo == hi {
                canonical_tokens.push(lo.to_string());
            } else {
                canonical_tokens.push(format!("{}-{}", lo, hi));
            }
        } else {
            let Ok(n) = token.parse::<u32>() else {
                continue;
            };
            if n >= 1 && n <= total_pages {
                canonical_tokens.push(n.to_string());
                pages.insert(n);
            }
        }
    }

    PageSelection {
        pages,
        canonical: canonical_tokens.join(","),
    }
}

/// Mode shortcuts that bypass the grammar: `all`, `odd`, `even` filter
/// `1..=total_pages` by parity. Any other mode returns `None` and the
/// caller falls through to [`parse_page_spec`].
pub fn select_by_mode(mode: &str, total_pages: u32) -> Option<PageSelection> {
    let pages: BTreeSet<u32> = match mode {
        "all" => (1..=total_pages).collect(),
        "odd" => (1..=total_pages).filter(|p| p % 2 == 1).collect(),
        "even" => (1..=total_pages).filter(|p| p % 2 == 0).collect(),
        _ => return None,
    };
    let canonical = pages
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(",");
    Some(PageSelection { pages, canonical })
}

fn clamp_page(page: u32, total_pages: u32) -> u32 {
    page.clamp(1, total_pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(sel: &PageSelection) -> Vec<u32> {
        sel.pages.iter().copied().collect()
    }

    #[test]
    fn test_simple_list() {
        let sel = parse_page_spec("1,3,5", 10);
        assert_eq!(pages(&sel), vec![1, 3, 5]);
        assert_eq!(sel.canonical, "1,3,5");
    }

    #[test]
    fn test_reversed_range_is_swapped() {
        let sel = parse_page_spec("5-2", 10);
        assert_eq!(pages(&sel), vec![2, 3, 4, 5]);
        assert_eq!(sel.canonical, "2-5");
    }

    #[test]
    fn test_endpoints_clamped() {
        let sel = parse_page_spec("0,99", 10);
        assert_eq!(pages(&sel), vec![1, 10]);
        assert_eq!(sel.canonical, "1,10");
    }

    #[test]
    fn test_duplicates_collapse() {
        let sel = parse_page_spec("1-3, 2, 3", 10);
        assert_eq!(pages(&sel), vec![1, 2, 3]);
    }

    #[test]
    fn test_malformed_tokens_dropped() {
        let sel = parse_page_spec("1, x, 3-y, 4", 10);
        assert_eq!(pages(&sel), vec![1, 4]);
        assert_eq!(sel.canonical, "1,4");
    }

    #[test]
    fn test_empty_and_all_invalid_yield_empty() {
        assert!(parse_page_spec("", 10).is_empty());
        assert!(parse_page_spec("a,b,c", 10).is_empty());
        assert!(parse_page_spec("1,2", 0).is_empty());
    }

    #[test]
    fn test_all_values_in_range() {
        for n in 1..=20u32 {
            let sel = parse_page_spec("0-999, 7, 500-3", n);
            assert!(sel.pages.iter().all(|&p| (1..=n).contains(&p)));
        }
    }

    #[test]
    fn test_range_collapsing_to_single_page() {
        let sel = parse_page_spec("90-95", 3);
        assert_eq!(pages(&sel), vec![3]);
        assert_eq!(sel.canonical, "3");
    }

    #[test]
    fn test_exact_drops_out_of_range_references() {
        let sel = parse_page_spec_exact("1,99", 2);
        assert_eq!(pages(&sel), vec![1]);
        assert_eq!(sel.canonical, "1");
        assert!(parse_page_spec_exact("0", 2).is_empty());
    }

    #[test]
    fn test_exact_intersects_ranges_with_document() {
        let sel = parse_page_spec_exact("1-99", 2);
        assert_eq!(pages(&sel), vec![1, 2]);
        assert_eq!(sel.canonical, "1-2");
        assert!(parse_page_spec_exact("5-99", 2).is_empty());
    }

    #[test]
    fn test_exact_keeps_in_range_semantics() {
        let sel = parse_page_spec_exact("3-1, 5", 10);
        assert_eq!(pages(&sel), vec![1, 2, 3, 5]);
        assert_eq!(sel.canonical, "1-3,5");
        assert!(parse_page_spec_exact("1,2", 0).is_empty());
    }

    #[test]
    fn test_mode_shortcuts() {
        assert_eq!(
            pages(&select_by_mode("all", 4).unwrap()),
            vec![1, 2, 3, 4]
        );
        assert_eq!(pages(&select_by_mode("odd", 5).unwrap()), vec![1, 3, 5]);
        assert_eq!(pages(&select_by_mode("even", 5).unwrap()), vec![2, 4]);
        assert!(select_by_mode("custom", 5).is_none());
    }

    #[test]
    fn test_page_list_rendering() {
        let sel = parse_page_spec("3-1", 10);
        assert_eq!(sel.to_page_list(), "1,2,3");
    }
}
