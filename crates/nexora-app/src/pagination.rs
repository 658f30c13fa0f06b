// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::ops::Range;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Number of pages needed for `len` rows. Never less than one.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    len.div_ceil(page_size).max(1)
}

/// Pulls `page` back into `[1, total_pages]`.
pub fn clamp_page(page: usize, len: usize, page_size: usize) -> usize {
    page.clamp(1, total_pages(len, page_size))
}

/// Index range of the rows shown on `page` (1-indexed).
pub fn page_range(page: usize, len: usize, page_size: usize) -> Range<usize> {
    let page_size = page_size.max(1);
    let start = page.saturating_sub(1).saturating_mul(page_size).min(len);
    let end = start.saturating_add(page_size).min(len);
    start..end
}

/// Footer text, e.g. `Showing 1-10 of 11 entries`.
pub fn page_summary(page: usize, len: usize, page_size: usize) -> String {
    let range = page_range(page, len, page_size);
    if range.is_empty() {
        return format!("Showing 0-0 of {len} entries");
    }
    format!("Showing {}-{} of {len} entries", range.start + 1, range.end)
}

#[cfg(test)]
mod tests {
    use super::{clamp_page, page_range, page_summary, total_pages};

    #[test]
    fn total_pages_is_at_least_one() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(21, 10), 3);
    }

    #[test]
    fn zero_page_size_behaves_like_one() {
        assert_eq!(total_pages(3, 0), 3);
        assert_eq!(page_range(2, 3, 0), 1..2);
    }

    #[test]
    fn last_page_is_partial() {
        assert_eq!(page_range(1, 11, 10), 0..10);
        assert_eq!(page_range(2, 11, 10), 10..11);
        assert_eq!(page_range(3, 11, 10), 11..11);
    }

    #[test]
    fn clamp_pulls_page_into_range() {
        assert_eq!(clamp_page(0, 11, 10), 1);
        assert_eq!(clamp_page(5, 11, 10), 2);
        assert_eq!(clamp_page(2, 9, 10), 1);
    }

    #[test]
    fn summary_matches_footer_text() {
        assert_eq!(page_summary(2, 11, 10), "Showing 11-11 of 11 entries");
        assert_eq!(page_summary(1, 11, 10), "Showing 1-10 of 11 entries");
        assert_eq!(page_summary(1, 0, 10), "Showing 0-0 of 0 entries");
    }
}
