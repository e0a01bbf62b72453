//! Page arithmetic for fixed-size result pages.

use seoquery_api::{MAX_PAGE, PAGE_SIZE};
use serde::Serialize;

/// Position within a paged result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// 1-based page number, at most `MAX_PAGE`.
    pub page: u32,
    /// Total matching items as reported by the server.
    pub total_count: i64,
}

impl Pagination {
    pub fn new(page: u32, total_count: i64) -> Self {
        Self {
            page: page.clamp(1, MAX_PAGE),
            total_count: total_count.max(0),
        }
    }

    pub fn offset(&self) -> u32 {
        (self.page.clamp(1, MAX_PAGE) - 1) * PAGE_SIZE
    }

    /// `ceil(total_count / PAGE_SIZE)`; zero for an empty result.
    pub fn total_pages(&self) -> u32 {
        let size = PAGE_SIZE as i64;
        let total = self.total_count.max(0);
        let pages = total / size + i64::from(total % size != 0);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// 1-based index range of the items on this page, e.g. `(201, 250)`.
    /// `None` when the page lies past the end of the results.
    pub fn item_range(&self) -> Option<(i64, i64)> {
        let first = self.offset() as i64 + 1;
        if first > self.total_count {
            return None;
        }
        let last = (self.offset() as i64 + PAGE_SIZE as i64).min(self.total_count);
        Some((first, last))
    }

    /// Label such as `201-250 of 250`.
    pub fn label(&self) -> String {
        match self.item_range() {
            Some((first, last)) => format!("{}-{} of {}", first, last, self.total_count),
            None => format!("0 of {}", self.total_count),
        }
    }

    /// Up to `width` page numbers centred on the current page, clamped to
    /// the available pages.
    pub fn window(&self, width: u32) -> Vec<u32> {
        let total = self.total_pages();
        if total == 0 || width == 0 {
            return Vec::new();
        }
        let width = width.min(total);
        let half = width / 2;
        let start = self
            .page
            .saturating_sub(half)
            .max(1)
            .min(total - width + 1);
        (start..start + width).collect()
    }
}
