//! Page cursor arithmetic.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Page cursor over a server-side collection.
///
/// `page` is 1-based and never below 1. `total` is the item count the server
/// last reported for the current filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    page: u32,
    limit: NonZeroU32,
    total: u64,
}

impl Pagination {
    /// First page of an unknown-size collection.
    #[must_use]
    pub const fn new(limit: NonZeroU32) -> Self {
        Self {
            page: 1,
            limit,
            total: 0,
        }
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn limit(&self) -> NonZeroU32 {
        self.limit
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// `ceil(total / limit)`; 0 when nothing is known.
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.limit.get()))
    }

    /// Last reachable page, at least 1.
    fn last_page(&self) -> u32 {
        u32::try_from(self.total_pages()).unwrap_or(u32::MAX).max(1)
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.last_page()
    }

    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Advance one page, never past the last known page.
    pub fn next(&mut self) {
        self.page = self.page.saturating_add(1).min(self.last_page());
    }

    /// Go back one page, never below 1.
    pub fn prev(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    /// Jump to `page`, clamped to `[1, last page]`.
    pub fn set_page(&mut self, page: u32) {
        self.page = page.clamp(1, self.last_page());
    }

    /// Back to the first page.
    pub const fn reset(&mut self) {
        self.page = 1;
    }

    /// Record the server-reported total.
    pub const fn set_total(&mut self, total: u64) {
        self.total = total;
    }

    /// Change the page size. The old page number is meaningless afterwards,
    /// so the cursor returns to page 1.
    pub const fn set_limit(&mut self, limit: NonZeroU32) {
        self.limit = limit;
        self.page = 1;
    }
}
