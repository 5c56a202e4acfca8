//! Page cursor for offset-paginated listings.

use core::num::NonZeroU32;

/// Default number of products per page.
pub const DEFAULT_PAGE_SIZE: NonZeroU32 = NonZeroU32::new(10).expect("10 is non-zero");

/// Which slice of a paginated result set is displayed.
///
/// `total_pages` is fetched separately from the pages themselves and is
/// `None` until that fetch succeeds. Once known, `page_index` stays within
/// `0..total_pages`; with zero pages the index is pinned at 0 and both
/// directions are disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    page_index: u32,
    page_size: NonZeroU32,
    total_pages: Option<u32>,
}

impl PageCursor {
    /// A cursor on the first page with an unknown total.
    #[must_use]
    pub const fn new(page_size: NonZeroU32) -> Self {
        Self {
            page_index: 0,
            page_size,
            total_pages: None,
        }
    }

    #[must_use]
    pub const fn page_index(&self) -> u32 {
        self.page_index
    }

    #[must_use]
    pub const fn page_size(&self) -> NonZeroU32 {
        self.page_size
    }

    #[must_use]
    pub const fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    /// Record the total page count, clamping the index back into range.
    pub const fn set_total_pages(&mut self, total: u32) {
        self.total_pages = Some(total);
        if total == 0 {
            self.page_index = 0;
        } else if self.page_index >= total {
            self.page_index = total - 1;
        }
    }

    /// Number of items to skip for the current page.
    #[must_use]
    pub fn skip(&self) -> u64 {
        self.offset_of(self.page_index)
    }

    /// Number of items to skip for an arbitrary page index.
    #[must_use]
    pub fn offset_of(&self, page_index: u32) -> u64 {
        u64::from(page_index) * u64::from(self.page_size.get())
    }

    /// Whether there is at least one page to fetch.
    #[must_use]
    pub const fn has_pages(&self) -> bool {
        matches!(self.total_pages, Some(total) if total > 0)
    }

    /// Whether `page_index` is a valid page under the known total.
    #[must_use]
    pub const fn contains(&self, page_index: u32) -> bool {
        matches!(self.total_pages, Some(total) if page_index < total)
    }

    #[must_use]
    pub const fn can_prev(&self) -> bool {
        self.has_pages() && self.page_index > 0
    }

    #[must_use]
    pub const fn can_next(&self) -> bool {
        match self.total_pages {
            Some(total) if total > 0 => self.page_index < total - 1,
            _ => false,
        }
    }

    /// Index of the previous page, if moving back is allowed.
    #[must_use]
    pub const fn prev_index(&self) -> Option<u32> {
        if self.can_prev() {
            Some(self.page_index - 1)
        } else {
            None
        }
    }

    /// Index of the next page, if moving forward is allowed.
    #[must_use]
    pub const fn next_index(&self) -> Option<u32> {
        if self.can_next() {
            Some(self.page_index + 1)
        } else {
            None
        }
    }

    /// Move to `page_index` after its page has been fetched.
    ///
    /// Returns `false` and leaves the cursor unchanged if the index is out of
    /// range.
    pub const fn move_to(&mut self, page_index: u32) -> bool {
        if self.contains(page_index) {
            self.page_index = page_index;
            true
        } else {
            false
        }
    }

    /// Human-readable position, e.g. `Page: 2 of 5`.
    ///
    /// With no pages (or an unknown total) this reads `Page: 0 of 0`.
    #[must_use]
    pub fn label(&self) -> String {
        match self.total_pages {
            Some(total) if total > 0 => format!("Page: {} of {total}", self.page_index + 1),
            _ => "Page: 0 of 0".to_owned(),
        }
    }
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}
