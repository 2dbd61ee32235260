//! Current-page tracking for scroll and navigation.
//!
//! Holds a page number and nothing else; it never sees entities.

use tracing::trace;

/// Tracks which page is "current" as pages scroll in and out of view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSync {
    current: usize,
    page_count: usize,
    threshold: f64,
}

impl ViewSync {
    pub fn new(page_count: usize, threshold: f64) -> Self {
        Self {
            current: 0,
            page_count,
            threshold,
        }
    }

    /// Zero-based current page.
    pub fn current_page(&self) -> usize {
        self.current
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Reports that `visible_ratio` of `page` is on screen. The page becomes
    /// current once the ratio reaches the threshold. Returns true when the
    /// current page changed.
    pub fn observe(&mut self, page: usize, visible_ratio: f64) -> bool {
        if page >= self.page_count || !(visible_ratio >= self.threshold) {
            return false;
        }
        let changed = self.current != page;
        if changed {
            trace!(from = self.current, to = page, visible_ratio, "current page changed");
            self.current = page;
        }
        changed
    }

    /// Jumps to `page`, clamped to the document.
    pub fn go_to(&mut self, page: usize) -> usize {
        self.current = page.min(self.page_count.saturating_sub(1));
        self.current
    }

    pub fn next_page(&mut self) -> usize {
        self.go_to(self.current + 1)
    }

    pub fn previous_page(&mut self) -> usize {
        self.go_to(self.current.saturating_sub(1))
    }

    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.page_count
    }
}
