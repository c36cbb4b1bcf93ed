//! Search session presets.

use std::time::Duration;

/// Page size of the inline search preview.
pub const PREVIEW_PAGE_SIZE: u32 = 12;

/// Page size of the dedicated results page.
pub const RESULTS_PAGE_SIZE: u32 = 100;

/// Quiet period before a first-page request is sent.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    pub page_size: u32,
    pub debounce: Duration,
    /// Whether `request_next_page` may load further pages.
    pub paginate: bool,
}

impl SearchConfig {
    /// Small, single-page session for a search box dropdown.
    pub fn preview() -> Self {
        Self {
            page_size: PREVIEW_PAGE_SIZE,
            debounce: DEFAULT_DEBOUNCE,
            paginate: false,
        }
    }

    /// Large, paginated session for a full results view.
    pub fn results_page() -> Self {
        Self {
            page_size: RESULTS_PAGE_SIZE,
            debounce: DEFAULT_DEBOUNCE,
            paginate: true,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Typing only debounces the first page; later pages are deliberate.
    pub fn debounce_for(&self, page: u32) -> Duration {
        if page <= 1 {
            self.debounce
        } else {
            Duration::ZERO
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::results_page()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(SearchConfig::preview().page_size, 12);
        assert!(!SearchConfig::preview().paginate);
        assert_eq!(SearchConfig::results_page().page_size, 100);
        assert!(SearchConfig::results_page().paginate);
    }

    #[test]
    fn test_only_first_page_is_debounced() {
        let config = SearchConfig::default();
        assert_eq!(config.debounce_for(1), Duration::from_millis(300));
        assert_eq!(config.debounce_for(2), Duration::ZERO);
    }

    #[test]
    fn test_page_size_is_never_zero() {
        assert_eq!(SearchConfig::preview().with_page_size(0).page_size, 1);
    }
}
