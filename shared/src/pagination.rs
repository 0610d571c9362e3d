//! Page-number pagination envelope

use serde::{Deserialize, Serialize};

/// Fixed page size for every paginated list
pub const PAGE_SIZE: u32 = 20;

/// Requested page, already normalized (1-based, never zero)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
}

impl PageRequest {
    /// Parse a raw `page` query value. Missing, non-numeric or zero values fall back to page 1.
    pub fn from_raw(raw: Option<&str>) -> Self {
        let page = raw
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);
        Self { page }
    }

    pub fn limit(&self) -> i64 {
        i64::from(PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(PAGE_SIZE)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1 }
    }
}

/// Paginated list response
///
/// `next`/`previous` carry page numbers rather than URLs; a page past the end
/// yields empty `results` while `count` still reports the full total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub next: Option<u32>,
    pub previous: Option<u32>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, count: i64, request: PageRequest) -> Self {
        let count = count.max(0);
        let total_pages = u32::try_from((count + i64::from(PAGE_SIZE) - 1) / i64::from(PAGE_SIZE))
            .unwrap_or(u32::MAX);
        let page = request.page;
        Self {
            count,
            page,
            page_size: PAGE_SIZE,
            total_pages,
            next: (page < total_pages).then(|| page + 1),
            previous: (page > 1).then(|| (page - 1).min(total_pages.max(1))),
            results,
        }
    }

    /// Transform every result while keeping the pagination metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_parsing() {
        assert_eq!(PageRequest::from_raw(None).page, 1);
        assert_eq!(PageRequest::from_raw(Some("abc")).page, 1);
        assert_eq!(PageRequest::from_raw(Some("0")).page, 1);
        assert_eq!(PageRequest::from_raw(Some("-3")).page, 1);
        assert_eq!(PageRequest::from_raw(Some(" 3 ")).page, 3);
        assert_eq!(PageRequest::from_raw(Some("3")).offset(), 40);
    }

    #[test]
    fn test_page_metadata() {
        let page = Page::new(vec![1; 20], 45, PageRequest { page: 2 });
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.next, Some(3));
        assert_eq!(page.previous, Some(1));

        let first = Page::new(vec![1; 20], 45, PageRequest::default());
        assert_eq!(first.previous, None);
        assert_eq!(first.next, Some(2));
    }

    #[test]
    fn test_page_past_the_end_is_empty() {
        let page: Page<i32> = Page::new(vec![], 5, PageRequest { page: 9 });
        assert_eq!(page.count, 5);
        assert!(page.results.is_empty());
        assert_eq!(page.next, None);
        assert_eq!(page.previous, Some(1));
    }

    #[test]
    fn test_empty_listing() {
        let page: Page<i32> = Page::new(vec![], 0, PageRequest::default());
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.next, None);
        assert_eq!(page.previous, None);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let page = Page::new(vec![1, 2], 2, PageRequest::default()).map(|n| n * 10);
        assert_eq!(page.results, vec![10, 20]);
        assert_eq!(page.count, 2);
    }
}
