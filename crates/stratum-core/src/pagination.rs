//! Pagination types for list operations.

use serde::{Deserialize, Serialize};

/// A request for a page of results.
///
/// Pages are numbered from 1, matching the `page` segment of listing cache
/// keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// The page number (1-indexed).
    pub page: u32,
    /// The number of items per page.
    pub limit: u32,
}

impl PageRequest {
    /// The default page size.
    pub const DEFAULT_LIMIT: u32 = 20;
    /// The maximum allowed page size.
    pub const MAX_LIMIT: u32 = 100;

    /// Creates a new page request, clamping the page to at least 1 and the
    /// limit to `1..=MAX_LIMIT`.
    #[must_use]
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, Self::MAX_LIMIT),
        }
    }

    /// Creates a page request for the first page with default size.
    #[must_use]
    pub fn first() -> Self {
        Self::new(1, Self::DEFAULT_LIMIT)
    }

    /// Returns the number of rows to skip in database queries.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

/// A page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// The items on this page.
    pub content: Vec<T>,
    /// The current page number (1-indexed).
    pub page: u32,
    /// The number of items per page.
    pub limit: u32,
    /// The total number of items across all pages.
    pub total_elements: u64,
}

impl<T> Page<T> {
    /// Creates a new page.
    #[must_use]
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        Self {
            content,
            page: request.page,
            limit: request.limit,
            total_elements,
        }
    }

    /// Creates an empty page.
    #[must_use]
    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), request, 0)
    }

    /// Maps the page content to a different type.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total_elements: self.total_elements,
        }
    }

    /// Returns true if the page is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Returns the number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Returns the total number of pages.
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total_elements.div_ceil(u64::from(self.limit))
    }

    /// Returns true if there is a next page.
    #[must_use]
    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.content.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_offset() {
        assert_eq!(PageRequest::new(1, 20).offset(), 0);
        assert_eq!(PageRequest::new(2, 20).offset(), 20);
        assert_eq!(PageRequest::new(5, 15).offset(), 60);
    }

    #[test]
    fn test_page_request_clamps() {
        let req = PageRequest::new(0, 1000);
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, PageRequest::MAX_LIMIT);

        let req = PageRequest::new(3, 0);
        assert_eq!(req.limit, 1);
    }

    #[test]
    fn test_page_request_default() {
        let req = PageRequest::default();
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, PageRequest::DEFAULT_LIMIT);
    }

    #[test]
    fn test_page_navigation() {
        let page = Page::new(vec![1, 2, 3], PageRequest::new(1, 10), 25);
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());

        let last = Page::new(vec![1, 2], PageRequest::new(3, 10), 22);
        assert!(!last.has_next());
    }

    #[test]
    fn test_page_map() {
        let page = Page::new(vec![1, 2, 3], PageRequest::first(), 3);
        let mapped = page.map(|x| x * 2);
        assert_eq!(mapped.content, vec![2, 4, 6]);
        assert_eq!(mapped.total_elements, 3);
    }

    #[test]
    fn test_page_empty() {
        let page: Page<i32> = Page::empty(PageRequest::first());
        assert!(page.is_empty());
        assert_eq!(page.len(), 0);
        assert_eq!(page.total_pages(), 0);
        assert!(!page.has_next());
    }
}
