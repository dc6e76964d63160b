//! Pagination contract shared by the store port and the query service.

use crate::error::{OrderError, Result};
use serde::{Deserialize, Serialize};

/// A zero-based page request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    page_number: u32,
    page_size: u32,
}

impl PageRequest {
    /// Create a page request.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidPageRequest`] if `page_size` is zero.
    pub fn new(page_number: u32, page_size: u32) -> Result<Self> {
        if page_size == 0 {
            return Err(OrderError::InvalidPageRequest(
                "page size must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            page_number,
            page_size,
        })
    }

    /// Zero-based page index
    #[must_use]
    pub const fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Maximum number of elements in the page
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of elements to skip before this page starts.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.page_number as u64 * self.page_size as u64
    }
}

/// One page of a larger result set, plus metadata describing the whole set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult<T> {
    /// Elements of this page, in store order
    pub content: Vec<T>,
    /// Zero-based page index
    pub page_number: u32,
    /// Requested page size
    pub page_size: u32,
    /// Number of elements across all pages
    pub total_elements: u64,
    /// `ceil(total_elements / page_size)`
    pub total_pages: u64,
}

impl<T> PageResult<T> {
    /// Build a page, deriving `total_pages` from `total_elements`.
    #[must_use]
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        Self {
            content,
            page_number: request.page_number(),
            page_size: request.page_size(),
            total_elements,
            total_pages: total_pages(total_elements, request.page_size()),
        }
    }

    /// An empty page for `request`.
    #[must_use]
    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), request, 0)
    }

    /// Transform the page content, keeping the metadata.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> PageResult<U>
    where
        F: FnMut(T) -> U,
    {
        PageResult {
            content: self.content.into_iter().map(f).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}

/// `ceil(total_elements / page_size)`, zero when there are no elements.
#[must_use]
pub const fn total_pages(total_elements: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total_elements.div_ceil(page_size as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_page_size_rejected() {
        assert!(matches!(
            PageRequest::new(0, 0),
            Err(OrderError::InvalidPageRequest(_))
        ));
    }

    #[test]
    fn test_offset() {
        let request = PageRequest::new(3, 10).unwrap();
        assert_eq!(request.offset(), 30);
    }

    #[test]
    fn test_empty_page_has_no_pages() {
        let page: PageResult<u8> = PageResult::empty(PageRequest::new(0, 10).unwrap());
        assert_eq!(page.total_elements, 0);
        assert_eq!(page.total_pages, 0);
        assert!(page.content.is_empty());
    }

    #[test]
    fn test_map_keeps_metadata() {
        let request = PageRequest::new(1, 2).unwrap();
        let page = PageResult::new(vec![1, 2], request, 5).map(|n| n * 10);

        assert_eq!(page.content, vec![10, 20]);
        assert_eq!(page.page_number, 1);
        assert_eq!(page.page_size, 2);
        assert_eq!(page.total_elements, 5);
        assert_eq!(page.total_pages, 3);
    }

    proptest! {
        #[test]
        fn prop_total_pages_is_ceiling(total in 0u64..1_000_000, size in 1u32..500) {
            let pages = total_pages(total, size);
            let size = u64::from(size);
            prop_assert!(pages * size >= total);
            if total > 0 {
                prop_assert!((pages - 1) * size < total);
            } else {
                prop_assert_eq!(pages, 0);
            }
        }
    }
}
