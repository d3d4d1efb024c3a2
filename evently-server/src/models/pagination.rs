//! Pagination
//!
//! Pages are 1-based. The wire shape is what the frontend consumes from its
//! collaborators: `{ "data": [...], "totalPages": N, "page": N }`.

use serde::{Deserialize, Serialize};

/// Maximum items per page.
const MAX_PER_PAGE: u32 = 50;

/// Default items per page for public listings.
const DEFAULT_PER_PAGE: u32 = 6;

/// Pagination parameters
#[derive(Debug, Clone, Copy)]
pub struct Page {
    /// Page number (1-indexed).
    pub page: u32,
    /// Items per page (max 50).
    pub per_page: u32,
}

impl Page {
    /// Create pagination with validation.
    ///
    /// - Page is clamped to a minimum of 1
    /// - Per page is clamped to 1..=50
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// SQL OFFSET value.
    pub fn offset(&self) -> i64 {
        ((self.page - 1) * self.per_page) as i64
    }

    /// SQL LIMIT value.
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// One page of results plus how many pages exist in total.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paged<T> {
    pub data: Vec<T>,
    pub total_pages: u32,
    pub page: u32,
}

impl<T> Paged<T> {
    /// Build from one page of rows and the windowed total row count.
    pub fn new(data: Vec<T>, total: i64, page: Page) -> Self {
        Self {
            data,
            total_pages: total_pages(total, page.per_page),
            page: page.page,
        }
    }

    /// Convert each item, keeping the page bookkeeping.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paged<U> {
        Paged {
            data: self.data.into_iter().map(f).collect(),
            total_pages: self.total_pages,
            page: self.page,
        }
    }
}

/// An empty result set still has one (empty) page.
fn total_pages(total: i64, per_page: u32) -> u32 {
    if total <= 0 {
        1
    } else {
        (total as u32).div_ceil(per_page)
    }
}

/// Query parameters for paginated listings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl From<PageParams> for Page {
    fn from(params: PageParams) -> Self {
        Self::new(
            params.page.unwrap_or(1),
            params.per_page.unwrap_or(DEFAULT_PER_PAGE),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_calculation() {
        let p = Page::new(1, 10);
        assert_eq!(p.offset(), 0);

        let p = Page::new(2, 10);
        assert_eq!(p.offset(), 10);

        let p = Page::new(3, 25);
        assert_eq!(p.offset(), 50);
    }

    #[test]
    fn clamps_page_and_per_page() {
        let p = Page::new(0, 10);
        assert_eq!(p.page, 1);

        let p = Page::new(1, 0);
        assert_eq!(p.per_page, 1);

        let p = Page::new(1, 999);
        assert_eq!(p.per_page, MAX_PER_PAGE);
    }

    #[test]
    fn total_pages_rounds_up() {
        let paged = Paged::new(Vec::<()>::new(), 0, Page::new(1, 10));
        assert_eq!(paged.total_pages, 1);

        let paged = Paged::new(Vec::<()>::new(), 25, Page::new(1, 10));
        assert_eq!(paged.total_pages, 3);

        let paged = Paged::new(Vec::<()>::new(), 100, Page::new(1, 10));
        assert_eq!(paged.total_pages, 10);
    }

    #[test]
    fn wire_shape_is_camel_case() {
        let paged = Paged::new(vec![1, 2, 3], 7, Page::new(2, 3));
        let json = serde_json::to_value(&paged).expect("serializes");
        assert_eq!(json["data"], serde_json::json!([1, 2, 3]));
        assert_eq!(json["totalPages"], 3);
        assert_eq!(json["page"], 2);
    }

    #[test]
    fn params_default_when_absent() {
        let page = Page::from(PageParams::default());
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, DEFAULT_PER_PAGE);
    }
}
