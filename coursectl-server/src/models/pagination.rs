//! Paging for the course catalog

use serde::{Deserialize, Serialize};

const MAX_PER_PAGE: u32 = 100;
const DEFAULT_PER_PAGE: u32 = 30;

/// Query parameters, e.g. `/courses?page=2&per_page=10`
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Clamped page window (1-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub per_page: u32,
}

impl Page {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(1, DEFAULT_PER_PAGE)
    }
}

impl From<PageParams> for Page {
    fn from(params: PageParams) -> Self {
        Self::new(
            params.page.unwrap_or(1),
            params.per_page.unwrap_or(DEFAULT_PER_PAGE),
        )
    }
}

/// One page of results plus the overall count
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, page: Page) -> Self {
        Self {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        }
    }
}
