//! Pagination types for history listings.

use serde::{Deserialize, Serialize};

use super::DomainError;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Validated page request. `page` and `paginate` are both >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    paginate: i64,
}

impl PageRequest {
    pub fn new(page: i64, paginate: i64) -> Result<Self, DomainError> {
        if page < 1 {
            return Err(DomainError::validation("page", "must be at least 1"));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&paginate) {
            return Err(DomainError::validation(
                "paginate",
                format!("must be between 1 and {}", MAX_PAGE_SIZE),
            ));
        }
        Ok(Self { page, paginate })
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn paginate(&self) -> i64 {
        self.paginate
    }

    pub fn offset(&self) -> i64 {
        self.paginate * (self.page - 1)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            paginate: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: i64,
    pub paginate: i64,
    pub total_data: i64,
    pub total_page: i64,
}

impl PageMeta {
    pub fn new(request: PageRequest, total_data: i64) -> Self {
        let total_page = if total_data == 0 {
            0
        } else {
            (total_data + request.paginate - 1) / request.paginate
        };

        Self {
            page: request.page,
            paginate: request.paginate,
            total_data,
            total_page,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}
