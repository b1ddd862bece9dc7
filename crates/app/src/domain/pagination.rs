//! Pagination

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Largest page a caller may request.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Rejected page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// Pages are numbered from 1.
    #[error("page must be at least 1")]
    PageOutOfRange,

    /// Limit must be within `1..=MAX_PAGE_LIMIT`.
    #[error("limit must be between 1 and {MAX_PAGE_LIMIT}")]
    LimitOutOfRange,
}

/// One-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl PageRequest {
    /// Build a checked page request.
    ///
    /// # Errors
    ///
    /// Returns an error when `page` is zero or `limit` is outside `1..=MAX_PAGE_LIMIT`.
    pub fn new(page: u32, limit: u32) -> Result<Self, PaginationError> {
        let request = Self { page, limit };

        request.validate()?;

        Ok(request)
    }

    /// Check bounds on a request that may have been built field by field.
    ///
    /// # Errors
    ///
    /// Returns an error when `page` is zero or `limit` is outside `1..=MAX_PAGE_LIMIT`.
    pub fn validate(&self) -> Result<(), PaginationError> {
        if self.page == 0 {
            return Err(PaginationError::PageOutOfRange);
        }

        if self.limit == 0 || self.limit > MAX_PAGE_LIMIT {
            return Err(PaginationError::LimitOutOfRange);
        }

        Ok(())
    }

    pub(crate) fn sql_limit(&self) -> i64 {
        i64::from(self.limit)
    }

    pub(crate) fn sql_offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
    }
}

/// A page of results together with the size of the whole filtered set.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub entries: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    pub(crate) fn new(entries: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            entries,
            total,
            page: request.page,
            limit: request.limit,
        }
    }

    /// Number of pages needed to show `total` entries.
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }

        self.total.div_ceil(u64::from(self.limit))
    }
}
