//! Page-based pagination for list endpoints.
//!
//! Handlers accept [`PaginationParams`] (usually flattened into a larger query
//! struct) and return a [`PaginationMeta`] next to the page of data:
//!
//! ```json
//! {
//!   "data": [...],
//!   "meta": {
//!     "total": 42,
//!     "page": 2,
//!     "limit": 10,
//!     "total_pages": 5,
//!     "has_next_page": true,
//!     "has_prev_page": true
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::serde::deserialize_optional_i64;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Query parameters for page-based pagination.
///
/// - `page` is 1-indexed and clamped to a minimum of 1 (default 1)
/// - `limit` is clamped to [1, 100] (default 10)
#[derive(Debug, Clone, Default, Hash, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number (1-indexed, default: 1)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    /// Items per page (1-100, default: 10)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
}

impl PaginationParams {
    #[must_use]
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }

    #[must_use]
    pub fn meta(&self, total: i64) -> PaginationMeta {
        PaginationMeta::new(self.page(), self.limit(), total)
    }
}

/// Metadata about a page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    /// Total number of items across all pages
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl PaginationMeta {
    #[must_use]
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let limit = limit.max(1);
        let total_pages = (total + limit - 1) / limit;

        Self {
            total,
            page,
            limit,
            total_pages,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let params = PaginationParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 10);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn limit_is_clamped() {
        let params = PaginationParams {
            page: None,
            limit: Some(150),
        };
        assert_eq!(params.limit(), 100);

        let params = PaginationParams {
            page: None,
            limit: Some(0),
        };
        assert_eq!(params.limit(), 1);

        let params = PaginationParams {
            page: None,
            limit: Some(-10),
        };
        assert_eq!(params.limit(), 1);
    }

    #[test]
    fn page_is_at_least_one() {
        let params = PaginationParams {
            page: Some(-3),
            limit: Some(20),
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn offset_follows_page() {
        let params = PaginationParams {
            page: Some(3),
            limit: Some(20),
        };
        assert_eq!(params.offset(), 40);
    }

    #[test]
    fn meta_for_middle_page() {
        let meta = PaginationMeta::new(2, 10, 42);
        assert_eq!(meta.total_pages, 5);
        assert!(meta.has_next_page);
        assert!(meta.has_prev_page);
    }

    #[test]
    fn meta_for_last_page() {
        let meta = PaginationMeta::new(5, 10, 42);
        assert!(!meta.has_next_page);
        assert!(meta.has_prev_page);
    }

    #[test]
    fn meta_for_empty_result() {
        let meta = PaginationMeta::new(1, 10, 0);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_next_page);
        assert!(!meta.has_prev_page);
    }

    #[test]
    fn params_deserialize_empty_strings_as_defaults() {
        let params: PaginationParams =
            serde_json::from_str(r#"{"page": "", "limit": "25"}"#).unwrap();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 25);
    }
}
