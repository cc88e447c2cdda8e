//! Paginated success envelopes.

use serde::{Deserialize, Serialize};

use crate::http::envelope::{build_success, SuccessEnvelope, SuccessOptions};

/// Pagination input as supplied by a handler.
///
/// `has_next`/`has_prev` are derived when left unset; explicit values win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: Option<bool>,
    pub has_prev: Option<bool>,
}

impl Pagination {
    pub fn new(page: u64, limit: u64, total: u64, total_pages: u64) -> Self {
        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: None,
            has_prev: None,
        }
    }

    /// Pagination with `total_pages = ceil(total / limit)`.
    pub fn from_total(page: u64, limit: u64, total: u64) -> Self {
        let total_pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self::new(page, limit, total, total_pages)
    }

    pub fn has_next(mut self, has_next: bool) -> Self {
        self.has_next = Some(has_next);
        self
    }

    pub fn has_prev(mut self, has_prev: bool) -> Self {
        self.has_prev = Some(has_prev);
        self
    }

    /// Zero-based offset of the first item on this page.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    pub fn resolve(self) -> PaginationMeta {
        PaginationMeta {
            page: self.page,
            limit: self.limit,
            total: self.total,
            total_pages: self.total_pages,
            has_next: self.has_next.unwrap_or(self.page < self.total_pages),
            has_prev: self.has_prev.unwrap_or(self.page > 1),
        }
    }
}

/// Pagination block as sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

/// `data` of a paginated envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Options for [`build_paginated`].
#[derive(Debug, Clone)]
pub struct PaginatedOptions {
    pub message: Option<String>,
    pub include_timestamp: bool,
    pub request_id: Option<String>,
}

impl Default for PaginatedOptions {
    fn default() -> Self {
        Self {
            message: None,
            include_timestamp: true,
            request_id: None,
        }
    }
}

impl PaginatedOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn include_timestamp(mut self, include: bool) -> Self {
        self.include_timestamp = include;
        self
    }

    pub fn request_id(mut self, request_id: impl Into<Option<String>>) -> Self {
        self.request_id = request_id.into();
        self
    }
}

/// Build a success envelope whose data is `{items, pagination}`.
pub fn build_paginated<T>(
    items: Vec<T>,
    pagination: Pagination,
    options: PaginatedOptions,
) -> SuccessEnvelope<Page<T>> {
    let message = options
        .message
        .unwrap_or_else(|| format!("Retrieved {} items", items.len()));

    build_success(
        SuccessOptions::new()
            .message(message)
            .data(Page {
                items,
                pagination: pagination.resolve(),
            })
            .include_timestamp(options.include_timestamp)
            .request_id(options.request_id),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_derived_flags() {
        let envelope = build_paginated(vec![1, 2, 3], Pagination::new(2, 3, 10, 4), PaginatedOptions::new());
        let page = envelope.data.as_ref().unwrap();

        assert!(page.pagination.has_next);
        assert!(page.pagination.has_prev);
        assert_eq!(envelope.message, "Retrieved 3 items");
        assert_eq!(envelope.status_code, 200);
    }

    #[test]
    fn test_first_and_last_page() {
        let first = Pagination::new(1, 10, 25, 3).resolve();
        assert!(first.has_next && !first.has_prev);

        let last = Pagination::new(3, 10, 25, 3).resolve();
        assert!(!last.has_next && last.has_prev);
    }

    #[test]
    fn test_explicit_flags_not_overridden() {
        let meta = Pagination::new(2, 3, 10, 4).has_next(false).has_prev(false).resolve();
        assert!(!meta.has_next);
        assert!(!meta.has_prev);
    }

    #[test]
    fn test_wire_shape() {
        let envelope = build_paginated(
            vec!["a"],
            Pagination::from_total(1, 20, 1),
            PaginatedOptions::new().message("Found").include_timestamp(false),
        );
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "success": true,
                "message": "Found",
                "statusCode": 200,
                "data": {
                    "items": ["a"],
                    "pagination": {
                        "page": 1, "limit": 20, "total": 1, "totalPages": 1,
                        "hasNext": false, "hasPrev": false
                    }
                }
            })
        );
    }

    #[test]
    fn test_from_total() {
        assert_eq!(Pagination::from_total(1, 3, 10).total_pages, 4);
        assert_eq!(Pagination::from_total(1, 5, 10).total_pages, 2);
        assert_eq!(Pagination::from_total(1, 0, 10).total_pages, 0);
        assert_eq!(Pagination::from_total(3, 5, 100).offset(), 10);
    }

    #[test]
    fn test_empty_items_message() {
        let envelope = build_paginated(Vec::<u8>::new(), Pagination::from_total(1, 10, 0), PaginatedOptions::new());
        assert_eq!(envelope.message, "Retrieved 0 items");
    }
}
