use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;
/// Upper bound on `pageSize`; larger requests are clamped, not rejected.
pub const MAX_PAGE_SIZE: u64 = 100;
/// Largest row offset the SQL backends accept (`BIGINT`).
pub const MAX_OFFSET: u64 = i64::MAX.unsigned_abs();

/// Requested page, as sent by the client. Out-of-range values are clamped
/// by [`PaginationParams::normalize`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// A clamped page with its row offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u64,
    pub page_size: u64,
    pub offset: u64,
}

impl PaginationParams {
    #[must_use]
    pub const fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: Some(page),
            page_size: Some(page_size),
        }
    }

    /// `page >= 1`, `1 <= page_size <= MAX_PAGE_SIZE`,
    /// `offset = (page - 1) * page_size`, capped at [`MAX_OFFSET`].
    #[must_use]
    pub fn normalize(self) -> Page {
        let page = clamp_positive(self.page, DEFAULT_PAGE);
        let page_size = clamp_positive(self.page_size, DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
        Page {
            page,
            page_size,
            offset: (page - 1).saturating_mul(page_size).min(MAX_OFFSET),
        }
    }
}

fn clamp_positive(value: Option<i64>, default: u64) -> u64 {
    value.map_or(default, |v| u64::try_from(v).unwrap_or(0).max(1))
}

impl Page {
    #[must_use]
    pub fn meta(&self, total_items: u64) -> PaginationMeta {
        compute_meta(total_items, self.page, self.page_size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u64,
    pub page_size: u64,
    pub total_items: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Derive page totals. A zero `page_size` yields zero pages instead of
/// dividing by zero.
#[must_use]
pub fn compute_meta(total_items: u64, page: u64, page_size: u64) -> PaginationMeta {
    let total_pages = if page_size == 0 {
        0
    } else {
        total_items.div_ceil(page_size)
    };
    PaginationMeta {
        page,
        page_size,
        total_items,
        total_pages,
        has_next: page < total_pages,
        has_previous: page > 1,
    }
}

/// One page of rows, serialized flat: `{ items, page, pageSize, ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedData<T> {
    pub items: Vec<T>,
    #[serde(flatten)]
    pub meta: PaginationMeta,
}

impl<T> PaginatedData<T> {
    #[must_use]
    pub const fn new(items: Vec<T>, meta: PaginationMeta) -> Self {
        Self { items, meta }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let page = PaginationParams::default().normalize();
        assert_eq!(
            page,
            Page {
                page: 1,
                page_size: 10,
                offset: 0
            }
        );
    }

    #[test]
    fn test_normalize_sweep() {
        for raw_page in [-5, -1, 0, 1, 2, 3, 50, 1_000] {
            for raw_size in [-10, 0, 1, 7, 10, 99, 100, 101, 10_000] {
                let page = PaginationParams::new(raw_page, raw_size).normalize();
                assert!(page.page >= 1);
                assert!((1..=MAX_PAGE_SIZE).contains(&page.page_size));
                assert_eq!(page.offset, (page.page - 1) * page.page_size);
                if raw_page < 1 {
                    assert_eq!(page.page, 1);
                }
                if raw_size < 1 {
                    assert_eq!(page.page_size, 1);
                }
                if raw_size > 100 {
                    assert_eq!(page.page_size, MAX_PAGE_SIZE);
                }
            }
        }
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let page = PaginationParams::new(i64::MAX, 100).normalize();
        assert_eq!(page.page, i64::MAX.unsigned_abs());
        assert_eq!(page.offset, MAX_OFFSET);
        assert!(i64::try_from(page.offset).is_ok());

        let page = PaginationParams::new(100_000_000_000_000_000, 100).normalize();
        assert_eq!(page.offset, MAX_OFFSET);
    }

    #[test]
    fn test_meta_sweep() {
        for total in [0u64, 1, 9, 10, 11, 25, 99, 100, 101] {
            for size in [1u64, 3, 10, 100] {
                for page in 1..=5u64 {
                    let meta = compute_meta(total, page, size);
                    assert_eq!(meta.total_pages, total.div_ceil(size));
                    assert_eq!(meta.has_previous, page > 1);
                    assert_eq!(meta.has_next, page < meta.total_pages);
                }
            }
        }
    }

    #[test]
    fn test_empty_result_has_no_pages() {
        let meta = compute_meta(0, 1, 10);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_next);
        assert!(!meta.has_previous);
    }

    #[test]
    fn test_zero_page_size_meta() {
        assert_eq!(compute_meta(10, 1, 0).total_pages, 0);
    }

    #[test]
    fn test_twenty_five_rows_page_two() {
        let page = PaginationParams::new(2, 10).normalize();
        assert_eq!(page.offset, 10);
        let meta = page.meta(25);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next);
        assert!(meta.has_previous);
    }

    #[test]
    fn test_paginated_data_is_flat() {
        let data = PaginatedData::new(vec![1, 2], compute_meta(2, 1, 10));
        assert_eq!(
            serde_json::to_value(data).unwrap(),
            json!({
                "items": [1, 2],
                "page": 1,
                "pageSize": 10,
                "totalItems": 2,
                "totalPages": 1,
                "hasNext": false,
                "hasPrevious": false
            })
        );
    }
}
