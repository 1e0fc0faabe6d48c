//! Paged query results.

use serde::{Deserialize, Serialize};

/// One page of records plus the total row count of the unpaged query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// 1-based page number.
    pub current: i64,
    /// Rows per page. `0` disables paging.
    pub size: i64,
    pub total: i64,
    pub records: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(current: i64, size: i64) -> Self {
        Self {
            current,
            size,
            total: 0,
            records: Vec::new(),
        }
    }

    /// Rows to skip: `(current - 1) * size`, or 0 before the first page.
    /// Saturates at `i64::MAX` for out-of-range page numbers.
    pub fn offset(&self) -> i64 {
        if self.current > 0 && self.size > 0 {
            (self.current - 1).saturating_mul(self.size)
        } else {
            0
        }
    }

    pub fn limit(&self) -> i64 {
        self.size
    }

    /// Number of pages needed for `total` rows.
    pub fn pages(&self) -> i64 {
        if self.size <= 0 {
            return 0;
        }
        self.total / self.size + i64::from(self.total % self.size > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_and_limit() {
        let page: Page<()> = Page::new(3, 20);
        assert_eq!(page.offset(), 40);
        assert_eq!(page.limit(), 20);

        let page: Page<()> = Page::new(0, 20);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_pages_rounds_up() {
        let mut page: Page<()> = Page::new(1, 10);
        page.total = 21;
        assert_eq!(page.pages(), 3);
        page.size = 0;
        assert_eq!(page.pages(), 0);
    }

    #[test]
    fn test_extreme_values_do_not_overflow() {
        let page: Page<()> = Page::new(i64::MAX, 20);
        assert_eq!(page.offset(), i64::MAX);

        let page: Page<()> = Page::new(2, i64::MAX);
        assert_eq!(page.offset(), i64::MAX);

        let mut page: Page<()> = Page::new(1, 20);
        page.total = i64::MAX;
        assert_eq!(page.pages(), i64::MAX / 20 + 1);

        page.size = i64::MAX;
        assert_eq!(page.pages(), 1);
    }

    #[test]
    fn test_serializes_to_json() {
        let mut page = Page::new(1, 2);
        page.total = 1;
        page.records.push("a".to_string());
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"current": 1, "size": 2, "total": 1, "records": ["a"]})
        );
    }
}
