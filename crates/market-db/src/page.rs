//! Offset pagination

use serde::{Deserialize, Serialize};

/// One page of a listing, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub page_number: i64,
    pub page_size: i64,
}

impl PageInfo {
    pub fn new(page_number: i64, page_size: i64) -> Self {
        Self {
            page_number,
            page_size,
        }
    }

    fn checked_offset(&self) -> Option<i64> {
        self.page_number.checked_sub(1)?.checked_mul(self.page_size)
    }

    /// `page_number >= 1`, `page_size >= 0` and the offset fits in an `i64`
    pub fn is_valid(&self) -> bool {
        self.page_number >= 1 && self.page_size >= 0 && self.checked_offset().is_some()
    }

    /// Rows to skip before this page
    ///
    /// Never negative; saturates at `i64::MAX` for pages [`is_valid`](Self::is_valid) rejects.
    pub fn offset(&self) -> i64 {
        self.checked_offset().unwrap_or(i64::MAX).max(0)
    }
}
