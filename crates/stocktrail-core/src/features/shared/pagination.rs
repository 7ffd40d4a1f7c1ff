//! Page/per-page parameters for list and history queries

use serde::{Deserialize, Serialize};

use crate::error::{AuditError, AuditResult};

pub const DEFAULT_PER_PAGE: i64 = 20;
pub const MAX_PER_PAGE: i64 = 100;

/// Requested page, 1-indexed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct PaginationParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
}

impl PaginationParams {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self { page, per_page }
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Items per page, defaulting to 20 and clamped to 1-100
    pub fn per_page(&self) -> i64 {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE)
    }

    /// Rows to skip; saturates for pages past the addressable range
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.per_page())
    }

    /// Reject explicit values that would otherwise be clamped
    pub fn validate(&self) -> AuditResult<()> {
        if matches!(self.page, Some(page) if page < 1) {
            return Err(AuditError::validation("page must be greater than 0"));
        }
        if matches!(self.per_page, Some(per_page) if !(1..=MAX_PER_PAGE).contains(&per_page)) {
            return Err(AuditError::validation(format!(
                "per_page must be between 1 and {MAX_PER_PAGE}"
            )));
        }
        if (self.page() - 1).checked_mul(self.per_page()).is_none() {
            return Err(AuditError::validation(format!(
                "page {} is out of range",
                self.page()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMetadata {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMetadata {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        let pages = if total <= 0 {
            0
        } else {
            (total + per_page - 1) / per_page
        };

        Self {
            page,
            per_page,
            total,
            pages,
            has_next: page < pages,
            has_prev: page > 1,
        }
    }

    pub fn from_params(params: &PaginationParams, total: i64) -> Self {
        Self::new(params.page(), params.per_page(), total)
    }
}

/// One page of list results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: PaginationMetadata,
}

impl<T> Paginated<T> {
    pub fn from_items(items: Vec<T>, params: &PaginationParams, total: i64) -> Self {
        Self {
            items,
            pagination: PaginationMetadata::from_params(params, total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = PaginationParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.per_page(), DEFAULT_PER_PAGE);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_offset_and_clamping() {
        assert_eq!(PaginationParams::new(Some(3), Some(25)).offset(), 50);

        let params = PaginationParams::new(Some(-4), Some(500));
        assert_eq!(params.page(), 1);
        assert_eq!(params.per_page(), MAX_PER_PAGE);
    }

    #[test]
    fn test_validate() {
        assert!(PaginationParams::new(Some(2), Some(100)).validate().is_ok());
        assert!(PaginationParams::new(Some(0), None).validate().is_err());
        assert!(PaginationParams::new(None, Some(101)).validate().is_err());
    }

    #[test]
    fn test_huge_page_is_rejected_and_offset_saturates() {
        let params = PaginationParams::new(Some(i64::MAX), Some(20));
        assert!(matches!(params.validate(), Err(AuditError::Validation(_))));
        assert_eq!(params.offset(), i64::MAX);

        let last_addressable = PaginationParams::new(Some(i64::MAX / 20 + 1), Some(20));
        assert!(last_addressable.validate().is_ok());
        assert_eq!(last_addressable.offset(), (i64::MAX / 20) * 20);
    }

    #[test]
    fn test_metadata() {
        let meta = PaginationMetadata::new(2, 10, 25);
        assert_eq!(meta.pages, 3);
        assert!(meta.has_prev);
        assert!(meta.has_next);

        let last = PaginationMetadata::new(3, 10, 30);
        assert_eq!(last.pages, 3);
        assert!(!last.has_next);

        let empty = PaginationMetadata::new(1, 10, 0);
        assert_eq!(empty.pages, 0);
        assert!(!empty.has_prev && !empty.has_next);
    }
}
