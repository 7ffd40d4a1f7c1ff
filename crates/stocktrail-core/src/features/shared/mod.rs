//! Helpers shared by the inventory feature modules

pub mod listing;
pub mod pagination;

pub use listing::{Annotated, WithHistory};
pub use pagination::{Paginated, PaginationMetadata, PaginationParams};

use crate::error::{AuditError, AuditResult};

/// Fail with a validation error naming every required field that is missing
pub(crate) fn require_fields(fields: &[(&str, bool)]) -> AuditResult<()> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AuditError::validation(format!(
            "Required fields missing: {}",
            missing.join(", ")
        )))
    }
}

/// True when the value holds non-whitespace text
pub(crate) fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|text| !text.trim().is_empty())
}
