//! Error types for auditing and inventory operations

use thiserror::Error;

use crate::audit::models::{AuditAction, NewAuditRecord};

/// Result type alias for audited operations
pub type AuditResult<T> = Result<T, AuditError>;

/// Errors returned by the audit core and the inventory handlers
#[derive(Debug, Error)]
pub enum AuditError {
    /// A required field is missing or a record violates its invariants
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{entity_type} '{key}' not found")]
    NotFound { entity_type: String, key: String },

    /// A create targeted an existing natural key, or a unique index rejected the write
    #[error("{entity_type} conflict: {detail}")]
    Conflict { entity_type: String, detail: String },

    #[error(transparent)]
    Serialization(#[from] SerializationError),

    /// Store I/O failed; nothing was committed
    #[error("Persistence error: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("Audit record {id} is corrupt: {reason}")]
    CorruptRecord { id: i64, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AuditError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(entity_type: &str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_string(),
            key: key.into(),
        }
    }

    pub fn conflict(entity_type: &str, detail: impl Into<String>) -> Self {
        Self::Conflict {
            entity_type: entity_type.to_string(),
            detail: detail.into(),
        }
    }

    /// Map a unique-constraint violation raised by the entity store to `Conflict`
    pub(crate) fn into_conflict_if_unique(self, entity_type: &str) -> Self {
        match self {
            Self::Persistence(sqlx::Error::Database(ref db_err)) if db_err.is_unique_violation() => {
                let detail = db_err.message().to_string();
                Self::conflict(entity_type, detail)
            }
            other => other,
        }
    }

    /// Whether retrying the same call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}

/// An entity could not be captured as a flat field map
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("{entity_type} does not serialize to a field map")]
    NotAFieldMap { entity_type: &'static str },

    #[error("field '{field}' of {entity_type} holds an unsupported {kind} value")]
    UnsupportedField {
        entity_type: &'static str,
        field: String,
        kind: &'static str,
    },

    #[error("failed to serialize {entity_type}: {source}")]
    Serde {
        entity_type: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// The mutation committed but its audit record could not be appended
///
/// Only produced in after-commit mode. The pending record is kept so the
/// caller can retry with [`AuditStore::append`](crate::audit::AuditStore::append).
#[derive(Debug, Error)]
#[error("audit record for {} {} ({}) was not written: {source}", .record.entity_type, .record.entity_id, .record.action)]
pub struct AuditWriteError {
    pub record: NewAuditRecord,
    #[source]
    pub source: sqlx::Error,
}

impl AuditWriteError {
    pub fn entity_type(&self) -> &str {
        &self.record.entity_type
    }

    pub fn entity_id(&self) -> i64 {
        self.record.entity_id
    }

    pub fn action(&self) -> AuditAction {
        self.record.action
    }
}
