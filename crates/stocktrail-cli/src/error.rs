//! Error types for the Stocktrail CLI

use stocktrail_core::db::DbError;
use stocktrail_core::AuditError;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check your environment variables or .env file.")]
    Config(String),

    /// Connecting or migrating failed
    #[error("Database error: {0}. Check DATABASE_URL and that the file is writable.")]
    Database(#[from] DbError),

    #[error(transparent)]
    Audit(#[from] AuditError),

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),
}
