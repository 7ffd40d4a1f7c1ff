//! Error types shared across the workspace

use thiserror::Error;

/// Result type alias for shared utilities
pub type Result<T> = std::result::Result<T, CommonError>;

#[derive(Error, Debug)]
pub enum CommonError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An environment variable or option held a value we cannot interpret
    #[error("Invalid value '{value}' for {setting}")]
    InvalidSetting { setting: &'static str, value: String },

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl CommonError {
    pub fn invalid_setting(setting: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidSetting {
            setting,
            value: value.into(),
        }
    }
}
