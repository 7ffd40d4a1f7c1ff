//! Configuration management

use anyhow::Context;

use crate::audit::{AuditWriteMode, InterceptorConfig};
use crate::db::DbConfig;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Default database URL; the file is created on first connect.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://stocktrail.db";

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Default minimum database connections in the pool.
pub const DEFAULT_DATABASE_MIN_CONNECTIONS: u32 = 1;

/// Default pool acquire timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default SQLite busy timeout in seconds.
pub const DEFAULT_DATABASE_BUSY_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub database: DbConfig,
    pub audit: InterceptorConfig,
}

impl Config {
    /// Load configuration from `.env`, environment variables and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = Self::from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Read environment variables only; unparsable numbers fall back to defaults
    pub fn from_env() -> anyhow::Result<Self> {
        let database = DbConfig {
            url: std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            max_connections: env_or("DATABASE_MAX_CONNECTIONS", DEFAULT_DATABASE_MAX_CONNECTIONS),
            min_connections: env_or("DATABASE_MIN_CONNECTIONS", DEFAULT_DATABASE_MIN_CONNECTIONS),
            connect_timeout_secs: env_or(
                "DATABASE_CONNECT_TIMEOUT",
                DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
            ),
            busy_timeout_secs: env_or("DATABASE_BUSY_TIMEOUT", DEFAULT_DATABASE_BUSY_TIMEOUT_SECS),
        };

        let write_mode = match std::env::var("AUDIT_WRITE_MODE") {
            Ok(mode) => mode
                .parse::<AuditWriteMode>()
                .with_context(|| "AUDIT_WRITE_MODE must be 'transactional' or 'after_commit'")?,
            Err(_) => AuditWriteMode::default(),
        };

        let record_empty_updates = match std::env::var("AUDIT_RECORD_EMPTY_UPDATES") {
            Ok(flag) => flag
                .parse::<bool>()
                .with_context(|| format!("AUDIT_RECORD_EMPTY_UPDATES must be true or false, got '{flag}'"))?,
            Err(_) => false,
        };

        Ok(Self {
            database,
            audit: InterceptorConfig {
                write_mode,
                record_empty_updates,
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if !self.database.url.starts_with("sqlite:") {
            anyhow::bail!("Database URL must use the sqlite: scheme, got '{}'", self.database.url);
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("Database max_connections must be greater than 0");
        }

        if self.database.min_connections > self.database.max_connections {
            anyhow::bail!(
                "Database min_connections ({}) cannot be greater than max_connections ({})",
                self.database.min_connections,
                self.database.max_connections
            );
        }

        if self.audit.write_mode == AuditWriteMode::AfterCommit {
            tracing::warn!("Audit write mode is after_commit - committed changes may lack audit records");
        }

        Ok(())
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
