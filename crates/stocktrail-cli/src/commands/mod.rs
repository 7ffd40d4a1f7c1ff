//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function.

pub mod history;
pub mod latest;
pub mod migrate;

use sqlx::SqlitePool;
use stocktrail_core::config::Config;
use stocktrail_core::db;

use crate::{CliError, Result};

/// Load configuration, apply the `--database-url` override and open the pool
pub(crate) async fn connect(database_url: Option<&str>) -> Result<(Config, SqlitePool)> {
    let mut config = Config::load().map_err(|e| CliError::Config(format!("{e:#}")))?;
    if let Some(url) = database_url {
        config.database.url = url.to_string();
        config
            .validate()
            .map_err(|e| CliError::Config(format!("{e:#}")))?;
    }

    let pool = db::create_pool(&config.database).await?;
    Ok((config, pool))
}
