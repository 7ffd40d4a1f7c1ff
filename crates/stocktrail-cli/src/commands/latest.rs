use std::sync::Arc;

use stocktrail_core::audit::{AuditStore, HistoryService, SqliteActorResolver};

use super::connect;
use crate::output::{render_latest, OutputFormat};
use crate::Result;

pub async fn run(
    database_url: Option<&str>,
    entity_type: &str,
    ids: &[i64],
    format: OutputFormat,
) -> Result<()> {
    let (_, pool) = connect(database_url).await?;
    let history = HistoryService::new(
        AuditStore::new(pool.clone()),
        Arc::new(SqliteActorResolver::new(pool.clone())),
    );

    let latest = history.latest_changes(entity_type, ids).await?;
    print!("{}", render_latest(ids, &latest, format)?);

    pool.close().await;
    Ok(())
}
