use std::sync::Arc;

use chrono::{DateTime, Utc};
use stocktrail_core::audit::{AuditAction, AuditQuery, AuditStore, HistoryService, SqliteActorResolver};
use stocktrail_core::features::shared::PaginationParams;
use tracing::debug;

use super::connect;
use crate::output::{render_history, OutputFormat};
use crate::Result;

#[derive(Debug, Clone)]
pub struct HistoryArgs {
    pub entity_type: String,
    pub entity_id: Option<i64>,
    pub actor_id: Option<i64>,
    pub action: Option<AuditAction>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub page: i64,
    pub per_page: i64,
}

impl HistoryArgs {
    fn query(&self) -> AuditQuery {
        let mut query = AuditQuery::new(&self.entity_type).between(self.since, self.until);
        if let Some(entity_id) = self.entity_id {
            query = query.entity_id(entity_id);
        }
        if let Some(actor_id) = self.actor_id {
            query = query.actor_id(actor_id);
        }
        if let Some(action) = self.action {
            query = query.action(action);
        }
        query
    }
}

pub async fn run(database_url: Option<&str>, args: HistoryArgs, format: OutputFormat) -> Result<()> {
    let pagination = PaginationParams::new(Some(args.page), Some(args.per_page));
    pagination.validate()?;

    let (_, pool) = connect(database_url).await?;
    let history = HistoryService::new(
        AuditStore::new(pool.clone()),
        Arc::new(SqliteActorResolver::new(pool.clone())),
    );

    let query = args.query();
    debug!(?query, "Fetching history");
    let page = history.history(&query, &pagination).await?;
    print!("{}", render_history(&page, format)?);

    pool.close().await;
    Ok(())
}
