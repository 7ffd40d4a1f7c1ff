use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::audit::{Auditable, HistoryService};
use crate::error::{AuditError, AuditResult};
use crate::features::computer::model::{self, Computer};
use crate::features::shared::listing::with_history;
use crate::features::shared::{PaginationParams, WithHistory};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetComputerQuery {
    pub id_mac: i64,
    #[serde(flatten)]
    pub history_page: PaginationParams,
}

/// A computer with a page of its formatted history
#[tracing::instrument(skip(pool, history))]
pub async fn handle(
    pool: &SqlitePool,
    history: &HistoryService,
    query: GetComputerQuery,
) -> AuditResult<WithHistory<Computer>> {
    let mut conn = pool.acquire().await?;
    let computer = model::find_by_id(&mut conn, query.id_mac)
        .await?
        .ok_or_else(|| AuditError::not_found(Computer::ENTITY_TYPE, query.id_mac.to_string()))?;
    drop(conn);

    with_history(history, computer, &query.history_page).await
}
