use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::audit::{Auditable, HistoryService};
use crate::error::{AuditError, AuditResult};
use crate::features::equipment::model::{self, Equipment};
use crate::features::shared::listing::with_history;
use crate::features::shared::{PaginationParams, WithHistory};

/// One piece of equipment with its detail and a page of its history
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetEquipmentQuery {
    pub id_equipement: i64,
    #[serde(flatten)]
    pub history_page: PaginationParams,
}

#[tracing::instrument(skip(pool, history))]
pub async fn handle(
    pool: &SqlitePool,
    history: &HistoryService,
    query: GetEquipmentQuery,
) -> AuditResult<WithHistory<Equipment>> {
    let mut conn = pool.acquire().await?;
    let equipment = model::find_by_id(&mut conn, query.id_equipement)
        .await?
        .ok_or_else(|| {
            AuditError::not_found(Equipment::ENTITY_TYPE, query.id_equipement.to_string())
        })?;
    drop(conn);

    with_history(history, equipment, &query.history_page).await
}
