use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::audit::{Auditable, HistoryService};
use crate::error::{AuditError, AuditResult};
use crate::features::screen::model::{self, Screen};
use crate::features::shared::listing::with_history;
use crate::features::shared::{PaginationParams, WithHistory};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetScreenQuery {
    pub id_ecran: i64,
    #[serde(flatten)]
    pub history_page: PaginationParams,
}

#[tracing::instrument(skip(pool, history))]
pub async fn handle(
    pool: &SqlitePool,
    history: &HistoryService,
    query: GetScreenQuery,
) -> AuditResult<WithHistory<Screen>> {
    let mut conn = pool.acquire().await?;
    let screen = model::find_by_id(&mut conn, query.id_ecran)
        .await?
        .ok_or_else(|| AuditError::not_found(Screen::ENTITY_TYPE, query.id_ecran.to_string()))?;
    drop(conn);

    with_history(history, screen, &query.history_page).await
}
