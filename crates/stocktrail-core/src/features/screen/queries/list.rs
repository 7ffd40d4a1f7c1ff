use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::audit::HistoryService;
use crate::error::AuditResult;
use crate::features::screen::model::{Screen, SCREEN_COLUMNS};
use crate::features::shared::listing::{annotate, fetch_page, Filter};
use crate::features::shared::{Annotated, Paginated, PaginationParams};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListScreensQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,
    pub numero_serie: Option<String>,
    pub marque: Option<String>,
    pub statut: Option<String>,
    pub localisation: Option<String>,
}

#[tracing::instrument(skip(pool, history))]
pub async fn handle(
    pool: &SqlitePool,
    history: &HistoryService,
    query: ListScreensQuery,
) -> AuditResult<Paginated<Annotated<Screen>>> {
    query.pagination.validate()?;

    let filters: Vec<Filter> = [
        Filter::contains("numero_serie", &query.numero_serie),
        Filter::contains("marque", &query.marque),
        Filter::equals("statut", &query.statut),
        Filter::equals("localisation", &query.localisation),
    ]
    .into_iter()
    .flatten()
    .collect();

    let (items, total) = fetch_page::<Screen>(
        pool,
        SCREEN_COLUMNS,
        "screens",
        "id_ecran ASC",
        &filters,
        &query.pagination,
    )
    .await?;

    annotate(history, items, &query.pagination, total).await
}
