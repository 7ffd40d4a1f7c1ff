use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::audit::HistoryService;
use crate::error::AuditResult;
use crate::features::computer::model::{Computer, COMPUTER_COLUMNS};
use crate::features::shared::listing::{annotate, fetch_page, Filter};
use crate::features::shared::{Annotated, Paginated, PaginationParams};

/// Search computers; `numero_serie` and `modele` match substrings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListComputersQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,
    pub numero_serie: Option<String>,
    pub modele: Option<String>,
    pub statut: Option<String>,
}

#[tracing::instrument(skip(pool, history))]
pub async fn handle(
    pool: &SqlitePool,
    history: &HistoryService,
    query: ListComputersQuery,
) -> AuditResult<Paginated<Annotated<Computer>>> {
    query.pagination.validate()?;

    let filters: Vec<Filter> = [
        Filter::contains("numero_serie", &query.numero_serie),
        Filter::contains("modele", &query.modele),
        Filter::equals("statut", &query.statut),
    ]
    .into_iter()
    .flatten()
    .collect();

    let (items, total) = fetch_page::<Computer>(
        pool,
        COMPUTER_COLUMNS,
        "computers",
        "id_mac ASC",
        &filters,
        &query.pagination,
    )
    .await?;

    annotate(history, items, &query.pagination, total).await
}
