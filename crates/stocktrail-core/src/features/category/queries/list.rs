use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::audit::HistoryService;
use crate::error::AuditResult;
use crate::features::category::model::{Category, CATEGORY_COLUMNS};
use crate::features::shared::listing::{annotate, fetch_page, Filter};
use crate::features::shared::{Annotated, Paginated, PaginationParams};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListCategoriesQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,
    pub name_contains: Option<String>,
}

#[tracing::instrument(skip(pool, history))]
pub async fn handle(
    pool: &SqlitePool,
    history: &HistoryService,
    query: ListCategoriesQuery,
) -> AuditResult<Paginated<Annotated<Category>>> {
    query.pagination.validate()?;

    let filters: Vec<Filter> = Filter::contains("nom_categorie", &query.name_contains)
        .into_iter()
        .collect();

    let (items, total) = fetch_page::<Category>(
        pool,
        CATEGORY_COLUMNS,
        "categories",
        "nom_categorie ASC",
        &filters,
        &query.pagination,
    )
    .await?;

    annotate(history, items, &query.pagination, total).await
}
