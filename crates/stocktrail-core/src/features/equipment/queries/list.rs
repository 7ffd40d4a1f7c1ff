use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::audit::HistoryService;
use crate::error::AuditResult;
use crate::features::equipment::model::{Equipment, EQUIPMENT_COLUMNS};
use crate::features::shared::listing::{annotate, fetch_page, Filter};
use crate::features::shared::{Annotated, Paginated, PaginationParams};

/// List equipment, each row with its last recorded change
///
/// Details are not loaded for list rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListEquipmentQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,
    pub statut: Option<String>,
    pub localisation: Option<String>,
    pub numero_serie: Option<String>,
    pub modele: Option<String>,
}

#[tracing::instrument(skip(pool, history))]
pub async fn handle(
    pool: &SqlitePool,
    history: &HistoryService,
    query: ListEquipmentQuery,
) -> AuditResult<Paginated<Annotated<Equipment>>> {
    query.pagination.validate()?;

    let filters: Vec<Filter> = [
        Filter::equals("statut", &query.statut),
        Filter::equals("localisation", &query.localisation),
        Filter::contains("numero_serie", &query.numero_serie),
        Filter::contains("modele", &query.modele),
    ]
    .into_iter()
    .flatten()
    .collect();

    let (items, total) = fetch_page::<Equipment>(
        pool,
        EQUIPMENT_COLUMNS,
        "equipment",
        "id_equipement ASC",
        &filters,
        &query.pagination,
    )
    .await?;

    annotate(history, items, &query.pagination, total).await
}
