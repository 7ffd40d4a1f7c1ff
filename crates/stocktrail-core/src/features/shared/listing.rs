//! Paged list queries annotated with each row's last audited change

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use super::pagination::{Paginated, PaginationParams};
use crate::audit::{AuditQuery, Auditable, HistoryPage, HistoryService, LastChange};
use crate::error::AuditResult;

/// A list row plus the most recent change recorded for it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotated<T> {
    #[serde(flatten)]
    pub item: T,
    pub last_change: Option<LastChange>,
}

/// An entity together with a page of its history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithHistory<T> {
    pub item: T,
    pub history: HistoryPage,
}

/// WHERE clause term for list queries
#[derive(Debug, Clone)]
pub(crate) enum Filter {
    Equals(&'static str, String),
    /// Case-insensitive substring match
    Contains(&'static str, String),
}

impl Filter {
    pub fn equals(column: &'static str, value: &Option<String>) -> Option<Self> {
        value.clone().map(|v| Self::Equals(column, v))
    }

    pub fn contains(column: &'static str, value: &Option<String>) -> Option<Self> {
        value.clone().map(|v| Self::Contains(column, v))
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, filters: &[Filter]) {
    for (index, filter) in filters.iter().enumerate() {
        builder.push(if index == 0 { " WHERE " } else { " AND " });
        match filter {
            Filter::Equals(column, value) => {
                builder.push(*column).push(" = ").push_bind(value.clone());
            }
            Filter::Contains(column, value) => {
                builder
                    .push(*column)
                    .push(" LIKE ")
                    .push_bind(format!("%{value}%"));
            }
        }
    }
}

/// Fetch one page of `table` plus the unpaged total
pub(crate) async fn fetch_page<T>(
    pool: &SqlitePool,
    columns: &str,
    table: &str,
    order_by: &str,
    filters: &[Filter],
    params: &PaginationParams,
) -> AuditResult<(Vec<T>, i64)>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let mut count = QueryBuilder::new(format!("SELECT COUNT(*) FROM {table}"));
    push_filters(&mut count, filters);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut select = QueryBuilder::new(format!("SELECT {columns} FROM {table}"));
    push_filters(&mut select, filters);
    select
        .push(format!(" ORDER BY {order_by} LIMIT "))
        .push_bind(params.per_page())
        .push(" OFFSET ")
        .push_bind(params.offset());
    let items: Vec<T> = select.build_query_as().fetch_all(pool).await?;

    Ok((items, total))
}

/// Attach the last change of every item with one audit query
pub(crate) async fn annotate<T: Auditable>(
    history: &HistoryService,
    items: Vec<T>,
    params: &PaginationParams,
    total: i64,
) -> AuditResult<Paginated<Annotated<T>>> {
    let ids: Vec<i64> = items.iter().map(Auditable::entity_id).collect();
    let mut latest = history.latest_changes(T::ENTITY_TYPE, &ids).await?;

    let rows = items
        .into_iter()
        .map(|item| {
            let last_change = latest.remove(&item.entity_id());
            Annotated { item, last_change }
        })
        .collect();

    Ok(Paginated::from_items(rows, params, total))
}

/// Wrap `item` with the first page of its history
pub(crate) async fn with_history<T: Auditable>(
    history: &HistoryService,
    item: T,
    params: &PaginationParams,
) -> AuditResult<WithHistory<T>> {
    let query = AuditQuery::new(T::ENTITY_TYPE).entity_id(item.entity_id());
    let history = history.history(&query, params).await?;
    Ok(WithHistory { item, history })
}
