//! Database queries for the audit trail
//!
//! `audit_log` is append-only: this module exposes inserts and reads, and the
//! schema's triggers reject any `UPDATE` or `DELETE` on the table.

use chrono::{SubsecRound, Utc};
use sqlx::{types::Json, Executor, QueryBuilder, Sqlite, SqlitePool};
use std::collections::HashMap;
use tracing::debug;

use super::models::{format_timestamp, AuditQuery, AuditRecord, AuditRow, NewAuditRecord};
use crate::error::AuditResult;

const AUDIT_COLUMNS: &str = "id, entity_type, entity_id, action, old_state, new_state, \
                             actor_id, occurred_at, origin, state_version";

/// Insert `record` and return it with its assigned id and timestamp
///
/// Generic over the executor so the interceptor can append inside its own
/// transaction or on the pool after commit.
pub async fn append_record<'e, X>(executor: X, record: &NewAuditRecord) -> Result<AuditRecord, sqlx::Error>
where
    X: Executor<'e, Database = Sqlite>,
{
    // Stored with microsecond precision
    let occurred_at = Utc::now().trunc_subsecs(6);

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO audit_log (
            entity_type, entity_id, action, old_state, new_state,
            actor_id, occurred_at, origin, state_version
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&record.entity_type)
    .bind(record.entity_id)
    .bind(record.action.as_str())
    .bind(record.old_state.as_ref().map(Json))
    .bind(record.new_state.as_ref().map(Json))
    .bind(record.actor_id)
    .bind(format_timestamp(&occurred_at))
    .bind(&record.origin)
    .bind(record.state_version)
    .fetch_one(executor)
    .await?;

    debug!(
        audit_id = id,
        entity_type = %record.entity_type,
        entity_id = record.entity_id,
        action = %record.action,
        "Appended audit record"
    );

    Ok(record.clone().into_record(id, occurred_at))
}

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &AuditQuery) {
    builder
        .push(" WHERE entity_type = ")
        .push_bind(query.entity_type.clone());

    if let Some(entity_id) = query.entity_id {
        builder.push(" AND entity_id = ").push_bind(entity_id);
    }
    if let Some(actor_id) = query.actor_id {
        builder.push(" AND actor_id = ").push_bind(actor_id);
    }
    if let Some(action) = query.action {
        builder.push(" AND action = ").push_bind(action.as_str());
    }
    if let Some(start) = query.start_time {
        builder.push(" AND occurred_at >= ").push_bind(format_timestamp(&start));
    }
    if let Some(end) = query.end_time {
        builder.push(" AND occurred_at <= ").push_bind(format_timestamp(&end));
    }
}

/// Query audit records, newest first (ties broken by id, descending)
pub async fn query_audit_records(pool: &SqlitePool, query: &AuditQuery) -> AuditResult<Vec<AuditRecord>> {
    let mut builder = QueryBuilder::new(format!("SELECT {AUDIT_COLUMNS} FROM audit_log"));
    push_filters(&mut builder, query);
    builder
        .push(" ORDER BY occurred_at DESC, id DESC LIMIT ")
        .push_bind(query.effective_limit())
        .push(" OFFSET ")
        .push_bind(query.offset.max(0));

    let rows: Vec<AuditRow> = builder.build_query_as().fetch_all(pool).await?;

    debug!(
        entity_type = %query.entity_type,
        count = rows.len(),
        "Queried audit records"
    );

    rows.into_iter().map(AuditRecord::try_from).collect()
}

/// Count the records matching `query`, ignoring its limit and offset
pub async fn count_audit_records(pool: &SqlitePool, query: &AuditQuery) -> AuditResult<i64> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM audit_log");
    push_filters(&mut builder, query);

    let total: i64 = builder.build_query_scalar().fetch_one(pool).await?;
    Ok(total)
}

/// Most recent record for each of `entity_ids`, in a single statement
///
/// Ids without any record are absent from the map.
pub async fn latest_per_entity(
    pool: &SqlitePool,
    entity_type: &str,
    entity_ids: &[i64],
) -> AuditResult<HashMap<i64, AuditRecord>> {
    let mut ids = entity_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut builder = QueryBuilder::new(format!(
        "SELECT {AUDIT_COLUMNS} FROM (\
            SELECT {AUDIT_COLUMNS}, ROW_NUMBER() OVER (\
                PARTITION BY entity_id ORDER BY occurred_at DESC, id DESC\
            ) AS rank_in_entity \
            FROM audit_log WHERE entity_type = "
    ));
    builder.push_bind(entity_type.to_string());
    builder.push(" AND entity_id IN (");
    let mut separated = builder.separated(", ");
    for id in &ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")) WHERE rank_in_entity = 1");

    let rows: Vec<AuditRow> = builder.build_query_as().fetch_all(pool).await?;

    debug!(
        entity_type,
        requested = ids.len(),
        found = rows.len(),
        "Resolved latest audit records"
    );

    rows.into_iter()
        .map(|row| AuditRecord::try_from(row).map(|record| (record.entity_id, record)))
        .collect()
}

/// Read and append access to the audit trail
#[derive(Debug, Clone)]
pub struct AuditStore {
    pool: SqlitePool,
}

impl AuditStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Append a record; the only write the store offers
    pub async fn append(&self, record: &NewAuditRecord) -> AuditResult<AuditRecord> {
        Ok(append_record(&self.pool, record).await?)
    }

    pub async fn query(&self, query: &AuditQuery) -> AuditResult<Vec<AuditRecord>> {
        query_audit_records(&self.pool, query).await
    }

    pub async fn count(&self, query: &AuditQuery) -> AuditResult<i64> {
        count_audit_records(&self.pool, query).await
    }

    pub async fn latest_per_entity(
        &self,
        entity_type: &str,
        entity_ids: &[i64],
    ) -> AuditResult<HashMap<i64, AuditRecord>> {
        latest_per_entity(&self.pool, entity_type, entity_ids).await
    }
}
