//! History views over the audit trail
//!
//! Formats stored records for display by attaching the resolved actor and the
//! field diff. Actor lookup goes through [`ActorResolver`], and each distinct
//! actor is resolved once per call.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

use super::diff::{diff, FieldChange};
use super::models::{timestamp, AuditAction, AuditQuery, AuditRecord};
use super::queries::AuditStore;
use crate::error::AuditResult;
use crate::features::shared::pagination::{PaginationMetadata, PaginationParams};

/// Display identity of the principal behind a change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl Actor {
    /// Placeholder for ids the resolver does not know
    pub fn unknown(id: i64) -> Self {
        Self {
            id,
            name: "Unknown".to_string(),
            email: String::new(),
        }
    }
}

#[async_trait]
pub trait ActorResolver: Send + Sync {
    async fn resolve(&self, actor_id: i64) -> AuditResult<Option<Actor>>;
}

/// Resolves actors from the `users` table
#[derive(Debug, Clone)]
pub struct SqliteActorResolver {
    pool: SqlitePool,
}

impl SqliteActorResolver {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActorResolver for SqliteActorResolver {
    async fn resolve(&self, actor_id: i64) -> AuditResult<Option<Actor>> {
        let row: Option<(i64, String, String)> =
            sqlx::query_as("SELECT id, name, email FROM users WHERE id = ?")
                .bind(actor_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(id, name, email)| Actor { id, name, email }))
    }
}

/// In-memory resolver
#[derive(Debug, Clone, Default)]
pub struct StaticActorResolver {
    actors: HashMap<i64, Actor>,
}

impl StaticActorResolver {
    pub fn new(actors: impl IntoIterator<Item = Actor>) -> Self {
        Self {
            actors: actors.into_iter().map(|actor| (actor.id, actor)).collect(),
        }
    }
}

#[async_trait]
impl ActorResolver for StaticActorResolver {
    async fn resolve(&self, actor_id: i64) -> AuditResult<Option<Actor>> {
        Ok(self.actors.get(&actor_id).cloned())
    }
}

/// One formatted change in an entity's history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub entity_id: i64,
    pub action: AuditAction,
    #[serde(with = "timestamp")]
    pub occurred_at: DateTime<Utc>,
    pub actor: Actor,
    pub origin: Option<String>,
    pub changes: Vec<FieldChange>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryPage {
    pub entries: Vec<HistoryEntry>,
    pub pagination: PaginationMetadata,
}

/// Summary of an entity's most recent change, for list views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastChange {
    #[serde(with = "timestamp")]
    pub occurred_at: DateTime<Utc>,
    pub actor: Actor,
    pub action: AuditAction,
}

#[derive(Clone)]
pub struct HistoryService {
    store: AuditStore,
    actors: Arc<dyn ActorResolver>,
}

impl HistoryService {
    pub fn new(store: AuditStore, actors: Arc<dyn ActorResolver>) -> Self {
        Self { store, actors }
    }

    /// Paginated history matching `query`, newest first
    ///
    /// `pagination` overrides the query's own limit and offset.
    #[tracing::instrument(skip(self, query), fields(entity_type = %query.entity_type))]
    pub async fn history(
        &self,
        query: &AuditQuery,
        pagination: &PaginationParams,
    ) -> AuditResult<HistoryPage> {
        let paged = query
            .clone()
            .page(pagination.per_page(), pagination.offset());

        let total = self.store.count(&paged).await?;
        let records = self.store.query(&paged).await?;
        let actors = self.resolve_actors(records.iter().map(|r| r.actor_id)).await?;

        let entries = records
            .into_iter()
            .map(|record| {
                let actor = actor_or_unknown(&actors, record.actor_id);
                to_entry(record, actor)
            })
            .collect();

        Ok(HistoryPage {
            entries,
            pagination: PaginationMetadata::from_params(pagination, total),
        })
    }

    /// Last change for each of `entity_ids`; ids never audited are absent
    #[tracing::instrument(skip(self, entity_ids), fields(count = entity_ids.len()))]
    pub async fn latest_changes(
        &self,
        entity_type: &str,
        entity_ids: &[i64],
    ) -> AuditResult<HashMap<i64, LastChange>> {
        let latest = self.store.latest_per_entity(entity_type, entity_ids).await?;
        let actors = self.resolve_actors(latest.values().map(|r| r.actor_id)).await?;

        Ok(latest
            .into_iter()
            .map(|(entity_id, record)| {
                let change = LastChange {
                    occurred_at: record.occurred_at,
                    actor: actor_or_unknown(&actors, record.actor_id),
                    action: record.action,
                };
                (entity_id, change)
            })
            .collect())
    }

    async fn resolve_actors(
        &self,
        actor_ids: impl Iterator<Item = i64>,
    ) -> AuditResult<HashMap<i64, Actor>> {
        let distinct: HashSet<i64> = actor_ids.collect();
        let mut resolved = HashMap::with_capacity(distinct.len());

        for actor_id in distinct {
            match self.actors.resolve(actor_id).await? {
                Some(actor) => {
                    resolved.insert(actor_id, actor);
                }
                None => warn!(actor_id, "Unknown actor in audit trail"),
            }
        }

        debug!(resolved = resolved.len(), "Resolved actors");
        Ok(resolved)
    }
}

fn actor_or_unknown(actors: &HashMap<i64, Actor>, actor_id: i64) -> Actor {
    actors
        .get(&actor_id)
        .cloned()
        .unwrap_or_else(|| Actor::unknown(actor_id))
}

fn to_entry(record: AuditRecord, actor: Actor) -> HistoryEntry {
    let changes = diff(record.old_state.as_ref(), record.new_state.as_ref());
    HistoryEntry {
        id: record.id,
        entity_id: record.entity_id,
        action: record.action,
        occurred_at: record.occurred_at,
        actor,
        origin: record.origin,
        changes,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::audit::models::CURRENT_STATE_VERSION;
    use serde_json::json;

    #[tokio::test]
    async fn test_static_resolver() {
        let resolver = StaticActorResolver::new([Actor {
            id: 1,
            name: "Camille".into(),
            email: "camille@example.org".into(),
        }]);

        assert_eq!(resolver.resolve(1).await.unwrap().unwrap().name, "Camille");
        assert!(resolver.resolve(2).await.unwrap().is_none());
    }

    #[test]
    fn test_unknown_actor_placeholder() {
        let actors = HashMap::new();
        assert_eq!(actor_or_unknown(&actors, 5), Actor::unknown(5));
        assert_eq!(Actor::unknown(5).name, "Unknown");
        assert!(Actor::unknown(5).email.is_empty());
    }

    #[test]
    fn test_entry_carries_diff_of_states() {
        let record = AuditRecord {
            id: 3,
            entity_type: "equipment".into(),
            entity_id: 1,
            action: AuditAction::Update,
            old_state: json!({"statut": "En stock"}).as_object().cloned(),
            new_state: json!({"statut": "En service"}).as_object().cloned(),
            actor_id: 5,
            occurred_at: Utc::now(),
            origin: None,
            state_version: CURRENT_STATE_VERSION,
        };

        let entry = to_entry(record, Actor::unknown(5));
        assert_eq!(entry.changes.len(), 1);
        assert_eq!(entry.changes[0].to_string(), "statut: En stock -> En service");
    }
}
