//! Audited mutations
//!
//! [`Interceptor::intercept`] wraps a caller's lookup and mutation so that the
//! before and after snapshots, the diff, and the audit record are produced
//! together. Lookup and mutation share one `BEGIN IMMEDIATE` transaction, which
//! takes SQLite's write lock up front. Two concurrent calls on the same key are
//! therefore serialized: the second one sees the first one's row.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, error, info};

use super::diff::{diff, FieldChange};
use super::models::{AuditAction, AuditContext, AuditRecord, NewAuditRecord};
use super::queries::append_record;
use super::snapshot::{snapshot, Auditable};
use crate::error::{AuditError, AuditResult, AuditWriteError};

/// Log target for mutations that committed without an audit record
pub const AUDIT_GAP_TARGET: &str = "stocktrail::audit_gap";

/// What the caller intends to do; the recorded action follows from it and the pre-state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Must not exist yet
    Create,
    /// Must exist
    Update,
    /// Create when absent, update when present
    Upsert,
    /// Must exist
    Delete,
}

/// When the audit record is written relative to the business commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditWriteMode {
    /// Mutation and audit record commit together or not at all
    #[default]
    Transactional,
    /// The mutation commits first; a failed append is reported, not rolled back
    ///
    /// The append runs after the write lock is released, so concurrent
    /// changes to one entity may be recorded out of commit order and
    /// `latest_per_entity` can then report the older change.
    AfterCommit,
}

impl std::str::FromStr for AuditWriteMode {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "transactional" => Ok(Self::Transactional),
            "after_commit" => Ok(Self::AfterCommit),
            _ => Err(AuditError::Config(format!("unknown audit write mode '{s}'"))),
        }
    }
}

impl std::fmt::Display for AuditWriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Transactional => "transactional",
            Self::AfterCommit => "after_commit",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterceptorConfig {
    pub write_mode: AuditWriteMode,
    /// Record UPDATEs whose diff is empty instead of skipping them
    pub record_empty_updates: bool,
}

/// What happened to the audit record of an intercepted mutation
#[derive(Debug)]
pub enum AuditOutcome {
    Recorded(AuditRecord),
    /// Empty UPDATE, not recorded by configuration
    Skipped,
    /// The mutation is committed but the trail has a gap
    Failed(AuditWriteError),
}

impl AuditOutcome {
    pub fn record(&self) -> Option<&AuditRecord> {
        match self {
            Self::Recorded(record) => Some(record),
            _ => None,
        }
    }

    pub fn is_recorded(&self) -> bool {
        matches!(self, Self::Recorded(_))
    }
}

/// Result of a successful mutation
#[derive(Debug)]
pub struct Intercepted<E> {
    pub entity: E,
    pub action: AuditAction,
    pub changes: Vec<FieldChange>,
    pub audit: AuditOutcome,
}

#[derive(Debug, Clone)]
pub struct Interceptor {
    pool: SqlitePool,
    config: InterceptorConfig,
}

impl Interceptor {
    pub fn new(pool: SqlitePool, config: InterceptorConfig) -> Self {
        Self { pool, config }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn config(&self) -> &InterceptorConfig {
        &self.config
    }

    /// Run `mutate` with audit capture
    ///
    /// `key` names the target (id or natural key) in errors and logs. `lookup`
    /// returns the pre-state; `mutate` receives it and returns the entity as
    /// written, or as it was before removal for [`MutationKind::Delete`].
    ///
    /// # Errors
    ///
    /// - `Conflict` when `Create` finds an existing entity or the store reports a unique violation
    /// - `NotFound` when `Update`/`Delete` finds nothing
    /// - `Serialization` when a snapshot cannot be taken; nothing is committed
    /// - any error returned by `lookup` or `mutate`, unchanged
    /// - `Persistence` when the audit insert fails in transactional mode; the mutation is rolled back
    #[tracing::instrument(
        skip(self, ctx, lookup, mutate),
        fields(entity_type = E::ENTITY_TYPE, actor_id = ctx.actor_id, mode = %self.config.write_mode)
    )]
    pub async fn intercept<E, L, M>(
        &self,
        ctx: &AuditContext,
        kind: MutationKind,
        key: &str,
        lookup: L,
        mutate: M,
    ) -> AuditResult<Intercepted<E>>
    where
        E: Auditable + Send + Sync + 'static,
        L: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, AuditResult<Option<E>>> + Send,
        M: for<'c> FnOnce(&'c mut SqliteConnection, Option<&'c E>) -> BoxFuture<'c, AuditResult<E>>
            + Send,
    {
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let existing = lookup(&mut *tx).await?;
        match (kind, &existing) {
            (MutationKind::Create, Some(found)) => {
                return Err(AuditError::conflict(
                    E::ENTITY_TYPE,
                    format!("'{key}' already exists with id {}", found.entity_id()),
                ));
            }
            (MutationKind::Update | MutationKind::Delete, None) => {
                return Err(AuditError::not_found(E::ENTITY_TYPE, key));
            }
            _ => {}
        }

        let old_state = existing.as_ref().map(snapshot).transpose()?;

        let entity = mutate(&mut *tx, existing.as_ref())
            .await
            .map_err(|e| e.into_conflict_if_unique(E::ENTITY_TYPE))?;

        let action = match (&existing, kind) {
            (None, _) => AuditAction::Create,
            (Some(_), MutationKind::Delete) => AuditAction::Delete,
            (Some(_), _) => AuditAction::Update,
        };

        let new_state = match action {
            AuditAction::Delete => None,
            _ => Some(snapshot(&entity)?),
        };

        let changes = diff(old_state.as_ref(), new_state.as_ref());
        let entity_id = entity.entity_id();

        if action == AuditAction::Update && changes.is_empty() && !self.config.record_empty_updates {
            tx.commit().await?;
            debug!(entity_id, "Update changed nothing; audit record skipped");
            return Ok(Intercepted {
                entity,
                action,
                changes,
                audit: AuditOutcome::Skipped,
            });
        }

        let record = NewAuditRecord::builder()
            .entity_type(E::ENTITY_TYPE)
            .entity_id(entity_id)
            .action(action)
            .old_state(old_state)
            .new_state(new_state)
            .actor_id(ctx.actor_id)
            .origin(ctx.origin.clone())
            .try_build()?;

        let audit = match self.config.write_mode {
            AuditWriteMode::Transactional => {
                let stored = append_record(&mut *tx, &record).await?;
                tx.commit().await?;
                AuditOutcome::Recorded(stored)
            }
            AuditWriteMode::AfterCommit => {
                tx.commit().await?;
                match append_record(&self.pool, &record).await {
                    Ok(stored) => AuditOutcome::Recorded(stored),
                    Err(source) => {
                        error!(
                            target: AUDIT_GAP_TARGET,
                            entity_type = E::ENTITY_TYPE,
                            entity_id,
                            action = %action,
                            actor_id = ctx.actor_id,
                            error = %source,
                            "Mutation committed without audit record"
                        );
                        AuditOutcome::Failed(AuditWriteError { record, source })
                    }
                }
            }
        };

        info!(entity_id, action = %action, changed_fields = changes.len(), "Audited mutation");

        Ok(Intercepted {
            entity,
            action,
            changes,
            audit,
        })
    }
}
