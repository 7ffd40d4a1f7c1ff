//! Shared fixtures for stocktrail-core integration tests
//!
//! Every [`TestDb`] is a fresh migrated SQLite file in its own temporary
//! directory, opened with the same pool settings as production.

#![allow(dead_code)]

use std::sync::Arc;

use sqlx::SqlitePool;
use stocktrail_core::audit::{
    Actor, AuditContext, AuditQuery, AuditRecord, AuditStore, HistoryService, Interceptor,
    InterceptorConfig, SqliteActorResolver,
};
use stocktrail_core::db::{self, DbConfig};
use tempfile::TempDir;

pub const ALICE: i64 = 1;
pub const BOB: i64 = 2;

pub struct TestDb {
    pub pool: SqlitePool,
    _dir: TempDir,
}

impl TestDb {
    pub async fn new() -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        let url = format!("sqlite://{}", dir.path().join("stocktrail.db").display());
        let pool = db::create_pool(&DbConfig::with_url(url)).await?;
        db::run_migrations(&pool).await?;

        sqlx::query("INSERT INTO users (id, name, email) VALUES (?, ?, ?), (?, ?, ?)")
            .bind(ALICE)
            .bind("Alice Martin")
            .bind("alice@example.org")
            .bind(BOB)
            .bind("Bob Durand")
            .bind("bob@example.org")
            .execute(&pool)
            .await?;

        Ok(Self { pool, _dir: dir })
    }

    pub fn interceptor(&self) -> Interceptor {
        self.interceptor_with(InterceptorConfig::default())
    }

    pub fn interceptor_with(&self, config: InterceptorConfig) -> Interceptor {
        Interceptor::new(self.pool.clone(), config)
    }

    pub fn store(&self) -> AuditStore {
        AuditStore::new(self.pool.clone())
    }

    pub fn history(&self) -> HistoryService {
        HistoryService::new(self.store(), Arc::new(SqliteActorResolver::new(self.pool.clone())))
    }

    /// Every record for `entity_type`, newest first
    pub async fn records(&self, entity_type: &str) -> anyhow::Result<Vec<AuditRecord>> {
        Ok(self.store().query(&AuditQuery::new(entity_type)).await?)
    }

    /// Make every audit append fail until the trigger is dropped
    pub async fn break_audit_log(&self) -> anyhow::Result<()> {
        sqlx::query(
            "CREATE TRIGGER audit_log_test_reject_insert BEFORE INSERT ON audit_log \
             BEGIN SELECT RAISE(ABORT, 'audit store unavailable'); END",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

pub fn ctx(actor_id: i64) -> AuditContext {
    AuditContext::new(actor_id).with_origin("127.0.0.1 integration-tests")
}

pub fn alice() -> Actor {
    Actor {
        id: ALICE,
        name: "Alice Martin".to_string(),
        email: "alice@example.org".to_string(),
    }
}
