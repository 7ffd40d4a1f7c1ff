//! End-to-end tests for the stocktrail binary
//!
//! These tests validate:
//! - Migrations against a fresh database file
//! - History output in table and JSON formats
//! - Latest-change lookup for several ids
//! - Argument and configuration errors

use assert_cmd::Command;
use predicates::prelude::*;
use stocktrail_core::audit::{AuditContext, Interceptor, InterceptorConfig};
use stocktrail_core::db::{self, DbConfig};
use stocktrail_core::features::equipment::commands::{create, update};
use stocktrail_core::features::equipment::{
    CreateEquipmentCommand, EquipmentFields, UpdateEquipmentCommand,
};
use tempfile::TempDir;

fn database_url(dir: &TempDir) -> String {
    format!("sqlite://{}", dir.path().join("stocktrail.db").display())
}

fn stocktrail(url: &str) -> Command {
    let mut cmd = Command::cargo_bin("stocktrail").expect("binary is built");
    cmd.env_remove("DATABASE_URL")
        .env_remove("AUDIT_WRITE_MODE")
        .arg("--database-url")
        .arg(url);
    cmd
}

/// Migrated database with one equipment created and then updated by actor 1
async fn seeded_database(dir: &TempDir) -> anyhow::Result<(String, i64)> {
    let url = database_url(dir);
    let pool = db::create_pool(&DbConfig::with_url(url.clone())).await?;
    db::run_migrations(&pool).await?;
    sqlx::query("INSERT INTO users (id, name, email) VALUES (1, 'Alice Martin', 'alice@example.org')")
        .execute(&pool)
        .await?;

    let interceptor = Interceptor::new(pool.clone(), InterceptorConfig::default());
    let ctx = AuditContext::new(1);
    let created = create::handle(
        &interceptor,
        &ctx,
        CreateEquipmentCommand {
            numero_serie: Some("ABC123".into()),
            fields: EquipmentFields {
                statut: Some("En stock".into()),
                ..Default::default()
            },
            detail: None,
        },
    )
    .await?;
    let id = created.entity.id_equipement;

    update::handle(
        &interceptor,
        &ctx,
        UpdateEquipmentCommand {
            id_equipement: id,
            fields: EquipmentFields {
                statut: Some("En service".into()),
                ..Default::default()
            },
            ..Default::default()
        },
    )
    .await?;

    pool.close().await;
    Ok((url, id))
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("stocktrail")
        .expect("binary is built")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("migrate"))
        .stdout(predicate::str::contains("history"))
        .stdout(predicate::str::contains("latest"));
}

#[test]
fn test_migrate_then_empty_history() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let url = database_url(&dir);

    stocktrail(&url)
        .arg("migrate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Migrations applied"));
    assert!(dir.path().join("stocktrail.db").exists());

    // a second run is a no-op
    stocktrail(&url).arg("migrate").assert().success();

    stocktrail(&url)
        .args(["history", "equipment"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No recorded changes"));

    Ok(())
}

#[tokio::test]
async fn test_history_table() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (url, id) = seeded_database(&dir).await?;

    stocktrail(&url)
        .args(["history", "equipment", "--id", &id.to_string()])
        .assert()
        .success()
        .stdout(predicate::str::contains("statut: En stock -> En service"))
        .stdout(predicate::str::contains("Alice Martin (#1)"))
        .stdout(predicate::str::contains("Page 1 of 1 (2 changes)"));

    Ok(())
}

#[tokio::test]
async fn test_history_json_with_action_filter() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (url, _) = seeded_database(&dir).await?;

    let output = stocktrail(&url)
        .args(["history", "equipment", "--action", "create", "--format", "json"])
        .output()?;
    assert!(output.status.success());

    let page: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let entries = page["entries"].as_array().cloned().unwrap_or_default();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["action"], "CREATE");
    assert_eq!(page["pagination"]["total"], 1);

    Ok(())
}

#[tokio::test]
async fn test_latest_for_several_ids() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (url, id) = seeded_database(&dir).await?;

    let output = stocktrail(&url)
        .args(["latest", "equipment", &id.to_string(), "999", "--format", "json"])
        .output()?;
    assert!(output.status.success());

    let latest: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(latest[id.to_string()]["action"], "UPDATE");
    assert_eq!(latest[id.to_string()]["actor"]["name"], "Alice Martin");
    assert!(latest["999"].is_null());

    Ok(())
}

#[test]
fn test_invalid_action_is_rejected() {
    stocktrail("sqlite::memory:")
        .args(["history", "equipment", "--action", "rename"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("rename"));
}

#[test]
fn test_non_sqlite_url_is_rejected() {
    stocktrail("postgresql://localhost/stock")
        .arg("migrate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}
