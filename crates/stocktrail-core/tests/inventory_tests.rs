//! Inventory handlers end to end
//!
//! These tests verify:
//! - Upsert by natural key records CREATE then UPDATE
//! - Partial updates keep absent fields
//! - Screen save semantics and required fields
//! - Equipment details stay out of the audited snapshot

mod common;

use common::{ctx, TestDb, ALICE};
use serde_json::json;
use stocktrail_core::audit::{AuditAction, AuditOutcome};
use stocktrail_core::features::category::commands::{delete as delete_category, upsert as upsert_category};
use stocktrail_core::features::category::queries::list as list_categories;
use stocktrail_core::features::category::{
    DeleteCategoryCommand, ListCategoriesQuery, UpsertCategoryCommand,
};
use stocktrail_core::features::computer::commands::{delete as delete_computer, upsert as upsert_computer};
use stocktrail_core::features::computer::queries::{get as get_computer, list as list_computers};
use stocktrail_core::features::computer::{
    ComputerFields, DeleteComputerCommand, GetComputerQuery, ListComputersQuery,
    UpsertComputerCommand,
};
use stocktrail_core::features::equipment::commands::{create, update, upsert as upsert_equipment};
use stocktrail_core::features::equipment::queries::{get as get_equipment, list as list_equipment};
use stocktrail_core::features::equipment::{
    CreateEquipmentCommand, DetailFields, EquipmentFields, GetEquipmentQuery, ListEquipmentQuery,
    UpdateEquipmentCommand, UpsertEquipmentCommand,
};
use stocktrail_core::features::screen::commands::{delete as delete_screen, save};
use stocktrail_core::features::screen::{DeleteScreenCommand, SaveScreenCommand, ScreenFields};
use stocktrail_core::AuditError;

fn category(name: &str, description: Option<&str>) -> UpsertCategoryCommand {
    UpsertCategoryCommand {
        nom_categorie: Some(name.to_string()),
        description: description.map(str::to_string),
    }
}

fn macbook(serial: &str, ram: i64) -> UpsertComputerCommand {
    UpsertComputerCommand {
        numero_serie: Some(serial.to_string()),
        fields: ComputerFields {
            modele: Some("MacBook Pro 14".into()),
            type_mac: Some("MacBook Pro".into()),
            ram: Some(ram),
            stockage: Some(512),
            ecran_taille: Some(14.2),
            statut: Some("En service".into()),
            ..Default::default()
        },
    }
}

#[tokio::test]
async fn test_category_upsert_creates_then_updates() -> anyhow::Result<()> {
    let db = TestDb::new().await?;
    let interceptor = db.interceptor();

    let created = upsert_category::handle(&interceptor, &ctx(ALICE), category("Claviers", None)).await?;
    assert_eq!(created.action, AuditAction::Create);

    let updated = upsert_category::handle(
        &interceptor,
        &ctx(ALICE),
        category("Claviers", Some("Claviers USB et sans fil")),
    )
    .await?;
    assert_eq!(updated.action, AuditAction::Update);
    assert_eq!(updated.entity.id_categorie, created.entity.id_categorie);
    assert_eq!(updated.changes.len(), 1);
    assert_eq!(updated.changes[0].field, "description");

    // absent description keeps the stored one
    let unchanged = upsert_category::handle(&interceptor, &ctx(ALICE), category("Claviers", None)).await?;
    assert_eq!(unchanged.entity.description.as_deref(), Some("Claviers USB et sans fil"));
    assert!(matches!(unchanged.audit, AuditOutcome::Skipped));

    assert_eq!(db.records("category").await?.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_category_name_is_required() -> anyhow::Result<()> {
    let db = TestDb::new().await?;

    let err = upsert_category::handle(&db.interceptor(), &ctx(ALICE), UpsertCategoryCommand::default())
        .await
        .expect_err("name is required");

    assert!(matches!(err, AuditError::Validation(_)));
    assert!(db.records("category").await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_category_in_use_cannot_be_deleted() -> anyhow::Result<()> {
    let db = TestDb::new().await?;
    let interceptor = db.interceptor();
    let keyboards = upsert_category::handle(&interceptor, &ctx(ALICE), category("Claviers", None))
        .await?
        .entity;

    create::handle(
        &interceptor,
        &ctx(ALICE),
        CreateEquipmentCommand {
            numero_serie: Some("KB-1".into()),
            fields: EquipmentFields {
                id_categorie: Some(keyboards.id_categorie),
                ..Default::default()
            },
            detail: None,
        },
    )
    .await?;

    let command = DeleteCategoryCommand {
        id_categorie: keyboards.id_categorie,
    };
    let err = delete_category::handle(&interceptor, &ctx(ALICE), command)
        .await
        .expect_err("foreign key blocks the delete");
    assert!(matches!(err, AuditError::Persistence(_)));

    let records = db.records("category").await?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].action, AuditAction::Create);

    Ok(())
}

#[tokio::test]
async fn test_category_list() -> anyhow::Result<()> {
    let db = TestDb::new().await?;
    let interceptor = db.interceptor();
    for name in ["Claviers", "Souris", "Casques"] {
        upsert_category::handle(&interceptor, &ctx(ALICE), category(name, None)).await?;
    }
    let mice = upsert_category::handle(&interceptor, &ctx(ALICE), category("Souris", Some("Filaires")))
        .await?
        .entity;
    delete_category::handle(
        &interceptor,
        &ctx(ALICE),
        DeleteCategoryCommand {
            id_categorie: mice.id_categorie,
        },
    )
    .await?;

    let all = list_categories::handle(&db.pool, &db.history(), ListCategoriesQuery::default()).await?;
    assert_eq!(all.pagination.total, 2);
    assert!(all.items.iter().all(|row| row.last_change.is_some()));

    let query = ListCategoriesQuery {
        name_contains: Some("cas".into()),
        ..Default::default()
    };
    let filtered = list_categories::handle(&db.pool, &db.history(), query).await?;
    assert_eq!(filtered.items.len(), 1);
    assert_eq!(filtered.items[0].item.nom_categorie, "Casques");

    let records = db.records("category").await?;
    assert_eq!(records[0].action, AuditAction::Delete);
    assert_eq!(records[0].entity_id, mice.id_categorie);

    Ok(())
}

#[tokio::test]
async fn test_computer_upsert_by_serial() -> anyhow::Result<()> {
    let db = TestDb::new().await?;
    let interceptor = db.interceptor();

    let created = upsert_computer::handle(&interceptor, &ctx(ALICE), macbook("C02XK1", 16)).await?;
    assert_eq!(created.action, AuditAction::Create);

    let upgraded = upsert_computer::handle(&interceptor, &ctx(ALICE), macbook("C02XK1", 32)).await?;
    assert_eq!(upgraded.action, AuditAction::Update);
    assert_eq!(upgraded.entity.id_mac, created.entity.id_mac);
    assert_eq!(upgraded.changes.len(), 1);
    assert_eq!(upgraded.changes[0].field, "ram");
    assert_eq!(upgraded.changes[0].old_value, json!(16));
    assert_eq!(upgraded.changes[0].new_value, json!(32));

    let found = get_computer::handle(
        &db.pool,
        &db.history(),
        GetComputerQuery {
            id_mac: created.entity.id_mac,
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(found.item.ram, Some(32));
    assert_eq!(found.history.pagination.total, 2);

    Ok(())
}

#[tokio::test]
async fn test_computer_validation() -> anyhow::Result<()> {
    let db = TestDb::new().await?;
    let interceptor = db.interceptor();

    let err = upsert_computer::handle(&interceptor, &ctx(ALICE), macbook("C02XK2", 0))
        .await
        .expect_err("ram must be positive");
    assert!(matches!(err, AuditError::Validation(_)));

    let err = upsert_computer::handle(&interceptor, &ctx(ALICE), UpsertComputerCommand::default())
        .await
        .expect_err("serial is required");
    assert!(matches!(err, AuditError::Validation(ref message) if message == "Serial number is required"));

    assert!(db.records("computer").await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_computer_list_and_delete() -> anyhow::Result<()> {
    let db = TestDb::new().await?;
    let interceptor = db.interceptor();
    let kept = upsert_computer::handle(&interceptor, &ctx(ALICE), macbook("C02AA1", 16)).await?.entity;
    let removed = upsert_computer::handle(&interceptor, &ctx(ALICE), macbook("C02AA2", 16)).await?.entity;

    delete_computer::handle(&interceptor, &ctx(ALICE), DeleteComputerCommand { id_mac: removed.id_mac }).await?;

    let page = list_computers::handle(
        &db.pool,
        &db.history(),
        ListComputersQuery {
            numero_serie: Some("C02AA".into()),
            ..Default::default()
        },
    )
    .await?;

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].item.id_mac, kept.id_mac);

    let records = db.records("computer").await?;
    assert_eq!(records[0].action, AuditAction::Delete);
    assert_eq!(records[0].old_state.as_ref().map(|s| s["numero_serie"].clone()), Some(json!("C02AA2")));

    Ok(())
}

#[tokio::test]
async fn test_screen_save_semantics() -> anyhow::Result<()> {
    let db = TestDb::new().await?;
    let interceptor = db.interceptor();
    let fields = ScreenFields {
        numero_serie: Some("CN-100".into()),
        marque: Some("Dell".into()),
        modele: Some("U2723QE".into()),
        connectivite: Some("USB-C".into()),
        taille_pouces: Some(27.0),
        ..Default::default()
    };

    let created = save::handle(
        &interceptor,
        &ctx(ALICE),
        SaveScreenCommand {
            id_ecran: None,
            fields: fields.clone(),
        },
    )
    .await?;
    assert_eq!(created.action, AuditAction::Create);

    // without an id the serial must be new
    let err = save::handle(
        &interceptor,
        &ctx(ALICE),
        SaveScreenCommand {
            id_ecran: None,
            fields: fields.clone(),
        },
    )
    .await
    .expect_err("serial already exists");
    assert!(matches!(err, AuditError::Conflict { .. }));

    let updated = save::handle(
        &interceptor,
        &ctx(ALICE),
        SaveScreenCommand {
            id_ecran: Some(created.entity.id_ecran),
            fields: ScreenFields {
                statut: Some("En service".into()),
                ..Default::default()
            },
        },
    )
    .await?;
    assert_eq!(updated.action, AuditAction::Update);
    assert_eq!(updated.entity.marque, "Dell");

    let err = save::handle(
        &interceptor,
        &ctx(ALICE),
        SaveScreenCommand {
            id_ecran: Some(404),
            fields: ScreenFields::default(),
        },
    )
    .await
    .expect_err("unknown id");
    assert!(matches!(err, AuditError::NotFound { .. }));

    delete_screen::handle(
        &interceptor,
        &ctx(ALICE),
        DeleteScreenCommand {
            id_ecran: created.entity.id_ecran,
        },
    )
    .await?;

    let actions: Vec<AuditAction> = db.records("screen").await?.iter().map(|r| r.action).collect();
    assert_eq!(actions, vec![AuditAction::Delete, AuditAction::Update, AuditAction::Create]);

    Ok(())
}

#[tokio::test]
async fn test_screen_requires_identifying_fields() -> anyhow::Result<()> {
    let db = TestDb::new().await?;

    let command = SaveScreenCommand {
        id_ecran: None,
        fields: ScreenFields {
            numero_serie: Some("CN-101".into()),
            ..Default::default()
        },
    };
    let err = save::handle(&db.interceptor(), &ctx(ALICE), command)
        .await
        .expect_err("marque, modele and connectivite are required");

    assert_eq!(
        err.to_string(),
        "Validation failed: Required fields missing: marque, modele, connectivite"
    );

    Ok(())
}

#[tokio::test]
async fn test_equipment_detail_is_not_audited() -> anyhow::Result<()> {
    let db = TestDb::new().await?;
    let interceptor = db.interceptor();

    let created = create::handle(
        &interceptor,
        &ctx(ALICE),
        CreateEquipmentCommand {
            numero_serie: Some("HS-1".into()),
            fields: EquipmentFields {
                marque: Some("Jabra".into()),
                ..Default::default()
            },
            detail: Some(DetailFields {
                type_connexion: Some("Bluetooth".into()),
                ..Default::default()
            }),
        },
    )
    .await?;
    let detail = created.entity.detail.as_ref().expect("detail saved");
    assert_eq!(detail.type_connexion.as_deref(), Some("Bluetooth"));
    assert!(created.changes.iter().all(|c| c.field != "detail"));

    let recolored = update::handle(
        &interceptor,
        &ctx(ALICE),
        UpdateEquipmentCommand {
            id_equipement: created.entity.id_equipement,
            detail: Some(DetailFields {
                couleur: Some("Noir".into()),
                ..Default::default()
            }),
            ..Default::default()
        },
    )
    .await?;

    let detail = recolored.entity.detail.as_ref().expect("detail kept");
    assert_eq!(detail.couleur.as_deref(), Some("Noir"));
    assert_eq!(detail.type_connexion.as_deref(), Some("Bluetooth"));
    assert!(recolored.changes.is_empty());
    assert!(matches!(recolored.audit, AuditOutcome::Skipped));

    let records = db.records("equipment").await?;
    assert_eq!(records.len(), 1);
    assert!(!records[0].new_state.as_ref().is_some_and(|s| s.contains_key("detail")));

    Ok(())
}

#[tokio::test]
async fn test_equipment_upsert_list_and_get() -> anyhow::Result<()> {
    let db = TestDb::new().await?;
    let interceptor = db.interceptor();
    let command = |statut: &str| UpsertEquipmentCommand {
        numero_serie: Some("MS-1".into()),
        fields: EquipmentFields {
            modele: Some("MX Master 3".into()),
            statut: Some(statut.to_string()),
            prix: Some(99.9),
            ..Default::default()
        },
        detail: None,
    };

    let created = upsert_equipment::handle(&interceptor, &ctx(ALICE), command("En stock")).await?;
    assert_eq!(created.action, AuditAction::Create);
    let moved = upsert_equipment::handle(&interceptor, &ctx(ALICE), command("En service")).await?;
    assert_eq!(moved.action, AuditAction::Update);

    let page = list_equipment::handle(
        &db.pool,
        &db.history(),
        ListEquipmentQuery {
            statut: Some("En service".into()),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(page.items.len(), 1);
    let last_change = page.items[0].last_change.as_ref().expect("audited");
    assert_eq!(last_change.action, AuditAction::Update);

    let found = get_equipment::handle(
        &db.pool,
        &db.history(),
        GetEquipmentQuery {
            id_equipement: created.entity.id_equipement,
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(found.history.entries.len(), 2);
    assert_eq!(found.history.entries[0].changes[0].field, "statut");

    Ok(())
}
