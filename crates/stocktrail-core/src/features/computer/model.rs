use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;

use crate::audit::Auditable;
use crate::error::{AuditError, AuditResult};

pub(crate) const COMPUTER_COLUMNS: &str = "id_mac, numero_serie, modele, type_mac, annee_achat, \
     processeur, ram, stockage, stockage_type, ecran_taille, resolution_ecran, numero_serie_apple, \
     statut, localisation, date_dernier_inventaire, commentaires";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Computer {
    pub id_mac: i64,
    pub numero_serie: String,
    pub modele: Option<String>,
    pub type_mac: Option<String>,
    pub annee_achat: Option<NaiveDate>,
    pub processeur: Option<String>,
    /// GB
    pub ram: Option<i64>,
    /// GB
    pub stockage: Option<i64>,
    pub stockage_type: Option<String>,
    /// Inches
    pub ecran_taille: Option<f64>,
    pub resolution_ecran: Option<String>,
    pub numero_serie_apple: Option<String>,
    pub statut: Option<String>,
    pub localisation: Option<String>,
    pub date_dernier_inventaire: Option<NaiveDate>,
    pub commentaires: Option<String>,
}

impl Auditable for Computer {
    const ENTITY_TYPE: &'static str = "computer";

    fn entity_id(&self) -> i64 {
        self.id_mac
    }
}

/// Writable columns other than the serial number; `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComputerFields {
    pub modele: Option<String>,
    pub type_mac: Option<String>,
    pub annee_achat: Option<NaiveDate>,
    pub processeur: Option<String>,
    pub ram: Option<i64>,
    pub stockage: Option<i64>,
    pub stockage_type: Option<String>,
    pub ecran_taille: Option<f64>,
    pub resolution_ecran: Option<String>,
    pub numero_serie_apple: Option<String>,
    pub statut: Option<String>,
    pub localisation: Option<String>,
    pub date_dernier_inventaire: Option<NaiveDate>,
    pub commentaires: Option<String>,
}

impl ComputerFields {
    /// Sizes must be positive when given
    pub fn validate(&self) -> AuditResult<()> {
        let mut invalid = Vec::new();
        if matches!(self.ram, Some(ram) if ram <= 0) {
            invalid.push("ram");
        }
        if matches!(self.stockage, Some(stockage) if stockage <= 0) {
            invalid.push("stockage");
        }
        if matches!(self.ecran_taille, Some(size) if !(size.is_finite() && size > 0.0)) {
            invalid.push("ecran_taille");
        }

        if invalid.is_empty() {
            Ok(())
        } else {
            Err(AuditError::validation(format!(
                "must be greater than 0: {}",
                invalid.join(", ")
            )))
        }
    }
}

pub(crate) async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> AuditResult<Option<Computer>> {
    let computer = sqlx::query_as(&format!("SELECT {COMPUTER_COLUMNS} FROM computers WHERE id_mac = ?"))
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(computer)
}

pub(crate) async fn find_by_serial(
    conn: &mut SqliteConnection,
    numero_serie: &str,
) -> AuditResult<Option<Computer>> {
    let computer = sqlx::query_as(&format!(
        "SELECT {COMPUTER_COLUMNS} FROM computers WHERE numero_serie = ?"
    ))
    .bind(numero_serie)
    .fetch_optional(conn)
    .await?;
    Ok(computer)
}

pub(crate) async fn insert(
    conn: &mut SqliteConnection,
    numero_serie: &str,
    fields: &ComputerFields,
) -> AuditResult<Computer> {
    let computer = sqlx::query_as(&format!(
        "INSERT INTO computers (numero_serie, modele, type_mac, annee_achat, processeur, ram, \
         stockage, stockage_type, ecran_taille, resolution_ecran, numero_serie_apple, statut, \
         localisation, date_dernier_inventaire, commentaires) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {COMPUTER_COLUMNS}"
    ))
    .bind(numero_serie)
    .bind(fields.modele.as_deref())
    .bind(fields.type_mac.as_deref())
    .bind(fields.annee_achat)
    .bind(fields.processeur.as_deref())
    .bind(fields.ram)
    .bind(fields.stockage)
    .bind(fields.stockage_type.as_deref())
    .bind(fields.ecran_taille)
    .bind(fields.resolution_ecran.as_deref())
    .bind(fields.numero_serie_apple.as_deref())
    .bind(fields.statut.as_deref())
    .bind(fields.localisation.as_deref())
    .bind(fields.date_dernier_inventaire)
    .bind(fields.commentaires.as_deref())
    .fetch_one(conn)
    .await?;
    Ok(computer)
}

pub(crate) async fn update(
    conn: &mut SqliteConnection,
    id: i64,
    fields: &ComputerFields,
) -> AuditResult<Computer> {
    let computer = sqlx::query_as(&format!(
        "UPDATE computers SET \
            modele = COALESCE(?, modele), \
            type_mac = COALESCE(?, type_mac), \
            annee_achat = COALESCE(?, annee_achat), \
            processeur = COALESCE(?, processeur), \
            ram = COALESCE(?, ram), \
            stockage = COALESCE(?, stockage), \
            stockage_type = COALESCE(?, stockage_type), \
            ecran_taille = COALESCE(?, ecran_taille), \
            resolution_ecran = COALESCE(?, resolution_ecran), \
            numero_serie_apple = COALESCE(?, numero_serie_apple), \
            statut = COALESCE(?, statut), \
            localisation = COALESCE(?, localisation), \
            date_dernier_inventaire = COALESCE(?, date_dernier_inventaire), \
            commentaires = COALESCE(?, commentaires) \
         WHERE id_mac = ? RETURNING {COMPUTER_COLUMNS}"
    ))
    .bind(fields.modele.as_deref())
    .bind(fields.type_mac.as_deref())
    .bind(fields.annee_achat)
    .bind(fields.processeur.as_deref())
    .bind(fields.ram)
    .bind(fields.stockage)
    .bind(fields.stockage_type.as_deref())
    .bind(fields.ecran_taille)
    .bind(fields.resolution_ecran.as_deref())
    .bind(fields.numero_serie_apple.as_deref())
    .bind(fields.statut.as_deref())
    .bind(fields.localisation.as_deref())
    .bind(fields.date_dernier_inventaire)
    .bind(fields.commentaires.as_deref())
    .bind(id)
    .fetch_one(conn)
    .await?;
    Ok(computer)
}

pub(crate) async fn delete(conn: &mut SqliteConnection, id: i64) -> AuditResult<Computer> {
    let computer = sqlx::query_as(&format!(
        "DELETE FROM computers WHERE id_mac = ? RETURNING {COMPUTER_COLUMNS}"
    ))
    .bind(id)
    .fetch_one(conn)
    .await?;
    Ok(computer)
}
