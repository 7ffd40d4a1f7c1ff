use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;

use crate::audit::Auditable;
use crate::error::{AuditError, AuditResult};

pub(crate) const SCREEN_COLUMNS: &str = "id_ecran, numero_serie, marque, modele, connectivite, \
     taille_pouces, resolution, statut, localisation, commentaires";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Screen {
    pub id_ecran: i64,
    pub numero_serie: String,
    pub marque: String,
    pub modele: String,
    pub connectivite: String,
    pub taille_pouces: Option<f64>,
    pub resolution: Option<String>,
    pub statut: Option<String>,
    pub localisation: Option<String>,
    pub commentaires: Option<String>,
}

impl Auditable for Screen {
    const ENTITY_TYPE: &'static str = "screen";

    fn entity_id(&self) -> i64 {
        self.id_ecran
    }
}

/// Every writable screen column; `None` keeps the stored value on update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenFields {
    pub numero_serie: Option<String>,
    pub marque: Option<String>,
    pub modele: Option<String>,
    pub connectivite: Option<String>,
    pub taille_pouces: Option<f64>,
    pub resolution: Option<String>,
    pub statut: Option<String>,
    pub localisation: Option<String>,
    pub commentaires: Option<String>,
}

impl ScreenFields {
    pub fn validate(&self) -> AuditResult<()> {
        if matches!(self.taille_pouces, Some(size) if !(size.is_finite() && size > 0.0)) {
            return Err(AuditError::validation("taille_pouces must be greater than 0"));
        }
        Ok(())
    }
}

pub(crate) async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> AuditResult<Option<Screen>> {
    let screen = sqlx::query_as(&format!("SELECT {SCREEN_COLUMNS} FROM screens WHERE id_ecran = ?"))
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(screen)
}

pub(crate) async fn find_by_serial(
    conn: &mut SqliteConnection,
    numero_serie: &str,
) -> AuditResult<Option<Screen>> {
    let screen = sqlx::query_as(&format!(
        "SELECT {SCREEN_COLUMNS} FROM screens WHERE numero_serie = ?"
    ))
    .bind(numero_serie)
    .fetch_optional(conn)
    .await?;
    Ok(screen)
}

/// Callers check the required fields first; the NOT NULL columns reject gaps anyway
pub(crate) async fn insert(conn: &mut SqliteConnection, fields: &ScreenFields) -> AuditResult<Screen> {
    let screen = sqlx::query_as(&format!(
        "INSERT INTO screens (numero_serie, marque, modele, connectivite, taille_pouces, \
         resolution, statut, localisation, commentaires) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {SCREEN_COLUMNS}"
    ))
    .bind(fields.numero_serie.as_deref())
    .bind(fields.marque.as_deref())
    .bind(fields.modele.as_deref())
    .bind(fields.connectivite.as_deref())
    .bind(fields.taille_pouces)
    .bind(fields.resolution.as_deref())
    .bind(fields.statut.as_deref())
    .bind(fields.localisation.as_deref())
    .bind(fields.commentaires.as_deref())
    .fetch_one(conn)
    .await?;
    Ok(screen)
}

pub(crate) async fn update(
    conn: &mut SqliteConnection,
    id: i64,
    fields: &ScreenFields,
) -> AuditResult<Screen> {
    let screen = sqlx::query_as(&format!(
        "UPDATE screens SET \
            numero_serie = COALESCE(?, numero_serie), \
            marque = COALESCE(?, marque), \
            modele = COALESCE(?, modele), \
            connectivite = COALESCE(?, connectivite), \
            taille_pouces = COALESCE(?, taille_pouces), \
            resolution = COALESCE(?, resolution), \
            statut = COALESCE(?, statut), \
            localisation = COALESCE(?, localisation), \
            commentaires = COALESCE(?, commentaires) \
         WHERE id_ecran = ? RETURNING {SCREEN_COLUMNS}"
    ))
    .bind(fields.numero_serie.as_deref())
    .bind(fields.marque.as_deref())
    .bind(fields.modele.as_deref())
    .bind(fields.connectivite.as_deref())
    .bind(fields.taille_pouces)
    .bind(fields.resolution.as_deref())
    .bind(fields.statut.as_deref())
    .bind(fields.localisation.as_deref())
    .bind(fields.commentaires.as_deref())
    .bind(id)
    .fetch_one(conn)
    .await?;
    Ok(screen)
}

pub(crate) async fn delete(conn: &mut SqliteConnection, id: i64) -> AuditResult<Screen> {
    let screen = sqlx::query_as(&format!(
        "DELETE FROM screens WHERE id_ecran = ? RETURNING {SCREEN_COLUMNS}"
    ))
    .bind(id)
    .fetch_one(conn)
    .await?;
    Ok(screen)
}
