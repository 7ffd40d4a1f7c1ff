use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::query::QueryAs;
use sqlx::sqlite::SqliteArguments;
use sqlx::{Sqlite, SqliteConnection};

use crate::audit::Auditable;
use crate::error::{AuditError, AuditResult};

pub(crate) const EQUIPMENT_COLUMNS: &str = "id_equipement, id_categorie, numero_serie, marque, modele, \
     date_achat, date_mise_en_service, statut, localisation, prix, fournisseur, garantie_expire, \
     commentaires";

const DETAIL_COLUMNS: &str = "id_detail, id_equipement, type_connexion, puissance_watts, \
     longueur_cable, couleur, compatibilite, caracteristiques_specifiques";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Equipment {
    pub id_equipement: i64,
    pub id_categorie: Option<i64>,
    pub numero_serie: String,
    pub marque: Option<String>,
    pub modele: Option<String>,
    pub date_achat: Option<NaiveDate>,
    pub date_mise_en_service: Option<NaiveDate>,
    pub statut: Option<String>,
    pub localisation: Option<String>,
    pub prix: Option<f64>,
    pub fournisseur: Option<String>,
    pub garantie_expire: Option<NaiveDate>,
    pub commentaires: Option<String>,
    #[sqlx(skip)]
    pub detail: Option<EquipmentDetail>,
}

impl Auditable for Equipment {
    const ENTITY_TYPE: &'static str = "equipment";
    const RELATIONS: &'static [&'static str] = &["detail"];

    fn entity_id(&self) -> i64 {
        self.id_equipement
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct EquipmentDetail {
    pub id_detail: i64,
    pub id_equipement: i64,
    pub type_connexion: Option<String>,
    pub puissance_watts: Option<f64>,
    pub longueur_cable: Option<f64>,
    pub couleur: Option<String>,
    pub compatibilite: Option<String>,
    pub caracteristiques_specifiques: Option<String>,
}

/// Writable equipment columns other than the natural key
///
/// On update a `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquipmentFields {
    pub id_categorie: Option<i64>,
    pub marque: Option<String>,
    pub modele: Option<String>,
    pub date_achat: Option<NaiveDate>,
    pub date_mise_en_service: Option<NaiveDate>,
    pub statut: Option<String>,
    pub localisation: Option<String>,
    pub prix: Option<f64>,
    pub fournisseur: Option<String>,
    pub garantie_expire: Option<NaiveDate>,
    pub commentaires: Option<String>,
}

impl EquipmentFields {
    pub fn validate(&self) -> AuditResult<()> {
        if let Some(prix) = self.prix {
            if !prix.is_finite() || prix < 0.0 {
                return Err(AuditError::validation(format!("prix must be a positive amount, got {prix}")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailFields {
    pub type_connexion: Option<String>,
    pub puissance_watts: Option<f64>,
    pub longueur_cable: Option<f64>,
    pub couleur: Option<String>,
    pub compatibilite: Option<String>,
    pub caracteristiques_specifiques: Option<String>,
}

type EquipmentQuery<'q> = QueryAs<'q, Sqlite, Equipment, SqliteArguments<'q>>;

fn bind_fields<'q>(query: EquipmentQuery<'q>, fields: &'q EquipmentFields) -> EquipmentQuery<'q> {
    query
        .bind(fields.id_categorie)
        .bind(fields.marque.as_deref())
        .bind(fields.modele.as_deref())
        .bind(fields.date_achat)
        .bind(fields.date_mise_en_service)
        .bind(fields.statut.as_deref())
        .bind(fields.localisation.as_deref())
        .bind(fields.prix)
        .bind(fields.fournisseur.as_deref())
        .bind(fields.garantie_expire)
        .bind(fields.commentaires.as_deref())
}

pub(crate) async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> AuditResult<Option<Equipment>> {
    let found: Option<Equipment> = sqlx::query_as(&format!(
        "SELECT {EQUIPMENT_COLUMNS} FROM equipment WHERE id_equipement = ?"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    match found {
        Some(equipment) => Ok(Some(with_detail(conn, equipment).await?)),
        None => Ok(None),
    }
}

pub(crate) async fn find_by_serial(
    conn: &mut SqliteConnection,
    numero_serie: &str,
) -> AuditResult<Option<Equipment>> {
    let found: Option<Equipment> = sqlx::query_as(&format!(
        "SELECT {EQUIPMENT_COLUMNS} FROM equipment WHERE numero_serie = ?"
    ))
    .bind(numero_serie)
    .fetch_optional(&mut *conn)
    .await?;

    match found {
        Some(equipment) => Ok(Some(with_detail(conn, equipment).await?)),
        None => Ok(None),
    }
}

async fn with_detail(conn: &mut SqliteConnection, mut equipment: Equipment) -> AuditResult<Equipment> {
    equipment.detail = sqlx::query_as(&format!(
        "SELECT {DETAIL_COLUMNS} FROM equipment_details WHERE id_equipement = ?"
    ))
    .bind(equipment.id_equipement)
    .fetch_optional(conn)
    .await?;
    Ok(equipment)
}

pub(crate) async fn insert(
    conn: &mut SqliteConnection,
    numero_serie: &str,
    fields: &EquipmentFields,
    detail: Option<&DetailFields>,
) -> AuditResult<Equipment> {
    let sql = format!(
        "INSERT INTO equipment (numero_serie, id_categorie, marque, modele, date_achat, \
         date_mise_en_service, statut, localisation, prix, fournisseur, garantie_expire, commentaires) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {EQUIPMENT_COLUMNS}"
    );
    let query = sqlx::query_as(&sql).bind(numero_serie);
    let equipment = bind_fields(query, fields).fetch_one(&mut *conn).await?;

    save_detail(conn, equipment, detail).await
}

/// Apply the provided fields to row `id`; absent fields keep their value
pub(crate) async fn update(
    conn: &mut SqliteConnection,
    id: i64,
    numero_serie: Option<&str>,
    fields: &EquipmentFields,
    detail: Option<&DetailFields>,
) -> AuditResult<Equipment> {
    let sql = format!(
        "UPDATE equipment SET \
            numero_serie = COALESCE(?, numero_serie), \
            id_categorie = COALESCE(?, id_categorie), \
            marque = COALESCE(?, marque), \
            modele = COALESCE(?, modele), \
            date_achat = COALESCE(?, date_achat), \
            date_mise_en_service = COALESCE(?, date_mise_en_service), \
            statut = COALESCE(?, statut), \
            localisation = COALESCE(?, localisation), \
            prix = COALESCE(?, prix), \
            fournisseur = COALESCE(?, fournisseur), \
            garantie_expire = COALESCE(?, garantie_expire), \
            commentaires = COALESCE(?, commentaires) \
         WHERE id_equipement = ? RETURNING {EQUIPMENT_COLUMNS}"
    );
    let query = sqlx::query_as(&sql).bind(numero_serie);
    let equipment = bind_fields(query, fields)
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;

    save_detail(conn, equipment, detail).await
}

/// Upsert the detail row when fields are given, then attach whatever is stored
async fn save_detail(
    conn: &mut SqliteConnection,
    equipment: Equipment,
    detail: Option<&DetailFields>,
) -> AuditResult<Equipment> {
    if let Some(detail) = detail {
        sqlx::query(
            "INSERT INTO equipment_details (id_equipement, type_connexion, puissance_watts, \
             longueur_cable, couleur, compatibilite, caracteristiques_specifiques) \
             VALUES (?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT (id_equipement) DO UPDATE SET \
                type_connexion = COALESCE(excluded.type_connexion, type_connexion), \
                puissance_watts = COALESCE(excluded.puissance_watts, puissance_watts), \
                longueur_cable = COALESCE(excluded.longueur_cable, longueur_cable), \
                couleur = COALESCE(excluded.couleur, couleur), \
                compatibilite = COALESCE(excluded.compatibilite, compatibilite), \
                caracteristiques_specifiques = \
                    COALESCE(excluded.caracteristiques_specifiques, caracteristiques_specifiques)",
        )
        .bind(equipment.id_equipement)
        .bind(detail.type_connexion.as_deref())
        .bind(detail.puissance_watts)
        .bind(detail.longueur_cable)
        .bind(detail.couleur.as_deref())
        .bind(detail.compatibilite.as_deref())
        .bind(detail.caracteristiques_specifiques.as_deref())
        .execute(&mut *conn)
        .await?;
    }

    with_detail(conn, equipment).await
}

/// Remove row `id`; its detail row goes with it
pub(crate) async fn delete(conn: &mut SqliteConnection, id: i64) -> AuditResult<Equipment> {
    let equipment = sqlx::query_as(&format!(
        "DELETE FROM equipment WHERE id_equipement = ? RETURNING {EQUIPMENT_COLUMNS}"
    ))
    .bind(id)
    .fetch_one(conn)
    .await?;
    Ok(equipment)
}
