use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;

use crate::audit::Auditable;
use crate::error::AuditResult;

pub(crate) const CATEGORY_COLUMNS: &str = "id_categorie, nom_categorie, description";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id_categorie: i64,
    pub nom_categorie: String,
    pub description: Option<String>,
}

impl Auditable for Category {
    const ENTITY_TYPE: &'static str = "category";

    fn entity_id(&self) -> i64 {
        self.id_categorie
    }
}

pub(crate) async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> AuditResult<Option<Category>> {
    let category = sqlx::query_as(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id_categorie = ?"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(category)
}

pub(crate) async fn find_by_name(
    conn: &mut SqliteConnection,
    nom_categorie: &str,
) -> AuditResult<Option<Category>> {
    let category = sqlx::query_as(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM categories WHERE nom_categorie = ?"
    ))
    .bind(nom_categorie)
    .fetch_optional(conn)
    .await?;
    Ok(category)
}

pub(crate) async fn insert(
    conn: &mut SqliteConnection,
    nom_categorie: &str,
    description: Option<&str>,
) -> AuditResult<Category> {
    let category = sqlx::query_as(&format!(
        "INSERT INTO categories (nom_categorie, description) VALUES (?, ?) \
         RETURNING {CATEGORY_COLUMNS}"
    ))
    .bind(nom_categorie)
    .bind(description)
    .fetch_one(conn)
    .await?;
    Ok(category)
}

/// Apply the provided fields; `None` keeps the stored value
pub(crate) async fn update(
    conn: &mut SqliteConnection,
    id: i64,
    description: Option<&str>,
) -> AuditResult<Category> {
    let category = sqlx::query_as(&format!(
        "UPDATE categories SET description = COALESCE(?, description) \
         WHERE id_categorie = ? RETURNING {CATEGORY_COLUMNS}"
    ))
    .bind(description)
    .bind(id)
    .fetch_one(conn)
    .await?;
    Ok(category)
}

pub(crate) async fn delete(conn: &mut SqliteConnection, id: i64) -> AuditResult<Category> {
    let category = sqlx::query_as(&format!(
        "DELETE FROM categories WHERE id_categorie = ? RETURNING {CATEGORY_COLUMNS}"
    ))
    .bind(id)
    .fetch_one(conn)
    .await?;
    Ok(category)
}
