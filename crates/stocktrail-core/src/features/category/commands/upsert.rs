//! Create a category, or update the one with the same name

use serde::{Deserialize, Serialize};

use crate::audit::{AuditContext, Intercepted, Interceptor, MutationKind};
use crate::error::{AuditError, AuditResult};
use crate::features::category::model::{self, Category};
use crate::features::shared::has_text;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpsertCategoryCommand {
    pub nom_categorie: Option<String>,
    /// Left unchanged on update when absent
    pub description: Option<String>,
}

impl UpsertCategoryCommand {
    /// Returns the natural key, which must be present
    pub fn validate(&self) -> AuditResult<String> {
        match &self.nom_categorie {
            Some(name) if has_text(&self.nom_categorie) => Ok(name.clone()),
            _ => Err(AuditError::validation("Category name is required")),
        }
    }
}

#[tracing::instrument(skip(interceptor, ctx, command), fields(nom_categorie = ?command.nom_categorie))]
pub async fn handle(
    interceptor: &Interceptor,
    ctx: &AuditContext,
    command: UpsertCategoryCommand,
) -> AuditResult<Intercepted<Category>> {
    let name = command.validate()?;
    let key = name.clone();
    let lookup_name = name.clone();
    let description = command.description;

    interceptor
        .intercept(
            ctx,
            MutationKind::Upsert,
            &key,
            move |conn| Box::pin(async move { model::find_by_name(conn, &lookup_name).await }),
            move |conn, existing| {
                Box::pin(async move {
                    match existing {
                        Some(current) => {
                            model::update(conn, current.id_categorie, description.as_deref()).await
                        }
                        None => model::insert(conn, &name, description.as_deref()).await,
                    }
                })
            },
        )
        .await
}
