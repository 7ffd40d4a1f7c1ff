use serde::{Deserialize, Serialize};

use crate::audit::{AuditContext, Intercepted, Interceptor, MutationKind};
use crate::error::AuditResult;
use crate::features::category::model::{self, Category};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeleteCategoryCommand {
    pub id_categorie: i64,
}

/// Delete a category; fails while equipment still references it
#[tracing::instrument(skip(interceptor, ctx), fields(id_categorie = command.id_categorie))]
pub async fn handle(
    interceptor: &Interceptor,
    ctx: &AuditContext,
    command: DeleteCategoryCommand,
) -> AuditResult<Intercepted<Category>> {
    let id = command.id_categorie;

    interceptor
        .intercept(
            ctx,
            MutationKind::Delete,
            &id.to_string(),
            move |conn| Box::pin(async move { model::find_by_id(conn, id).await }),
            move |conn, _existing| Box::pin(async move { model::delete(conn, id).await }),
        )
        .await
}
