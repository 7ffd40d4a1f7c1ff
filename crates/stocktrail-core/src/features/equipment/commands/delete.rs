use serde::{Deserialize, Serialize};

use crate::audit::{AuditContext, Intercepted, Interceptor, MutationKind};
use crate::error::AuditResult;
use crate::features::equipment::model::{self, Equipment};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeleteEquipmentCommand {
    pub id_equipement: i64,
}

#[tracing::instrument(skip(interceptor, ctx), fields(id_equipement = command.id_equipement))]
pub async fn handle(
    interceptor: &Interceptor,
    ctx: &AuditContext,
    command: DeleteEquipmentCommand,
) -> AuditResult<Intercepted<Equipment>> {
    let id = command.id_equipement;

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
