use serde::{Deserialize, Serialize};

use crate::audit::{AuditContext, Intercepted, Interceptor, MutationKind};
use crate::error::AuditResult;
use crate::features::screen::model::{self, Screen};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeleteScreenCommand {
    pub id_ecran: i64,
}

#[tracing::instrument(skip(interceptor, ctx), fields(id_ecran = command.id_ecran))]
pub async fn handle(
    interceptor: &Interceptor,
    ctx: &AuditContext,
    command: DeleteScreenCommand,
) -> AuditResult<Intercepted<Screen>> {
    let id = command.id_ecran;

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
