use serde::{Deserialize, Serialize};

use crate::audit::{AuditContext, Intercepted, Interceptor, MutationKind};
use crate::error::AuditResult;
use crate::features::computer::model::{self, Computer};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeleteComputerCommand {
    pub id_mac: i64,
}

#[tracing::instrument(skip(interceptor, ctx), fields(id_mac = command.id_mac))]
pub async fn handle(
    interceptor: &Interceptor,
    ctx: &AuditContext,
    command: DeleteComputerCommand,
) -> AuditResult<Intercepted<Computer>> {
    let id = command.id_mac;

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
