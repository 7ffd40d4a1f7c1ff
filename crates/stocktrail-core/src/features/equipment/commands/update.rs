//! Update equipment by id
//!
//! Only the provided fields change. The serial number may be changed; a
//! collision with another row is reported as a conflict.

use serde::{Deserialize, Serialize};

use crate::audit::{AuditContext, Intercepted, Interceptor, MutationKind};
use crate::error::{AuditError, AuditResult};
use crate::features::equipment::model::{self, DetailFields, Equipment, EquipmentFields};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEquipmentCommand {
    pub id_equipement: i64,
    pub numero_serie: Option<String>,
    #[serde(flatten)]
    pub fields: EquipmentFields,
    #[serde(default)]
    pub detail: Option<DetailFields>,
}

impl UpdateEquipmentCommand {
    pub fn validate(&self) -> AuditResult<()> {
        if matches!(self.numero_serie.as_deref(), Some(serial) if serial.trim().is_empty()) {
            return Err(AuditError::validation("Serial number cannot be blank"));
        }
        self.fields.validate()
    }
}

#[tracing::instrument(skip(interceptor, ctx, command), fields(id_equipement = command.id_equipement))]
pub async fn handle(
    interceptor: &Interceptor,
    ctx: &AuditContext,
    command: UpdateEquipmentCommand,
) -> AuditResult<Intercepted<Equipment>> {
    command.validate()?;
    let UpdateEquipmentCommand {
        id_equipement: id,
        numero_serie,
        fields,
        detail,
    } = command;

    interceptor
        .intercept(
            ctx,
            MutationKind::Update,
            &id.to_string(),
            move |conn| Box::pin(async move { model::find_by_id(conn, id).await }),
            move |conn, _existing| {
                Box::pin(async move {
                    model::update(conn, id, numero_serie.as_deref(), &fields, detail.as_ref()).await
                })
            },
        )
        .await
}
