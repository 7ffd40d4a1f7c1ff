//! Create equipment, or update the row with the same serial number

use serde::{Deserialize, Serialize};

use crate::audit::{AuditContext, Intercepted, Interceptor, MutationKind};
use crate::error::AuditResult;
use crate::features::equipment::commands::CreateEquipmentCommand;
use crate::features::equipment::model::{self, DetailFields, Equipment, EquipmentFields};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpsertEquipmentCommand {
    pub numero_serie: Option<String>,
    #[serde(flatten)]
    pub fields: EquipmentFields,
    #[serde(default)]
    pub detail: Option<DetailFields>,
}

impl From<UpsertEquipmentCommand> for CreateEquipmentCommand {
    fn from(command: UpsertEquipmentCommand) -> Self {
        Self {
            numero_serie: command.numero_serie,
            fields: command.fields,
            detail: command.detail,
        }
    }
}

#[tracing::instrument(skip(interceptor, ctx, command), fields(numero_serie = ?command.numero_serie))]
pub async fn handle(
    interceptor: &Interceptor,
    ctx: &AuditContext,
    command: UpsertEquipmentCommand,
) -> AuditResult<Intercepted<Equipment>> {
    let command = CreateEquipmentCommand::from(command);
    let serial = command.validate()?;
    let key = serial.clone();
    let lookup_serial = serial.clone();
    let CreateEquipmentCommand { fields, detail, .. } = command;

    interceptor
        .intercept(
            ctx,
            MutationKind::Upsert,
            &key,
            move |conn| Box::pin(async move { model::find_by_serial(conn, &lookup_serial).await }),
            move |conn, existing| {
                Box::pin(async move {
                    match existing {
                        Some(current) => {
                            model::update(conn, current.id_equipement, None, &fields, detail.as_ref())
                                .await
                        }
                        None => model::insert(conn, &serial, &fields, detail.as_ref()).await,
                    }
                })
            },
        )
        .await
}
