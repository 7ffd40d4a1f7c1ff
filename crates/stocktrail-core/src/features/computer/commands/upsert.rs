//! Create a computer, or update the one with the same serial number
//!
//! Fields left out of the command keep their stored value.

use serde::{Deserialize, Serialize};

use crate::audit::{AuditContext, Intercepted, Interceptor, MutationKind};
use crate::error::{AuditError, AuditResult};
use crate::features::computer::model::{self, Computer, ComputerFields};
use crate::features::shared::has_text;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpsertComputerCommand {
    pub numero_serie: Option<String>,
    #[serde(flatten)]
    pub fields: ComputerFields,
}

impl UpsertComputerCommand {
    /// Returns the serial number, which must be present
    pub fn validate(&self) -> AuditResult<String> {
        let serial = match &self.numero_serie {
            Some(serial) if has_text(&self.numero_serie) => serial.clone(),
            _ => return Err(AuditError::validation("Serial number is required")),
        };
        self.fields.validate()?;
        Ok(serial)
    }
}

#[tracing::instrument(skip(interceptor, ctx, command), fields(numero_serie = ?command.numero_serie))]
pub async fn handle(
    interceptor: &Interceptor,
    ctx: &AuditContext,
    command: UpsertComputerCommand,
) -> AuditResult<Intercepted<Computer>> {
    let serial = command.validate()?;
    let key = serial.clone();
    let lookup_serial = serial.clone();
    let fields = command.fields;

    interceptor
        .intercept(
            ctx,
            MutationKind::Upsert,
            &key,
            move |conn| Box::pin(async move { model::find_by_serial(conn, &lookup_serial).await }),
            move |conn, existing| {
                Box::pin(async move {
                    match existing {
                        Some(current) => model::update(conn, current.id_mac, &fields).await,
                        None => model::insert(conn, &serial, &fields).await,
                    }
                })
            },
        )
        .await
}
