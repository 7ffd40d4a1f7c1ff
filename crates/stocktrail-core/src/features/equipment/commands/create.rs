//! Create equipment
//!
//! Fails with a conflict when the serial number is already registered.

use serde::{Deserialize, Serialize};

use crate::audit::{AuditContext, Intercepted, Interceptor, MutationKind};
use crate::error::{AuditError, AuditResult};
use crate::features::equipment::model::{self, DetailFields, Equipment, EquipmentFields};
use crate::features::shared::has_text;

/// Command to register a new piece of equipment
///
/// # Examples
///
/// ```rust,ignore
/// use stocktrail_core::features::equipment::{CreateEquipmentCommand, EquipmentFields};
///
/// let command = CreateEquipmentCommand {
///     numero_serie: Some("ABC123".to_string()),
///     fields: EquipmentFields {
///         marque: Some("Logitech".to_string()),
///         statut: Some("En stock".to_string()),
///         ..Default::default()
///     },
///     detail: None,
/// };
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateEquipmentCommand {
    pub numero_serie: Option<String>,
    #[serde(flatten)]
    pub fields: EquipmentFields,
    #[serde(default)]
    pub detail: Option<DetailFields>,
}

impl CreateEquipmentCommand {
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
    command: CreateEquipmentCommand,
) -> AuditResult<Intercepted<Equipment>> {
    let serial = command.validate()?;
    let key = serial.clone();
    let lookup_serial = serial.clone();
    let CreateEquipmentCommand { fields, detail, .. } = command;

    interceptor
        .intercept(
            ctx,
            MutationKind::Create,
            &key,
            move |conn| Box::pin(async move { model::find_by_serial(conn, &lookup_serial).await }),
            move |conn, _existing| {
                Box::pin(async move { model::insert(conn, &serial, &fields, detail.as_ref()).await })
            },
        )
        .await
}
