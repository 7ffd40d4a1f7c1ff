//! Save a screen
//!
//! With `id_ecran` the stored screen is updated; without it a new one is
//! created and an existing serial number is a conflict.

use serde::{Deserialize, Serialize};

use crate::audit::{AuditContext, Intercepted, Interceptor, MutationKind};
use crate::error::AuditResult;
use crate::features::screen::model::{self, Screen, ScreenFields};
use crate::features::shared::{has_text, require_fields};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaveScreenCommand {
    pub id_ecran: Option<i64>,
    #[serde(flatten)]
    pub fields: ScreenFields,
}

impl SaveScreenCommand {
    pub fn validate(&self) -> AuditResult<()> {
        if self.id_ecran.is_none() {
            let fields = &self.fields;
            require_fields(&[
                ("numero_serie", has_text(&fields.numero_serie)),
                ("marque", has_text(&fields.marque)),
                ("modele", has_text(&fields.modele)),
                ("connectivite", has_text(&fields.connectivite)),
            ])?;
        }
        self.fields.validate()
    }
}

#[tracing::instrument(skip(interceptor, ctx, command), fields(id_ecran = ?command.id_ecran))]
pub async fn handle(
    interceptor: &Interceptor,
    ctx: &AuditContext,
    command: SaveScreenCommand,
) -> AuditResult<Intercepted<Screen>> {
    command.validate()?;
    let SaveScreenCommand { id_ecran, fields } = command;

    match id_ecran {
        Some(id) => {
            interceptor
                .intercept(
                    ctx,
                    MutationKind::Update,
                    &id.to_string(),
                    move |conn| Box::pin(async move { model::find_by_id(conn, id).await }),
                    move |conn, _existing| Box::pin(async move { model::update(conn, id, &fields).await }),
                )
                .await
        }
        None => {
            // validate() guarantees the serial for creations
            let serial = fields.numero_serie.clone().unwrap_or_default();
            let key = serial.clone();

            interceptor
                .intercept(
                    ctx,
                    MutationKind::Create,
                    &key,
                    move |conn| Box::pin(async move { model::find_by_serial(conn, &serial).await }),
                    move |conn, _existing| Box::pin(async move { model::insert(conn, &fields).await }),
                )
                .await
        }
    }
}
