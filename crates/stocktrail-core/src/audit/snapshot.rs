//! Canonical field maps of live entities
//!
//! A snapshot is the entity's `serde` representation flattened to an ordered
//! map of scalar values. Relational fields named in [`Auditable::RELATIONS`]
//! are dropped, and anything else that is not a scalar is rejected.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::SerializationError;

/// Ordered field name to JSON scalar map, in declaration order
pub type FieldMap = Map<String, Value>;

/// An entity whose mutations are recorded in the audit trail
///
/// The `Serialize` impl must emit every persisted column, with `None` as an
/// explicit null. Do not use `skip_serializing_if` on audited fields.
pub trait Auditable: Serialize {
    /// Logical table name stored in `audit_log.entity_type`
    const ENTITY_TYPE: &'static str;

    /// Serialized fields that reference other records and are not captured
    const RELATIONS: &'static [&'static str] = &[];

    fn entity_id(&self) -> i64;
}

/// Capture `entity` as a [`FieldMap`]
///
/// Dates and timestamps come out as ISO-8601 text through chrono's `serde`
/// support; use [`timestamp`](super::models::timestamp) on `DateTime<Utc>`
/// fields to get the fixed-width form.
pub fn snapshot<E: Auditable>(entity: &E) -> Result<FieldMap, SerializationError> {
    let value = serde_json::to_value(entity).map_err(|source| SerializationError::Serde {
        entity_type: E::ENTITY_TYPE,
        source,
    })?;

    let Value::Object(fields) = value else {
        return Err(SerializationError::NotAFieldMap {
            entity_type: E::ENTITY_TYPE,
        });
    };

    let mut captured = FieldMap::new();
    for (field, value) in fields {
        if E::RELATIONS.contains(&field.as_str()) {
            continue;
        }

        let kind = match value {
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            scalar => {
                captured.insert(field, scalar);
                continue;
            }
        };

        return Err(SerializationError::UnsupportedField {
            entity_type: E::ENTITY_TYPE,
            field,
            kind,
        });
    }

    Ok(captured)
}
