//! Equipment, keyed by `numero_serie`
//!
//! An equipment row may own one `equipment_details` row. The detail is loaded
//! with the equipment and returned to callers, but it is a relation and is not
//! part of the audited snapshot.

pub mod commands;
pub mod model;
pub mod queries;

pub use commands::{
    CreateEquipmentCommand, DeleteEquipmentCommand, UpdateEquipmentCommand, UpsertEquipmentCommand,
};
pub use model::{DetailFields, Equipment, EquipmentDetail, EquipmentFields};
pub use queries::{GetEquipmentQuery, ListEquipmentQuery};
