pub mod create;
pub mod delete;
pub mod update;
pub mod upsert;

pub use create::CreateEquipmentCommand;
pub use delete::DeleteEquipmentCommand;
pub use update::UpdateEquipmentCommand;
pub use upsert::UpsertEquipmentCommand;
