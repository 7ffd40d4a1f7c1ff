pub mod get;
pub mod list;

pub use get::GetEquipmentQuery;
pub use list::ListEquipmentQuery;
