pub mod get;
pub mod list;

pub use get::GetComputerQuery;
pub use list::ListComputersQuery;
