pub mod delete;
pub mod upsert;

pub use delete::DeleteComputerCommand;
pub use upsert::UpsertComputerCommand;
