pub mod delete;
pub mod upsert;

pub use delete::DeleteCategoryCommand;
pub use upsert::UpsertCategoryCommand;
