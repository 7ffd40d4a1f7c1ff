//! Equipment categories, keyed by `nom_categorie`

pub mod commands;
pub mod model;
pub mod queries;

pub use commands::{DeleteCategoryCommand, UpsertCategoryCommand};
pub use model::Category;
pub use queries::ListCategoriesQuery;
