pub mod list;

pub use list::ListCategoriesQuery;
