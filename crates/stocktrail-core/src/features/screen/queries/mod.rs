pub mod get;
pub mod list;

pub use get::GetScreenQuery;
pub use list::ListScreensQuery;
