pub mod delete;
pub mod save;

pub use delete::DeleteScreenCommand;
pub use save::SaveScreenCommand;
