//! Screens, keyed by `numero_serie`

pub mod commands;
pub mod model;
pub mod queries;

pub use commands::{DeleteScreenCommand, SaveScreenCommand};
pub use model::{Screen, ScreenFields};
pub use queries::{GetScreenQuery, ListScreensQuery};
