//! Computers (the Mac inventory), keyed by `numero_serie`

pub mod commands;
pub mod model;
pub mod queries;

pub use commands::{DeleteComputerCommand, UpsertComputerCommand};
pub use model::{Computer, ComputerFields};
pub use queries::{GetComputerQuery, ListComputersQuery};
