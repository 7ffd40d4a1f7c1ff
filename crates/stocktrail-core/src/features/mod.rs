//! Inventory feature modules
//!
//! Each feature is a vertical slice with its own commands and queries.
//! Commands write through the [`Interceptor`](crate::audit::Interceptor)
//! so that every mutation produces an audit record; queries read the
//! entity tables directly and attach history from the audit log.
//!
//! # Features
//!
//! - **category**: equipment categories, upserted by name
//! - **computer**: the Mac inventory, upserted by serial number
//! - **equipment**: general equipment with an optional detail row
//! - **screen**: screens, saved by id or created by serial number
//!
//! # Architecture
//!
//! Each feature module follows the structure:
//! - `model.rs` - Row type, its `Auditable` impl and the SQL it needs
//! - `commands/` - Write operations (create, update, upsert, delete)
//! - `queries/` - Read operations (get, list)

pub mod category;
pub mod computer;
pub mod equipment;
pub mod screen;
pub mod shared;
