//! Stocktrail core library
//!
//! Field-level change auditing for the equipment inventory. Every write to an
//! inventory table goes through the [`Interceptor`](audit::Interceptor), which
//! captures the entity before and after the mutation, diffs the two snapshots
//! and appends an immutable record to the `audit_log` table.
//!
//! # Modules
//!
//! - [`audit`]: snapshots, diffs, the audit store, the interceptor and history queries
//! - [`features`]: inventory command and query handlers (categories, equipment, computers, screens)
//! - [`db`]: SQLite pool creation and migrations
//! - [`config`]: environment-driven configuration
//!
//! # Example
//!
//! ```rust,ignore
//! use stocktrail_core::audit::{AuditContext, Interceptor, InterceptorConfig};
//! use stocktrail_core::features::equipment::commands::{create, CreateEquipmentCommand};
//!
//! let interceptor = Interceptor::new(pool.clone(), InterceptorConfig::default());
//! let ctx = AuditContext::new(42).with_origin("10.0.0.7 inventory-ui/2.1");
//!
//! let outcome = create::handle(&interceptor, &ctx, CreateEquipmentCommand {
//!     numero_serie: Some("ABC123".into()),
//!     ..Default::default()
//! }).await?;
//! println!("created equipment {} with {} audited fields", outcome.entity.id_equipement, outcome.changes.len());
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod audit;
pub mod config;
pub mod db;
pub mod error;
pub mod features;

pub use error::{AuditError, AuditResult, AuditWriteError, SerializationError};
