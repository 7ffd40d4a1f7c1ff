//! Stocktrail Common Library
//!
//! Shared logging setup and base error types for the Stocktrail workspace.
//!
//! # Overview
//!
//! - **Logging**: `tracing` subscriber initialisation driven by `LOG_*` variables
//! - **Error Handling**: the error type returned by the shared utilities
//!
//! # Example
//!
//! ```no_run
//! use stocktrail_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> stocktrail_common::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     let _guard = init_logging(&config)?;
//!     tracing::info!("Application started");
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod error;
pub mod logging;

pub use error::{CommonError, Result};
