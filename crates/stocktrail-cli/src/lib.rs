//! Stocktrail CLI Library
//!
//! Command-line access to the inventory audit trail:
//!
//! - **Migrations**: create or upgrade the database schema (`stocktrail migrate`)
//! - **History**: print the recorded changes of an entity type (`stocktrail history`)
//! - **Latest**: print the last change of a set of entities (`stocktrail latest`)

pub mod commands;
pub mod error;
pub mod output;

pub use error::{CliError, Result};

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use stocktrail_core::audit::AuditAction;

use crate::output::OutputFormat;

/// Stocktrail - audit trail for the equipment inventory
#[derive(Parser, Debug)]
#[command(name = "stocktrail")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Database URL (overrides the configuration)
    #[arg(long, env = "DATABASE_URL", global = true)]
    pub database_url: Option<String>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply pending database migrations
    Migrate,

    /// Show the change history of an entity type
    History {
        /// Entity type (equipment, category, computer, screen)
        entity_type: String,

        /// Only changes to this entity id
        #[arg(long)]
        id: Option<i64>,

        /// Only changes made by this actor id
        #[arg(long)]
        actor: Option<i64>,

        /// Only this action (create, update, delete)
        #[arg(long)]
        action: Option<AuditAction>,

        /// Changes at or after this instant (RFC 3339)
        #[arg(long)]
        since: Option<DateTime<Utc>>,

        /// Changes at or before this instant (RFC 3339)
        #[arg(long)]
        until: Option<DateTime<Utc>>,

        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: i64,

        /// Entries per page (1-100)
        #[arg(long, default_value_t = 20)]
        per_page: i64,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Show the most recent change of each given entity
    Latest {
        /// Entity type (equipment, category, computer, screen)
        entity_type: String,

        /// Entity ids
        #[arg(required = true)]
        ids: Vec<i64>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}
