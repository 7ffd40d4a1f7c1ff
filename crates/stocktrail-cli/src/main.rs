//! Stocktrail CLI - Main entry point

use clap::Parser;
use std::process;
use stocktrail_cli::{commands, Cli, Commands};
use stocktrail_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use tracing::error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Output goes to stdout; logs stay on stderr and are quiet unless verbose
    let level = if cli.verbose { LogLevel::Debug } else { LogLevel::Warn };
    let log_config = LogConfig::builder()
        .level(level)
        .output(LogOutput::Console)
        .log_file_prefix("stocktrail-cli")
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    // The CLI works without logging
    let _guard = init_logging(&log_config).ok().flatten();

    if let Err(e) = execute_command(&cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn execute_command(cli: &Cli) -> stocktrail_cli::Result<()> {
    let database_url = cli.database_url.as_deref();

    match &cli.command {
        Commands::Migrate => commands::migrate::run(database_url).await,
        Commands::History {
            entity_type,
            id,
            actor,
            action,
            since,
            until,
            page,
            per_page,
            format,
        } => {
            let args = commands::history::HistoryArgs {
                entity_type: entity_type.clone(),
                entity_id: *id,
                actor_id: *actor,
                action: *action,
                since: *since,
                until: *until,
                page: *page,
                per_page: *per_page,
            };
            commands::history::run(database_url, args, *format).await
        }
        Commands::Latest {
            entity_type,
            ids,
            format,
        } => commands::latest::run(database_url, entity_type, ids, *format).await,
    }
}
