//! solr-metadata CLI - edit Solr metadata display configurations.
//!
//! Commands:
//! - `solr-metadata list`: List configurations
//! - `solr-metadata create <name>`: Create an empty configuration
//! - `solr-metadata show <id>`: Show the configuration form
//! - `solr-metadata edit <id> [edits] [--save]`: Apply edits, optionally saving
//! - `solr-metadata delete <id> --yes`: Delete a configuration
//! - `solr-metadata preview <id> <values>...`: Truncate values as the description would
//!
//! Environment variables:
//! - SOLR_METADATA_*: Override any setting (e.g. SOLR_METADATA_DATA_DIR)
//! - RUST_LOG: Log filter when --debug is not given
//!
//! Exit codes:
//! - 0: Success
//! - 1: Error

mod cli;
mod commands;
mod config;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use config::Settings;

/// Run one command and map its result to an exit code.
async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    let editor = commands::open_editor(&settings).await?;
    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Commands::List { json } => commands::run_list(&editor, json, &mut stdout).await,
        Commands::Create { name } => commands::run_create(&editor, &name, &mut stdout).await,
        Commands::Show { id, json } => commands::run_show(&editor, &id, json, &mut stdout).await,
        Commands::Edit(args) => commands::run_edit(&editor, &args, &mut stdout).await,
        Commands::Delete { id, yes } => {
            commands::run_delete(&editor, &id, yes, &mut stdout).await
        }
        Commands::Preview {
            id,
            values,
            separator,
        } => commands::run_preview(&editor, &id, &values, &separator, &mut stdout).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing with appropriate level
    let filter = if cli.debug {
        EnvFilter::new("solr_metadata=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}
