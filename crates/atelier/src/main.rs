//! Atelier - design version history.
//!
//! This is the main entry point for the atelier CLI.

mod commands;

use atelier_history::{Config, TracingErrorPolicy, VersionStore};
use atelier_storage::json::{default_storage, project_storage, JsonStorage};
use atelier_util::log::LogLevel;
use clap::{Parser, Subcommand};
use commands::{handle_designs, handle_versions, init_logging, VersionCommands};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "atelier")]
#[command(author, version, about = "Design version history", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project directory (defaults to the current directory)
    #[arg(long, global = true)]
    project: Option<PathBuf>,

    /// Read and write history in this directory instead of the project's
    #[arg(long, global = true, conflicts_with = "global_history")]
    history_dir: Option<PathBuf>,

    /// Use the per-user history directory instead of the project's
    #[arg(long = "global", global = true)]
    global_history: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the saved versions of a design
    Versions {
        #[command(subcommand)]
        command: VersionCommands,
    },
    /// List designs that have saved versions
    Designs,
    /// Show the effective configuration
    Config,
    /// Print version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let project = match cli.project {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    // Config is read before logging starts so its level applies
    let loaded = Config::load(Some(project.as_path())).await;
    let level = loaded
        .as_ref()
        .ok()
        .and_then(|(config, _)| config.log_level.as_deref())
        .and_then(LogLevel::parse);
    let log_file = init_logging(cli.verbose, level);
    if let Some(path) = &log_file {
        tracing::debug!(path = %path.display(), "Logging to file");
    }

    let (config, sources) = loaded?;

    match cli.command {
        Commands::Versions { command } => {
            let storage = open_storage(cli.history_dir, cli.global_history, &project)?;
            let store = open_store(storage, &config)?;
            handle_versions(command, &store).await
        }
        Commands::Designs => {
            let storage = open_storage(cli.history_dir, cli.global_history, &project)?;
            let store = open_store(storage, &config)?;
            handle_designs(&store).await
        }
        Commands::Config => show_config(&config, &sources),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Pick the history location from the command line flags.
fn open_storage(
    history_dir: Option<PathBuf>,
    global: bool,
    project: &Path,
) -> anyhow::Result<JsonStorage> {
    if let Some(dir) = history_dir {
        return Ok(JsonStorage::new(dir));
    }
    if global {
        return default_storage()
            .ok_or_else(|| anyhow::anyhow!("Could not determine the user data directory"));
    }
    Ok(project_storage(project))
}

fn open_store(storage: JsonStorage, config: &Config) -> anyhow::Result<VersionStore> {
    tracing::debug!(path = %storage.base_path().display(), "Opening version history");
    let history = config.history_config()?;
    Ok(VersionStore::from_config(
        Arc::new(storage),
        Arc::new(TracingErrorPolicy),
        &history,
    ))
}

/// Show the configuration sources and the effective settings.
fn show_config(config: &Config, sources: &[PathBuf]) -> anyhow::Result<()> {
    println!("Configuration sources:");
    if sources.is_empty() {
        println!("  (none)");
    } else {
        for source in sources {
            println!("  {}", source.display());
        }
    }
    println!();

    println!("Current configuration:");
    println!("{}", serde_json::to_string_pretty(&config.effective()?)?);

    Ok(())
}

/// Print version information.
fn print_version() {
    println!("atelier {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Undo history, auto-save and saved versions for garment designs.");
    println!();
    println!("https://github.com/atelier-app/atelier");
}
