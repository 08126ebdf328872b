use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::process::ExitCode;

mod config;
mod output;
mod prompt;

use crate::config::ConfigManager;
use crate::prompt::TerminalPrompt;
use seqace_backup_core::{BackupError, BackupOrchestrator};

#[derive(Parser)]
#[command(name = "seqace-backup")]
#[command(author, version, about = "Back up Sequel Ace favorites and passwords to 1Password", long_about = None)]
struct Cli {
    /// 1Password vault to store backups in
    #[arg(long, global = true)]
    vault: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Back up favorites and their passwords to the vault
    Backup {
        /// Title for the backup item (defaults to a timestamped name)
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Restore favorites and passwords from a backup
    Restore {
        /// Title of the backup to restore (defaults to the most recent)
        #[arg(short, long)]
        title: Option<String>,
    },

    /// List backups stored in the vault
    List,

    /// Show the contents of a backup without restoring it
    Show {
        /// Title of the backup to show (defaults to the most recent)
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Delete all favorites and their keychain passwords
    Clear {
        /// Skip the safety backup offer
        #[arg(long)]
        skip_backup: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.debug {
        env_logger::Builder::from_env(env_logger::Env::default())
            .filter_level(log::LevelFilter::Debug)
            .filter_module("seqace_backup_core", log::LevelFilter::Debug)
            .filter_module("seqace_backup_cli", log::LevelFilter::Debug)
            .format_timestamp_millis()
            .init();
        eprintln!("Debug logging enabled");
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if was_interrupted(&err) {
                eprintln!("\n{}", "Operation cancelled by user".yellow());
                // Conventional exit status for SIGINT
                return ExitCode::from(130);
            }
            eprintln!("{} {err:#}", "Error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let manager = ConfigManager::new();
    let config = manager
        .load()
        .context("Failed to load configuration")?
        .into_backup_config(cli.vault);

    let orchestrator = BackupOrchestrator::connect(config).await?;

    match cli.command {
        Commands::Backup { title } => {
            let report = orchestrator.backup(title.as_deref()).await?;
            output::print_backup_report(&report);
        }
        Commands::Restore { title } => {
            let report = orchestrator.restore(title.as_deref()).await?;
            output::print_restore_report(&report);
        }
        Commands::List => {
            let entries = orchestrator.list().await?;
            output::print_listing(orchestrator.vault_name(), &entries);
        }
        Commands::Show { title } => {
            let (title, snapshot) = orchestrator.fetch(title.as_deref()).await?;
            output::print_snapshot(&title, &snapshot);
        }
        Commands::Clear { skip_backup } => {
            let prompt = TerminalPrompt;
            let outcome = orchestrator.clear(skip_backup, &prompt).await?;
            output::print_clear_outcome(&outcome);
        }
    }

    Ok(())
}

/// True when the failure chain bottoms out in an interrupted read, which is
/// how a Ctrl-C during a dialoguer prompt surfaces.
fn was_interrupted(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        if let Some(io_err) = cause.downcast_ref::<std::io::Error>() {
            return io_err.kind() == std::io::ErrorKind::Interrupted;
        }
        if let Some(BackupError::Io(io_err)) = cause.downcast_ref::<BackupError>() {
            return io_err.kind() == std::io::ErrorKind::Interrupted;
        }
        false
    })
}
