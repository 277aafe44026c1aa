//! # Cognitus CLI (`cognitus`)
//!
//! ## Usage
//!
//! ```bash
//! cognitus --config ./config/cognitus.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `cognitus init` | Create the collection and index files |
//! | `cognitus sync` | Bring the index in line with the collection |
//! | `cognitus status` | Show counts and index drift |
//! | `cognitus check` | Classify a card without saving it |
//! | `cognitus admit` | Admit one card |
//! | `cognitus import <file>` | Admit every card in a saved response |
//! | `cognitus generate <topic>` | Generate cards; `--save` admits them |
//! | `cognitus remove <id>` | Delete a card and its index entry |
//! | `cognitus serve` | Start the HTTP review API |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use cognitus::progress::ProgressMode;
use cognitus::{commands, config, logging, migrate, server, stats};

/// Cognitus: LLM flashcard generation with duplicate filtering.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/cognitus.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "cognitus",
    about = "Generate flashcards and admit only the ones your collection does not already have",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/cognitus.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the collection and index files. Safe to run repeatedly.
    Init,

    /// Reconcile the index with the collection.
    Sync {
        /// Progress on stderr. Defaults to human on a TTY, otherwise off.
        #[arg(long, value_enum)]
        progress: Option<ProgressMode>,
    },

    /// Show collection and index counts without syncing.
    Status {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Report whether a card would be rejected as a duplicate.
    Check {
        #[arg(long)]
        front: String,
        #[arg(long)]
        back: String,
    },

    /// Admit one card unless it duplicates an existing one.
    Admit {
        #[arg(long)]
        topic: String,
        #[arg(long)]
        front: String,
        #[arg(long)]
        back: String,
    },

    /// Admit every card in a file of `question / ::: / answer` blocks.
    Import {
        file: PathBuf,
        #[arg(long)]
        topic: String,
    },

    /// Generate flashcards for a topic through the configured provider.
    Generate {
        topic: String,
        /// Admit the generated cards instead of only printing them.
        #[arg(long)]
        save: bool,
    },

    /// Delete a card from the collection and the index.
    Remove { id: i64 },

    /// Start the HTTP review API on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;
    logging::init(&cfg.log)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Collection and index initialized successfully.");
        }
        Commands::Sync { progress } => {
            let mode = progress.unwrap_or_else(ProgressMode::default_for_tty);
            commands::run_sync(&cfg, mode).await?;
        }
        Commands::Status { json } => {
            stats::run_status(&cfg, json).await?;
        }
        Commands::Check { front, back } => {
            commands::run_check(&cfg, &front, &back).await?;
        }
        Commands::Admit { topic, front, back } => {
            commands::run_admit(&cfg, &topic, &front, &back).await?;
        }
        Commands::Import { file, topic } => {
            commands::run_import(&cfg, &file, &topic).await?;
        }
        Commands::Generate { topic, save } => {
            commands::run_generate(&cfg, &topic, save).await?;
        }
        Commands::Remove { id } => {
            commands::run_remove(&cfg, id).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
