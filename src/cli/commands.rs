//! CLI commands implementation.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::load_settings;
use crate::dates::Reconciler;
use crate::fetch::HttpFetcher;
use crate::repository::{SqliteStoryRepository, StoryStore};
use crate::services::GuessRunner;

#[derive(Parser)]
#[command(name = "datesleuth")]
#[command(about = "Publication date inference for archived web stories")]
#[command(version)]
pub struct Cli {
    /// Path to a TOML settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database path (overrides settings)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Guess publication dates for every candidate story in a source
    Guess {
        /// Source ID scoping the batch
        source_id: String,
        /// Limit number of stories to process (0 = unlimited)
        #[arg(short, long, default_value = "0")]
        limit: usize,
        /// Report guesses without writing them back
        #[arg(long)]
        dry_run: bool,
    },

    /// Run the heuristic fixture self-test and exit
    Selftest,

    /// Manage story sources
    Source {
        #[command(subcommand)]
        command: SourceCommands,
    },

    /// Manage candidate stories
    Story {
        #[command(subcommand)]
        command: StoryCommands,
    },
}

#[derive(Subcommand)]
enum SourceCommands {
    /// Register a source
    Add { id: String, name: String },
    /// List registered sources
    List,
}

#[derive(Subcommand)]
enum StoryCommands {
    /// Add a candidate story to a source
    Add {
        source_id: String,
        url: String,
        /// Post-redirect URL, if the fetch followed one
        #[arg(long)]
        redirect_url: Option<String>,
        /// Currently recorded publish date
        #[arg(long)]
        publish_date: Option<String>,
    },
    /// List candidate stories for a source
    List { source_id: String },
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        settings.database_path = db;
    }

    match cli.command {
        Commands::Guess {
            source_id,
            limit,
            dry_run,
        } => {
            let store = SqliteStoryRepository::new(&settings.database_path)?;
            let fetcher = HttpFetcher::new(&settings)?;
            let mut runner = GuessRunner::new(store, fetcher, &settings);
            let summary = runner.run(&source_id, limit, dry_run).await?;
            eprintln!(
                "{} stories processed, {} dates guessed, {} fetch failures",
                summary.processed, summary.guessed, summary.fetch_failures
            );
        }
        Commands::Selftest => {
            let reconciler = Reconciler::new(&settings);
            let verified = reconciler.self_test()?;
            println!("self-test passed: {verified} fixtures verified");
        }
        Commands::Source { command } => match command {
            SourceCommands::Add { id, name } => {
                let mut store = SqliteStoryRepository::new(&settings.database_path)?;
                store.add_source(&id, &name)?;
            }
            SourceCommands::List => {
                let store = SqliteStoryRepository::new(&settings.database_path)?;
                for (id, name) in store.list_sources()? {
                    println!("{id}\t{name}");
                }
            }
        },
        Commands::Story { command } => match command {
            StoryCommands::Add {
                source_id,
                url,
                redirect_url,
                publish_date,
            } => {
                let mut store = SqliteStoryRepository::new(&settings.database_path)?;
                let id = store.add_story(
                    &source_id,
                    &url,
                    redirect_url.as_deref(),
                    publish_date.as_deref(),
                )?;
                println!("{id}");
            }
            StoryCommands::List { source_id } => {
                let store = SqliteStoryRepository::new(&settings.database_path)?;
                store.resolve_scope(&source_id)?;
                for story in store.list_candidates(&source_id)? {
                    println!(
                        "{}\t{}\t{}",
                        story.id,
                        story.url,
                        story.publish_date.as_deref().unwrap_or("(none)")
                    );
                }
            }
        },
    }

    Ok(())
}
