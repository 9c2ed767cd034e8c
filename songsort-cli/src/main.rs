//! songsort - rank the songs of music folders by pairwise comparison
//!
//! Subcommands:
//! - `scan`: import folders and show what would be ranked
//! - `rank`: import folders, optionally edit the list, ask for a preference on
//!   pairs of songs, print the ranking
//! - `config`: print (or write) the effective configuration
//!
//! Results are printed to stdout. Prompts, summaries and logs go to stderr.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use songsort_common::config::{default_config_path, write_toml_config, ConfigResolver, ImportConfig};
use songsort_common::{SortStrategy, TomlConfig};
use songsort_core::review::{ListMode, ListReview, ReviewOutcome};
use songsort_core::{SongId, SongList};
use songsort_import::{ImportReport, Importer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod output;
mod prompt;

use prompt::Console;

/// Command-line arguments for songsort
#[derive(Parser, Debug)]
#[command(name = "songsort")]
#[command(about = "Rank folders of songs by comparing them two at a time")]
#[command(version)]
struct Args {
    /// Config file (overrides SONGSORT_CONFIG and the per-user config)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "songsort_core=trace" (RUST_LOG wins)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import folders and list the songs found
    Scan {
        /// Folders to import
        #[arg(required = true)]
        folders: Vec<PathBuf>,

        /// Leave out songs at or below this path (repeatable)
        #[arg(long)]
        exclude: Vec<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Import folders and rank their songs interactively
    Rank {
        /// Folders to import
        #[arg(required = true)]
        folders: Vec<PathBuf>,

        /// Leave out songs at or below this path (repeatable)
        #[arg(long)]
        exclude: Vec<PathBuf>,

        /// Drop songs and fix metadata before sorting
        #[arg(long)]
        edit: bool,

        /// Comparison schedule (binary-insertion or merge)
        #[arg(long)]
        strategy: Option<SortStrategy>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration
    Config {
        /// Write it to the per-user config file
        #[arg(long)]
        write: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let resolver = ConfigResolver::with_explicit_path(args.config.clone());
    let mut config = resolver.load().context("Failed to load configuration")?;

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        "Starting songsort v{} (config: {:?})",
        env!("CARGO_PKG_VERSION"),
        resolver.source()
    );

    match args.command {
        Command::Scan {
            folders,
            exclude,
            json,
        } => {
            let songs = import_all(&folders, &exclude, &config.import).await?;
            let review = ListReview::new(ListMode::ConfirmImport, &songs);
            if json {
                output::print_json(&review.rows(&songs))?;
            } else {
                print!("{}", output::render_table(&review, &songs, false));
            }
        }

        Command::Rank {
            folders,
            exclude,
            edit,
            strategy,
            json,
        } => {
            if let Some(strategy) = strategy {
                config.ranking.strategy = strategy;
            }
            let mut songs = import_all(&folders, &exclude, &config.import).await?;
            let mut console = Console::new();

            if edit {
                let outcome = prompt::edit_list(&mut console, &mut songs)
                    .await
                    .context("Editing the song list failed")?;
                if outcome == ReviewOutcome::ImportCancelled {
                    console.say("Edits discarded.\n").await?;
                }
            }

            let completed = prompt::run_session(&mut console, &mut songs, &config.ranking)
                .await
                .context("Ranking session failed")?;
            if !completed {
                console
                    .say("Session cancelled, no ranks were assigned.\n")
                    .await?;
                return Ok(());
            }

            if json {
                let ranked: Vec<_> = songs.ranked().into_iter().map(|(_, song)| song).collect();
                output::print_json(&ranked)?;
            } else {
                let results = ListReview::new(ListMode::ShowResults, &songs);
                print!("{}", output::render_results(&results, &songs));
            }
        }

        Command::Config { write } => {
            print!(
                "{}",
                config
                    .to_toml_string()
                    .context("Failed to serialize configuration")?
            );
            if write {
                write_config(&config)?;
            }
        }
    }

    Ok(())
}

/// Import every folder and merge the confirmed songs into one list
///
/// Songs under an `exclude` path are dropped during confirmation. A path
/// already imported from an earlier folder is skipped.
async fn import_all(
    folders: &[PathBuf],
    exclude: &[PathBuf],
    config: &ImportConfig,
) -> Result<SongList> {
    let mut songs = SongList::new();
    for folder in folders {
        let report = import(folder, config).await?;
        output::print_import_summary(folder, &report);

        let mut staged = report.songs;
        confirm_import(&mut staged, exclude).context("Failed to confirm imported songs")?;

        let skipped = songs.append(staged);
        if skipped > 0 {
            warn!(folder = %folder.display(), skipped, "Songs already imported from another folder");
        }
    }
    Ok(songs)
}

/// Accept a freshly imported list, dropping excluded paths
fn confirm_import(staged: &mut SongList, exclude: &[PathBuf]) -> songsort_core::Result<ReviewOutcome> {
    let mut review = ListReview::new(ListMode::ConfirmImport, staged);
    let excluded: Vec<SongId> = staged
        .iter()
        .filter(|(_, song)| exclude.iter().any(|e| song.path().starts_with(e)))
        .map(|(id, _)| id)
        .collect();
    for id in excluded {
        review.set_keep(staged, id, false)?;
    }
    review.accept(staged)
}

/// Import `folder` on the blocking pool
async fn import(folder: &Path, config: &ImportConfig) -> Result<ImportReport> {
    let config = config.clone();
    let root = folder.to_path_buf();
    let report = tokio::task::spawn_blocking(move || Importer::new(&config).import_folder(&root))
        .await
        .context("Import task failed")?
        .with_context(|| format!("Failed to import {}", folder.display()))?;
    Ok(report)
}

fn write_config(config: &TomlConfig) -> Result<()> {
    let path = default_config_path().context("No per-user config directory on this system")?;
    write_toml_config(config, &path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    eprintln!("Configuration written to {}", path.display());
    Ok(())
}
