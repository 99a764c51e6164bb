mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "blackbook", version, about = "Catalogue and annotate photographs of street art")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add or refresh photo records for a list of image files.
    Ingest {
        /// Catalogue file to update.
        database: PathBuf,
        /// Text file listing one image path per line.
        file_list: PathBuf,
    },
    /// Interpolate photo locations from recorded GPS tracks.
    Locate {
        /// Report interpolated locations without saving them.
        #[arg(short = 'n', long)]
        dry_run: bool,
        /// Catalogue file to update.
        database: PathBuf,
        /// JSON files of {timestamp, latitude, longitude} samples.
        #[arg(required = true)]
        tracks: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Ingest {
            database,
            file_list,
        } => commands::ingest::run(&database, &file_list),
        Command::Locate {
            dry_run,
            database,
            tracks,
        } => commands::locate::run(&database, &tracks, dry_run),
    }
}
