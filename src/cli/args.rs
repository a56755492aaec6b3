//! CLI arguments module
//!
//! Defines command-line argument parsing using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the torrent relay
#[derive(Debug, Parser)]
#[command(name = "torrent-relay")]
#[command(about = "Download torrents and optionally relay them to Google Drive", long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download a torrent
    Download {
        /// Torrent file path or magnet link
        #[arg(short = 't', long)]
        torrent: String,

        /// Download destination directory
        #[arg(short = 'd', long)]
        destination: Option<PathBuf>,

        /// Start fresh (ignore any previous session)
        #[arg(long)]
        no_resume: bool,

        /// Upload to Google Drive after download
        #[arg(long)]
        upload: bool,

        /// Google Drive folder ID (required with --upload)
        #[arg(short = 'f', long)]
        folder_id: Option<String>,

        /// Skip files that already exist in Drive
        #[arg(long, default_value_t = true)]
        skip_existing: bool,

        /// Use parallel uploads
        #[arg(long)]
        parallel: bool,
    },

    /// Upload files to Google Drive
    Upload {
        /// Local path to file or folder to upload
        #[arg(short = 'p', long)]
        path: PathBuf,

        /// Google Drive destination folder ID
        #[arg(short = 'f', long)]
        folder_id: String,

        /// Force re-upload even if files exist
        #[arg(long)]
        no_skip: bool,

        /// Use parallel uploads
        #[arg(long)]
        parallel: bool,

        /// Include only files matching pattern (repeatable)
        #[arg(long)]
        include: Vec<String>,

        /// Exclude files matching pattern (repeatable)
        #[arg(long)]
        exclude: Vec<String>,

        /// Preview what would be uploaded without uploading
        #[arg(long)]
        dry_run: bool,

        /// Clear previous upload progress and start fresh
        #[arg(long)]
        no_resume: bool,
    },

    /// Check for a paused download session
    Status,

    /// Clear the download session
    Clear,
}

impl CliArgs {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Get the log level based on verbosity settings
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::ERROR
        } else {
            tracing::Level::INFO
        }
    }
}
