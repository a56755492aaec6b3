//! CLI module
//!
//! Command-line interface for the torrent relay.

pub mod args;
pub mod config;
pub mod progress;

pub use args::{CliArgs, Command};
pub use config::{ConfigStore, CONFIG_FILE};
pub use progress::{format_bytes, format_eta, format_speed, print_upload_summary, ProgressDisplay};
