//! Progress display module
//!
//! Handles rendering download and upload progress in the CLI.

use std::io::{self, Write};

use crate::engine::JobStatus;
use crate::upload::UploadReport;

/// Format bytes to human readable string
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}

/// Format a transfer rate to human readable string
pub fn format_speed(bytes_per_sec: f64) -> String {
    format!("{}/s", format_bytes(bytes_per_sec as u64))
}

/// Format an ETA from remaining bytes and the current rate
///
/// A rate of zero yields "N/A"; otherwise the estimate is rendered in the
/// largest applicable unit: seconds under a minute, minutes and seconds under
/// an hour, hours and minutes beyond that.
pub fn format_eta(remaining_bytes: u64, rate: f64) -> String {
    if rate <= 0.0 {
        return "N/A".to_string();
    }
    format_eta_seconds(remaining_bytes as f64 / rate)
}

fn format_eta_seconds(eta: f64) -> String {
    let secs = eta as u64;
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

/// Progress display for CLI
pub struct ProgressDisplay {
    /// Quiet mode (no progress output)
    quiet: bool,
}

impl ProgressDisplay {
    /// Create a new progress display
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Render one download status snapshot as an in-place progress line
    pub fn update_download(&self, status: &JobStatus) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let percent = status.percent();
        let bar_width: usize = 40;
        let filled = (percent / 100.0 * bar_width as f64) as usize;
        let filled = filled.min(bar_width);
        let bar: String = "=".repeat(filled) + &" ".repeat(bar_width - filled);

        let peers = status.num_peers.saturating_sub(status.num_seeds);
        let line = format!(
            "[{}] {:.1}% | ↓ {} | Seeds: {} | Peers: {} | ETA: {}",
            bar,
            percent,
            format_speed(status.download_rate),
            status.num_seeds,
            peers,
            format_eta(status.remaining(), status.download_rate),
        );

        print!("\r\x1b[2K{}", line);
        io::stdout().flush()
    }

    /// Render per-file upload progress as an in-place line
    pub fn update_upload(&self, name: &str, done: u64, total: u64) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let percent = if total == 0 {
            100.0
        } else {
            done as f64 / total as f64 * 100.0
        };
        print!(
            "\r\x1b[2KUploading {} | {:.1}% ({} / {})",
            name,
            percent,
            format_bytes(done),
            format_bytes(total)
        );
        io::stdout().flush()
    }

    /// Terminate an in-place progress line
    pub fn finish_line(&self) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        println!();
        Ok(())
    }

    /// Print a status message
    pub fn print_status(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        println!("\r\x1b[2K{}", message);
        Ok(())
    }

    /// Print an error message
    pub fn print_error(&self, message: &str) -> io::Result<()> {
        eprintln!("\r\x1b[2KError: {}", message);
        Ok(())
    }
}

/// Print the upload summary: counts plus the first few failed paths
pub fn print_upload_summary(report: &UploadReport, dry_run: bool) {
    println!();
    println!("{}", "=".repeat(60));
    println!("{}", if dry_run { "UPLOAD PLAN (DRY RUN)" } else { "UPLOAD SUMMARY" });
    println!("{}", "=".repeat(60));
    println!("Successful uploads: {}", report.success.len());
    println!("Skipped (already exist): {}", report.skipped.len());
    println!("Failed uploads: {}", report.failed.len());

    if !report.failed.is_empty() {
        println!();
        println!("Failed items:");
        for item in report.failed.iter().take(10) {
            println!("  - {}", item.display());
        }
        if report.failed.len() > 10 {
            println!("  ... and {} more", report.failed.len() - 10);
        }
    }

    if report.interrupted {
        println!();
        println!("Upload was interrupted; run the same command to resume.");
    }
    println!("{}", "=".repeat(60));
}
