//! torrent-relay - Main entry point
//!
//! Downloads torrents through an external transfer engine and optionally
//! relays the result to Google Drive.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use torrent_relay::cli::print_upload_summary;
use torrent_relay::{
    CliArgs, Command, ConfigStore, DownloadMonitor, DriveClient, ProgressLedger, RelayError,
    RpcEngine, SessionStore, Source, UploadOptions, Uploader,
};
use tracing::{debug, error, info, warn};

const EXIT_OK: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_INTERRUPT: i32 = 130;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse_args();
    init_logging(&args);
    debug!("CLI arguments: {:?}", args);

    let interrupt = Arc::new(AtomicBool::new(false));
    spawn_interrupt_watcher(interrupt.clone());

    let code = match run(args, interrupt).await {
        Ok(code) => code,
        Err(e) => {
            error!("Operation failed: {:#}", e);
            EXIT_FAILURE
        }
    };
    std::process::exit(code);
}

/// Initialize logging based on verbosity settings
fn init_logging(args: &CliArgs) {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if args.is_verbose() {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

/// Watch for Ctrl-C and raise the shared interrupt flag
///
/// The monitor checkpoints and pauses; upload workers finish their in-flight
/// transfers before the orchestrator reports cancellation.
fn spawn_interrupt_watcher(flag: Arc<AtomicBool>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing in-flight work");
            flag.store(true, Ordering::SeqCst);
        }
    });
}

async fn run(args: CliArgs, interrupt: Arc<AtomicBool>) -> Result<i32> {
    let quiet = args.is_quiet();

    match args.command {
        Command::Download {
            torrent,
            destination,
            no_resume,
            upload,
            folder_id,
            skip_existing,
            parallel,
        } => {
            handle_download(
                torrent,
                destination,
                no_resume,
                upload,
                folder_id,
                skip_existing,
                parallel,
                interrupt,
                quiet,
            )
            .await
        }
        Command::Upload {
            path,
            folder_id,
            no_skip,
            parallel,
            include,
            exclude,
            dry_run,
            no_resume,
        } => {
            handle_upload(
                path, folder_id, no_skip, parallel, include, exclude, dry_run, no_resume, interrupt,
            )
            .await
        }
        Command::Status => Ok(handle_status()),
        Command::Clear => handle_clear().await,
    }
}

/// Handle the download command
#[allow(clippy::too_many_arguments)]
async fn handle_download(
    torrent: String,
    destination: Option<PathBuf>,
    no_resume: bool,
    upload: bool,
    folder_id: Option<String>,
    skip_existing: bool,
    parallel: bool,
    interrupt: Arc<AtomicBool>,
    quiet: bool,
) -> Result<i32> {
    if upload && folder_id.is_none() {
        error!("--folder-id is required when using --upload");
        return Ok(EXIT_FAILURE);
    }

    let config = ConfigStore::load_default();
    let dest = destination.unwrap_or_else(|| config.download_path());
    let source = Source::parse(&torrent)?;

    info!("Starting download: {}", source.describe());
    let engine = RpcEngine::new(config.engine_url());
    let mut monitor = DownloadMonitor::new(engine, SessionStore::default(), interrupt.clone(), quiet);

    let downloaded = match monitor.run(&source, &dest, !no_resume).await? {
        Some(path) => path,
        None => {
            println!("\nDownload paused. Resume with the same command.");
            return Ok(EXIT_INTERRUPT);
        }
    };
    info!("Download completed: {}", downloaded.display());

    if upload {
        if let Some(folder_id) = &folder_id {
            let token = resolve_drive_token(&config)?;
            let client = Arc::new(DriveClient::new(token));
            let options = UploadOptions {
                skip_existing,
                parallel,
                ..Default::default()
            };
            let uploader = Arc::new(Uploader::new(
                client,
                options,
                ProgressLedger::open_default(),
                interrupt,
            )?);

            let report = uploader.upload(&downloaded, folder_id).await;
            print_upload_summary(&report, false);

            if report.interrupted {
                return Ok(EXIT_INTERRUPT);
            }
            if !report.failed.is_empty() {
                warn!("Some files failed to upload");
                return Ok(EXIT_FAILURE);
            }
            info!("Upload completed successfully");
        }
    }

    Ok(EXIT_OK)
}

/// Handle the upload command
#[allow(clippy::too_many_arguments)]
async fn handle_upload(
    path: PathBuf,
    folder_id: String,
    no_skip: bool,
    parallel: bool,
    include: Vec<String>,
    exclude: Vec<String>,
    dry_run: bool,
    no_resume: bool,
    interrupt: Arc<AtomicBool>,
) -> Result<i32> {
    let config = ConfigStore::load_default();

    let mut ledger = ProgressLedger::open_default();
    if no_resume {
        ledger.clear()?;
        info!("Previous upload progress cleared");
    }

    // A dry run performs no remote calls, so no token is needed for it
    let token = if dry_run {
        String::new()
    } else {
        resolve_drive_token(&config)?
    };
    let client = Arc::new(DriveClient::new(token));

    let options = UploadOptions {
        skip_existing: !no_skip,
        parallel,
        include,
        exclude,
        dry_run,
        resume: !no_resume,
    };
    let uploader = Arc::new(Uploader::new(client, options, ledger, interrupt)?);

    let report = uploader.upload(&path, &folder_id).await;
    print_upload_summary(&report, dry_run);

    if report.interrupted {
        println!("\nUpload progress has been saved. Use the same command to resume.");
        return Ok(EXIT_INTERRUPT);
    }
    if !report.failed.is_empty() {
        warn!("Some files failed to upload");
        return Ok(EXIT_FAILURE);
    }
    info!("{} completed successfully", if dry_run { "Dry run" } else { "Upload" });
    Ok(EXIT_OK)
}

/// Handle the status command
fn handle_status() -> i32 {
    let store = SessionStore::default();
    if store.exists() {
        println!("Found paused download session");
        println!("  Run 'torrent-relay download -t <torrent>' to resume");
    } else {
        println!("No paused download session found");
    }
    EXIT_OK
}

/// Handle the clear command
async fn handle_clear() -> Result<i32> {
    let store = SessionStore::default();
    match store.clear().await {
        Ok(()) => {
            println!("Download session cleared");
            Ok(EXIT_OK)
        }
        Err(e) => {
            error!("Failed to clear session: {}", e);
            Ok(EXIT_FAILURE)
        }
    }
}

/// Resolve the Drive access token from the environment or config file
fn resolve_drive_token(config: &ConfigStore) -> Result<String> {
    config.drive_token().ok_or_else(|| {
        RelayError::config_error_with_field(
            "Google Drive access token not set (set GDRIVE_ACCESS_TOKEN or the drive_token config key)",
            "drive_token",
        )
        .into()
    })
}
