//! Download monitor
//!
//! Drives a single download job to completion: polls the engine once per
//! second, renders progress, checkpoints the engine session on a wall-clock
//! interval, and turns a user interrupt into a checkpoint-then-pause instead
//! of an error.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::cli::progress::ProgressDisplay;
use crate::download::session::SessionStore;
use crate::engine::{Source, TransferEngine, TransferJob};

/// How often the engine is polled for a status snapshot
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// How much wall-clock time may pass between session checkpoints
pub const CHECKPOINT_INTERVAL: Duration = Duration::from_secs(10);

/// Lifecycle phase of one monitored download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorPhase {
    /// Job handed to the engine
    Submitted,
    /// Waiting for the engine to resolve metadata
    AwaitingMetadata,
    /// Payload transfer in progress
    Transferring,
    /// Terminal: payload fully transferred
    Completed,
    /// Paused by user interrupt; resumable via the persisted session
    Interrupted,
}

/// Monitors one download job from submission to completion
pub struct DownloadMonitor<E: TransferEngine> {
    engine: E,
    store: SessionStore,
    interrupt: Arc<AtomicBool>,
    display: ProgressDisplay,
    poll_interval: Duration,
    checkpoint_interval: Duration,
    phase: MonitorPhase,
}

impl<E: TransferEngine> DownloadMonitor<E> {
    /// Create a new monitor
    pub fn new(engine: E, store: SessionStore, interrupt: Arc<AtomicBool>, quiet: bool) -> Self {
        Self {
            engine,
            store,
            interrupt,
            display: ProgressDisplay::new(quiet),
            poll_interval: POLL_INTERVAL,
            checkpoint_interval: CHECKPOINT_INTERVAL,
            phase: MonitorPhase::Submitted,
        }
    }

    /// Override the poll and checkpoint cadence
    pub fn with_intervals(mut self, poll: Duration, checkpoint: Duration) -> Self {
        self.poll_interval = poll;
        self.checkpoint_interval = checkpoint;
        self
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> MonitorPhase {
        self.phase
    }

    fn set_phase(&mut self, phase: MonitorPhase) {
        debug!("Monitor phase: {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    fn interrupted(&self) -> bool {
        self.interrupt.load(Ordering::SeqCst)
    }

    /// Persist the engine's current session state
    async fn checkpoint(&self) -> Result<()> {
        let state = self.engine.save_state().await?;
        self.store.save(&state).await?;
        Ok(())
    }

    async fn checkpoint_logged(&self) {
        if let Err(e) = self.checkpoint().await {
            warn!("Failed to checkpoint session: {}", e);
        }
    }

    /// Run a download to completion or pause
    ///
    /// Returns the path of the downloaded content, or `None` when the user
    /// interrupted the download (the session is checkpointed so the same
    /// invocation can be repeated to resume).
    pub async fn run(&mut self, source: &Source, dest: &Path, resume: bool) -> Result<Option<PathBuf>> {
        tokio::fs::create_dir_all(dest).await?;

        if resume {
            if let Some(blob) = self.store.load().await {
                match self.engine.restore(&blob).await {
                    Ok(()) => info!("Resumed previous session ({} bytes of state)", blob.len()),
                    Err(e) => warn!("Failed to restore session ({}), starting fresh", e),
                }
            }
        }

        info!("Submitting {}", source.describe());
        let job = self.engine.submit(source, dest).await?;
        self.set_phase(MonitorPhase::AwaitingMetadata);

        // Deliberate indefinite wait: metadata discovery is bounded only by
        // user interruption, matching the engine's own discovery latency.
        self.display.print_status("Waiting for metadata...")?;
        let status = loop {
            if self.interrupted() {
                warn!("Interrupted while waiting for metadata, session saved");
                self.checkpoint_logged().await;
                self.set_phase(MonitorPhase::Interrupted);
                return Ok(None);
            }
            let st = job.status().await?;
            if st.has_metadata {
                break st;
            }
            sleep(self.poll_interval).await;
        };

        let name = status.name.clone().unwrap_or_else(|| source.default_name());
        info!("Downloading: {}", name);
        self.set_phase(MonitorPhase::Transferring);

        let mut last_checkpoint = Instant::now();
        loop {
            if self.interrupted() {
                warn!("Download paused by user, session saved for resume");
                self.checkpoint_logged().await;
                self.set_phase(MonitorPhase::Interrupted);
                return Ok(None);
            }

            let st = job.status().await?;
            if st.state.is_complete() {
                break;
            }

            self.display.update_download(&st)?;

            if last_checkpoint.elapsed() >= self.checkpoint_interval {
                self.checkpoint_logged().await;
                last_checkpoint = Instant::now();
            }

            sleep(self.poll_interval).await;
        }

        self.display.finish_line()?;
        info!("Download complete: {}", name);
        self.set_phase(MonitorPhase::Completed);

        if let Err(e) = self.store.clear().await {
            warn!("Could not remove session file: {}", e);
        }

        Ok(Some(dest.join(&name)))
    }
}
