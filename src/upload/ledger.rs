//! Progress ledger
//!
//! Persists per-path upload outcomes across restarts so an interrupted
//! multi-file upload can skip already-completed items on resume.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default ledger file in the working directory
pub const LEDGER_FILE: &str = ".torrent-relay.progress.json";

/// Terminal outcome of one transfer item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemOutcome {
    Success,
    Skipped,
    Failed,
}

/// Persisted mapping of local path to outcome
#[derive(Debug)]
pub struct ProgressLedger {
    path: PathBuf,
    entries: HashMap<String, ItemOutcome>,
}

impl ProgressLedger {
    /// Open a ledger backed by the given file
    ///
    /// A missing or corrupt file yields an empty ledger, never an error.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Could not parse progress ledger {}: {}", path.display(), e);
                    HashMap::new()
                }
            },
            Err(e) => {
                debug!("No progress ledger at {}: {}", path.display(), e);
                HashMap::new()
            }
        };
        Self { path, entries }
    }

    /// Open the default ledger dotfile
    pub fn open_default() -> Self {
        Self::open(LEDGER_FILE)
    }

    /// Record a terminal outcome for a path
    pub fn record(&mut self, path: &Path, outcome: ItemOutcome) {
        self.entries.insert(path.to_string_lossy().into_owned(), outcome);
    }

    /// Look up the recorded outcome for a path
    pub fn get(&self, path: &Path) -> Option<ItemOutcome> {
        self.entries.get(path.to_string_lossy().as_ref()).copied()
    }

    /// Whether a path completed in a previous run (success or skip)
    ///
    /// A recorded failure is not "done": it is retried on resume.
    pub fn is_done(&self, path: &Path) -> bool {
        matches!(self.get(path), Some(ItemOutcome::Success) | Some(ItemOutcome::Skipped))
    }

    /// Number of recorded entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ledger has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Persist the ledger
    pub fn save(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }

    /// Drop all entries and remove the backing file; removing an absent file
    /// is success
    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
