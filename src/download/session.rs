//! Session persistence
//!
//! Stores the engine's opaque bencoded session blob on disk so an
//! interrupted download can resume. The store has no knowledge of the blob's
//! contents beyond checking that it is structurally valid bencode.

use std::path::PathBuf;

use anyhow::Result;
use tokio::fs;
use tracing::{debug, warn};

/// Default session file in the working directory
pub const SESSION_FILE: &str = ".torrent-relay.session";

/// Persists engine session state to a single file
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Create a store backed by the given file
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path of the backing file
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Whether a session file currently exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the persisted session blob
    ///
    /// A missing, empty, or structurally invalid file is treated as "no
    /// session" rather than an error; an invalid file is removed so the next
    /// run starts clean.
    pub async fn load(&self) -> Option<Vec<u8>> {
        let data = match fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) => {
                debug!("No session file at {}: {}", self.path.display(), e);
                return None;
            }
        };

        if data.is_empty() {
            warn!("Session file {} is empty, starting fresh", self.path.display());
            return None;
        }

        if let Err(e) = serde_bencode::from_bytes::<serde_bencode::value::Value>(&data) {
            warn!(
                "Session file {} is corrupt ({}), starting fresh",
                self.path.display(),
                e
            );
            if let Err(e) = fs::remove_file(&self.path).await {
                warn!("Could not remove corrupt session file: {}", e);
            }
            return None;
        }

        debug!("Loaded session from {} ({} bytes)", self.path.display(), data.len());
        Some(data)
    }

    /// Persist a session blob, replacing any previous one
    pub async fn save(&self, state: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        fs::write(&self.path, state).await?;
        debug!("Session saved to {} ({} bytes)", self.path.display(), state.len());
        Ok(())
    }

    /// Remove the session file; removing an absent file is success
    pub async fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!("Session file {} removed", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(PathBuf::from(SESSION_FILE))
    }
}
