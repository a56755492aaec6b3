//! Remote storage interface
//!
//! Trait-based abstraction over the remote object store, enabling the upload
//! orchestrator to work against Google Drive or a test double without knowing
//! implementation details.

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod drive;

pub use drive::{DriveClient, UPLOAD_CHUNK_SIZE};

/// Progress callback invoked with cumulative bytes transferred
pub type ProgressFn<'a> = &'a (dyn Fn(u64) + Send + Sync);

/// Descriptor of an existing remote file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

/// Abstract remote object store
///
/// Lookups are exact-name, non-trashed, and scoped to a parent folder.
/// Uploads are chunked and report cumulative progress through the callback.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Find a file by exact name under a parent folder
    async fn find_file(&self, name: &str, parent_id: &str) -> Result<Option<RemoteFile>>;

    /// Find a folder by exact name under a parent folder, returning its id
    async fn find_folder(&self, name: &str, parent_id: &str) -> Result<Option<String>>;

    /// Create a folder under a parent, returning the new folder id
    async fn create_folder(&self, name: &str, parent_id: &str) -> Result<String>;

    /// Upload one local file under a parent, returning the new file id
    async fn upload_file(&self, path: &Path, parent_id: &str, progress: ProgressFn<'_>) -> Result<String>;
}

/// Classify a file's MIME type from its extension
pub fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("mp4") => "video/mp4",
        Some("mkv") => "video/x-matroska",
        Some("avi") => "video/x-msvideo",
        Some("mp3") => "audio/mpeg",
        Some("flac") => "audio/flac",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("txt") => "text/plain",
        Some("srt") => "text/plain",
        Some("json") => "application/json",
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        _ => "application/octet-stream",
    }
}
