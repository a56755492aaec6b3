//! Google Drive client
//!
//! Implements [`RemoteStore`] against the Drive v3 API: exact-name lookups,
//! folder creation, and resumable chunked uploads.

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{json, Value};
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use crate::error::RelayError;
use crate::remote::{mime_type_for, ProgressFn, RemoteFile, RemoteStore};

/// Chunk size for resumable uploads (a multiple of 256 KiB, per the API)
pub const UPLOAD_CHUNK_SIZE: usize = 8 * 1024 * 1024;

const PROVIDER: &str = "Google Drive";
const UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";
const API_URL: &str = "https://www.googleapis.com/drive/v3/files";
const ABOUT_URL: &str = "https://www.googleapis.com/drive/v3/about?fields=user";
const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

/// Google Drive API client
pub struct DriveClient {
    client: reqwest::Client,
    access_token: String,
}

impl DriveClient {
    /// Create a new Drive client from a pre-issued OAuth2 access token
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_token: access_token.into(),
        }
    }

    /// Check if the client is authenticated by validating the token
    pub async fn check_auth(&self) -> Result<bool> {
        let response = self
            .client
            .get(ABOUT_URL)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Auth check failed: {} - {}", status, error_text);
        }

        Ok(status.is_success())
    }

    /// Escape the query language's quote character in a name value
    fn escape_query_value(name: &str) -> String {
        name.replace('\'', "\\'")
    }

    /// Build an exact-name file lookup query
    fn file_query(name: &str, parent_id: &str) -> String {
        format!(
            "name='{}' and '{}' in parents and trashed=false",
            Self::escape_query_value(name),
            parent_id
        )
    }

    /// Build an exact-name folder lookup query
    fn folder_query(name: &str, parent_id: &str) -> String {
        format!(
            "name='{}' and '{}' in parents and mimeType='{}' and trashed=false",
            Self::escape_query_value(name),
            parent_id,
            FOLDER_MIME
        )
    }

    /// Run a list query and return the matching file entries
    async fn list_query(&self, query: &str, fields: &str) -> Result<Vec<Value>> {
        let url = format!(
            "{}?q={}&fields={}&pageSize=1&supportsAllDrives=true&includeItemsFromAllDrives=true",
            API_URL,
            urlencoding::encode(query),
            urlencoding::encode(fields)
        );

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .send()
            .await
            .map_err(|e| RelayError::cloud_storage_error_with_source("Lookup request failed", PROVIDER, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RelayError::cloud_storage_error_with_source(
                format!("Lookup failed: {}", status),
                PROVIDER,
                error_text,
            )
            .into());
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| RelayError::cloud_storage_error_with_source("Invalid lookup response", PROVIDER, e.to_string()))?;

        Ok(body
            .get("files")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    /// Create a resumable upload session, returning the session URL
    async fn create_resumable_upload(
        &self,
        name: &str,
        mime_type: &str,
        parent_id: &str,
        total_size: u64,
    ) -> Result<String> {
        debug!("Creating resumable upload session for: {}", name);

        let url = format!("{}?uploadType=resumable&supportsAllDrives=true", UPLOAD_URL);
        let metadata = json!({
            "name": name,
            "mimeType": mime_type,
            "parents": [parent_id],
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("X-Upload-Content-Length", total_size.to_string())
            .json(&metadata)
            .send()
            .await
            .map_err(|e| RelayError::cloud_storage_error_retryable("Failed to open upload session", PROVIDER, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RelayError::cloud_storage_error_retryable(
                format!("Failed to open upload session: {}", status),
                PROVIDER,
                error_text,
            )
            .into());
        }

        let upload_url = response
            .headers()
            .get("Location")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                RelayError::cloud_storage_error("Missing Location header in session response", PROVIDER)
            })?
            .to_string();

        debug!("Opened resumable upload session for {}", name);
        Ok(upload_url)
    }

    /// Upload one chunk to a resumable session
    ///
    /// Returns the file id once the final chunk is accepted, `None` while the
    /// session expects more data (308 Resume Incomplete).
    async fn upload_chunk(
        &self,
        upload_url: &str,
        chunk: Bytes,
        offset: u64,
        total_size: u64,
    ) -> Result<Option<String>> {
        let chunk_size = chunk.len();
        let content_range = if chunk_size == 0 && total_size == 0 {
            format!("bytes */{}", total_size)
        } else {
            format!("bytes {}-{}/{}", offset, offset + chunk_size as u64 - 1, total_size)
        };

        debug!("Uploading chunk: offset={}, size={}, range={}", offset, chunk_size, content_range);

        let response = self
            .client
            .put(upload_url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("Content-Range", content_range)
            .body(chunk)
            .send()
            .await
            .map_err(|e| RelayError::cloud_storage_error_retryable("Chunk upload failed", PROVIDER, e.to_string()))?;

        let status = response.status().as_u16();
        match status {
            200 | 201 => {
                let body: Value = response.json().await.map_err(|e| {
                    RelayError::cloud_storage_error_with_source("Invalid upload response", PROVIDER, e.to_string())
                })?;
                let id = body
                    .get("id")
                    .and_then(Value::as_str)
                    .ok_or_else(|| RelayError::cloud_storage_error("Missing file id in upload response", PROVIDER))?;
                Ok(Some(id.to_string()))
            }
            // Resume Incomplete: session expects more data
            308 => Ok(None),
            _ => {
                let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
                Err(RelayError::cloud_storage_error_retryable(
                    format!("Chunk upload failed: {}", status),
                    PROVIDER,
                    error_text,
                )
                .into())
            }
        }
    }
}

/// Fill a buffer from the file, stopping only at EOF
async fn read_full(file: &mut tokio::fs::File, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = file.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

#[async_trait]
impl RemoteStore for DriveClient {
    async fn find_file(&self, name: &str, parent_id: &str) -> Result<Option<RemoteFile>> {
        let query = Self::file_query(name, parent_id);
        let files = self.list_query(&query, "files(id, name, size, mimeType)").await?;

        match files.into_iter().next() {
            Some(entry) => {
                let file: RemoteFile = serde_json::from_value(entry).map_err(|e| {
                    RelayError::cloud_storage_error_with_source("Malformed file entry", PROVIDER, e.to_string())
                })?;
                Ok(Some(file))
            }
            None => Ok(None),
        }
    }

    async fn find_folder(&self, name: &str, parent_id: &str) -> Result<Option<String>> {
        let query = Self::folder_query(name, parent_id);
        let folders = self.list_query(&query, "files(id, name)").await?;

        Ok(folders
            .into_iter()
            .next()
            .and_then(|entry| entry.get("id").and_then(Value::as_str).map(str::to_string)))
    }

    async fn create_folder(&self, name: &str, parent_id: &str) -> Result<String> {
        debug!("Creating folder: {}", name);

        let metadata = json!({
            "name": name,
            "mimeType": FOLDER_MIME,
            "parents": [parent_id],
        });

        let url = format!("{}?supportsAllDrives=true", API_URL);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .json(&metadata)
            .send()
            .await
            .map_err(|e| RelayError::cloud_storage_error_with_source("Folder create request failed", PROVIDER, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RelayError::cloud_storage_error_with_source(
                format!("Failed to create folder '{}': {}", name, status),
                PROVIDER,
                error_text,
            )
            .into());
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| RelayError::cloud_storage_error_with_source("Invalid folder response", PROVIDER, e.to_string()))?;

        let folder_id = body
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| RelayError::cloud_storage_error("Missing folder id in response", PROVIDER))?;

        info!("Created folder '{}' (id: {})", name, folder_id);
        Ok(folder_id.to_string())
    }

    async fn upload_file(&self, path: &Path, parent_id: &str, progress: ProgressFn<'_>) -> Result<String> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| RelayError::storage_error_with_path("Invalid file name", path.display().to_string()))?;

        let metadata = tokio::fs::metadata(path).await.map_err(|e| {
            RelayError::storage_error_full("Cannot stat file for upload", path.display().to_string(), e.to_string())
        })?;
        let total = metadata.len();
        let mime = mime_type_for(path);

        debug!("Uploading '{}' ({} bytes, {})", name, total, mime);
        let upload_url = self.create_resumable_upload(name, mime, parent_id, total).await?;

        let mut file_id = None;
        let mut last_reported = 0u64;

        if total == 0 {
            file_id = self.upload_chunk(&upload_url, Bytes::new(), 0, 0).await?;
            progress(0);
        } else {
            let mut file = tokio::fs::File::open(path).await.map_err(|e| {
                RelayError::storage_error_full("Cannot open file for upload", path.display().to_string(), e.to_string())
            })?;
            let mut buf = vec![0u8; UPLOAD_CHUNK_SIZE.min(total as usize)];
            let mut offset = 0u64;

            while offset < total {
                let n = read_full(&mut file, &mut buf).await.map_err(|e| {
                    RelayError::storage_error_full("Read failed during upload", path.display().to_string(), e.to_string())
                })?;
                if n == 0 {
                    return Err(RelayError::cloud_storage_error(
                        format!("File '{}' truncated during upload", name),
                        PROVIDER,
                    )
                    .into());
                }

                let result = self
                    .upload_chunk(&upload_url, Bytes::copy_from_slice(&buf[..n]), offset, total)
                    .await?;

                offset += n as u64;
                progress(offset);
                last_reported = offset;

                if let Some(id) = result {
                    file_id = Some(id);
                    break;
                }
            }
        }

        // The final chunk boundary may undershoot the exact size
        if last_reported < total {
            progress(total);
        }

        let id = file_id
            .ok_or_else(|| RelayError::cloud_storage_error("Upload ended without a file id", PROVIDER))?;
        info!("Uploaded '{}' (id: {})", name, id);
        Ok(id)
    }
}
