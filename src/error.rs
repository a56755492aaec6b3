//! Error types for the torrent relay
//!
//! This module defines the error taxonomy shared by the download monitor,
//! the upload orchestrator, and the remote storage client.

use std::fmt;

/// Comprehensive error type for relay operations
#[derive(Debug, Clone)]
pub enum RelayError {
    /// Source descriptor errors (bad torrent path or magnet link)
    SourceError {
        message: String,
        path: Option<String>,
    },

    /// Session persistence errors
    SessionError {
        message: String,
        source: Option<String>,
    },

    /// Transfer engine errors (RPC daemon faults)
    EngineError {
        message: String,
        source: Option<String>,
    },

    /// Cloud storage errors (Google Drive, etc.)
    CloudStorageError {
        message: String,
        provider: String,
        source: Option<String>,
        is_retryable: bool,
    },

    /// Configuration errors
    ConfigError {
        message: String,
        field: Option<String>,
    },

    /// Local file I/O and storage errors
    StorageError {
        message: String,
        path: Option<String>,
        source: Option<String>,
    },
}

impl RelayError {
    /// Create a new SourceError for an unrecognized descriptor
    pub fn source_invalid(message: impl Into<String>) -> Self {
        RelayError::SourceError {
            message: message.into(),
            path: None,
        }
    }

    /// Create a new SourceError for a missing torrent file
    pub fn source_not_found(path: impl Into<String>) -> Self {
        RelayError::SourceError {
            message: "Torrent file not found".to_string(),
            path: Some(path.into()),
        }
    }

    /// Create a new SessionError
    pub fn session_error(message: impl Into<String>) -> Self {
        RelayError::SessionError {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new SessionError with source
    pub fn session_error_with_source(message: impl Into<String>, source: impl Into<String>) -> Self {
        RelayError::SessionError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a new EngineError
    pub fn engine_error(message: impl Into<String>) -> Self {
        RelayError::EngineError {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new EngineError with source
    pub fn engine_error_with_source(message: impl Into<String>, source: impl Into<String>) -> Self {
        RelayError::EngineError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a new CloudStorageError
    pub fn cloud_storage_error(message: impl Into<String>, provider: impl Into<String>) -> Self {
        RelayError::CloudStorageError {
            message: message.into(),
            provider: provider.into(),
            source: None,
            is_retryable: false,
        }
    }

    /// Create a new CloudStorageError with source
    pub fn cloud_storage_error_with_source(
        message: impl Into<String>,
        provider: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        RelayError::CloudStorageError {
            message: message.into(),
            provider: provider.into(),
            source: Some(source.into()),
            is_retryable: false,
        }
    }

    /// Create a new retryable CloudStorageError
    pub fn cloud_storage_error_retryable(
        message: impl Into<String>,
        provider: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        RelayError::CloudStorageError {
            message: message.into(),
            provider: provider.into(),
            source: Some(source.into()),
            is_retryable: true,
        }
    }

    /// Create a new ConfigError
    pub fn config_error(message: impl Into<String>) -> Self {
        RelayError::ConfigError {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new ConfigError with field
    pub fn config_error_with_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        RelayError::ConfigError {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new StorageError
    pub fn storage_error(message: impl Into<String>) -> Self {
        RelayError::StorageError {
            message: message.into(),
            path: None,
            source: None,
        }
    }

    /// Create a new StorageError with path
    pub fn storage_error_with_path(message: impl Into<String>, path: impl Into<String>) -> Self {
        RelayError::StorageError {
            message: message.into(),
            path: Some(path.into()),
            source: None,
        }
    }

    /// Create a new StorageError with path and source
    pub fn storage_error_full(
        message: impl Into<String>,
        path: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        RelayError::StorageError {
            message: message.into(),
            path: Some(path.into()),
            source: Some(source.into()),
        }
    }

    /// Whether a retry may succeed for this error
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RelayError::CloudStorageError { is_retryable: true, .. }
        )
    }
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayError::SourceError { message, path } => {
                if let Some(p) = path {
                    write!(f, "Source error: {} (path: {})", message, p)
                } else {
                    write!(f, "Source error: {}", message)
                }
            }
            RelayError::SessionError { message, source } => {
                if let Some(src) = source {
                    write!(f, "Session error: {} (source: {})", message, src)
                } else {
                    write!(f, "Session error: {}", message)
                }
            }
            RelayError::EngineError { message, source } => {
                if let Some(src) = source {
                    write!(f, "Engine error: {} (source: {})", message, src)
                } else {
                    write!(f, "Engine error: {}", message)
                }
            }
            RelayError::CloudStorageError { message, provider, source, is_retryable } => {
                match (source, is_retryable) {
                    (Some(s), true) => write!(f, "Cloud storage error (retryable): {} [{}] (source: {})", message, provider, s),
                    (Some(s), false) => write!(f, "Cloud storage error: {} [{}] (source: {})", message, provider, s),
                    (None, true) => write!(f, "Cloud storage error (retryable): {} [{}]", message, provider),
                    (None, false) => write!(f, "Cloud storage error: {} [{}]", message, provider),
                }
            }
            RelayError::ConfigError { message, field } => {
                if let Some(field_val) = field {
                    write!(f, "Config error: {} (field: {})", message, field_val)
                } else {
                    write!(f, "Config error: {}", message)
                }
            }
            RelayError::StorageError { message, path, source } => {
                match (path, source) {
                    (Some(p), Some(s)) => write!(f, "Storage error: {} (path: {}, source: {})", message, p, s),
                    (Some(p), None) => write!(f, "Storage error: {} (path: {})", message, p),
                    (None, Some(s)) => write!(f, "Storage error: {} (source: {})", message, s),
                    (None, None) => write!(f, "Storage error: {}", message),
                }
            }
        }
    }
}

impl std::error::Error for RelayError {}

// Implement From traits for common error types

impl From<std::io::Error> for RelayError {
    fn from(err: std::io::Error) -> Self {
        RelayError::storage_error_full(err.to_string(), "unknown".to_string(), err.kind().to_string())
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        RelayError::storage_error_full("Failed to parse JSON data", "unknown".to_string(), err.to_string())
    }
}

impl From<serde_bencode::Error> for RelayError {
    fn from(err: serde_bencode::Error) -> Self {
        RelayError::session_error_with_source("Failed to parse bencoded session data", err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_invalid() {
        let err = RelayError::source_invalid("Not a torrent file or magnet link");
        assert_eq!(err.to_string(), "Source error: Not a torrent file or magnet link");
    }

    #[test]
    fn test_source_not_found() {
        let err = RelayError::source_not_found("/path/to/missing.torrent");
        assert!(err.to_string().contains("Source error"));
        assert!(err.to_string().contains("/path/to/missing.torrent"));
    }

    #[test]
    fn test_session_error_with_source() {
        let err = RelayError::session_error_with_source("Corrupt state blob", "bencode error");
        assert!(err.to_string().contains("Session error"));
        assert!(err.to_string().contains("Corrupt state blob"));
        assert!(err.to_string().contains("bencode error"));
    }

    #[test]
    fn test_engine_error_with_source() {
        let err = RelayError::engine_error_with_source("Daemon unreachable", "connection refused");
        assert!(err.to_string().contains("Engine error"));
        assert!(err.to_string().contains("Daemon unreachable"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_cloud_storage_error() {
        let err = RelayError::cloud_storage_error("Upload failed", "Google Drive");
        assert!(err.to_string().contains("Cloud storage error"));
        assert!(err.to_string().contains("Upload failed"));
        assert!(err.to_string().contains("Google Drive"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_cloud_storage_error_retryable() {
        let err = RelayError::cloud_storage_error_retryable("Chunk upload failed", "Google Drive", "timeout");
        assert!(err.to_string().contains("Cloud storage error (retryable)"));
        assert!(err.to_string().contains("Chunk upload failed"));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_config_error_with_field() {
        let err = RelayError::config_error_with_field("Invalid glob pattern", "include");
        assert!(err.to_string().contains("Config error"));
        assert!(err.to_string().contains("include"));
    }

    #[test]
    fn test_storage_error_with_path() {
        let err = RelayError::storage_error_with_path("File not found", "/path/to/file");
        assert!(err.to_string().contains("Storage error"));
        assert!(err.to_string().contains("/path/to/file"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: RelayError = io_err.into();
        assert!(matches!(err, RelayError::StorageError { .. }));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: RelayError = json_err.into();
        assert!(matches!(err, RelayError::StorageError { .. }));
    }
}
