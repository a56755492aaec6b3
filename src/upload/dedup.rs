//! Dedup oracle
//!
//! Answers "does a same-named object already exist under this parent?". A
//! remote lookup failure is logged and degraded to "not found": re-uploading
//! a file beats blocking the whole run on a transient service error.

use std::sync::Arc;

use tracing::warn;

use crate::remote::{RemoteFile, RemoteStore};

/// Existence lookups against the remote store
#[derive(Clone)]
pub struct DedupOracle {
    store: Arc<dyn RemoteStore>,
}

impl DedupOracle {
    /// Create an oracle over a remote store
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// Find an existing file by name under a parent folder
    pub async fn find_file(&self, name: &str, parent_id: &str) -> Option<RemoteFile> {
        match self.store.find_file(name, parent_id).await {
            Ok(found) => found,
            Err(e) => {
                warn!("Lookup for file '{}' failed, assuming it does not exist: {}", name, e);
                None
            }
        }
    }

    /// Find an existing folder by name under a parent folder
    pub async fn find_folder(&self, name: &str, parent_id: &str) -> Option<String> {
        match self.store.find_folder(name, parent_id).await {
            Ok(found) => found,
            Err(e) => {
                warn!("Lookup for folder '{}' failed, assuming it does not exist: {}", name, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelayError;
    use crate::remote::ProgressFn;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::path::Path;

    struct FlakyStore {
        fail: bool,
    }

    #[async_trait]
    impl RemoteStore for FlakyStore {
        async fn find_file(&self, name: &str, _parent_id: &str) -> Result<Option<RemoteFile>> {
            if self.fail {
                return Err(RelayError::cloud_storage_error("Lookup failed", "Google Drive").into());
            }
            if name == "present.txt" {
                Ok(Some(RemoteFile {
                    id: "file-1".into(),
                    name: name.into(),
                    size: None,
                    mime_type: "text/plain".into(),
                }))
            } else {
                Ok(None)
            }
        }

        async fn find_folder(&self, name: &str, _parent_id: &str) -> Result<Option<String>> {
            if self.fail {
                return Err(RelayError::cloud_storage_error("Lookup failed", "Google Drive").into());
            }
            Ok((name == "present").then(|| "folder-1".to_string()))
        }

        async fn create_folder(&self, _name: &str, _parent_id: &str) -> Result<String> {
            unreachable!("oracle never creates")
        }

        async fn upload_file(&self, _path: &Path, _parent_id: &str, _progress: ProgressFn<'_>) -> Result<String> {
            unreachable!("oracle never uploads")
        }
    }

    #[tokio::test]
    async fn test_find_file_hit_and_miss() {
        let oracle = DedupOracle::new(Arc::new(FlakyStore { fail: false }));

        let found = oracle.find_file("present.txt", "root").await.unwrap();
        assert_eq!(found.id, "file-1");
        assert!(oracle.find_file("absent.txt", "root").await.is_none());
    }

    #[tokio::test]
    async fn test_find_folder_hit_and_miss() {
        let oracle = DedupOracle::new(Arc::new(FlakyStore { fail: false }));

        assert_eq!(oracle.find_folder("present", "root").await.as_deref(), Some("folder-1"));
        assert!(oracle.find_folder("absent", "root").await.is_none());
    }

    #[tokio::test]
    async fn test_lookup_failure_degrades_to_not_found() {
        let oracle = DedupOracle::new(Arc::new(FlakyStore { fail: true }));

        assert!(oracle.find_file("present.txt", "root").await.is_none());
        assert!(oracle.find_folder("present", "root").await.is_none());
    }
}
