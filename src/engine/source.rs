//! Source descriptors
//!
//! Classifies and validates the download source: either a .torrent file on
//! disk or a magnet link.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, warn};
use url::Url;

use crate::error::RelayError;

/// A validated download source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Path to a .torrent file on disk
    TorrentFile(PathBuf),
    /// A magnet URI
    Magnet(String),
}

impl Source {
    /// Classify and validate a source descriptor string
    ///
    /// A descriptor is either a path ending in `.torrent` (which must exist)
    /// or a string starting with the `magnet:` scheme. Anything else is
    /// rejected as invalid.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();

        if Self::is_magnet(trimmed) {
            Self::validate_magnet(trimmed)?;
            debug!("Recognized magnet link source");
            return Ok(Source::Magnet(trimmed.to_string()));
        }

        if trimmed.ends_with(".torrent") {
            let path = Path::new(trimmed);
            if !path.exists() {
                warn!("Torrent file does not exist: {}", trimmed);
                return Err(RelayError::source_not_found(trimmed).into());
            }
            debug!("Recognized torrent file source: {}", trimmed);
            return Ok(Source::TorrentFile(path.to_path_buf()));
        }

        Err(RelayError::source_invalid(
            "Provide a .torrent file path or a magnet link",
        )
        .into())
    }

    /// Check if a string looks like a magnet link
    pub fn is_magnet(input: &str) -> bool {
        input.trim().starts_with("magnet:")
    }

    /// Validate a magnet URI: scheme and the btih info-hash parameter
    fn validate_magnet(uri: &str) -> Result<()> {
        let url = Url::parse(uri).map_err(|e| {
            RelayError::source_invalid(format!("Invalid magnet URL format: {}", e))
        })?;

        if url.scheme() != "magnet" {
            return Err(RelayError::source_invalid("URL is not a magnet link").into());
        }

        let xt = url
            .query_pairs()
            .find(|(key, _)| key == "xt")
            .map(|(_, value)| value.into_owned())
            .ok_or_else(|| {
                RelayError::source_invalid("Magnet link must contain an xt=urn:btih:<hash> parameter")
            })?;

        let hash_str = xt.strip_prefix("urn:btih:").ok_or_else(|| {
            RelayError::source_invalid("xt parameter is not a BitTorrent info hash")
        })?;

        if hash_str.len() != 40 || hex::decode(hash_str).map_or(true, |b| b.len() != 20) {
            return Err(RelayError::source_invalid(format!(
                "Info hash has invalid length or encoding: {} (expected 40 hex characters)",
                hash_str
            ))
            .into());
        }

        Ok(())
    }

    /// Display name fallback used before engine metadata resolves one
    pub fn default_name(&self) -> String {
        match self {
            Source::TorrentFile(path) => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "download".to_string()),
            Source::Magnet(uri) => Url::parse(uri)
                .ok()
                .and_then(|u| {
                    u.query_pairs()
                        .find(|(key, _)| key == "dn")
                        .map(|(_, value)| value.into_owned())
                })
                .unwrap_or_else(|| "download".to_string()),
        }
    }

    /// Short description for log messages
    pub fn describe(&self) -> String {
        match self {
            Source::TorrentFile(path) => format!("torrent file {}", path.display()),
            Source::Magnet(uri) => {
                let head: String = uri.chars().take(60).collect();
                format!("magnet link {}...", head)
            }
        }
    }
}
