//! Path classification
//!
//! Pure helpers that walk a local path once to produce aggregate statistics,
//! and enumerate directory children for the orchestrator.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::warn;
use walkdir::WalkDir;

/// Aggregate statistics for a local path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathStats {
    /// Number of files
    pub files: u64,
    /// Number of directories (excluding the root itself)
    pub folders: u64,
    /// Total bytes across readable files
    pub total_size: u64,
}

/// Walk a path once, summing file count, folder count, and byte size
///
/// Unreadable entries are skipped from the sums rather than failing the walk.
pub fn scan(path: &Path) -> PathStats {
    if path.is_file() {
        let size = path.metadata().map(|m| m.len()).unwrap_or_else(|e| {
            warn!("Cannot stat {}: {}", path.display(), e);
            0
        });
        return PathStats { files: 1, folders: 0, total_size: size };
    }

    let mut stats = PathStats::default();
    for entry in WalkDir::new(path).min_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", path.display(), e);
                continue;
            }
        };

        if entry.file_type().is_dir() {
            stats.folders += 1;
        } else if entry.file_type().is_file() {
            stats.files += 1;
            match entry.metadata() {
                Ok(meta) => stats.total_size += meta.len(),
                Err(e) => warn!("Cannot stat {}: {}", entry.path().display(), e),
            }
        }
    }
    stats
}

/// List the files directly under a directory, in discovery order
///
/// Unreadable subtrees during a failure sweep are tolerated the same way
/// [`scan`] tolerates them.
pub fn files_under(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

/// Enumerate the immediate children of a directory, sorted by name
pub fn list_children(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut children: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                None
            }
        })
        .collect();
    children.sort();
    Ok(children)
}
