//! Job status snapshot
//!
//! Defines the status snapshot reported by the transfer engine for a
//! running download job.

use serde::{Deserialize, Serialize};

/// State of a download job as reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobState {
    /// Queued, not yet started
    Queued,
    /// Verifying existing data on disk
    Checking,
    /// Fetching metadata from peers (magnet links)
    FetchingMetadata,
    /// Actively downloading payload data
    Downloading,
    /// All data transferred, uploading to peers
    Seeding,
    /// All data transferred, not seeding
    Finished,
    /// Paused by the engine
    Paused,
}

impl JobState {
    /// Whether the job has fully transferred its payload
    pub fn is_complete(self) -> bool {
        matches!(self, JobState::Seeding | JobState::Finished)
    }
}

impl Default for JobState {
    fn default() -> Self {
        JobState::Queued
    }
}

/// Point-in-time status snapshot for a download job
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobStatus {
    /// Whether torrent metadata has been resolved
    pub has_metadata: bool,
    /// Resolved display name (None until metadata arrives)
    #[serde(default)]
    pub name: Option<String>,
    /// Current engine-side state
    #[serde(default)]
    pub state: JobState,
    /// Download progress (0.0 to 1.0)
    #[serde(default)]
    pub progress: f64,
    /// Instantaneous download rate in bytes per second
    #[serde(default)]
    pub download_rate: f64,
    /// Number of connected seeds
    #[serde(default)]
    pub num_seeds: u32,
    /// Number of connected peers (including seeds)
    #[serde(default)]
    pub num_peers: u32,
    /// Bytes downloaded so far
    #[serde(default)]
    pub bytes_done: u64,
    /// Total bytes wanted
    #[serde(default)]
    pub bytes_total: u64,
}

impl JobStatus {
    /// Download progress as a percentage
    pub fn percent(&self) -> f64 {
        if self.bytes_total == 0 {
            self.progress * 100.0
        } else {
            self.bytes_done as f64 / self.bytes_total as f64 * 100.0
        }
    }

    /// Bytes still to download
    pub fn remaining(&self) -> u64 {
        self.bytes_total.saturating_sub(self.bytes_done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_state_is_complete() {
        assert!(JobState::Seeding.is_complete());
        assert!(JobState::Finished.is_complete());
        assert!(!JobState::Downloading.is_complete());
        assert!(!JobState::FetchingMetadata.is_complete());
        assert!(!JobState::Queued.is_complete());
    }

    #[test]
    fn test_job_state_default() {
        assert_eq!(JobState::default(), JobState::Queued);
    }

    #[test]
    fn test_percent() {
        let status = JobStatus {
            bytes_done: 250,
            bytes_total: 1000,
            ..Default::default()
        };
        assert!((status.percent() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_percent_unknown_total() {
        let status = JobStatus {
            progress: 0.5,
            ..Default::default()
        };
        assert!((status.percent() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_remaining() {
        let status = JobStatus {
            bytes_done: 300,
            bytes_total: 1000,
            ..Default::default()
        };
        assert_eq!(status.remaining(), 700);

        let overshot = JobStatus {
            bytes_done: 1200,
            bytes_total: 1000,
            ..Default::default()
        };
        assert_eq!(overshot.remaining(), 0);
    }

    #[test]
    fn test_status_deserialize() {
        let json = r#"{
            "has_metadata": true,
            "name": "Big Buck Bunny",
            "state": "downloading",
            "progress": 0.42,
            "download_rate": 1048576.0,
            "num_seeds": 12,
            "num_peers": 30,
            "bytes_done": 420,
            "bytes_total": 1000
        }"#;
        let status: JobStatus = serde_json::from_str(json).unwrap();
        assert!(status.has_metadata);
        assert_eq!(status.name.as_deref(), Some("Big Buck Bunny"));
        assert_eq!(status.state, JobState::Downloading);
        assert_eq!(status.num_seeds, 12);
    }

    #[test]
    fn test_status_deserialize_minimal() {
        // The engine may omit fields before metadata arrives
        let json = r#"{"has_metadata": false}"#;
        let status: JobStatus = serde_json::from_str(json).unwrap();
        assert!(!status.has_metadata);
        assert_eq!(status.state, JobState::Queued);
        assert!(status.name.is_none());
    }
}
