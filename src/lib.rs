//! torrent-relay
//!
//! A torrent CLI downloader with resumable sessions and Google Drive relay.

pub mod cli;
pub mod download;
pub mod engine;
pub mod error;
pub mod remote;
pub mod upload;

pub use error::RelayError;

pub use cli::{CliArgs, Command, ConfigStore, ProgressDisplay};
pub use download::{DownloadMonitor, MonitorPhase, SessionStore};
pub use engine::{
    JobState, JobStatus, RpcEngine, RpcJob, Source, TransferEngine, TransferJob,
};
pub use remote::{DriveClient, RemoteFile, RemoteStore};
pub use upload::{
    DedupOracle, ItemOutcome, PathStats, PatternFilter, ProgressLedger, UploadOptions,
    UploadReport, Uploader,
};
