//! Transfer engine interface
//!
//! The peer-to-peer engine is an external collaborator. This module defines
//! the narrow status/control surface the download monitor drives, plus the
//! RPC client binding to a running engine daemon.

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

pub mod rpc;
pub mod source;
pub mod status;

pub use rpc::{RpcEngine, RpcJob, DEFAULT_ENGINE_URL};
pub use source::Source;
pub use status::{JobState, JobStatus};

/// Handle to a single download job inside the engine
#[async_trait]
pub trait TransferJob: Send + Sync {
    /// Fetch the current status snapshot for this job
    async fn status(&self) -> Result<JobStatus>;
}

/// Narrow control surface over the external transfer engine
///
/// The engine owns peer connections, piece selection, and the wire protocol.
/// The monitor only submits jobs, polls them, and checkpoints the engine's
/// opaque session state.
#[async_trait]
pub trait TransferEngine: Send + Sync {
    type Job: TransferJob + Send + 'static;

    /// Load previously checkpointed session state into the engine
    async fn restore(&self, state: &[u8]) -> Result<()>;

    /// Submit a source for download into the destination directory
    async fn submit(&self, source: &Source, dest: &Path) -> Result<Self::Job>;

    /// Serialize the engine's current session state for checkpointing
    async fn save_state(&self) -> Result<Vec<u8>>;
}
