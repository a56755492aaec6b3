//! Download module
//!
//! Session persistence and the monitor loop driving one download job.

pub mod monitor;
pub mod session;

pub use monitor::{DownloadMonitor, MonitorPhase, CHECKPOINT_INTERVAL, POLL_INTERVAL};
pub use session::{SessionStore, SESSION_FILE};
