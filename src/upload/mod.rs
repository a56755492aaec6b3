//! Upload module
//!
//! Recursive upload orchestration: path classification, glob filtering,
//! dedup lookups, bounded retry, persistent progress, and the orchestrator
//! tying them together.

pub mod classify;
pub mod dedup;
pub mod filter;
pub mod ledger;
pub mod orchestrator;
pub mod retry;

pub use classify::{list_children, scan, PathStats};
pub use dedup::DedupOracle;
pub use filter::PatternFilter;
pub use ledger::{ItemOutcome, ProgressLedger, LEDGER_FILE};
pub use orchestrator::{UploadOptions, UploadReport, Uploader, DEFAULT_POOL_SIZE};
pub use retry::{with_backoff, BASE_DELAY, MAX_ATTEMPTS};
