//! Transfer retrier
//!
//! Wraps a fallible transfer attempt with bounded exponential-backoff retry.
//! The final exhausted attempt propagates its error to the caller.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

/// Maximum attempts per transfer
pub const MAX_ATTEMPTS: u32 = 3;

/// Base delay for exponential backoff
pub const BASE_DELAY: Duration = Duration::from_secs(2);

/// Run an operation with bounded exponential backoff
///
/// The operation receives the zero-based attempt index. After a failed
/// attempt `i` the retrier waits `base_delay * 2^i` before the next attempt;
/// the last attempt's error is returned as-is.
pub async fn with_backoff<T, E, F, Fut>(max_attempts: u32, base_delay: Duration, mut op: F) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0u32;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                let failed = attempt;
                attempt += 1;
                if attempt >= max_attempts {
                    warn!("Attempt {}/{} failed, giving up: {}", failed + 1, max_attempts, e);
                    return Err(e);
                }
                let delay = base_delay * 2u32.pow(failed);
                warn!(
                    "Attempt {}/{} failed ({}), retrying in {:?}",
                    failed + 1,
                    max_attempts,
                    e,
                    delay
                );
                sleep(delay).await;
            }
        }
    }
}
