/// Shared plumbing for the two polling loops: the error type that ends a
/// loop and the cooperative tick/sleep driver.
use crate::state::SharedState;
use std::time::Duration;

/// Failure that ends the owning loop. The other loop keeps running.
#[derive(Debug)]
pub enum WorkerError {
    /// The loop's task panicked.
    Panicked(String),
    /// Reading the wall clock failed.
    Time(String),
    /// `getrusage` reported an error.
    Usage(nix::Error),
    /// Writing to the terminal failed.
    Screen(std::io::Error),
}

impl std::fmt::Display for WorkerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerError::Panicked(msg) => write!(f, "worker panicked: {msg}"),
            WorkerError::Time(msg) => write!(f, "failed to read current time: {msg}"),
            WorkerError::Usage(e) => write!(f, "failed to query CPU usage: {e}"),
            WorkerError::Screen(e) => write!(f, "failed to write to terminal: {e}"),
        }
    }
}

impl std::error::Error for WorkerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WorkerError::Panicked(_) | WorkerError::Time(_) => None,
            WorkerError::Usage(e) => Some(e),
            WorkerError::Screen(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for WorkerError {
    fn from(e: std::io::Error) -> Self {
        WorkerError::Screen(e)
    }
}

/// Call `tick` then sleep `interval`, until the termination flag is set.
///
/// The flag is checked before every tick and setting it wakes the sleep,
/// so a stop request is observed promptly whatever the interval. The first
/// error from `tick` ends the loop; there are no retries.
pub async fn poll_until_finished<F>(
    name: &'static str,
    state: &SharedState,
    interval: Duration,
    mut tick: F,
) -> Result<u64, WorkerError>
where
    F: FnMut() -> Result<(), WorkerError>,
{
    let mut iterations = 0u64;
    while !state.finished.is_set() {
        if let Err(e) = tick() {
            tracing::error!(worker = name, iterations, error = %e, "worker loop failed");
            return Err(e);
        }
        iterations += 1;
        state.finished.sleep(interval).await;
    }
    tracing::debug!(worker = name, iterations, "worker loop finished");
    Ok(iterations)
}
