use log::debug;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// What ended a `wait_or_shutdown` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Elapsed,
    ShutdownRequested,
}

/// Cooperative shutdown signal shared by every poll loop.
///
/// Wraps a `CancellationToken`: set once, never cleared, read by every
/// loop at the top of each iteration and inside each interruptible wait.
/// Constructed by the supervisor and cloned into each task rather than
/// living as ambient global state, so tests can instantiate independent
/// controllers.
#[derive(Debug, Clone, Default)]
pub struct ShutdownController {
    token: CancellationToken,
}

impl ShutdownController {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Idempotent; safe to call from the signal-listener task. Wakes every
    /// task currently parked in `wait_or_shutdown`.
    pub fn request_shutdown(&self) {
        if !self.token.is_cancelled() {
            debug!("Shutdown requested; waking all waiting poll loops.");
        }
        self.token.cancel();
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Blocks up to `duration` or until shutdown is requested, whichever
    /// comes first.
    pub async fn wait_or_shutdown(&self, duration: Duration) -> WaitOutcome {
        tokio::select! {
            _ = self.token.cancelled() => WaitOutcome::ShutdownRequested,
            _ = tokio::time::sleep(duration) => WaitOutcome::Elapsed,
        }
    }
}
