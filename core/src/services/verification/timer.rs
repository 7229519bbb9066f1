//! Cancellable one-shot countdowns on the tokio timer

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

/// Fires a callback once after a delay unless cancelled first
///
/// Dropping the countdown cancels it.
#[derive(Debug)]
pub struct Countdown {
    deadline: Instant,
    handle: JoinHandle<()>,
}

impl Countdown {
    /// Start a countdown on the current tokio runtime
    pub fn after<F>(duration: Duration, on_fire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let deadline = Instant::now() + duration;
        let handle = tokio::spawn(async move {
            sleep_until(deadline).await;
            on_fire();
        });
        Self { deadline, handle }
    }

    /// Time left before the countdown fires
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Whole seconds left, rounded up
    pub fn seconds_remaining(&self) -> u64 {
        let remaining = self.remaining();
        remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0)
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
