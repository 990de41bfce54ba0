use std::time::Duration;

use tokio::time::{sleep_until, Instant};

/// Explicit debounce timer handle.
///
/// `arm` (re)starts the countdown, `cancel` disarms it, and `expired` resolves
/// once the armed deadline passes. Disarmed timers never resolve, so `expired`
/// can sit in a `select!` unconditionally.
#[derive(Debug, Default)]
pub struct DebounceTimer {
    deadline: Option<Instant>,
}

impl DebounceTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the timer `delay` from now, replacing any earlier deadline.
    pub fn arm(&mut self, delay: Duration) {
        self.deadline = Some(Instant::now() + delay);
    }

    /// Disarms the timer. Returns whether it was armed.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Waits for the armed deadline, then disarms. Cancel-safe: dropping the
    /// future early leaves the deadline in place.
    pub async fn expired(&mut self) {
        match self.deadline {
            Some(deadline) => {
                sleep_until(deadline).await;
                self.deadline = None;
            }
            None => std::future::pending().await,
        }
    }
}
