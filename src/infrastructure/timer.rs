use crate::types::RECONNECT_BACKOFF_FACTOR;
use std::time::Duration;

/// Reconnect schedule: `base × 1.5^attempt`, for at most `max_attempts` attempts
#[derive(Debug, Clone)]
pub struct Backoff {
    attempts: u32,
    base: Duration,
    max_attempts: u32,
}

impl Backoff {
    pub fn new(base: Duration, max_attempts: u32) -> Self {
        Self {
            attempts: 0,
            base,
            max_attempts,
        }
    }

    /// Attempts handed out since the last reset
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before the reconnect numbered `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let secs = self.base.as_secs_f64() * RECONNECT_BACKOFF_FACTOR.powf(f64::from(attempt));
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// Get the next delay, or `None` once the ceiling is reached
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.is_exhausted() {
            return None;
        }

        let delay = self.delay_for(self.attempts);
        self.attempts += 1;
        Some(delay)
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    /// Reset the attempt counter
    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}
