//! Capped exponential backoff as an explicit state machine.
//!
//! `Attempting(k) -> Waiting { next: k + 1, delay } -> Attempting(k + 1)`, ending in
//! `Succeeded` or `Exhausted`. The delay itself is performed by a [`Sleeper`], so
//! tests drive the machine without real time passing.

use async_trait::async_trait;
use std::time::Duration;

const BASE_DELAY_MS: u64 = 1000;
const MAX_DELAY_MS: u64 = 8000;

/// Delay after failed attempt `attempt` (1-based): `min(1000 * 2^(attempt-1), 8000)` ms.
pub fn backoff_delay(attempt: u32) -> Duration {
    let exp = attempt.saturating_sub(1).min(16);
    Duration::from_millis((BASE_DELAY_MS << exp).min(MAX_DELAY_MS))
}

/// Suspends the caller between attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, delay: Duration);
}

/// Real wall-clock sleeper.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// Attempt `k` (1-based) is due.
    Attempting(u32),
    /// Attempt `next` runs once `delay` has elapsed.
    Waiting { next: u32, delay: Duration },
    Succeeded,
    Exhausted,
}

/// Tracks attempts and the last failure for one retried operation.
#[derive(Debug, Clone)]
pub struct RetryMachine {
    state: RetryState,
    max_attempts: u32,
    last_error: Option<String>,
}

impl RetryMachine {
    pub fn new(max_attempts: u32) -> Self {
        let state = if max_attempts == 0 {
            RetryState::Exhausted
        } else {
            RetryState::Attempting(1)
        };
        Self {
            state,
            max_attempts,
            last_error: None,
        }
    }

    pub fn state(&self) -> RetryState {
        self.state
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The attempt number currently due, if any.
    pub fn current_attempt(&self) -> Option<u32> {
        match self.state {
            RetryState::Attempting(k) => Some(k),
            _ => None,
        }
    }

    pub fn record_success(&mut self) {
        if let RetryState::Attempting(_) = self.state {
            self.state = RetryState::Succeeded;
        }
    }

    /// Record a failed attempt. Moves to `Waiting` while attempts remain,
    /// otherwise to `Exhausted`.
    pub fn record_failure(&mut self, error: impl Into<String>) {
        let RetryState::Attempting(k) = self.state else {
            return;
        };
        self.last_error = Some(error.into());
        self.state = if k < self.max_attempts {
            RetryState::Waiting {
                next: k + 1,
                delay: backoff_delay(k),
            }
        } else {
            RetryState::Exhausted
        };
    }

    /// Leave `Waiting` once the delay has been slept.
    pub fn resume(&mut self) {
        if let RetryState::Waiting { next, .. } = self.state {
            self.state = RetryState::Attempting(next);
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records requested delays and returns immediately.
    #[derive(Default)]
    pub(crate) struct RecordingSleeper {
        pub delays: Mutex<Vec<Duration>>,
    }

    impl RecordingSleeper {
        pub fn delays_ms(&self) -> Vec<u64> {
            self.delays
                .lock()
                .unwrap()
                .iter()
                .map(|d| d.as_millis() as u64)
                .collect()
        }
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, delay: Duration) {
            self.delays.lock().unwrap().push(delay);
        }
    }
}
