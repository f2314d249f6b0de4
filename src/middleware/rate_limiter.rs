// Sliding-window rate limiting, one limiter per chat session

use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::debug;

/// Timestamps remembered per limiter
pub const RATE_LIMIT_HISTORY: usize = 10;

pub const DEFAULT_MAX_REQUESTS: usize = 5;
pub const DEFAULT_WINDOW_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("⏱️ Too many requests. Wait {wait_secs}s.")]
pub struct RateLimitExceeded {
    pub wait_secs: u64,
}

/// Counts requests inside a trailing window. Every check is recorded, even
/// rejected ones, and only the newest `RATE_LIMIT_HISTORY` are kept.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    timestamps: VecDeque<Instant>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window_secs: u64) -> Self {
        Self {
            timestamps: VecDeque::with_capacity(RATE_LIMIT_HISTORY),
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    pub fn check(&mut self) -> Result<(), RateLimitExceeded> {
        self.check_at(Instant::now())
    }

    pub fn check_at(&mut self, now: Instant) -> Result<(), RateLimitExceeded> {
        if self.timestamps.len() == RATE_LIMIT_HISTORY {
            self.timestamps.pop_front();
        }
        self.timestamps.push_back(now);

        let window = self.window;
        let mut recent = self
            .timestamps
            .iter()
            .filter(|t| now.saturating_duration_since(**t) < window);

        let Some(oldest) = recent.next() else {
            return Ok(());
        };
        let count = 1 + recent.count();

        if count <= self.max_requests {
            return Ok(());
        }

        let remaining = window.saturating_sub(now.saturating_duration_since(*oldest));
        let wait_secs = remaining.as_secs_f64().ceil().max(1.0) as u64;
        debug!(count, wait_secs, "Rate limit exceeded");
        Err(RateLimitExceeded { wait_secs })
    }

    pub fn recorded(&self) -> usize {
        self.timestamps.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW_SECS)
    }
}
