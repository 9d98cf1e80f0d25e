//! Rate limiting for login attempts.
//!
//! The throttle is process wide, not per client: at most one login attempt is
//! accepted per interval, whoever sends it. It is a coarse brute-force damper,
//! not a fairness mechanism.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, Instant},
};

/// Minimum spacing between accepted login attempts.
pub const LOGIN_INTERVAL: Duration = Duration::from_secs(1);

const NEVER: u64 = u64::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited,
}

pub trait RateLimiter: Send + Sync {
    /// Claim the slot for one login attempt.
    fn try_acquire(&self) -> RateLimitDecision;
}

/// Single-slot throttle shared by every caller.
///
/// The last accepted attempt is kept as microseconds since `origin` in one
/// atomic, and claimed with compare-and-swap so two racing requests cannot
/// both pass.
#[derive(Debug)]
pub struct GlobalRateLimiter {
    interval: Duration,
    origin: Instant,
    last_attempt: AtomicU64,
}

impl Default for GlobalRateLimiter {
    fn default() -> Self {
        Self::new(LOGIN_INTERVAL)
    }
}

impl GlobalRateLimiter {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            origin: Instant::now(),
            last_attempt: AtomicU64::new(NEVER),
        }
    }

    pub fn try_acquire_at(&self, now: Instant) -> RateLimitDecision {
        let now = micros(now.saturating_duration_since(self.origin));
        let interval = micros(self.interval);

        let mut last = self.last_attempt.load(Ordering::Acquire);
        loop {
            if last != NEVER && now.saturating_sub(last) < interval {
                return RateLimitDecision::Limited;
            }
            match self.last_attempt.compare_exchange_weak(
                last,
                now,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return RateLimitDecision::Allowed,
                Err(current) => last = current,
            }
        }
    }
}

impl RateLimiter for GlobalRateLimiter {
    fn try_acquire(&self) -> RateLimitDecision {
        self.try_acquire_at(Instant::now())
    }
}

#[derive(Clone, Debug)]
pub struct NoopRateLimiter;

impl RateLimiter for NoopRateLimiter {
    fn try_acquire(&self) -> RateLimitDecision {
        RateLimitDecision::Allowed
    }
}

fn micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(NEVER - 1)
}
