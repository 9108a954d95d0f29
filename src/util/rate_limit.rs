//! Rate limiting utilities

use dashmap::DashMap;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Rate limiter type alias
pub type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Create a rate limiter with the specified requests per second
pub fn create_limiter(requests_per_second: u32) -> Arc<Limiter> {
    let quota = Quota::per_second(NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

/// Per-participant command limiter, created lazily on first command
pub struct CommandRateLimiter {
    per_second: u32,
    limiters: DashMap<String, Arc<Limiter>>,
}

impl CommandRateLimiter {
    pub fn new(per_second: u32) -> Self {
        Self {
            per_second,
            limiters: DashMap::new(),
        }
    }

    /// Check if a command from `participant` is allowed (returns true if allowed)
    pub fn check(&self, participant: &str) -> bool {
        let limiter = self
            .limiters
            .entry(participant.to_string())
            .or_insert_with(|| create_limiter(self.per_second))
            .clone();
        limiter.check().is_ok()
    }

    /// Forget everyone, e.g. when the session is torn down
    pub fn clear(&self) {
        self.limiters.clear();
    }
}
