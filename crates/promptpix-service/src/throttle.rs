//! Per-account throttling of profile updates.

use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};

use promptpix_core::UserId;

/// Decides whether an account may update its profile now.
pub trait UpdateThrottle: Send + Sync {
    /// `Ok(())` to allow the update, or `Err(wait)` with the time until the
    /// next update is allowed.
    fn check(&self, user_id: &UserId) -> Result<(), Duration>;
}

/// Allows one update per account per cooldown period.
pub struct GovernorThrottle {
    limiter: Option<DefaultKeyedRateLimiter<UserId>>,
    clock: DefaultClock,
}

impl GovernorThrottle {
    /// A throttle with the given cooldown. A zero cooldown never throttles.
    #[must_use]
    pub fn new(cooldown: Duration) -> Self {
        Self {
            limiter: Quota::with_period(cooldown).map(RateLimiter::keyed),
            clock: DefaultClock::default(),
        }
    }
}

impl UpdateThrottle for GovernorThrottle {
    fn check(&self, user_id: &UserId) -> Result<(), Duration> {
        let Some(limiter) = &self.limiter else {
            return Ok(());
        };

        limiter
            .check_key(user_id)
            .map_err(|not_until| not_until.wait_time_from(self.clock.now()))
    }
}
