//! Rate limiting utilities

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::ws::protocol::ClientMsg;

/// Rate limiter type alias
pub type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Create a rate limiter with the specified requests per second
pub fn create_limiter(requests_per_second: u32) -> Arc<Limiter> {
    let quota = Quota::per_second(NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

/// Per-connection limiter for the streamed `move` / `aim` inputs
#[derive(Clone)]
pub struct ConnectionRateLimiter {
    input_limiter: Arc<Limiter>,
}

impl ConnectionRateLimiter {
    pub fn new(messages_per_second: u32) -> Self {
        Self {
            input_limiter: create_limiter(messages_per_second),
        }
    }

    /// Check if an input message is allowed (returns true if allowed)
    pub fn check_input(&self) -> bool {
        self.input_limiter.check().is_ok()
    }

    /// Whether `msg` may reach the room. Discrete events never count
    /// against the quota and are always admitted.
    pub fn admit(&self, msg: &ClientMsg) -> bool {
        !msg.is_continuous() || self.check_input()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_is_capped_at_quota() {
        let limiter = ConnectionRateLimiter::new(5);
        let allowed = (0..20).filter(|_| limiter.check_input()).count();
        assert_eq!(allowed, 5);
    }

    #[test]
    fn zero_quota_still_admits_one() {
        let limiter = ConnectionRateLimiter::new(0);
        assert!(limiter.check_input());
        assert!(!limiter.check_input());
    }

    #[test]
    fn game_events_bypass_an_exhausted_quota() {
        let limiter = ConnectionRateLimiter::new(2);
        let aim = ClientMsg::Aim { angle: 1.0 };
        let admitted = (0..10).filter(|_| limiter.admit(&aim)).count();
        assert_eq!(admitted, 2);

        assert!(limiter.admit(&ClientMsg::Hit));
        assert!(limiter.admit(&ClientMsg::Ready));
        assert!(limiter.admit(&ClientMsg::Shoot {
            bullet_x: 0.0,
            bullet_y: 0.0,
            angle: 0.0,
            recoil_vel_x: 0.0,
            recoil_vel_y: 0.0,
        }));
        assert!(!limiter.admit(&aim));
    }
}
