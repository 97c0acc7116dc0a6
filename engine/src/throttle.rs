//! Leading + trailing edge rate gate.
//!
//! The first call in a quiet period fires immediately. Calls landing inside
//! the interval collapse into one pending trailing fire, released by
//! [`Throttle::poll`] once the interval has elapsed. Time is always passed
//! in, so the gate is deterministic under test.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    /// Run the action now.
    Fire,
    /// Action deferred to the trailing edge.
    Deferred,
}

#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last_fire: Option<Instant>,
    pending: bool,
}

impl Throttle {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fire: None,
            pending: false,
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn call(&mut self, now: Instant) -> ThrottleDecision {
        if self.window_open(now) {
            self.pending = true;
            ThrottleDecision::Deferred
        } else {
            self.last_fire = Some(now);
            self.pending = false;
            ThrottleDecision::Fire
        }
    }

    /// Release the trailing call if it is due. Returns `true` when the
    /// caller should run the action.
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.pending || self.window_open(now) {
            return false;
        }
        self.pending = false;
        self.last_fire = Some(now);
        true
    }

    /// When the pending trailing call becomes due.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        if !self.pending {
            return None;
        }
        self.last_fire.map(|at| at + self.interval)
    }

    /// Drop a pending trailing call. The current window stays in force.
    pub fn cancel(&mut self) {
        self.pending = false;
    }

    fn window_open(&self, now: Instant) -> bool {
        self.last_fire
            .is_some_and(|at| now.saturating_duration_since(at) < self.interval)
    }
}
