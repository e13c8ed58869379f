#![forbid(unsafe_code)]

//! One-shot deadline timer owned by a gesture session.
//!
//! A [`OneShotTimer`] is a plain value: it exists only while the session is
//! in its pressing phase, and dropping or [`cancel`](OneShotTimer::cancel)ing
//! it is the whole cancellation story. Nothing is registered anywhere that
//! could fire after the owner is gone; hosts learn the deadline from the
//! `TimerArmed` effect and call back with `poll_timer` once it has passed.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Identifier of an armed timer, unique per controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(pub u64);

/// A single deferred deadline.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "dropping a OneShotTimer cancels it"]
pub struct OneShotTimer {
    id: TimerId,
    armed_at_ms: u64,
    deadline_ms: u64,
}

impl OneShotTimer {
    /// Arm a timer that becomes due `delay` after `now_ms`.
    pub fn arm(id: TimerId, now_ms: u64, delay: Duration) -> Self {
        let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        Self {
            id,
            armed_at_ms: now_ms,
            deadline_ms: now_ms.saturating_add(delay_ms),
        }
    }

    #[inline]
    #[must_use]
    pub const fn id(&self) -> TimerId {
        self.id
    }

    #[inline]
    #[must_use]
    pub const fn armed_at_ms(&self) -> u64 {
        self.armed_at_ms
    }

    #[inline]
    #[must_use]
    pub const fn deadline_ms(&self) -> u64 {
        self.deadline_ms
    }

    /// Whether the deadline has been reached at `now_ms`.
    #[inline]
    #[must_use]
    pub const fn is_due(&self, now_ms: u64) -> bool {
        now_ms >= self.deadline_ms
    }

    /// Time left until the deadline (zero once due).
    #[must_use]
    pub const fn remaining(&self, now_ms: u64) -> Duration {
        Duration::from_millis(self.deadline_ms.saturating_sub(now_ms))
    }

    /// Consume the timer because its deadline passed.
    pub fn fire(self) -> TimerId {
        self.id
    }

    /// Consume the timer without firing.
    pub fn cancel(self) -> TimerId {
        self.id
    }
}
