//! Countdown timers.
//!
//! Every grace window in the motor (jump buffer, coyote time, wall stick,
//! wall-jump input freeze, stun) is a plain countdown decremented once per
//! fixed tick. There is no scheduling; a tick either sees the timer running
//! or it does not.

use bevy::prelude::*;

/// A countdown in seconds. Running while `remaining > 0`.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub struct Countdown {
    remaining: f32,
}

impl Countdown {
    /// Restart the countdown at `duration` seconds.
    #[inline]
    pub fn arm(&mut self, duration: f32) {
        self.remaining = duration.max(0.0);
    }

    /// Stop the countdown immediately.
    #[inline]
    pub fn clear(&mut self) {
        self.remaining = 0.0;
    }

    /// Advance by `dt` seconds.
    ///
    /// Returns `true` only on the tick the countdown reaches zero.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.remaining <= 0.0 {
            return false;
        }
        self.remaining = (self.remaining - dt).max(0.0);
        self.remaining == 0.0
    }

    /// Whether time is left on the countdown.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.remaining > 0.0
    }

    /// Seconds left.
    #[inline]
    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}
