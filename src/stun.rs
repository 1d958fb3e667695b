//! Knockback and stun.
//!
//! A hazard hit throws the character and takes the body away from every
//! other subsystem until the stun countdown runs out. Hits while already
//! stunned are dropped.

use bevy::prelude::*;

use crate::config::MovementConfig;
use crate::events::{MovementEventKind, MovementEventSink};
use crate::motor::KinematicBody;
use crate::state::MotionState;
use crate::timers::Countdown;

/// Per-character stun state.
#[derive(Reflect, Debug, Clone, Default, PartialEq)]
pub struct StunState {
    /// Time left out of control.
    pub timer: Countdown,
}

impl StunState {
    /// Whether the character is stunned.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.timer.is_running()
    }

    /// Knockback velocity for a horizontal `direction` sign.
    pub fn knockback_velocity(config: &MovementConfig, direction: f32) -> Vec2 {
        let sign = if direction < 0.0 { -1.0 } else { 1.0 };
        Vec2::new(
            sign * config.knockback_force,
            config.knockback_upward_modifier * config.knockback_force,
        )
    }

    /// Apply a hit. Returns `false` without touching anything when already
    /// stunned.
    pub fn knock(
        &mut self,
        direction: f32,
        motion: &mut MotionState,
        body: &mut KinematicBody,
        config: &MovementConfig,
        sink: &mut dyn MovementEventSink,
    ) -> bool {
        if self.is_active() {
            return false;
        }

        motion.horizontal_velocity = 0.0;
        motion.vertical_velocity = 0.0;
        body.velocity = Self::knockback_velocity(config, direction);
        self.timer.arm(config.stun_duration);

        debug!(velocity = ?body.velocity, "knockback");
        sink.emit(MovementEventKind::KnockbackApplied);
        true
    }

    /// Advance the stun countdown. Returns `true` on the tick it expires.
    pub fn tick(&mut self, dt: f32) -> bool {
        let expired = self.timer.tick(dt);
        if expired {
            debug!("stun expired");
        }
        expired
    }
}
