//! Horizontal motion model.
//!
//! First-order smoothing toward a target speed, re-evaluated every fixed
//! tick. Acceleration and deceleration rates are separate so starting and
//! stopping feel different, and each has a ground and an air variant.

use crate::config::MovementConfig;
use crate::intent::MovementInput;
use crate::state::{Facing, MotionState};

/// Move `current` toward `target` by the fraction `rate * dt` of the
/// remaining gap. The fraction is clamped to `0..=1` so large steps never
/// overshoot.
#[inline]
pub fn approach(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    let t = (rate * dt).clamp(0.0, 1.0);
    current + (target - current) * t
}

/// Target horizontal speed for `input`, signed by the input direction.
pub fn target_velocity(config: &MovementConfig, input: &MovementInput) -> f32 {
    input.horizontal() * config.target_speed(input.run_held)
}

/// Advance horizontal velocity by one fixed step and turn to follow input.
pub fn steer(state: &mut MotionState, config: &MovementConfig, input: &MovementInput, dt: f32) {
    let (acceleration, deceleration) = config.acceleration_pair(state.grounded);

    if input.has_movement() {
        if let Some(facing) = Facing::from_sign(input.horizontal()) {
            if facing != state.facing {
                state.turn(facing);
            }
        }
        let target = target_velocity(config, input);
        state.horizontal_velocity = approach(state.horizontal_velocity, target, acceleration, dt);
    } else {
        state.horizontal_velocity = approach(state.horizontal_velocity, 0.0, deceleration, dt);
    }
}
