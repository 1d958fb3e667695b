//! Vertical motion model.
//!
//! Owns `MotionState::vertical_velocity` while no sub-state has taken the
//! body. The arc is built from the derived gravity of [`MovementConfig`]:
//!
//! - rising: plain gravity until the normalized ascent passes the apex
//!   threshold, then a short hang at zero velocity
//! - descending from a jump: gravity scaled by the release multiplier
//! - fast fall: a linear taper from the release speed to zero, then the
//!   scaled gravity
//! - walked off a ledge: plain gravity
//!
//! The result is always clamped to `[-max_fall_speed, MAX_RISE_SPEED]`.
//!
//! [`MAX_RISE_SPEED`]: crate::config::MAX_RISE_SPEED

use crate::config::MovementConfig;
use crate::state::MotionState;

/// Velocity written when the apex hang ends. Slightly negative so the next
/// integration sees a descent without a discontinuity.
pub const APEX_RELEASE_VELOCITY: f32 = -0.01;

/// Normalized position of `value` between `a` and `b`, clamped to `0..=1`.
#[inline]
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if a == b {
        0.0
    } else {
        ((value - a) / (b - a)).clamp(0.0, 1.0)
    }
}

/// Normalized ascent progress: 0 at take-off speed, 1 at rest.
#[inline]
pub fn apex_progress(config: &MovementConfig, vertical_velocity: f32) -> f32 {
    inverse_lerp(config.initial_jump_velocity(), 0.0, vertical_velocity)
}

/// Advance vertical velocity by one fixed step.
pub fn integrate(state: &mut MotionState, config: &MovementConfig, dt: f32) {
    let gravity = config.gravity();
    let release_gravity = gravity * config.gravity_on_release_multiplier;

    if state.jumping {
        // Ceiling hit cuts the ascent
        if state.bumped_head && state.vertical_velocity > 0.0 {
            state.cut_to_fast_fall(config.time_for_upwards_cancel);
        }

        if state.vertical_velocity >= 0.0 {
            if apex_progress(config, state.vertical_velocity) > config.apex_threshold {
                if !state.past_apex_threshold {
                    state.past_apex_threshold = true;
                    state.time_past_apex_threshold = 0.0;
                }
                state.time_past_apex_threshold += dt;
                state.vertical_velocity = if state.time_past_apex_threshold < config.apex_hang_time {
                    0.0
                } else {
                    APEX_RELEASE_VELOCITY
                };
            } else {
                state.vertical_velocity += gravity * dt;
                state.past_apex_threshold = false;
            }
        } else {
            state.falling = true;
            if !state.fast_falling {
                state.vertical_velocity += release_gravity * dt;
            }
        }
    }

    if state.fast_falling {
        let cancel = config.time_for_upwards_cancel;
        if state.fast_fall_time >= cancel {
            state.vertical_velocity += release_gravity * dt;
        } else {
            let t = state.fast_fall_time / cancel;
            state.vertical_velocity = state.fast_fall_release_speed * (1.0 - t);
        }
        state.fast_fall_time += dt;
    }

    if state.airborne() && !state.jumping {
        state.falling = true;
        state.vertical_velocity += gravity * dt;
    }

    state.vertical_velocity = config.clamp_vertical(state.vertical_velocity);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_RISE_SPEED;

    const DT: f32 = 1.0 / 60.0;

    fn jumping(config: &MovementConfig) -> MotionState {
        MotionState {
            jumping: true,
            jumps_used: 1,
            vertical_velocity: config.initial_jump_velocity(),
            ..Default::default()
        }
    }

    // ==================== Helper Tests ====================

    #[test]
    fn inverse_lerp_clamps() {
        assert_eq!(inverse_lerp(10.0, 0.0, 10.0), 0.0);
        assert_eq!(inverse_lerp(10.0, 0.0, 0.0), 1.0);
        assert_eq!(inverse_lerp(10.0, 0.0, 5.0), 0.5);
        assert_eq!(inverse_lerp(10.0, 0.0, 20.0), 0.0);
        assert_eq!(inverse_lerp(10.0, 0.0, -3.0), 1.0);
        assert_eq!(inverse_lerp(1.0, 1.0, 1.0), 0.0);
    }

    // ==================== Ascent Tests ====================

    #[test]
    fn ascent_applies_gravity() {
        let config = MovementConfig::default();
        let mut state = jumping(&config);
        let before = state.vertical_velocity;

        integrate(&mut state, &config, DT);

        let expected = before + config.gravity() * DT;
        assert!((state.vertical_velocity - expected).abs() < 1e-4);
        assert!(!state.past_apex_threshold);
        assert!(!state.falling);
    }

    #[test]
    fn apex_hang_holds_then_releases() {
        let config = MovementConfig::default();
        let mut state = jumping(&config);
        // Just under the top of the arc
        state.vertical_velocity = config.initial_jump_velocity() * 0.01;

        integrate(&mut state, &config, DT);
        assert!(state.past_apex_threshold);
        assert_eq!(state.vertical_velocity, 0.0);

        // Hang lasts apex_hang_time, counted from the first hang tick
        let hang_ticks = (config.apex_hang_time / DT).ceil() as usize;
        for _ in 1..hang_ticks {
            integrate(&mut state, &config, DT);
        }
        assert_eq!(state.vertical_velocity, APEX_RELEASE_VELOCITY);

        // Then the descent takes over with the release multiplier
        integrate(&mut state, &config, DT);
        assert!(state.falling);
        let expected = APEX_RELEASE_VELOCITY + config.gravity() * config.gravity_on_release_multiplier * DT;
        assert!((state.vertical_velocity - expected).abs() < 1e-4);
    }

    #[test]
    fn reaches_apex_after_time_to_apex() {
        // Fine step so the apex band is wider than one gravity step
        let dt = 1.0 / 120.0;
        let config = MovementConfig::default();
        let mut state = jumping(&config);
        let ticks = (config.time_to_apex / dt).round() as usize;
        for _ in 0..ticks {
            integrate(&mut state, &config, dt);
        }
        assert!(state.past_apex_threshold);
        assert!(state.vertical_velocity.abs() < 0.05);
    }

    // ==================== Fast Fall Tests ====================

    #[test]
    fn fast_fall_tapers_linearly_to_zero() {
        let config = MovementConfig::default();
        let mut state = jumping(&config);
        state.vertical_velocity = 10.0;
        state.begin_fast_fall(10.0);

        // First tick: still at the release speed
        integrate(&mut state, &config, DT);
        assert!((state.vertical_velocity - 10.0).abs() < 1e-4);
        assert!(state.fast_fall_time > 0.0);

        // Second tick: part way down the taper
        integrate(&mut state, &config, DT);
        let t = DT / config.time_for_upwards_cancel;
        assert!((state.vertical_velocity - 10.0 * (1.0 - t)).abs() < 1e-3);

        // Once the window is over, amplified gravity applies
        for _ in 0..5 {
            integrate(&mut state, &config, DT);
        }
        assert!(state.vertical_velocity < 0.0);
    }

    #[test]
    fn head_bump_cuts_ascent() {
        let config = MovementConfig::default();
        let mut state = jumping(&config);
        state.bumped_head = true;

        integrate(&mut state, &config, DT);

        assert!(state.fast_falling);
        assert!(state.vertical_velocity <= 0.0);
    }

    // ==================== Fall Tests ====================

    #[test]
    fn walking_off_ledge_falls_with_plain_gravity() {
        let config = MovementConfig::default();
        let mut state = MotionState::default();

        integrate(&mut state, &config, DT);

        assert!(state.falling);
        assert!((state.vertical_velocity - config.gravity() * DT).abs() < 1e-4);
    }

    #[test]
    fn grounded_idle_keeps_velocity() {
        let config = MovementConfig::default();
        let mut state = MotionState {
            grounded: true,
            vertical_velocity: config.world_gravity,
            ..Default::default()
        };

        integrate(&mut state, &config, DT);
        assert_eq!(state.vertical_velocity, config.world_gravity);
        assert!(!state.falling);
    }

    #[test]
    fn fall_speed_is_clamped() {
        let config = MovementConfig::default();
        let mut state = MotionState::default();
        for _ in 0..600 {
            integrate(&mut state, &config, DT);
        }
        assert_eq!(state.vertical_velocity, -config.max_fall_speed);

        let mut state = jumping(&config);
        state.vertical_velocity = 500.0;
        integrate(&mut state, &config, DT);
        assert!(state.vertical_velocity <= MAX_RISE_SPEED);
    }
}
