//! Jump arbiter.
//!
//! Decides, once per fixed tick, whether a jump starts, continues or gets
//! cut. Checks run in a fixed priority order:
//!
//! 1. a press arms the jump buffer
//! 2. a release cuts a rising jump (jump cut / fast fall)
//! 3. buffered press on ground or inside the coyote window: first jump
//! 4. buffered press while in a jump with jumps left: air jump
//! 5. buffered press while falling without having jumped: air jump that
//!    costs two units, since the coyote window already granted the ground
//!    jump that was skipped
//!
//! Landing is resolved last so a jump initiated this tick is never undone.

use bevy::prelude::*;

use crate::config::MovementConfig;
use crate::events::MovementEventKind;
use crate::intent::MovementInput;
use crate::state::MotionState;

/// What the arbiter did on one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArbiterReport {
    /// Jump started this tick, as the notification to emit.
    pub initiated: Option<MovementEventKind>,
    /// Jump phase ended on the ground this tick.
    pub landed: bool,
}

/// Start a jump costing `cost` units. The count never exceeds
/// `jumps_allowed`.
pub fn initiate(state: &mut MotionState, config: &MovementConfig, cost: u8) {
    state.jumping = true;
    state.jump_buffer.clear();
    state.jumps_used = state.jumps_used.saturating_add(cost).min(config.jumps_allowed);
    state.vertical_velocity = config.initial_jump_velocity();
}

/// End the jump phase on the ground. Vertical velocity rests at the world
/// gravity constant so the body stays pressed into the floor.
pub fn land(state: &mut MotionState, config: &MovementConfig) {
    state.clear_jump_phase();
    state.vertical_velocity = config.world_gravity;
}

/// Whether the landing transition applies this tick.
#[inline]
pub fn should_land(state: &MotionState) -> bool {
    (state.jumping || state.falling) && state.grounded && state.vertical_velocity <= 0.0
}

/// Run the arbiter for one tick.
pub fn arbitrate(state: &mut MotionState, config: &MovementConfig, input: &MovementInput) -> ArbiterReport {
    let mut report = ArbiterReport::default();

    if input.jump_pressed {
        state.jump_buffer.arm(config.jump_buffer_time);
        state.jump_released_during_buffer = false;
    }

    if input.jump_released {
        if state.jump_buffer.is_running() {
            state.jump_released_during_buffer = true;
        }
        if state.ascending() {
            if state.past_apex_threshold {
                state.cut_to_fast_fall(config.time_for_upwards_cancel);
            } else {
                state.begin_fast_fall(state.vertical_velocity);
            }
        }
    }

    let buffered = state.jump_buffer.is_running();
    let can_ground_jump = state.grounded || state.coyote.is_running();

    if buffered && !state.jumping && can_ground_jump {
        initiate(state, config, 1);
        if state.jump_released_during_buffer {
            // Tapped jump: short hop
            state.begin_fast_fall(state.vertical_velocity);
        }
        trace!(jumps_used = state.jumps_used, "ground jump");
        report.initiated = Some(MovementEventKind::JumpInitiated);
    } else if buffered && state.jumping && state.jumps_used < config.jumps_allowed {
        state.fast_falling = false;
        initiate(state, config, 1);
        trace!(jumps_used = state.jumps_used, "air jump");
        report.initiated = Some(MovementEventKind::DoubleJumpInitiated);
    } else if buffered && state.falling && state.jumps_used < config.jumps_allowed.saturating_sub(1) {
        initiate(state, config, 2);
        state.fast_falling = false;
        trace!(jumps_used = state.jumps_used, "air jump after coyote window");
        report.initiated = Some(MovementEventKind::DoubleJumpInitiated);
    }

    if should_land(state) {
        land(state, config);
        report.landed = true;
    }

    report
}

/// Launch off a trampoline. Returns `false` when the character is rising,
/// in which case nothing changes.
pub fn bounce(state: &mut MotionState, config: &MovementConfig, body_vertical_velocity: f32) -> bool {
    if body_vertical_velocity > 0.0 {
        return false;
    }
    state.clear_jump_phase();
    state.jumping = true;
    state.jump_buffer.clear();
    state.vertical_velocity = config.trampoline_bounce_force;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grounded() -> MotionState {
        MotionState {
            grounded: true,
            ..Default::default()
        }
    }

    fn pressed() -> MovementInput {
        let mut input = MovementInput::new();
        input.press_jump();
        input
    }

    fn released() -> MovementInput {
        let mut input = MovementInput::new();
        input.jump_held = true;
        input.release_jump();
        input
    }

    // ==================== Initiation Tests ====================

    #[test]
    fn press_on_ground_jumps() {
        let config = MovementConfig::default();
        let mut state = grounded();

        let report = arbitrate(&mut state, &config, &pressed());

        assert_eq!(report.initiated, Some(MovementEventKind::JumpInitiated));
        assert!(!report.landed);
        assert!(state.jumping);
        assert_eq!(state.jumps_used, 1);
        assert_eq!(state.vertical_velocity, config.initial_jump_velocity());
        assert!(!state.jump_buffer.is_running());
    }

    #[test]
    fn double_jump_then_cap() {
        let config = MovementConfig::default().with_jumps_allowed(2);
        let mut state = grounded();
        arbitrate(&mut state, &config, &pressed());
        state.grounded = false;
        state.vertical_velocity = 5.0;

        let report = arbitrate(&mut state, &config, &pressed());
        assert_eq!(report.initiated, Some(MovementEventKind::DoubleJumpInitiated));
        assert_eq!(state.jumps_used, 2);

        state.vertical_velocity = 3.0;
        let report = arbitrate(&mut state, &config, &pressed());
        assert_eq!(report.initiated, None);
        assert_eq!(state.jumps_used, 2);
        assert_eq!(state.vertical_velocity, 3.0);
    }

    #[test]
    fn air_jump_clears_fast_fall() {
        let config = MovementConfig::default();
        let mut state = MotionState {
            jumping: true,
            jumps_used: 1,
            fast_falling: true,
            vertical_velocity: 2.0,
            ..Default::default()
        };
        arbitrate(&mut state, &config, &pressed());
        assert!(!state.fast_falling);
        assert_eq!(state.jumps_used, 2);
    }

    #[test]
    fn coyote_window_allows_ground_jump() {
        let config = MovementConfig::default();
        let mut state = MotionState::default();
        state.coyote.arm(config.coyote_time);

        let report = arbitrate(&mut state, &config, &pressed());
        assert_eq!(report.initiated, Some(MovementEventKind::JumpInitiated));
        assert_eq!(state.jumps_used, 1);
    }

    #[test]
    fn falling_air_jump_costs_two() {
        let config = MovementConfig::default().with_jumps_allowed(3);
        let mut state = MotionState {
            falling: true,
            vertical_velocity: -4.0,
            ..Default::default()
        };

        let report = arbitrate(&mut state, &config, &pressed());
        assert_eq!(report.initiated, Some(MovementEventKind::DoubleJumpInitiated));
        assert_eq!(state.jumps_used, 2);
    }

    #[test]
    fn falling_with_single_jump_cannot_jump() {
        let config = MovementConfig::default().with_jumps_allowed(1);
        let mut state = MotionState {
            falling: true,
            vertical_velocity: -4.0,
            ..Default::default()
        };

        let report = arbitrate(&mut state, &config, &pressed());
        assert_eq!(report.initiated, None);
        // Press stays buffered for a landing
        assert!(state.jump_buffer.is_running());
    }

    // ==================== Release Tests ====================

    #[test]
    fn release_while_rising_starts_fast_fall() {
        let config = MovementConfig::default();
        let mut state = MotionState {
            jumping: true,
            jumps_used: 1,
            vertical_velocity: 12.0,
            ..Default::default()
        };

        arbitrate(&mut state, &config, &released());
        assert!(state.fast_falling);
        assert_eq!(state.fast_fall_release_speed, 12.0);
        assert_eq!(state.fast_fall_time, 0.0);
    }

    #[test]
    fn release_past_apex_cuts_immediately() {
        let config = MovementConfig::default();
        let mut state = MotionState {
            jumping: true,
            past_apex_threshold: true,
            vertical_velocity: 0.5,
            ..Default::default()
        };

        arbitrate(&mut state, &config, &released());
        assert!(state.fast_falling);
        assert!(!state.past_apex_threshold);
        assert_eq!(state.vertical_velocity, 0.0);
        assert_eq!(state.fast_fall_time, config.time_for_upwards_cancel);
    }

    #[test]
    fn release_while_falling_is_ignored() {
        let config = MovementConfig::default();
        let mut state = MotionState {
            jumping: true,
            falling: true,
            vertical_velocity: -3.0,
            ..Default::default()
        };
        arbitrate(&mut state, &config, &released());
        assert!(!state.fast_falling);
    }

    #[test]
    fn tap_jump_short_hops() {
        let config = MovementConfig::default();
        let mut state = grounded();
        let mut input = MovementInput::new();
        input.press_jump();
        input.release_jump();

        let report = arbitrate(&mut state, &config, &input);
        assert_eq!(report.initiated, Some(MovementEventKind::JumpInitiated));
        assert!(state.fast_falling);
        assert_eq!(state.fast_fall_release_speed, config.initial_jump_velocity());
    }

    // ==================== Landing Tests ====================

    #[test]
    fn landing_resets_jump_phase() {
        let config = MovementConfig::default();
        let mut state = MotionState {
            grounded: true,
            jumping: true,
            falling: true,
            fast_falling: true,
            jumps_used: 2,
            vertical_velocity: -8.0,
            ..Default::default()
        };

        let report = arbitrate(&mut state, &config, &MovementInput::new());
        assert!(report.landed);
        assert_eq!(state.jumps_used, 0);
        assert!(!state.jumping && !state.falling && !state.fast_falling);
        assert_eq!(state.vertical_velocity, config.world_gravity);
    }

    #[test]
    fn rising_through_ground_probe_does_not_land() {
        let config = MovementConfig::default();
        let mut state = MotionState {
            grounded: true,
            jumping: true,
            jumps_used: 1,
            vertical_velocity: 10.0,
            ..Default::default()
        };
        let report = arbitrate(&mut state, &config, &MovementInput::new());
        assert!(!report.landed);
        assert!(state.jumping);
    }

    // ==================== Trampoline Tests ====================

    #[test]
    fn bounce_resets_jumps() {
        let config = MovementConfig::default();
        let mut state = MotionState {
            falling: true,
            fast_falling: true,
            jumps_used: 2,
            vertical_velocity: -10.0,
            ..Default::default()
        };

        assert!(bounce(&mut state, &config, -10.0));
        assert!(state.jumping);
        assert!(!state.falling && !state.fast_falling);
        assert_eq!(state.jumps_used, 0);
        assert_eq!(state.vertical_velocity, config.trampoline_bounce_force);
    }

    #[test]
    fn bounce_ignored_while_rising() {
        let config = MovementConfig::default();
        let mut state = MotionState::default();
        assert!(!bounce(&mut state, &config, 1.0));
        assert!(!state.jumping);
    }
}
