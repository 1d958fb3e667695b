//! Movement input component.
//!
//! [`MovementInput`] is the per-character input snapshot the motor reads.
//! The sampling layer (keyboard, gamepad, AI, replay) writes it during
//! `Update`; the motor consumes it once per fixed tick.
//!
//! Levels (`movement`, `run_held`, `jump_held`) are plain state. Edges
//! (`jump_pressed`, `jump_released`, `interact_pressed`) are latched until
//! the end of the next fixed tick, so an edge sampled on a frame with no
//! fixed step is not lost and an edge is never seen twice.

use bevy::prelude::*;

/// Below this magnitude a directional axis is treated as released.
pub const AXIS_DEADZONE: f32 = 0.001;

/// Input snapshot for one character.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use platformer_motor::prelude::*;
///
/// let mut input = MovementInput::new();
/// input.set_movement(Vec2::new(1.0, 0.0));
/// input.set_jump_held(true);
/// assert!(input.jump_pressed);
///
/// // The motor clears edges after each fixed tick
/// input.clear_edges();
/// assert!(!input.jump_pressed);
/// assert!(input.jump_held);
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct MovementInput {
    /// Directional input, each axis in `-1.0..=1.0`. Only `x` drives
    /// horizontal motion.
    pub movement: Vec2,
    /// Run modifier held.
    pub run_held: bool,
    /// Jump button held.
    pub jump_held: bool,
    /// Jump button went down since the last fixed tick.
    pub jump_pressed: bool,
    /// Jump button went up since the last fixed tick.
    pub jump_released: bool,
    /// Interact button went down since the last fixed tick.
    pub interact_pressed: bool,
    /// Character stands in an interaction zone. Suppresses all jump
    /// processing, including buffering.
    pub in_interaction_zone: bool,
}

impl MovementInput {
    /// Create an empty input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directional input. Each axis is clamped to `-1.0..=1.0`.
    pub fn set_movement(&mut self, movement: Vec2) {
        self.movement = movement.clamp(Vec2::NEG_ONE, Vec2::ONE);
    }

    /// Set only the horizontal axis.
    pub fn set_horizontal(&mut self, direction: f32) {
        self.movement.x = direction.clamp(-1.0, 1.0);
    }

    /// Set the run modifier.
    pub fn set_run_held(&mut self, held: bool) {
        self.run_held = held;
    }

    /// Set the jump button level. Call every frame with the current state;
    /// press and release edges are latched on transitions.
    pub fn set_jump_held(&mut self, held: bool) {
        if held && !self.jump_held {
            self.jump_pressed = true;
        } else if !held && self.jump_held {
            self.jump_released = true;
        }
        self.jump_held = held;
    }

    /// Latch a jump press without going through the held level.
    pub fn press_jump(&mut self) {
        self.jump_pressed = true;
        self.jump_held = true;
    }

    /// Latch a jump release without going through the held level.
    pub fn release_jump(&mut self) {
        self.jump_released = true;
        self.jump_held = false;
    }

    /// Latch an interact press.
    pub fn press_interact(&mut self) {
        self.interact_pressed = true;
    }

    /// Mark whether the character is inside an interaction zone.
    pub fn set_in_interaction_zone(&mut self, inside: bool) {
        self.in_interaction_zone = inside;
    }

    /// Clear latched edges. Levels are kept.
    pub fn clear_edges(&mut self) {
        self.jump_pressed = false;
        self.jump_released = false;
        self.interact_pressed = false;
    }

    /// Whether any directional input is active.
    pub fn has_movement(&self) -> bool {
        self.movement.abs().max_element() > AXIS_DEADZONE
    }

    /// Horizontal axis with the deadzone applied.
    pub fn horizontal(&self) -> f32 {
        if self.movement.x.abs() > AXIS_DEADZONE {
            self.movement.x
        } else {
            0.0
        }
    }

    /// Whether the horizontal input points toward `sign` (`1.0` or `-1.0`).
    pub fn pushes_toward(&self, sign: f32) -> bool {
        self.horizontal() * sign > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Level Tests ====================

    #[test]
    fn movement_input_new() {
        let input = MovementInput::new();
        assert_eq!(input.movement, Vec2::ZERO);
        assert!(!input.run_held);
        assert!(!input.jump_held);
        assert!(!input.jump_pressed);
        assert!(!input.has_movement());
    }

    #[test]
    fn set_movement_clamps() {
        let mut input = MovementInput::new();
        input.set_movement(Vec2::new(5.0, -3.0));
        assert_eq!(input.movement, Vec2::new(1.0, -1.0));

        input.set_horizontal(-0.5);
        assert_eq!(input.movement.x, -0.5);
    }

    #[test]
    fn deadzone_applies() {
        let mut input = MovementInput::new();
        input.set_horizontal(0.0001);
        assert!(!input.has_movement());
        assert_eq!(input.horizontal(), 0.0);

        input.set_horizontal(0.5);
        assert!(input.has_movement());
        assert!(input.pushes_toward(1.0));
        assert!(!input.pushes_toward(-1.0));
    }

    #[test]
    fn vertical_only_input_counts_as_movement() {
        let mut input = MovementInput::new();
        input.set_movement(Vec2::new(0.0, 1.0));
        assert!(input.has_movement());
        assert_eq!(input.horizontal(), 0.0);
    }

    // ==================== Edge Tests ====================

    #[test]
    fn held_transitions_latch_edges() {
        let mut input = MovementInput::new();

        input.set_jump_held(true);
        assert!(input.jump_pressed);
        assert!(!input.jump_released);

        // Holding does not re-latch
        input.clear_edges();
        input.set_jump_held(true);
        assert!(!input.jump_pressed);

        input.set_jump_held(false);
        assert!(input.jump_released);
        assert!(!input.jump_held);
    }

    #[test]
    fn press_and_release_in_one_frame_keep_both_edges() {
        let mut input = MovementInput::new();
        input.set_jump_held(true);
        input.set_jump_held(false);
        assert!(input.jump_pressed);
        assert!(input.jump_released);
    }

    #[test]
    fn clear_edges_keeps_levels() {
        let mut input = MovementInput::new();
        input.set_movement(Vec2::X);
        input.set_run_held(true);
        input.press_jump();
        input.press_interact();

        input.clear_edges();
        assert!(!input.jump_pressed);
        assert!(!input.interact_pressed);
        assert!(input.jump_held);
        assert!(input.run_held);
        assert_eq!(input.movement, Vec2::X);
    }

    #[test]
    fn release_jump_latches() {
        let mut input = MovementInput::new();
        input.press_jump();
        input.release_jump();
        assert!(input.jump_pressed && input.jump_released);
        assert!(!input.jump_held);
    }
}
