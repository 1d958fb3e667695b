//! Motion state and state marker components.
//!
//! [`MotionState`] is the mutable per-character record shared by the
//! vertical model, the horizontal model and the jump arbiter. The marker
//! components are derived from the motor after every tick so that
//! presentation layers can query them without reading motor internals.

use bevy::prelude::*;

use crate::timers::Countdown;

/// Horizontal facing direction.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Facing {
    /// Facing +X.
    #[default]
    Right,
    /// Facing -X.
    Left,
}

impl Facing {
    /// `1.0` for right, `-1.0` for left.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Right => 1.0,
            Facing::Left => -1.0,
        }
    }

    /// The opposite direction.
    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            Facing::Right => Facing::Left,
            Facing::Left => Facing::Right,
        }
    }

    /// Facing for a signed value, `None` for zero.
    pub fn from_sign(value: f32) -> Option<Self> {
        if value > 0.0 {
            Some(Facing::Right)
        } else if value < 0.0 {
            Some(Facing::Left)
        } else {
            None
        }
    }
}

/// Per-character motion record.
///
/// Invariants kept by the motor after every tick:
/// - `jumps_used <= jumps_allowed`
/// - `vertical_velocity` within `[-max_fall_speed, 50]`
/// - never `jumping` and `falling` while grounded after a landing
#[derive(Reflect, Debug, Clone, Default, PartialEq)]
pub struct MotionState {
    /// Current facing.
    pub facing: Facing,
    /// Smoothed horizontal velocity.
    pub horizontal_velocity: f32,
    /// Vertical velocity owned by the vertical model.
    pub vertical_velocity: f32,

    /// Ground below the feet this tick.
    pub grounded: bool,
    /// Grounded on the previous tick.
    pub was_grounded: bool,
    /// Ceiling above the head this tick.
    pub bumped_head: bool,

    /// Jump units consumed since the last grounding event.
    pub jumps_used: u8,
    /// In a jump (ascending, at apex or descending from it).
    pub jumping: bool,
    /// Descending.
    pub falling: bool,

    /// Jump cut active.
    pub fast_falling: bool,
    /// Seconds since the jump cut began.
    pub fast_fall_time: f32,
    /// Upward speed at the moment the jump was cut.
    pub fast_fall_release_speed: f32,

    /// Past the apex threshold of the current ascent.
    pub past_apex_threshold: bool,
    /// Seconds spent past the apex threshold.
    pub time_past_apex_threshold: f32,

    /// Jump buffer window.
    pub jump_buffer: Countdown,
    /// Jump was released while the buffer was armed.
    pub jump_released_during_buffer: bool,
    /// Coyote window.
    pub coyote: Countdown,
}

impl MotionState {
    /// Whether the character is in the air.
    #[inline]
    pub fn airborne(&self) -> bool {
        !self.grounded
    }

    /// Whether a jump is currently rising.
    #[inline]
    pub fn ascending(&self) -> bool {
        self.jumping && self.vertical_velocity > 0.0
    }

    /// Start a jump cut from `release_speed`, tapering toward zero.
    pub fn begin_fast_fall(&mut self, release_speed: f32) {
        self.fast_falling = true;
        self.fast_fall_time = 0.0;
        self.fast_fall_release_speed = release_speed;
    }

    /// Cut upward motion immediately; amplified gravity applies from the
    /// next integration.
    pub fn cut_to_fast_fall(&mut self, cancel_time: f32) {
        self.past_apex_threshold = false;
        self.fast_falling = true;
        self.fast_fall_time = cancel_time;
        self.fast_fall_release_speed = 0.0;
        self.vertical_velocity = 0.0;
    }

    /// Clear all jump-phase flags and the jump count.
    pub fn clear_jump_phase(&mut self) {
        self.jumping = false;
        self.falling = false;
        self.fast_falling = false;
        self.fast_fall_time = 0.0;
        self.past_apex_threshold = false;
        self.time_past_apex_threshold = 0.0;
        self.jumps_used = 0;
    }

    /// Turn to face `facing`.
    #[inline]
    pub fn turn(&mut self, facing: Facing) {
        self.facing = facing;
    }
}

/// Marker component indicating the character is grounded.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Grounded;

/// Marker component indicating the character is airborne.
///
/// Mutually exclusive with [`Grounded`].
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Airborne;

/// Marker component indicating the character is sliding on a wall.
///
/// Contains the direction to the wall.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct WallSliding {
    /// Side the wall is on.
    pub side: Facing,
}

impl WallSliding {
    /// Check if the wall is on the left side.
    pub fn is_left(&self) -> bool {
        self.side == Facing::Left
    }

    /// Check if the wall is on the right side.
    pub fn is_right(&self) -> bool {
        self.side == Facing::Right
    }
}

/// Marker component indicating the character is riding a rail.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Grinding;

/// Marker component indicating the character is knocked back and stunned.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Stunned;

/// Marker for a character that failed activation. It is never simulated.
#[derive(Component, Reflect, Debug, Clone, Default, PartialEq)]
#[reflect(Component)]
pub struct MotorRejected {
    /// Why activation failed.
    pub reason: String,
}
