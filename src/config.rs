//! Movement configuration.
//!
//! [`MovementConfig`] holds every tunable the motor reads. It is supplied
//! from outside (code presets, builders or TOML) and never mutated while a
//! character is simulated. The jump kinematics derived from the raw jump
//! fields are recomputed whenever those fields change through this API and
//! once more at validation time.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How a character catches and keeps a wall slide.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WallSlidePolicy {
    /// The directional input must push toward the wall to start and to keep
    /// sliding. Releasing the input lets go of the wall.
    #[default]
    RequirePush,
    /// Contact alone starts and keeps a slide.
    ContactOnly,
}

/// Collision layer filters, as bitmasks over the backend's collision groups.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerMasks {
    /// Surfaces that count as ground and ceilings.
    pub ground: u32,
    /// Surfaces that can be wall-slid on.
    pub wall: u32,
}

impl Default for LayerMasks {
    fn default() -> Self {
        Self {
            ground: 0b0001,
            wall: 0b0010,
        }
    }
}

/// Kinematics derived from the raw jump fields.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub struct JumpKinematics {
    /// Jump height after the compensation factor.
    pub adjusted_jump_height: f32,
    /// Gravity acceleration (negative).
    pub gravity: f32,
    /// Upward speed that reaches `adjusted_jump_height` in `time_to_apex`.
    pub initial_jump_velocity: f32,
}

impl JumpKinematics {
    /// Compute from jump height, compensation factor and time to apex.
    ///
    /// `gravity = -2·(height·compensation) / time_to_apex²`,
    /// `initial_jump_velocity = |gravity|·time_to_apex`.
    pub fn compute(jump_height: f32, compensation: f32, time_to_apex: f32) -> Self {
        let adjusted_jump_height = jump_height * compensation;
        let gravity = -(2.0 * adjusted_jump_height) / time_to_apex.powi(2);
        Self {
            adjusted_jump_height,
            gravity,
            initial_jump_velocity: gravity.abs() * time_to_apex,
        }
    }
}

/// Upper bound of the vertical velocity clamp (units/second).
pub const MAX_RISE_SPEED: f32 = 50.0;

/// Configuration parameters for the platformer motor.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct MovementConfig {
    // === Walk / Run ===
    /// Target speed while walking (units/second).
    pub max_walk_speed: f32,
    /// Target speed while the run modifier is held (units/second).
    pub max_run_speed: f32,
    /// Rate used to approach target speed on the ground (1/second).
    pub ground_acceleration: f32,
    /// Rate used to approach zero on the ground without input (1/second).
    pub ground_deceleration: f32,
    /// Rate used to approach target speed in the air (1/second).
    pub air_acceleration: f32,
    /// Rate used to approach zero in the air without input (1/second).
    pub air_deceleration: f32,

    // === Jump ===
    /// Peak height of a jump before compensation.
    pub jump_height: f32,
    /// Scales `jump_height` to offset apex-hang and discrete-step losses.
    pub jump_height_compensation_factor: f32,
    /// Seconds from take-off to the peak.
    pub time_to_apex: f32,
    /// Gravity multiplier while descending.
    pub gravity_on_release_multiplier: f32,
    /// Terminal fall speed (positive).
    pub max_fall_speed: f32,
    /// Number of jumps before touching ground again (1 = no air jumps).
    pub jumps_allowed: u8,

    // === Jump cut ===
    /// Window over which an early release tapers upward speed to zero.
    pub time_for_upwards_cancel: f32,

    // === Apex ===
    /// Normalized ascent progress (0..1) past which the apex hang starts.
    pub apex_threshold: f32,
    /// Seconds the vertical velocity is held at zero at the peak.
    pub apex_hang_time: f32,

    // === Grace windows ===
    /// Seconds an early jump press is remembered before landing.
    pub jump_buffer_time: f32,
    /// Seconds after leaving ground during which a ground jump is allowed.
    pub coyote_time: f32,

    // === Wall ===
    /// Entry/continuation rule for wall slides.
    pub wall_slide_policy: WallSlidePolicy,
    /// Seconds a caught wall holds the character still before sliding.
    pub wall_stick_time: f32,
    /// Maximum descent speed while sliding (positive).
    pub wall_slide_speed: f32,
    /// Wall-jump velocity: `x` away from the wall, `y` upward.
    pub wall_jump_force: Vec2,
    /// Seconds after a wall jump during which wall detection is suspended.
    pub wall_jump_input_freeze_time: f32,

    // === Grind ===
    /// Horizontal speed along a rail.
    pub grind_speed: f32,
    /// Upward speed when jumping off a rail.
    pub grind_jump_force: f32,

    // === Knockback / stun ===
    /// Knockback speed magnitude.
    pub knockback_force: f32,
    /// Vertical knockback as a fraction of `knockback_force`.
    pub knockback_upward_modifier: f32,
    /// Seconds the character is out of control after a hit.
    pub stun_duration: f32,

    // === Trampoline ===
    /// Upward speed given by a trampoline bounce.
    pub trampoline_bounce_force: f32,

    // === Resting ===
    /// Vertical velocity written on landing, keeping the body pressed into
    /// the ground.
    pub world_gravity: f32,

    // === Sensors ===
    /// Depth of the downward ground cast below the feet.
    pub ground_detection_ray_length: f32,
    /// Depth of the upward head cast above the body.
    pub head_detection_ray_length: f32,
    /// Width of the head cast as a fraction of the feet width.
    pub head_width: f32,
    /// Size of the box swept toward walls.
    pub wall_check_size: Vec2,
    /// Distance the wall box is swept.
    pub wall_check_distance: f32,
    /// Layer filters for all casts.
    pub layers: LayerMasks,

    #[serde(skip)]
    #[reflect(ignore)]
    derived: JumpKinematics,
}

impl Default for MovementConfig {
    fn default() -> Self {
        let mut config = Self {
            // Walk / run
            max_walk_speed: 12.5,
            max_run_speed: 20.0,
            ground_acceleration: 5.0,
            ground_deceleration: 20.0,
            air_acceleration: 5.0,
            air_deceleration: 5.0,

            // Jump
            jump_height: 6.5,
            jump_height_compensation_factor: 1.054,
            time_to_apex: 0.35,
            gravity_on_release_multiplier: 2.0,
            max_fall_speed: 26.0,
            jumps_allowed: 2,

            // Jump cut
            time_for_upwards_cancel: 0.027,

            // Apex
            apex_threshold: 0.97,
            apex_hang_time: 0.075,

            // Grace windows
            jump_buffer_time: 0.125,
            coyote_time: 0.1,

            // Wall
            wall_slide_policy: WallSlidePolicy::RequirePush,
            wall_stick_time: 0.15,
            wall_slide_speed: 2.0,
            wall_jump_force: Vec2::new(25.0, 20.0),
            wall_jump_input_freeze_time: 0.1,

            // Grind
            grind_speed: 30.0,
            grind_jump_force: 20.0,

            // Knockback
            knockback_force: 15.0,
            knockback_upward_modifier: 0.5,
            stun_duration: 0.5,

            // Trampoline
            trampoline_bounce_force: 30.0,

            // Resting
            world_gravity: -9.81,

            // Sensors
            ground_detection_ray_length: 0.02,
            head_detection_ray_length: 0.02,
            head_width: 0.75,
            wall_check_size: Vec2::new(0.5, 1.0),
            wall_check_distance: 0.1,
            layers: LayerMasks::default(),

            derived: JumpKinematics::default(),
        };
        config.recompute_derived();
        config
    }
}

impl MovementConfig {
    /// Create a config optimized for responsive player control.
    pub fn player() -> Self {
        Self::default()
    }

    /// Create a config with a long, slow arc and a single air jump.
    pub fn floaty() -> Self {
        Self {
            time_to_apex: 0.5,
            apex_hang_time: 0.15,
            gravity_on_release_multiplier: 1.5,
            max_fall_speed: 18.0,
            ..default()
        }
        .recomputed()
    }

    /// Parse a config from TOML. Missing keys keep their default values.
    /// The result is validated.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validated()
    }

    /// Gravity acceleration derived from the jump fields (negative).
    #[inline]
    pub fn gravity(&self) -> f32 {
        self.derived.gravity
    }

    /// Vertical speed given at take-off.
    #[inline]
    pub fn initial_jump_velocity(&self) -> f32 {
        self.derived.initial_jump_velocity
    }

    /// Jump height after the compensation factor.
    #[inline]
    pub fn adjusted_jump_height(&self) -> f32 {
        self.derived.adjusted_jump_height
    }

    /// Target horizontal speed for the given run modifier.
    #[inline]
    pub fn target_speed(&self, running: bool) -> f32 {
        if running {
            self.max_run_speed
        } else {
            self.max_walk_speed
        }
    }

    /// Acceleration and deceleration rates for the given ground state.
    #[inline]
    pub fn acceleration_pair(&self, grounded: bool) -> (f32, f32) {
        if grounded {
            (self.ground_acceleration, self.ground_deceleration)
        } else {
            (self.air_acceleration, self.air_deceleration)
        }
    }

    /// Clamp a vertical velocity to `[-max_fall_speed, MAX_RISE_SPEED]`.
    #[inline]
    pub fn clamp_vertical(&self, velocity: f32) -> f32 {
        velocity.clamp(-self.max_fall_speed, MAX_RISE_SPEED)
    }

    /// Recompute the derived jump kinematics from the raw fields.
    pub fn recompute_derived(&mut self) {
        self.derived = JumpKinematics::compute(
            self.jump_height,
            self.jump_height_compensation_factor,
            self.time_to_apex,
        );
    }

    fn recomputed(mut self) -> Self {
        self.recompute_derived();
        self
    }

    /// Recompute derived values and validate, consuming the config.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let config = self.recomputed();
        config.validate()?;
        Ok(config)
    }

    /// Check every tunable. Zero or non-finite values that would divide by
    /// zero or propagate NaN into velocities are rejected here rather than
    /// at use time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("max_walk_speed", self.max_walk_speed),
            ("max_run_speed", self.max_run_speed),
            ("ground_acceleration", self.ground_acceleration),
            ("ground_deceleration", self.ground_deceleration),
            ("air_acceleration", self.air_acceleration),
            ("air_deceleration", self.air_deceleration),
            ("jump_height", self.jump_height),
            (
                "jump_height_compensation_factor",
                self.jump_height_compensation_factor,
            ),
            ("time_to_apex", self.time_to_apex),
            (
                "gravity_on_release_multiplier",
                self.gravity_on_release_multiplier,
            ),
            ("max_fall_speed", self.max_fall_speed),
            ("jump_buffer_time", self.jump_buffer_time),
            ("time_for_upwards_cancel", self.time_for_upwards_cancel),
            ("apex_hang_time", self.apex_hang_time),
            ("ground_detection_ray_length", self.ground_detection_ray_length),
            ("head_detection_ray_length", self.head_detection_ray_length),
            ("head_width", self.head_width),
            ("wall_check_size.x", self.wall_check_size.x),
            ("wall_check_size.y", self.wall_check_size.y),
            ("wall_check_distance", self.wall_check_distance),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        let non_negative = [
            ("coyote_time", self.coyote_time),
            ("wall_stick_time", self.wall_stick_time),
            ("wall_slide_speed", self.wall_slide_speed),
            ("wall_jump_force.x", self.wall_jump_force.x),
            ("wall_jump_force.y", self.wall_jump_force.y),
            (
                "wall_jump_input_freeze_time",
                self.wall_jump_input_freeze_time,
            ),
            ("grind_speed", self.grind_speed),
            ("grind_jump_force", self.grind_jump_force),
            ("knockback_force", self.knockback_force),
            ("knockback_upward_modifier", self.knockback_upward_modifier),
            ("stun_duration", self.stun_duration),
            ("trampoline_bounce_force", self.trampoline_bounce_force),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Negative { field, value });
            }
        }

        for (field, value) in [
            ("apex_threshold", self.apex_threshold),
            ("head_width", self.head_width),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfUnitRange { field, value });
            }
        }

        if !self.world_gravity.is_finite() {
            return Err(ConfigError::NotFinite {
                field: "world_gravity",
                value: self.world_gravity,
            });
        }

        if self.jumps_allowed == 0 {
            return Err(ConfigError::NoJumpsAllowed);
        }

        if self.layers.ground == 0 {
            return Err(ConfigError::EmptyLayerMask("ground"));
        }
        if self.layers.wall == 0 {
            return Err(ConfigError::EmptyLayerMask("wall"));
        }

        let derived = JumpKinematics::compute(
            self.jump_height,
            self.jump_height_compensation_factor,
            self.time_to_apex,
        );
        if derived != self.derived {
            // Raw jump fields were edited directly without recomputing.
            return Err(ConfigError::StaleDerived);
        }

        Ok(())
    }

    /// Builder: set jump height and time to apex.
    pub fn with_jump(mut self, height: f32, time_to_apex: f32) -> Self {
        self.jump_height = height;
        self.time_to_apex = time_to_apex;
        self.recomputed()
    }

    /// Builder: set the jump height compensation factor.
    pub fn with_jump_compensation(mut self, factor: f32) -> Self {
        self.jump_height_compensation_factor = factor;
        self.recomputed()
    }

    /// Builder: set number of jumps allowed before landing.
    pub fn with_jumps_allowed(mut self, jumps: u8) -> Self {
        self.jumps_allowed = jumps;
        self
    }

    /// Builder: set walk and run speeds.
    pub fn with_speeds(mut self, walk: f32, run: f32) -> Self {
        self.max_walk_speed = walk;
        self.max_run_speed = run;
        self
    }

    /// Builder: set coyote time.
    pub fn with_coyote_time(mut self, time: f32) -> Self {
        self.coyote_time = time;
        self
    }

    /// Builder: set jump buffer time.
    pub fn with_jump_buffer_time(mut self, time: f32) -> Self {
        self.jump_buffer_time = time;
        self
    }

    /// Builder: set max fall speed.
    pub fn with_max_fall_speed(mut self, speed: f32) -> Self {
        self.max_fall_speed = speed;
        self
    }

    /// Builder: set the wall slide policy.
    pub fn with_wall_slide_policy(mut self, policy: WallSlidePolicy) -> Self {
        self.wall_slide_policy = policy;
        self
    }

    /// Builder: set wall stick time and slide speed.
    pub fn with_wall_slide(mut self, stick_time: f32, slide_speed: f32) -> Self {
        self.wall_stick_time = stick_time;
        self.wall_slide_speed = slide_speed;
        self
    }

    /// Builder: set knockback force, upward modifier and stun duration.
    pub fn with_knockback(mut self, force: f32, upward_modifier: f32, stun: f32) -> Self {
        self.knockback_force = force;
        self.knockback_upward_modifier = upward_modifier;
        self.stun_duration = stun;
        self
    }

    /// Builder: set collision layer masks.
    pub fn with_layers(mut self, layers: LayerMasks) -> Self {
        self.layers = layers;
        self
    }
}
