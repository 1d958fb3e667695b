//! # `platformer_motor`
//!
//! A deterministic, fixed-timestep movement core for 2D side-scrolling
//! platformer characters, with physics backend abstraction.
//!
//! This crate provides a tuneable character motor that:
//! - Derives gravity and jump velocity from a desired jump height and time to apex
//! - Supports multi-jumps, coyote time, jump buffering and variable jump height
//! - Hangs briefly at the apex and falls faster after an early release
//! - Smooths horizontal motion with separate ground and air rates
//! - Handles wall slides, wall jumps, rail grinds, trampolines and knockback
//! - Abstracts the physics backend for easy swapping (Rapier2D included)
//!
//! ## Architecture
//!
//! Every fixed tick, for each character:
//! 1. The backend probes the ground, the ceiling and the wall in the facing direction
//! 2. Queued contacts (hazards, rails, trampolines) are handed to the motor
//! 3. [`CharacterMotor::step`](motor::CharacterMotor::step) decides which
//!    subsystem owns the body and writes its velocity
//! 4. Marker components are synced for animation and gameplay queries
//!
//! The motor itself is plain data and can be stepped without an `App`.
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use platformer_motor::prelude::*;
//!
//! // Tunables for a double-jumping character
//! let config = MovementConfig::player().with_jumps_allowed(2);
//! assert!(config.validate().is_ok());
//!
//! // Input is sampled every frame and consumed by the fixed tick
//! let mut input = MovementInput::default();
//! input.set_horizontal(1.0);
//! input.set_jump_held(true);
//! assert!(input.jump_pressed);
//! ```

use bevy::prelude::*;

pub mod backend;
pub mod collision;
pub mod config;
pub mod detection;
pub mod error;
pub mod events;
pub mod grind;
pub mod horizontal;
pub mod intent;
pub mod jump;
pub mod motor;
pub mod state;
pub mod stun;
pub mod systems;
pub mod timers;
pub mod vertical;
pub mod wall;

#[cfg(feature = "rapier2d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::backend::CharacterPhysicsBackend;
    pub use crate::config::{LayerMasks, MovementConfig, WallSlidePolicy};
    pub use crate::detection::{CharacterBounds, ProbeResult};
    pub use crate::error::ConfigError;
    pub use crate::events::{
        HazardContact, MovementEvent, MovementEventKind, RailContact, RailPhase, TrampolineContact,
    };
    pub use crate::intent::MovementInput;
    pub use crate::motor::{CharacterMotor, VelocityOwner};
    pub use crate::state::{Airborne, Facing, Grinding, Grounded, MotorRejected, Stunned, WallSliding};
    pub use crate::{PlatformerMotorPlugin, PlatformerMotorSet};

    #[cfg(feature = "rapier2d")]
    pub use crate::rapier::{Hazard, Rail, Rapier2dBackend, Rapier2dCharacterBundle, Trampoline};
}

/// Phases of the fixed tick, run in order.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformerMotorSet {
    /// Validate new characters and insert their runtime components.
    Activation,
    /// Backend probes refresh each character's `ProbeResult`.
    Sensors,
    /// Queued contact notifications reach the motors.
    Contacts,
    /// Motors step and write the bodies.
    Motor,
    /// State markers follow the motors.
    Markers,
}

/// Main plugin for the platformer motor.
///
/// This plugin is generic over a physics backend `B` which provides the actual
/// physics operations (probing, velocity access, collider bounds).
///
/// # Type Parameters
/// - `B`: The physics backend implementation (e.g., `Rapier2dBackend`)
///
/// # Examples
///
/// With Rapier2D backend:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_rapier2d::prelude::*;
/// use platformer_motor::prelude::*;
///
/// App::new()
///     .add_plugins(MinimalPlugins)
///     .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
///     .add_plugins(PlatformerMotorPlugin::<Rapier2dBackend>::default())
///     .run();
/// ```
pub struct PlatformerMotorPlugin<B: backend::CharacterPhysicsBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::CharacterPhysicsBackend> Default for PlatformerMotorPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::CharacterPhysicsBackend> Plugin for PlatformerMotorPlugin<B> {
    fn build(&self, app: &mut App) {
        // Register core types
        app.register_type::<config::MovementConfig>();
        app.register_type::<intent::MovementInput>();
        app.register_type::<motor::CharacterMotor>();
        app.register_type::<detection::ProbeResult>();
        app.register_type::<detection::CharacterBounds>();
        app.register_type::<state::Grounded>();
        app.register_type::<state::Airborne>();
        app.register_type::<state::WallSliding>();
        app.register_type::<state::Grinding>();
        app.register_type::<state::Stunned>();
        app.register_type::<state::MotorRejected>();

        app.add_event::<events::MovementEvent>();
        app.add_event::<events::HazardContact>();
        app.add_event::<events::RailContact>();
        app.add_event::<events::TrampolineContact>();

        // Add the physics backend plugin
        app.add_plugins(B::plugin());

        app.configure_sets(
            FixedUpdate,
            (
                PlatformerMotorSet::Activation,
                PlatformerMotorSet::Sensors,
                PlatformerMotorSet::Contacts,
                PlatformerMotorSet::Motor,
                PlatformerMotorSet::Markers,
            )
                .chain(),
        );

        app.add_systems(
            FixedUpdate,
            (
                systems::activate_characters::<B>.in_set(PlatformerMotorSet::Activation),
                systems::dispatch_contacts.in_set(PlatformerMotorSet::Contacts),
                systems::run_motors::<B>.in_set(PlatformerMotorSet::Motor),
                systems::sync_state_markers.in_set(PlatformerMotorSet::Markers),
            ),
        );

        // Edges are consumed once per fixed tick
        app.add_systems(FixedPostUpdate, systems::clear_input_edges);
    }
}
