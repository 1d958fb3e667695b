//! Physics backend abstraction.
//!
//! This module defines the trait that physics backends must implement
//! to work with the platformer motor. The motor only needs velocity and
//! gravity-scale access and the character's collider bounds. Collision
//! probing needs the engine's query pipeline, so each backend plugin adds
//! its own probe system to [`PlatformerMotorSet::Sensors`], built on
//! [`detection::probe`](crate::detection::probe).
//!
//! [`PlatformerMotorSet::Sensors`]: crate::PlatformerMotorSet::Sensors

use bevy::prelude::*;

use crate::detection::CharacterBounds;

/// Trait for physics backend implementations.
///
/// Implement this trait to integrate a physics engine with the platformer
/// motor. The backend reads and writes the body; its plugin keeps each
/// character's [`ProbeResult`](crate::detection::ProbeResult) current.
///
/// For an example implementation, see the `rapier` module's
/// `Rapier2dBackend`.
pub trait CharacterPhysicsBackend: 'static + Send + Sync {
    /// The velocity component type used by this backend. Characters without
    /// it are not activated.
    type VelocityComponent: Component;

    /// Returns the plugin that sets up this backend, including its probe
    /// system.
    fn plugin() -> impl Plugin;

    /// Get the current velocity of an entity.
    fn get_velocity(world: &World, entity: Entity) -> Vec2;

    /// Set the velocity of an entity.
    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec2);

    /// Get the gravity scale of an entity.
    fn get_gravity_scale(_world: &World, _entity: Entity) -> f32 {
        // Default implementation: unscaled gravity
        1.0
    }

    /// Set the gravity scale of an entity.
    fn set_gravity_scale(_world: &mut World, _entity: Entity, _scale: f32) {}

    /// Get the current position of an entity.
    fn get_position(world: &World, entity: Entity) -> Vec2;

    /// Get the fixed timestep delta time.
    fn get_fixed_timestep(world: &World) -> f32;

    /// World-space feet and body boxes of a character, or `None` when the
    /// entity has no usable collider.
    fn character_bounds(world: &World, entity: Entity) -> Option<CharacterBounds>;
}
