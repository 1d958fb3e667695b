//! Rapier2D physics backend implementation.
//!
//! This module provides the physics backend for Bevy Rapier2D.
//! Enable with the `rapier2d` feature.

use bevy::prelude::*;
use bevy_rapier2d::geometry::Group;
use bevy_rapier2d::prelude::*;

use crate::backend::CharacterPhysicsBackend;
use crate::collision::{CollisionData, ShapeCast};
use crate::config::MovementConfig;
use crate::detection::{self, CharacterBounds, ProbeResult};
use crate::events::{HazardContact, RailContact, RailPhase, TrampolineContact};
use crate::motor::CharacterMotor;
use crate::PlatformerMotorSet;

/// Rapier2D physics backend for the platformer motor.
///
/// Velocity and gravity scale go through Rapier's [`Velocity`] and
/// [`GravityScale`] components. Collision probing is handled by a dedicated
/// Rapier system that receives `RapierContext` as a system parameter.
pub struct Rapier2dBackend;

impl CharacterPhysicsBackend for Rapier2dBackend {
    type VelocityComponent = Velocity;

    fn plugin() -> impl Plugin {
        Rapier2dBackendPlugin
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec2 {
        world
            .get::<Velocity>(entity)
            .map(|v| v.linvel)
            .unwrap_or(Vec2::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec2) {
        if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            vel.linvel = velocity;
        }
    }

    fn get_gravity_scale(world: &World, entity: Entity) -> f32 {
        world.get::<GravityScale>(entity).map(|g| g.0).unwrap_or(1.0)
    }

    fn set_gravity_scale(world: &mut World, entity: Entity, scale: f32) {
        if let Some(mut gravity_scale) = world.get_mut::<GravityScale>(entity) {
            gravity_scale.0 = scale;
        } else {
            world.entity_mut(entity).insert(GravityScale(scale));
        }
    }

    fn get_position(world: &World, entity: Entity) -> Vec2 {
        world
            .get::<Transform>(entity)
            .map(|t| t.translation.xy())
            .or_else(|| {
                world
                    .get::<GlobalTransform>(entity)
                    .map(|t| t.translation().xy())
            })
            .unwrap_or(Vec2::ZERO)
    }

    fn get_fixed_timestep(world: &World) -> f32 {
        world
            .get_resource::<Time<Fixed>>()
            .map(|t| t.delta_secs())
            .filter(|&d| d > 0.0)
            .unwrap_or(1.0 / 60.0)
    }

    fn character_bounds(world: &World, entity: Entity) -> Option<CharacterBounds> {
        let collider = world.get::<Collider>(entity)?;
        collider_bounds(collider, Self::get_position(world, entity))
    }
}

/// Plugin that sets up Rapier2D-specific systems for the platformer motor.
pub struct Rapier2dBackendPlugin;

impl Plugin for Rapier2dBackendPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<Rail>();
        app.register_type::<Trampoline>();
        app.register_type::<Hazard>();

        // Sensors: box casts against the query pipeline
        app.add_systems(FixedUpdate, rapier_update_probes.in_set(PlatformerMotorSet::Sensors));

        // Contacts: tagged colliders become motor notifications
        app.add_systems(
            FixedUpdate,
            translate_collision_events
                .in_set(PlatformerMotorSet::Contacts)
                .before(crate::systems::dispatch_contacts),
        );
    }
}

/// Rail zone. Characters touching it may start grinding.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Rail;

/// Surface that bounces characters landing on it.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Trampoline;

/// Surface that knocks characters back and stuns them.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Hazard;

/// Half extents of a collider's axis-aligned box, ignoring rotation.
///
/// Supports cuboids, capsules and balls. Other shapes return `None`.
pub fn collider_half_extents(collider: &Collider) -> Option<Vec2> {
    if let Some(cuboid) = collider.as_cuboid() {
        Some(cuboid.half_extents())
    } else if let Some(capsule) = collider.as_capsule() {
        let segment = capsule.segment();
        let half_span = (segment.a() - segment.b()).abs() / 2.0;
        Some(half_span + Vec2::splat(capsule.radius()))
    } else {
        collider.as_ball().map(|ball| Vec2::splat(ball.radius()))
    }
}

/// World-space bounds of a collider centered on `position`.
pub fn collider_bounds(collider: &Collider, position: Vec2) -> Option<CharacterBounds> {
    let half_extents = collider_half_extents(collider)?;
    let bounds = CharacterBounds::centered(position, half_extents);
    bounds.is_valid().then_some(bounds)
}

/// Box collider swept by a cast.
fn cast_collider(cast: &ShapeCast) -> Collider {
    let half = cast.size / 2.0;
    Collider::cuboid(half.x, half.y)
}

/// Sweep a box through the query pipeline.
fn rapier_shapecast(context: &RapierContext, cast: &ShapeCast, exclude_entity: Entity) -> Option<CollisionData> {
    let shape = cast_collider(cast);

    let filter = QueryFilter::default()
        .exclude_rigid_body(exclude_entity)
        .exclude_sensors()
        .groups(CollisionGroups::new(
            Group::ALL,
            Group::from_bits_truncate(cast.layer_mask),
        ));

    context
        .cast_shape(
            cast.origin,
            0.0,
            cast.direction,
            &shape,
            ShapeCastOptions {
                max_time_of_impact: cast.max_distance,
                stop_at_penetration: false,
                ..default()
            },
            filter,
        )
        .map(|(hit_entity, hit)| {
            let normal = hit.details.map(|d| d.normal1).unwrap_or(-cast.direction);
            let hit_point = cast.origin + cast.direction * hit.time_of_impact;
            CollisionData::new(hit.time_of_impact, normal, hit_point, Some(hit_entity))
        })
}

/// Rapier-specific probe system.
///
/// Casts from the character's current collider box every fixed tick, so
/// bounds follow the body as it moves.
fn rapier_update_probes(
    rapier_context: ReadRapierContext,
    mut q_characters: Query<(
        Entity,
        &Transform,
        &Collider,
        &MovementConfig,
        &CharacterMotor,
        &mut ProbeResult,
        &mut CharacterBounds,
    )>,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };

    for (entity, transform, collider, config, motor, mut result, mut bounds) in &mut q_characters {
        let Some(current) = collider_bounds(collider, transform.translation.xy()) else {
            *result = ProbeResult::airborne();
            continue;
        };

        let caster = |cast: &ShapeCast| rapier_shapecast(&context, cast, entity);
        *result = detection::probe(&caster, &current, motor.motion.facing, config);
        *bounds = current;
    }
}

/// Translate Rapier collision events on tagged colliders into motor
/// notifications.
///
/// Rails report both entering and leaving. Trampolines and hazards only
/// report the start of a contact. Hazard knockback points away from the
/// hazard's center.
pub fn translate_collision_events(
    mut collisions: EventReader<CollisionEvent>,
    characters: Query<&Transform, With<CharacterMotor>>,
    rails: Query<(), With<Rail>>,
    trampolines: Query<(), With<Trampoline>>,
    hazards: Query<&Transform, With<Hazard>>,
    mut hazard_contacts: EventWriter<HazardContact>,
    mut rail_contacts: EventWriter<RailContact>,
    mut trampoline_contacts: EventWriter<TrampolineContact>,
) {
    for collision in collisions.read() {
        let (a, b, started) = match *collision {
            CollisionEvent::Started(a, b, _) => (a, b, true),
            CollisionEvent::Stopped(a, b, _) => (a, b, false),
        };

        for (character, other) in [(a, b), (b, a)] {
            let Ok(character_transform) = characters.get(character) else {
                continue;
            };

            if rails.contains(other) {
                let phase = if started { RailPhase::Entered } else { RailPhase::Exited };
                rail_contacts.write(RailContact { character, phase });
            }

            if !started {
                continue;
            }

            if trampolines.contains(other) {
                trampoline_contacts.write(TrampolineContact { character });
            }

            if let Ok(hazard_transform) = hazards.get(other) {
                hazard_contacts.write(HazardContact::away_from(
                    character,
                    character_transform.translation.x,
                    hazard_transform.translation.x,
                ));
            }
        }
    }
}

/// Bundle for creating a character with Rapier2D physics.
///
/// The motor writes velocities directly, so the body is dynamic with
/// rotation locked and Rapier's own gravity scaled by the motor (the grind
/// sub-state sets it to zero). Collision events are enabled so rails,
/// trampolines and hazards can report contacts.
///
/// # Example
///
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_rapier2d::prelude::*;
/// use platformer_motor::prelude::*;
/// use platformer_motor::rapier::Rapier2dCharacterBundle;
///
/// fn spawn_player(mut commands: Commands) {
///     commands.spawn((
///         Transform::from_xyz(0.0, 100.0, 0.0),
///         MovementConfig::player(),
///         MovementInput::default(),
///         Rapier2dCharacterBundle::new(),
///         Collider::cuboid(0.4, 0.9),
///     ));
/// }
/// ```
#[derive(Bundle)]
pub struct Rapier2dCharacterBundle {
    /// The rigid body type. Should typically be [`RigidBody::Dynamic`].
    pub rigid_body: RigidBody,
    /// Current linear and angular velocity. Written by the motor every tick.
    pub velocity: Velocity,
    /// Multiplier on Rapier's gravity.
    pub gravity_scale: GravityScale,
    /// Which axes are locked. Rotation is locked by default.
    pub locked_axes: LockedAxes,
    /// Enables collision events for contact notifications.
    pub active_events: ActiveEvents,
}

impl Default for Rapier2dCharacterBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl Rapier2dCharacterBundle {
    /// Create a character bundle with rotation locked.
    pub fn new() -> Self {
        Self {
            rigid_body: RigidBody::Dynamic,
            velocity: Velocity::default(),
            gravity_scale: GravityScale(1.0),
            locked_axes: LockedAxes::ROTATION_LOCKED,
            active_events: ActiveEvents::COLLISION_EVENTS,
        }
    }

    /// Set the rigid body type for the character.
    ///
    /// ```ignore
    /// let bundle = Rapier2dCharacterBundle::new()
    ///     .with_body(RigidBody::KinematicVelocityBased);
    /// ```
    pub fn with_body(mut self, body: RigidBody) -> Self {
        self.rigid_body = body;
        self
    }

    /// Set which axes should be locked for the rigid body.
    pub fn with_locked_axes(mut self, axes: LockedAxes) -> Self {
        self.locked_axes = axes;
        self
    }
}
