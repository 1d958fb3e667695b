//! Core motor systems.
//!
//! These systems feed the physics backend's view of each character into its
//! [`CharacterMotor`] and copy the result back. They are generic over the
//! physics backend to allow different physics engines to be used. Probing
//! is the backend plugin's job since it needs the engine's query pipeline.

use bevy::ecs::system::EntityCommands;
use bevy::prelude::*;

use crate::backend::CharacterPhysicsBackend;
use crate::config::MovementConfig;
use crate::detection::ProbeResult;
use crate::error::ConfigError;
use crate::events::{HazardContact, MovementEvent, MovementEventKind, RailContact, TrampolineContact};
use crate::intent::MovementInput;
use crate::motor::{CharacterMotor, KinematicBody};
use crate::state::{Airborne, Facing, Grinding, Grounded, MotorRejected, Stunned, WallSliding};

/// Validate newly spawned characters and insert their runtime components.
///
/// A character is picked up once it carries a [`MovementConfig`] and the
/// backend's velocity component. Invalid configs and characters without a
/// usable collider are logged once and tagged with [`MotorRejected`].
pub fn activate_characters<B: CharacterPhysicsBackend>(world: &mut World) {
    let pending: Vec<(Entity, MovementConfig)> = world
        .query_filtered::<(Entity, &MovementConfig), (
            With<B::VelocityComponent>,
            Without<CharacterMotor>,
            Without<MotorRejected>,
        )>()
        .iter(world)
        .map(|(e, config)| (e, *config))
        .collect();

    for (entity, config) in pending {
        let checked = config.validated().and_then(|config| {
            match B::character_bounds(world, entity) {
                Some(bounds) if bounds.is_valid() => Ok((config, bounds)),
                _ => Err(ConfigError::MissingBounds),
            }
        });

        match checked {
            Ok((config, bounds)) => {
                let mut character = world.entity_mut(entity);
                character.insert((config, bounds, CharacterMotor::new(Facing::Right), ProbeResult::airborne()));
                character.insert_if_new(MovementInput::default());
                info!(?entity, "platformer motor activated");
            }
            Err(err) => {
                error!(?entity, "platformer motor rejected character: {err}");
                world.entity_mut(entity).insert(MotorRejected {
                    reason: err.to_string(),
                });
            }
        }
    }
}

fn drain<E: Event>(world: &mut World) -> Vec<E> {
    world
        .get_resource_mut::<Events<E>>()
        .map(|mut events| events.drain().collect())
        .unwrap_or_default()
}

/// Hand queued contact notifications to the motors they target.
///
/// Contacts for entities without a motor are dropped.
pub fn dispatch_contacts(world: &mut World) {
    for contact in drain::<HazardContact>(world) {
        if let Some(mut motor) = world.get_mut::<CharacterMotor>(contact.character) {
            motor.notify_hazard(contact.direction);
        }
    }

    for contact in drain::<RailContact>(world) {
        if let Some(mut motor) = world.get_mut::<CharacterMotor>(contact.character) {
            motor.notify_rail(contact.phase);
        }
    }

    for contact in drain::<TrampolineContact>(world) {
        if let Some(mut motor) = world.get_mut::<CharacterMotor>(contact.character) {
            motor.notify_trampoline();
        }
    }
}

/// Advance every motor by one fixed tick and write the body back.
///
/// Velocity and gravity scale are only written when the motor changed them,
/// so a stunned or wall-frozen body keeps whatever the integrator produced.
pub fn run_motors<B: CharacterPhysicsBackend>(world: &mut World) {
    let dt = B::get_fixed_timestep(world);

    let characters: Vec<(Entity, MovementConfig, MovementInput, ProbeResult)> = world
        .query_filtered::<(Entity, &MovementConfig, Option<&MovementInput>, &ProbeResult), With<CharacterMotor>>()
        .iter(world)
        .map(|(e, config, input, probe)| (e, *config, input.copied().unwrap_or_default(), *probe))
        .collect();

    for (entity, config, input, probe) in characters {
        let before = KinematicBody {
            velocity: B::get_velocity(world, entity),
            gravity_scale: B::get_gravity_scale(world, entity),
        };
        let mut body = before;
        let mut emitted: Vec<MovementEventKind> = Vec::new();

        {
            let Some(mut motor) = world.get_mut::<CharacterMotor>(entity) else {
                continue;
            };
            motor.step(&config, &input, &probe, &mut body, dt, &mut emitted);
        }

        if body.velocity != before.velocity {
            B::set_velocity(world, entity, body.velocity);
        }
        if body.gravity_scale != before.gravity_scale {
            B::set_gravity_scale(world, entity, body.gravity_scale);
        }

        if emitted.is_empty() {
            continue;
        }
        let position = B::get_position(world, entity);
        world.send_event_batch(emitted.into_iter().map(|kind| MovementEvent {
            character: entity,
            kind,
            position,
        }));
    }
}

fn toggle<M: Component + Default>(entity: &mut EntityCommands, wanted: bool, present: bool) {
    if wanted && !present {
        entity.insert(M::default());
    } else if !wanted && present {
        entity.remove::<M>();
    }
}

/// Sync state marker components with the motor.
pub fn sync_state_markers(
    mut commands: Commands,
    q: Query<(
        Entity,
        &CharacterMotor,
        Has<Grounded>,
        Has<Airborne>,
        Option<&WallSliding>,
        Has<Grinding>,
        Has<Stunned>,
    )>,
) {
    for (entity, motor, has_grounded, has_airborne, sliding, has_grinding, has_stunned) in &q {
        let mut character = commands.entity(entity);

        toggle::<Grounded>(&mut character, motor.is_grounded(), has_grounded);
        toggle::<Airborne>(&mut character, !motor.is_grounded(), has_airborne);
        toggle::<Grinding>(&mut character, motor.is_grinding(), has_grinding);
        toggle::<Stunned>(&mut character, motor.is_stunned(), has_stunned);

        // Sync WallSliding, re-inserting when the wall side changed
        if motor.is_wall_sliding() {
            let side = motor.wall.side;
            if sliding.map(|marker| marker.side) != Some(side) {
                character.insert(WallSliding { side });
            }
        } else if sliding.is_some() {
            character.remove::<WallSliding>();
        }
    }
}

/// Clear latched input edges once the fixed tick has consumed them.
pub fn clear_input_edges(mut q: Query<&mut MovementInput>) {
    for mut input in &mut q {
        if input.jump_pressed || input.jump_released || input.interact_pressed {
            input.clear_edges();
        }
    }
}
