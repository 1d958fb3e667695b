//! Character motor.
//!
//! [`CharacterMotor`] ties the subsystems together and advances them by one
//! fixed tick in [`CharacterMotor::step`]. Exactly one owner writes the
//! body velocity per tick, in priority order:
//!
//! 1. stun
//! 2. wall (sliding or post-jump freeze)
//! 3. grind
//! 4. normal control (jump arbiter, vertical and horizontal models)
//!
//! When a sub-state hands the body back, normal control resumes from the
//! body's current velocity so nothing snaps.
//!
//! The motor is plain data. It knows nothing about the physics engine or the
//! ECS; the Bevy systems feed it probe results and contact notifications and
//! copy the resulting [`KinematicBody`] back to the real body.

use bevy::prelude::*;

use crate::config::MovementConfig;
use crate::detection::ProbeResult;
use crate::events::{MovementEventKind, MovementEventSink, RailPhase};
use crate::grind::GrindState;
use crate::horizontal;
use crate::intent::MovementInput;
use crate::jump;
use crate::state::{Facing, MotionState};
use crate::stun::StunState;
use crate::vertical;
use crate::wall::WallState;

/// The part of a rigid body the motor reads and writes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicBody {
    /// Linear velocity.
    pub velocity: Vec2,
    /// Multiplier on the physics engine's gravity for this body.
    pub gravity_scale: f32,
}

impl Default for KinematicBody {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            gravity_scale: 1.0,
        }
    }
}

impl KinematicBody {
    /// A body moving at `velocity` with unit gravity scale.
    pub fn new(velocity: Vec2) -> Self {
        Self {
            velocity,
            ..default()
        }
    }
}

/// Subsystem that wrote the body velocity on a tick.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum VelocityOwner {
    /// Jump arbiter with the vertical and horizontal models.
    #[default]
    Normal,
    /// Wall slide or wall-jump freeze.
    Wall,
    /// Rail grind.
    Grind,
    /// Knockback stun.
    Stun,
}

/// Contact notifications received since the last tick.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
struct PendingContacts {
    hazard: Option<f32>,
    rail: Option<RailPhase>,
    trampoline: bool,
}

/// Runtime movement state for one character.
///
/// Inserted by the activation system once the character's
/// [`MovementConfig`] has been validated.
#[derive(Component, Reflect, Debug, Clone, Default, PartialEq)]
#[reflect(Component)]
pub struct CharacterMotor {
    /// Shared motion record.
    pub motion: MotionState,
    /// Wall slide state.
    pub wall: WallState,
    /// Grind state.
    pub grind: GrindState,
    /// Stun state.
    pub stun: StunState,
    owner: VelocityOwner,
    pending: PendingContacts,
    started: bool,
}

impl CharacterMotor {
    /// Create a motor facing `facing`.
    pub fn new(facing: Facing) -> Self {
        let mut motor = Self::default();
        motor.motion.facing = facing;
        motor
    }

    /// Owner of the body velocity on the last tick.
    #[inline]
    pub fn owner(&self) -> VelocityOwner {
        self.owner
    }

    /// Sub-state that would take the body right now, if any.
    pub fn competing_substate(&self) -> Option<VelocityOwner> {
        if self.stun.is_active() {
            Some(VelocityOwner::Stun)
        } else if self.wall.is_active() {
            Some(VelocityOwner::Wall)
        } else if self.grind.is_active() {
            Some(VelocityOwner::Grind)
        } else {
            None
        }
    }

    /// Whether the character stands on ground.
    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.motion.grounded
    }

    /// Whether the character is sliding on a wall.
    #[inline]
    pub fn is_wall_sliding(&self) -> bool {
        self.wall.sliding
    }

    /// Whether the character is riding a rail.
    #[inline]
    pub fn is_grinding(&self) -> bool {
        self.grind.is_active()
    }

    /// Whether the character is stunned.
    #[inline]
    pub fn is_stunned(&self) -> bool {
        self.stun.is_active()
    }

    /// Jump units used since the last grounding event.
    #[inline]
    pub fn jumps_used(&self) -> u8 {
        self.motion.jumps_used
    }

    /// A hazard hit the character. `direction` is the horizontal knockback
    /// sign. Only the first hit per tick is kept.
    pub fn notify_hazard(&mut self, direction: f32) {
        if self.pending.hazard.is_none() {
            self.pending.hazard = Some(direction);
        }
    }

    /// The character entered or left a rail zone. The latest phase per tick
    /// wins.
    pub fn notify_rail(&mut self, phase: RailPhase) {
        self.pending.rail = Some(phase);
    }

    /// The character touched a trampoline.
    pub fn notify_trampoline(&mut self) {
        self.pending.trampoline = true;
    }

    /// Advance every subsystem by one fixed tick of `dt` seconds.
    pub fn step(
        &mut self,
        config: &MovementConfig,
        input: &MovementInput,
        probe: &ProbeResult,
        body: &mut KinematicBody,
        dt: f32,
        sink: &mut dyn MovementEventSink,
    ) {
        let pending = std::mem::take(&mut self.pending);

        if let Some(direction) = pending.hazard {
            if !self.stun.is_active() {
                self.release_substates(body, sink);
                self.stun.knock(direction, &mut self.motion, body, config, sink);
                self.owner = VelocityOwner::Stun;
                return;
            }
        }
        if self.stun.is_active() && !self.stun.tick(dt) {
            self.owner = VelocityOwner::Stun;
            return;
        }

        self.sense(probe);
        self.tick_timers(config, dt);

        match pending.rail {
            Some(RailPhase::Entered) => {
                if self.grind.enter(&mut self.motion, body, config, sink) {
                    self.wall.stop_sliding(sink);
                    self.wall.freeze.clear();
                }
            }
            Some(RailPhase::Exited) => self.grind.exit(body, sink),
            None => {}
        }
        if pending.trampoline {
            self.bounce(config, body, sink);
        }

        if !self.grind.is_active() {
            self.wall.update(&mut self.motion, body, input, config, dt, sink);
        }

        // A sub-state that ended this tick hands over the body's velocity
        if self.owner != VelocityOwner::Normal && self.competing_substate().is_none() {
            self.motion.horizontal_velocity = body.velocity.x;
            self.motion.vertical_velocity = config.clamp_vertical(body.velocity.y);
        }

        let mut grind_jumped = false;
        if self.grind.is_active() && input.jump_pressed {
            self.grind.jump(&mut self.motion, body, config, sink);
            self.motion.vertical_velocity = config.clamp_vertical(self.motion.vertical_velocity);
            grind_jumped = true;
        }

        if !input.in_interaction_zone && !grind_jumped && self.competing_substate().is_none() {
            let report = jump::arbitrate(&mut self.motion, config, input);
            if let Some(kind) = report.initiated {
                sink.emit(kind);
            }
            if report.landed {
                self.wall.forget_last_wall();
                debug!("jump phase ended on ground");
            }
        }

        self.owner = self.competing_substate().unwrap_or(VelocityOwner::Normal);
        match self.owner {
            VelocityOwner::Normal => {
                vertical::integrate(&mut self.motion, config, dt);
                horizontal::steer(&mut self.motion, config, input, dt);
                body.velocity = Vec2::new(self.motion.horizontal_velocity, self.motion.vertical_velocity);
            }
            VelocityOwner::Grind => self.grind.ride(&self.motion, body, config),
            VelocityOwner::Wall | VelocityOwner::Stun => {}
        }

        if self.started && self.motion.grounded && !self.motion.was_grounded {
            sink.emit(MovementEventKind::Landed);
        }
        self.started = true;
    }

    fn sense(&mut self, probe: &ProbeResult) {
        self.motion.was_grounded = self.motion.grounded;
        self.motion.grounded = probe.grounded();
        self.motion.bumped_head = probe.bumped_head();
        self.wall.sense(probe.touching_wall(), probe.wall_surface());
    }

    fn tick_timers(&mut self, config: &MovementConfig, dt: f32) {
        self.motion.jump_buffer.tick(dt);
        if self.motion.grounded {
            self.motion.coyote.arm(config.coyote_time);
        } else {
            self.motion.coyote.tick(dt);
        }
        self.wall.freeze.tick(dt);
    }

    /// End wall and grind sub-states so another owner can take the body.
    fn release_substates(&mut self, body: &mut KinematicBody, sink: &mut dyn MovementEventSink) {
        self.wall.stop_sliding(sink);
        self.wall.freeze.clear();
        self.grind.exit(body, sink);
    }

    fn bounce(&mut self, config: &MovementConfig, body: &mut KinematicBody, sink: &mut dyn MovementEventSink) {
        if body.velocity.y > 0.0 {
            trace!("trampoline ignored while rising");
            return;
        }
        self.release_substates(body, sink);
        jump::bounce(&mut self.motion, config, body.velocity.y);
        self.motion.vertical_velocity = config.clamp_vertical(self.motion.vertical_velocity);
        self.wall.forget_last_wall();
        body.velocity.y = self.motion.vertical_velocity;
        sink.emit(MovementEventKind::TrampolineBounced);
    }
}
