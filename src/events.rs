//! Events in and out of the motor.
//!
//! Outgoing [`MovementEvent`]s are one-shot notifications for audio and
//! animation. They are emitted exactly once per occurrence, never awaited,
//! and have no effect on simulation state.
//!
//! Incoming contact notifications ([`HazardContact`], [`RailContact`],
//! [`TrampolineContact`]) are produced by whatever detects the contact
//! (the Rapier backend ships a translator for tagged sensors).

use bevy::prelude::*;

/// What happened.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementEventKind {
    /// First jump from ground or coyote window.
    JumpInitiated,
    /// Additional jump in the air.
    DoubleJumpInitiated,
    /// Jump off a wall slide.
    WallJumpPerformed,
    /// Touched ground after being airborne.
    Landed,
    /// Wall slide loop should start.
    WallSlideStarted,
    /// Wall slide loop should stop.
    WallSlideStopped,
    /// Grind loop should start.
    GrindStarted,
    /// Grind loop should stop.
    GrindStopped,
    /// Jump off a rail.
    GrindJumpPerformed,
    /// Knockback applied and stun started.
    KnockbackApplied,
    /// Trampoline bounce applied.
    TrampolineBounced,
}

/// A motor notification with the world position it happened at.
#[derive(Event, Reflect, Debug, Clone, Copy, PartialEq)]
pub struct MovementEvent {
    /// Character that produced the event.
    pub character: Entity,
    /// What happened.
    pub kind: MovementEventKind,
    /// Character position at the time.
    pub position: Vec2,
}

/// Receiver of motor notifications.
pub trait MovementEventSink {
    /// Deliver one notification.
    fn emit(&mut self, kind: MovementEventKind);
}

impl MovementEventSink for Vec<MovementEventKind> {
    fn emit(&mut self, kind: MovementEventKind) {
        self.push(kind);
    }
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardEvents;

impl MovementEventSink for DiscardEvents {
    fn emit(&mut self, _kind: MovementEventKind) {}
}

/// A hazard touched the character.
#[derive(Event, Reflect, Debug, Clone, Copy, PartialEq)]
pub struct HazardContact {
    /// Character that was hit.
    pub character: Entity,
    /// Horizontal knockback sign, away from the hazard.
    pub direction: f32,
}

impl HazardContact {
    /// Knockback away from a hazard at `hazard_x` for a character at
    /// `character_x`.
    pub fn away_from(character: Entity, character_x: f32, hazard_x: f32) -> Self {
        let delta = character_x - hazard_x;
        Self {
            character,
            direction: if delta < 0.0 { -1.0 } else { 1.0 },
        }
    }
}

/// Rail contact phase.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RailPhase {
    /// Entered the rail zone.
    Entered,
    /// Left the rail zone.
    Exited,
}

/// The character entered or left a rail zone.
#[derive(Event, Reflect, Debug, Clone, Copy, PartialEq)]
pub struct RailContact {
    /// Character touching the rail.
    pub character: Entity,
    /// Enter or exit.
    pub phase: RailPhase,
}

/// The character touched a trampoline.
#[derive(Event, Reflect, Debug, Clone, Copy, PartialEq)]
pub struct TrampolineContact {
    /// Character that touched the trampoline.
    pub character: Entity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_sink_collects_in_order() {
        let mut sink: Vec<MovementEventKind> = Vec::new();
        sink.emit(MovementEventKind::JumpInitiated);
        sink.emit(MovementEventKind::Landed);
        assert_eq!(
            sink,
            vec![MovementEventKind::JumpInitiated, MovementEventKind::Landed]
        );
    }

    #[test]
    fn hazard_direction_points_away() {
        let character = Entity::from_raw(1);
        assert_eq!(HazardContact::away_from(character, 5.0, 2.0).direction, 1.0);
        assert_eq!(HazardContact::away_from(character, -1.0, 2.0).direction, -1.0);
        // Directly on top: pushed right
        assert_eq!(HazardContact::away_from(character, 2.0, 2.0).direction, 1.0);
    }
}
