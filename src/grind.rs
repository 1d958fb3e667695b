//! Rail grinding.
//!
//! Entering a rail zone while descending takes the body: gravity scale goes
//! to zero (the previous value is saved) and the character rides the rail
//! at `grind_speed` in its facing direction. Leaving the zone or pressing
//! jump hands the body back with the saved gravity scale restored.

use bevy::prelude::*;

use crate::config::MovementConfig;
use crate::events::{MovementEventKind, MovementEventSink};
use crate::motor::KinematicBody;
use crate::state::MotionState;

/// Per-character grind state.
#[derive(Reflect, Debug, Clone, Default, PartialEq)]
pub struct GrindState {
    /// Riding a rail.
    pub grinding: bool,
    /// Body gravity scale before the grind started.
    pub saved_gravity_scale: f32,
}

impl GrindState {
    /// Whether the grind subsystem owns the body.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.grinding
    }

    /// Try to start grinding. Only succeeds while descending and not
    /// already grinding.
    pub fn enter(
        &mut self,
        motion: &mut MotionState,
        body: &mut KinematicBody,
        config: &MovementConfig,
        sink: &mut dyn MovementEventSink,
    ) -> bool {
        if self.grinding || body.velocity.y >= 0.0 {
            return false;
        }

        self.grinding = true;
        self.saved_gravity_scale = body.gravity_scale;
        body.gravity_scale = 0.0;

        // A rail counts as ground for the jump economy
        motion.clear_jump_phase();
        self.ride(motion, body, config);

        debug!(speed = body.velocity.x, "grind started");
        sink.emit(MovementEventKind::GrindStarted);
        true
    }

    /// Hold the body on the rail.
    pub fn ride(&self, motion: &MotionState, body: &mut KinematicBody, config: &MovementConfig) {
        body.velocity = Vec2::new(config.grind_speed * motion.facing.sign(), 0.0);
    }

    /// Leave the rail and restore the saved gravity scale.
    pub fn exit(&mut self, body: &mut KinematicBody, sink: &mut dyn MovementEventSink) {
        if !self.grinding {
            return;
        }
        self.grinding = false;
        body.gravity_scale = self.saved_gravity_scale;
        debug!("grind stopped");
        sink.emit(MovementEventKind::GrindStopped);
    }

    /// Jump off the rail. The launch counts as the first jump.
    pub fn jump(
        &mut self,
        motion: &mut MotionState,
        body: &mut KinematicBody,
        config: &MovementConfig,
        sink: &mut dyn MovementEventSink,
    ) {
        self.exit(body, sink);

        body.velocity.y = config.grind_jump_force;

        motion.clear_jump_phase();
        motion.jumping = true;
        motion.jumps_used = 1;
        motion.horizontal_velocity = body.velocity.x;
        motion.vertical_velocity = config.grind_jump_force;
        motion.jump_buffer.clear();
        motion.jump_released_during_buffer = false;

        sink.emit(MovementEventKind::GrindJumpPerformed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::DiscardEvents;
    use crate::state::Facing;

    fn descending(gravity_scale: f32) -> KinematicBody {
        KinematicBody {
            velocity: Vec2::new(4.0, -6.0),
            gravity_scale,
        }
    }

    // ==================== Entry Tests ====================

    #[test]
    fn enter_takes_body() {
        let config = MovementConfig::default();
        let mut grind = GrindState::default();
        let mut motion = MotionState {
            facing: Facing::Left,
            jumps_used: 2,
            jumping: true,
            ..Default::default()
        };
        let mut body = descending(1.5);
        let mut events: Vec<MovementEventKind> = Vec::new();

        assert!(grind.enter(&mut motion, &mut body, &config, &mut events));
        assert!(grind.is_active());
        assert_eq!(body.gravity_scale, 0.0);
        assert_eq!(body.velocity, Vec2::new(-config.grind_speed, 0.0));
        assert_eq!(motion.jumps_used, 0);
        assert!(!motion.jumping);
        assert_eq!(events, vec![MovementEventKind::GrindStarted]);
    }

    #[test]
    fn enter_requires_descent() {
        let config = MovementConfig::default();
        let mut grind = GrindState::default();
        let mut motion = MotionState::default();
        let mut body = KinematicBody::new(Vec2::new(4.0, 2.0));

        assert!(!grind.enter(&mut motion, &mut body, &config, &mut DiscardEvents));
        assert!(!grind.is_active());
        assert_eq!(body.gravity_scale, 1.0);
    }

    #[test]
    fn enter_while_grinding_is_ignored() {
        let config = MovementConfig::default();
        let mut grind = GrindState::default();
        let mut motion = MotionState::default();
        let mut body = descending(2.0);
        grind.enter(&mut motion, &mut body, &config, &mut DiscardEvents);

        body.velocity.y = -1.0;
        assert!(!grind.enter(&mut motion, &mut body, &config, &mut DiscardEvents));
        // Saved scale is not overwritten by the zeroed one
        assert_eq!(grind.saved_gravity_scale, 2.0);
    }

    // ==================== Exit Tests ====================

    #[test]
    fn enter_exit_round_trip_restores_gravity_scale() {
        let config = MovementConfig::default();
        let mut grind = GrindState::default();
        let mut motion = MotionState::default();
        let mut body = descending(0.73);
        let mut events: Vec<MovementEventKind> = Vec::new();

        grind.enter(&mut motion, &mut body, &config, &mut events);
        grind.exit(&mut body, &mut events);

        assert!(!grind.is_active());
        assert_eq!(body.gravity_scale, 0.73);
        assert_eq!(
            events,
            vec![MovementEventKind::GrindStarted, MovementEventKind::GrindStopped]
        );

        // Second exit is a no-op
        grind.exit(&mut body, &mut events);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn jump_launches_off_rail() {
        let config = MovementConfig::default();
        let mut grind = GrindState::default();
        let mut motion = MotionState::default();
        let mut body = descending(1.0);
        let mut events: Vec<MovementEventKind> = Vec::new();

        grind.enter(&mut motion, &mut body, &config, &mut events);
        grind.jump(&mut motion, &mut body, &config, &mut events);

        assert!(!grind.is_active());
        assert_eq!(body.gravity_scale, 1.0);
        assert_eq!(body.velocity, Vec2::new(config.grind_speed, config.grind_jump_force));
        assert!(motion.jumping);
        assert_eq!(motion.jumps_used, 1);
        assert_eq!(motion.vertical_velocity, config.grind_jump_force);
        assert_eq!(
            events,
            vec![
                MovementEventKind::GrindStarted,
                MovementEventKind::GrindStopped,
                MovementEventKind::GrindJumpPerformed
            ]
        );
    }
}
