//! Wall slide and wall jump.
//!
//! States: idle, sliding (with a short stick at the start), and the
//! post-jump freeze during which wall detection is suspended so the wall
//! just left cannot be caught again mid-jump.
//!
//! While sliding or frozen this subsystem owns the body velocity.

use bevy::prelude::*;

use crate::config::{MovementConfig, WallSlidePolicy};
use crate::events::{MovementEventKind, MovementEventSink};
use crate::intent::MovementInput;
use crate::motor::KinematicBody;
use crate::state::{Facing, MotionState};
use crate::timers::Countdown;

/// Per-character wall interaction state.
#[derive(Reflect, Debug, Clone, Default, PartialEq)]
pub struct WallState {
    /// Wall found in the facing direction this tick.
    pub touching: bool,
    /// Sliding on a wall.
    pub sliding: bool,
    /// Side of the wall being slid on.
    pub side: Facing,
    /// Hold at zero velocity when a wall is first caught.
    pub stick: Countdown,
    /// Wall detection suspended after a wall jump.
    pub freeze: Countdown,
    /// Identity of the touched wall.
    pub surface: Option<Entity>,
    /// Wall the last wall jump left from. `None` means no memory, so any
    /// wall counts as new.
    pub last_wall_jumped_from: Option<Entity>,
}

impl WallState {
    /// Whether the wall subsystem owns the body this tick.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.sliding || self.freeze.is_running()
    }

    /// Whether the touched wall differs from the one last jumped from.
    pub fn is_new_wall(&self) -> bool {
        match self.last_wall_jumped_from {
            None => true,
            Some(last) => self.surface != Some(last),
        }
    }

    /// Forget the last wall jumped from.
    #[inline]
    pub fn forget_last_wall(&mut self) {
        self.last_wall_jumped_from = None;
    }

    /// Record the probe result for this tick.
    pub fn sense(&mut self, touching: bool, surface: Option<Entity>) {
        self.touching = touching;
        self.surface = if touching { surface } else { None };
    }

    /// Whether a slide may start or continue this tick.
    pub fn can_slide(
        &self,
        motion: &MotionState,
        body: &KinematicBody,
        input: &MovementInput,
        config: &MovementConfig,
    ) -> bool {
        if !self.touching || motion.grounded || body.velocity.y > 0.0 {
            return false;
        }
        let toward = motion.facing.sign();
        match config.wall_slide_policy {
            WallSlidePolicy::RequirePush => input.pushes_toward(toward),
            WallSlidePolicy::ContactOnly => !input.pushes_toward(-toward),
        }
    }

    /// Leave the wall. Emits the stop notification if a slide was active.
    pub fn stop_sliding(&mut self, sink: &mut dyn MovementEventSink) {
        if self.sliding {
            self.sliding = false;
            self.stick.clear();
            debug!("wall slide stopped");
            sink.emit(MovementEventKind::WallSlideStopped);
        }
    }

    /// Advance the wall subsystem by one fixed tick.
    ///
    /// Does nothing while the post-jump freeze runs; the caller ticks the
    /// freeze countdown.
    pub fn update(
        &mut self,
        motion: &mut MotionState,
        body: &mut KinematicBody,
        input: &MovementInput,
        config: &MovementConfig,
        dt: f32,
        sink: &mut dyn MovementEventSink,
    ) {
        if self.freeze.is_running() {
            return;
        }

        let can_slide = self.can_slide(motion, body, input, config);
        if can_slide && !self.sliding {
            self.sliding = true;
            self.side = motion.facing;
            if self.is_new_wall() {
                motion.jumps_used = 0;
            }
            self.stick.arm(config.wall_stick_time);
            debug!(side = ?self.side, "wall slide started");
            sink.emit(MovementEventKind::WallSlideStarted);
        } else if !can_slide {
            self.stop_sliding(sink);
        }

        if !self.sliding {
            return;
        }

        if input.jump_pressed {
            self.wall_jump(motion, body, config, sink);
            return;
        }

        self.stick.tick(dt);
        if self.stick.is_running() {
            body.velocity = Vec2::ZERO;
        } else {
            let vy = (body.velocity.y + config.gravity() * dt).max(-config.wall_slide_speed);
            body.velocity = Vec2::new(0.0, vy);
        }
    }

    /// Jump away from the wall. Consumes every air jump.
    pub fn wall_jump(
        &mut self,
        motion: &mut MotionState,
        body: &mut KinematicBody,
        config: &MovementConfig,
        sink: &mut dyn MovementEventSink,
    ) {
        let away = self.side.flipped();
        self.stop_sliding(sink);

        motion.clear_jump_phase();
        motion.jumping = true;
        motion.jumps_used = config.jumps_allowed;
        motion.horizontal_velocity = 0.0;
        motion.vertical_velocity = 0.0;
        motion.jump_buffer.clear();
        motion.jump_released_during_buffer = false;
        motion.turn(away);

        // Unit mass: the impulse is the new velocity
        body.velocity = Vec2::new(config.wall_jump_force.x * away.sign(), config.wall_jump_force.y);

        self.last_wall_jumped_from = self.surface;
        self.freeze.arm(config.wall_jump_input_freeze_time);
        debug!(direction = ?away, "wall jump");
        sink.emit(MovementEventKind::WallJumpPerformed);
    }
}
