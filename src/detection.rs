//! Collision probe.
//!
//! Once per fixed tick, before any motion is integrated, three box casts
//! classify the character's surroundings:
//! - down from the feet: grounded
//! - up from the top of the body (narrowed by `head_width`): bumped head
//! - sideways in the facing direction: touching a wall
//!
//! The probe only reports. It never changes motion state itself.

use bevy::prelude::*;

use crate::collision::{CollisionData, ShapeCast, ShapeCaster};
use crate::config::MovementConfig;
use crate::state::Facing;

/// World-space bounding boxes the casts start from.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct CharacterBounds {
    /// Box around the feet collider.
    pub feet: Rect,
    /// Box around the body collider.
    pub body: Rect,
}

impl CharacterBounds {
    /// Bounds where the feet share the body box.
    pub fn from_body(body: Rect) -> Self {
        Self { feet: body, body }
    }

    /// Bounds of a box centered on `center`.
    pub fn centered(center: Vec2, half_extents: Vec2) -> Self {
        Self::from_body(Rect::from_center_half_size(center, half_extents))
    }

    /// Check that both boxes have positive area.
    pub fn is_valid(&self) -> bool {
        let positive = |rect: &Rect| {
            let size = rect.size();
            size.x > 0.0 && size.y > 0.0 && size.is_finite()
        };
        positive(&self.feet) && positive(&self.body)
    }
}

/// Result of one probe pass.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct ProbeResult {
    /// Ground hit below the feet.
    #[reflect(ignore)]
    pub ground: Option<CollisionData>,
    /// Ceiling hit above the head.
    #[reflect(ignore)]
    pub head: Option<CollisionData>,
    /// Wall hit in the facing direction.
    #[reflect(ignore)]
    pub wall: Option<CollisionData>,
}

impl ProbeResult {
    /// A result with nothing around.
    pub fn airborne() -> Self {
        Self::default()
    }

    /// A result with only ground below.
    pub fn on_ground() -> Self {
        Self {
            ground: Some(CollisionData::new(0.0, Vec2::Y, Vec2::ZERO, None)),
            ..default()
        }
    }

    /// Builder: add a wall hit against `surface`.
    pub fn with_wall(mut self, surface: Option<Entity>) -> Self {
        self.wall = Some(CollisionData::new(0.0, Vec2::X, Vec2::ZERO, surface));
        self
    }

    /// Builder: add a ceiling hit.
    pub fn with_head_bump(mut self) -> Self {
        self.head = Some(CollisionData::new(0.0, Vec2::NEG_Y, Vec2::ZERO, None));
        self
    }

    /// Whether ground was found under the feet.
    #[inline]
    pub fn grounded(&self) -> bool {
        self.ground.is_some()
    }

    /// Whether a ceiling was found above the head.
    #[inline]
    pub fn bumped_head(&self) -> bool {
        self.head.is_some()
    }

    /// Whether a climbable wall was found in the facing direction.
    #[inline]
    pub fn touching_wall(&self) -> bool {
        self.wall.is_some()
    }

    /// Identity of the touched wall, if known.
    #[inline]
    pub fn wall_surface(&self) -> Option<Entity> {
        self.wall.and_then(|w| w.entity)
    }
}

/// Downward cast from the bottom of the feet.
pub fn ground_cast(bounds: &CharacterBounds, config: &MovementConfig) -> ShapeCast {
    let origin = Vec2::new(bounds.feet.center().x, bounds.feet.min.y);
    let size = Vec2::new(bounds.feet.width(), config.ground_detection_ray_length);
    ShapeCast::new(
        origin,
        size,
        Vec2::NEG_Y,
        config.ground_detection_ray_length,
        config.layers.ground,
    )
}

/// Upward cast from the top of the body, narrowed by `head_width`.
pub fn head_cast(bounds: &CharacterBounds, config: &MovementConfig) -> ShapeCast {
    let origin = Vec2::new(bounds.feet.center().x, bounds.body.max.y);
    let size = Vec2::new(
        bounds.feet.width() * config.head_width,
        config.head_detection_ray_length,
    );
    ShapeCast::new(
        origin,
        size,
        Vec2::Y,
        config.head_detection_ray_length,
        config.layers.ground,
    )
}

/// Sideways cast whose leading face starts flush with the body edge.
pub fn wall_cast(bounds: &CharacterBounds, facing: Facing, config: &MovementConfig) -> ShapeCast {
    let sign = facing.sign();
    let size = config.wall_check_size;
    let center = bounds.body.center();
    let inset = (bounds.body.half_size().x - size.x * 0.5).max(0.0);
    let origin = Vec2::new(center.x + sign * inset, center.y);
    ShapeCast::new(
        origin,
        size,
        Vec2::new(sign, 0.0),
        config.wall_check_distance,
        config.layers.wall,
    )
}

/// Run all three casts.
pub fn probe<C: ShapeCaster + ?Sized>(
    caster: &C,
    bounds: &CharacterBounds,
    facing: Facing,
    config: &MovementConfig,
) -> ProbeResult {
    ProbeResult {
        ground: caster.cast(&ground_cast(bounds, config)),
        head: caster.cast(&head_cast(bounds, config)),
        wall: caster.cast(&wall_cast(bounds, facing, config)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::ShapeCast;

    fn bounds() -> CharacterBounds {
        // 1 wide, 2 tall, feet at y = 0
        CharacterBounds::centered(Vec2::new(0.0, 1.0), Vec2::new(0.5, 1.0))
    }

    // ==================== Cast Geometry Tests ====================

    #[test]
    fn ground_cast_starts_at_feet() {
        let config = MovementConfig::default();
        let cast = ground_cast(&bounds(), &config);

        assert_eq!(cast.origin, Vec2::new(0.0, 0.0));
        assert_eq!(cast.direction, Vec2::NEG_Y);
        assert_eq!(cast.size.x, 1.0);
        assert_eq!(cast.max_distance, config.ground_detection_ray_length);
        assert_eq!(cast.layer_mask, config.layers.ground);
    }

    #[test]
    fn head_cast_is_narrowed() {
        let config = MovementConfig::default();
        let cast = head_cast(&bounds(), &config);

        assert_eq!(cast.origin, Vec2::new(0.0, 2.0));
        assert_eq!(cast.direction, Vec2::Y);
        assert!((cast.size.x - config.head_width).abs() < 1e-6);
    }

    #[test]
    fn wall_cast_follows_facing() {
        let config = MovementConfig::default();

        let right = wall_cast(&bounds(), Facing::Right, &config);
        assert_eq!(right.direction, Vec2::X);
        assert!(right.origin.x > 0.0);
        assert_eq!(right.layer_mask, config.layers.wall);

        let left = wall_cast(&bounds(), Facing::Left, &config);
        assert_eq!(left.direction, Vec2::NEG_X);
        assert!(left.origin.x < 0.0);

        // Leading face is flush with the body edge
        assert!((right.origin.x + right.size.x * 0.5 - 0.5).abs() < 1e-6);
    }

    // ==================== Probe Tests ====================

    #[test]
    fn probe_classifies_each_direction() {
        let config = MovementConfig::default();
        let wall = Entity::from_raw(7);
        // Floor below and a wall to the right, nothing above
        let world = move |cast: &ShapeCast| {
            if cast.direction == Vec2::NEG_Y {
                Some(CollisionData::new(0.01, Vec2::Y, cast.origin, None))
            } else if cast.direction == Vec2::X {
                Some(CollisionData::new(0.05, Vec2::NEG_X, cast.origin, Some(wall)))
            } else {
                None
            }
        };

        let result = probe(&world, &bounds(), Facing::Right, &config);
        assert!(result.grounded());
        assert!(!result.bumped_head());
        assert!(result.touching_wall());
        assert_eq!(result.wall_surface(), Some(wall));

        let result = probe(&world, &bounds(), Facing::Left, &config);
        assert!(!result.touching_wall());
    }

    #[test]
    fn probe_respects_layer_mask() {
        let config = MovementConfig::default();
        // Only answers casts against the wall layer
        let walls_only = |cast: &ShapeCast| {
            (cast.layer_mask & 0b0010 != 0).then(|| CollisionData::new(0.0, Vec2::NEG_X, cast.origin, None))
        };

        let result = probe(&walls_only, &bounds(), Facing::Right, &config);
        assert!(!result.grounded());
        assert!(result.touching_wall());
    }

    // ==================== Bounds Tests ====================

    #[test]
    fn bounds_validity() {
        assert!(bounds().is_valid());
        let flat = CharacterBounds::centered(Vec2::ZERO, Vec2::new(1.0, 0.0));
        assert!(!flat.is_valid());
    }

    #[test]
    fn probe_result_builders() {
        let surface = Entity::from_raw(3);
        let result = ProbeResult::on_ground().with_wall(Some(surface)).with_head_bump();
        assert!(result.grounded());
        assert!(result.bumped_head());
        assert_eq!(result.wall_surface(), Some(surface));
        assert_eq!(ProbeResult::airborne(), ProbeResult::default());
    }
}
