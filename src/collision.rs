//! Swept-shape cast primitive.
//!
//! The motor never talks to a physics engine directly. It describes the box
//! casts it needs as [`ShapeCast`] requests and hands them to a
//! [`ShapeCaster`]. Backends usually pass a closure over their query pipeline.

use bevy::prelude::*;

/// Information about a shapecast collision.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CollisionData {
    /// Distance to the hit point (if hit).
    pub distance: f32,
    /// Normal of the surface at hit point.
    pub normal: Vec2,
    /// World position of the hit point.
    pub point: Vec2,
    /// Surface that was hit (if known). Used as the surface identity for
    /// wall memory.
    pub entity: Option<Entity>,
}

impl CollisionData {
    /// Create a collision result.
    pub fn new(distance: f32, normal: Vec2, point: Vec2, entity: Option<Entity>) -> Self {
        Self {
            distance,
            normal,
            point,
            entity,
        }
    }
}

/// A box swept along a direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeCast {
    /// Center of the box at the start of the sweep.
    pub origin: Vec2,
    /// Full width and height of the box.
    pub size: Vec2,
    /// Sweep direction (unit length).
    pub direction: Vec2,
    /// Maximum sweep distance.
    pub max_distance: f32,
    /// Only surfaces whose collision group intersects this mask are hit.
    pub layer_mask: u32,
}

impl ShapeCast {
    /// Create a cast request. The direction is normalized.
    pub fn new(origin: Vec2, size: Vec2, direction: Vec2, max_distance: f32, layer_mask: u32) -> Self {
        Self {
            origin,
            size,
            direction: direction.normalize_or_zero(),
            max_distance,
            layer_mask,
        }
    }
}

/// Anything that can answer a swept-box query.
pub trait ShapeCaster {
    /// Sweep `cast` and return the first blocking hit, if any.
    fn cast(&self, cast: &ShapeCast) -> Option<CollisionData>;
}

impl<F> ShapeCaster for F
where
    F: Fn(&ShapeCast) -> Option<CollisionData>,
{
    fn cast(&self, cast: &ShapeCast) -> Option<CollisionData> {
        self(cast)
    }
}
