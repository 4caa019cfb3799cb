//! Collision-specific debug visualization
//!
//! Draws every registered bounding box (green when clear, red when the object
//! is flagged as colliding), the room boundary, and short-lived containment
//! correction arrows.

use crate::debug::draw::{DebugDrawSystem, DebugShape, ShapeKey};
use crate::foundation::math::{Vec3, Vec4};
use crate::scene::{ObjectId, AABB};

/// Length of a containment correction arrow in world units
const CORRECTION_ARROW_LENGTH: f32 = 0.5;

/// Seconds a correction arrow stays visible
const CORRECTION_ARROW_DURATION: f32 = 1.0;

/// Color scheme for collision visualization
#[derive(Clone, Debug)]
pub struct CollisionDebugColors {
    /// Room boundary
    pub boundary: Vec4,

    /// Bounding box of an object that is not colliding
    pub bounds_clear: Vec4,

    /// Bounding box of an object flagged as colliding
    pub bounds_colliding: Vec4,

    /// Containment correction arrows
    pub correction: Vec4,
}

impl Default for CollisionDebugColors {
    fn default() -> Self {
        Self {
            boundary: Vec4::new(0.5, 0.8, 1.0, 0.15),        // Light blue, transparent
            bounds_clear: Vec4::new(0.0, 1.0, 0.0, 0.3),     // Green, semi-transparent
            bounds_colliding: Vec4::new(1.0, 0.0, 0.0, 0.5), // Red, semi-transparent
            correction: Vec4::new(1.0, 1.0, 0.0, 1.0),       // Yellow
        }
    }
}

/// Debug overlay of the collision detector's state
#[derive(Debug, Default)]
pub struct CollisionDebugVisualizer {
    shapes: DebugDrawSystem,
    colors: CollisionDebugColors,
}

impl CollisionDebugVisualizer {
    /// Create a visualizer with the default colors
    pub fn new() -> Self {
        Self::default()
    }

    fn bounds_color(&self, colliding: bool) -> Vec4 {
        if colliding {
            self.colors.bounds_colliding
        } else {
            self.colors.bounds_clear
        }
    }

    /// Draw (or redraw) the bounding box of an object
    pub fn draw_bounds(&mut self, id: ObjectId, bounds: &AABB, colliding: bool) {
        let shape = DebugShape::Box {
            bounds: *bounds,
            color: self.bounds_color(colliding),
            wireframe: true,
        };
        self.shapes.set(ShapeKey::Bounds(id), shape);
    }

    /// Recolor an already drawn box without moving it
    pub fn set_colliding(&mut self, id: ObjectId, colliding: bool) {
        if let Some(DebugShape::Box { bounds, .. }) = self.shapes.get(ShapeKey::Bounds(id)) {
            let bounds = *bounds;
            self.draw_bounds(id, &bounds, colliding);
        }
    }

    /// Draw the room boundary
    pub fn draw_boundary(&mut self, room: &AABB) {
        let shape = DebugShape::Box {
            bounds: *room,
            color: self.colors.boundary,
            wireframe: true,
        };
        self.shapes.set(ShapeKey::Room, shape);
    }

    /// Flash an arrow showing which way to nudge an object back into the room
    pub fn draw_correction(&mut self, origin: Vec3, normal: Vec3) {
        let arrow = DebugShape::Line {
            start: origin,
            end: origin + normal * CORRECTION_ARROW_LENGTH,
            color: self.colors.correction,
        };
        self.shapes.flash(arrow, CORRECTION_ARROW_DURATION);
    }

    /// Drop the visualization of an object
    pub fn clear_object(&mut self, id: ObjectId) {
        self.shapes.remove(ShapeKey::Bounds(id));
    }

    /// Check if an object currently has a box drawn
    pub fn has_object(&self, id: ObjectId) -> bool {
        self.shapes.get(ShapeKey::Bounds(id)).is_some()
    }

    /// Expire correction arrows
    pub fn update(&mut self, delta_time: f32) {
        self.shapes.advance(delta_time);
    }

    /// Shapes to draw this frame
    pub fn shapes(&self) -> impl Iterator<Item = &DebugShape> {
        self.shapes.shapes()
    }

    /// Number of shapes held
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }
}
