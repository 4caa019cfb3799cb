//! Debug shape store
//!
//! Keyed shapes stay until replaced or removed; flashes fade out after a few
//! seconds. The renderer pulls [`DebugDrawSystem::shapes`] once per frame.

use std::collections::BTreeMap;

use crate::foundation::math::{Vec3, Vec4};
use crate::scene::{ObjectId, AABB};

/// Slot a keyed shape lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShapeKey {
    /// Room boundary
    Room,
    /// Bounding box of one placed object
    Bounds(ObjectId),
}

/// Something the renderer should draw as an overlay
#[derive(Clone, Debug, PartialEq)]
pub enum DebugShape {
    /// Line segment
    Line {
        /// Start point
        start: Vec3,
        /// End point
        end: Vec3,
        /// RGBA color
        color: Vec4,
    },

    /// World-space box
    Box {
        /// Box to draw
        bounds: AABB,
        /// RGBA color
        color: Vec4,
        /// Draw edges only
        wireframe: bool,
    },
}

impl DebugShape {
    /// Get the shape color
    pub fn color(&self) -> Vec4 {
        match self {
            Self::Line { color, .. } | Self::Box { color, .. } => *color,
        }
    }
}

#[derive(Clone, Debug)]
struct Flash {
    shape: DebugShape,
    remaining: f32,
}

/// Shapes for the current frame
#[derive(Debug)]
pub struct DebugDrawSystem {
    keyed: BTreeMap<ShapeKey, DebugShape>,
    flashes: Vec<Flash>,

    /// Master enable/disable flag
    pub enabled: bool,
}

impl DebugDrawSystem {
    /// Create an empty, enabled store
    pub fn new() -> Self {
        Self {
            keyed: BTreeMap::new(),
            flashes: Vec::new(),
            enabled: true,
        }
    }

    /// Put a shape in a slot, replacing what was there
    pub fn set(&mut self, key: ShapeKey, shape: DebugShape) {
        if self.enabled {
            self.keyed.insert(key, shape);
        }
    }

    /// Shape in a slot
    pub fn get(&self, key: ShapeKey) -> Option<&DebugShape> {
        self.keyed.get(&key)
    }

    /// Empty a slot
    pub fn remove(&mut self, key: ShapeKey) -> Option<DebugShape> {
        self.keyed.remove(&key)
    }

    /// Show a shape for `seconds`
    pub fn flash(&mut self, shape: DebugShape, seconds: f32) {
        if self.enabled && seconds > 0.0 {
            self.flashes.push(Flash { shape, remaining: seconds });
        }
    }

    /// Age flashes by `delta_time` seconds and drop the expired ones
    pub fn advance(&mut self, delta_time: f32) {
        self.flashes.retain_mut(|flash| {
            flash.remaining -= delta_time;
            flash.remaining > 0.0
        });
    }

    /// Everything to draw: keyed shapes in key order, then flashes
    pub fn shapes(&self) -> impl Iterator<Item = &DebugShape> {
        let enabled = self.enabled;
        self.keyed
            .values()
            .chain(self.flashes.iter().map(|flash| &flash.shape))
            .filter(move |_| enabled)
    }

    /// Number of shapes held
    pub fn len(&self) -> usize {
        self.keyed.len() + self.flashes.len()
    }

    /// Check if nothing is held
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DebugDrawSystem {
    fn default() -> Self {
        Self::new()
    }
}
