//! Room boundary
//!
//! One boundary per scene; immutable once built. Replacing it means building
//! a new value and handing it to the detector.

use serde::{Serialize, Deserialize};

use super::AABB;
use crate::foundation::math::Vec3;

/// Room boundary document: six named scalars, as stored in config files
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomBoundaryDocument {
    /// Minimum X (wall)
    pub min_x: f32,
    /// Maximum X (wall)
    pub max_x: f32,
    /// Minimum Y (floor)
    pub min_y: f32,
    /// Maximum Y (ceiling)
    pub max_y: f32,
    /// Minimum Z (wall)
    pub min_z: f32,
    /// Maximum Z (wall)
    pub max_z: f32,
}

impl RoomBoundaryDocument {
    /// Check that every axis has finite, non-inverted extents
    pub fn validate(&self) -> Result<(), String> {
        let axes = [
            ("x", self.min_x, self.max_x),
            ("y", self.min_y, self.max_y),
            ("z", self.min_z, self.max_z),
        ];

        for (name, min, max) in axes {
            if !min.is_finite() || !max.is_finite() {
                return Err(format!("room {} extents must be finite", name));
            }
            if min >= max {
                return Err(format!("room min_{0} ({1}) must be below max_{0} ({2})", name, min, max));
            }
        }

        Ok(())
    }
}

impl Default for RoomBoundaryDocument {
    /// A 10 x 3 x 10 room with the floor at y = 0
    fn default() -> Self {
        Self {
            min_x: -5.0,
            max_x: 5.0,
            min_y: 0.0,
            max_y: 3.0,
            min_z: -5.0,
            max_z: 5.0,
        }
    }
}

/// Room boundary used by containment checks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomBoundary {
    bounds: AABB,
}

impl RoomBoundary {
    /// Build a boundary from a document, rejecting inverted extents
    pub fn from_document(document: &RoomBoundaryDocument) -> Result<Self, String> {
        document.validate()?;
        Ok(Self {
            bounds: AABB::new(
                Vec3::new(document.min_x, document.min_y, document.min_z),
                Vec3::new(document.max_x, document.max_y, document.max_z),
            ),
        })
    }

    /// Convert back to the six-scalar document form
    pub fn to_document(&self) -> RoomBoundaryDocument {
        RoomBoundaryDocument {
            min_x: self.bounds.min.x,
            max_x: self.bounds.max.x,
            min_y: self.bounds.min.y,
            max_y: self.bounds.max.y,
            min_z: self.bounds.min.z,
            max_z: self.bounds.max.z,
        }
    }

    /// Boundary as a box
    pub fn as_aabb(&self) -> &AABB {
        &self.bounds
    }

    /// Floor height
    pub fn floor(&self) -> f32 {
        self.bounds.min.y
    }

    /// Ceiling height
    pub fn ceiling(&self) -> f32 {
        self.bounds.max.y
    }
}

impl Default for RoomBoundary {
    fn default() -> Self {
        let document = RoomBoundaryDocument::default();
        Self {
            bounds: AABB::new(
                Vec3::new(document.min_x, document.min_y, document.min_z),
                Vec3::new(document.max_x, document.max_y, document.max_z),
            ),
        }
    }
}
