//! Axis-aligned bounding boxes
//!
//! The collision detector keeps one world-space box per placed object plus
//! the room box; everything coarse is answered from these.

use serde::{Serialize, Deserialize};

use crate::foundation::math::{Point3, Transform, Vec3};

/// Axis-aligned bounding box for spatial queries
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Smallest AABB enclosing all points, `None` for an empty slice
    pub fn from_points(points: &[Point3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut min = first.coords;
        let mut max = first.coords;

        for point in rest {
            min = min.inf(&point.coords);
            max = max.sup(&point.coords);
        }

        Some(Self { min, max })
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Get the full size of the AABB
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Check that both corners are finite
    pub fn is_finite(&self) -> bool {
        self.min.iter().chain(self.max.iter()).all(|c| c.is_finite())
    }

    /// Check if this AABB and another share a region of positive volume
    ///
    /// Boxes that only touch along a face, edge or corner do not overlap, so
    /// furniture can stand flush against other furniture.
    pub fn overlaps(&self, other: &AABB) -> bool {
        self.min.x < other.max.x && self.max.x > other.min.x &&
        self.min.y < other.max.y && self.max.y > other.min.y &&
        self.min.z < other.max.z && self.max.z > other.min.z
    }

    /// Euclidean gap between the closest faces of two boxes (0 if they touch
    /// or overlap)
    pub fn gap_to(&self, other: &AABB) -> f32 {
        let gap = (self.min - other.max)
            .sup(&(other.min - self.max))
            .sup(&Vec3::zeros());
        gap.magnitude()
    }

    /// The eight corners of the box
    pub fn corners(&self) -> [Point3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Point3::new(lo.x, lo.y, lo.z),
            Point3::new(hi.x, lo.y, lo.z),
            Point3::new(lo.x, hi.y, lo.z),
            Point3::new(hi.x, hi.y, lo.z),
            Point3::new(lo.x, lo.y, hi.z),
            Point3::new(hi.x, lo.y, hi.z),
            Point3::new(lo.x, hi.y, hi.z),
            Point3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// World-space AABB of this (model-space) box after applying a transform
    pub fn transformed(&self, transform: &Transform) -> AABB {
        let corners = self.corners().map(|corner| transform.transform_point(corner));
        // Eight corners are never empty
        Self::from_points(&corners).unwrap_or(*self)
    }
}
