//! Oriented bounding boxes
//!
//! Exact box-vs-box overlap via the Separating Axis Theorem. Tests 15
//! potential separating axes:
//! - 3 face normals of each box
//! - 9 edge-edge cross products

use crate::foundation::math::{Transform, Vec3};
use crate::scene::AABB;

/// Axes shorter than this are treated as degenerate and skipped
const EPSILON: f32 = 0.000001;

/// A box with arbitrary orientation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    /// World-space center
    pub center: Vec3,
    /// Unit axes of the box in world space
    pub axes: [Vec3; 3],
    /// Half-size along each axis
    pub half_extents: Vec3,
}

impl OrientedBox {
    /// Place a model-space box in the world
    pub fn from_local(local: &AABB, transform: &Transform) -> Self {
        let rotation = transform.rotation_matrix();
        let center = transform.transform_point(local.center().into()).coords;
        Self {
            center,
            axes: [
                rotation.column(0).into_owned(),
                rotation.column(1).into_owned(),
                rotation.column(2).into_owned(),
            ],
            half_extents: local.extents().component_mul(&transform.scale.abs()),
        }
    }

    /// Project onto an axis, returning (min, max)
    fn project(&self, axis: &Vec3) -> (f32, f32) {
        let center = self.center.dot(axis);
        let radius = (0..3)
            .map(|i| self.axes[i].dot(axis).abs() * self.half_extents[i])
            .sum::<f32>();
        (center - radius, center + radius)
    }

    /// Test if this box intersects another with positive volume
    ///
    /// Boxes that only touch are not intersecting.
    pub fn intersects(&self, other: &OrientedBox) -> bool {
        // Test axis (returns false if it's a separating axis)
        fn test_axis(a: &OrientedBox, b: &OrientedBox, axis: Vec3) -> bool {
            let axis_len_sq = axis.magnitude_squared();
            if axis_len_sq < EPSILON {
                return true; // Degenerate axis, skip
            }

            let normalized_axis = axis / axis_len_sq.sqrt();
            let (min1, max1) = a.project(&normalized_axis);
            let (min2, max2) = b.project(&normalized_axis);

            max1 > min2 && max2 > min1
        }

        for axis in self.axes.iter().chain(other.axes.iter()) {
            if !test_axis(self, other, *axis) {
                return false;
            }
        }

        for edge_a in &self.axes {
            for edge_b in &other.axes {
                if !test_axis(self, other, edge_a.cross(edge_b)) {
                    return false;
                }
            }
        }

        // No separating axis found = boxes intersect
        true
    }
}
