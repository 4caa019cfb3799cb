//! Math utilities and types
//!
//! Provides the fundamental math types used for placement: vectors, points,
//! quaternions and the position/rotation/scale transform of a placed object.

pub use nalgebra::{Vector3, Vector4, Matrix3, Matrix4, Quaternion, Unit};

use serde::{Serialize, Deserialize};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type (RGBA colors)
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Coordinate axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Horizontal X axis
    X,
    /// Vertical Y axis (up)
    Y,
    /// Horizontal Z axis
    Z,
}

impl Axis {
    /// Component index of this axis in a [`Vec3`]
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// Unit vector along the positive direction of this axis
    pub fn unit(self) -> Vec3 {
        let mut v = Vec3::zeros();
        v[self.index()] = 1.0;
        v
    }
}

/// Transform representing position, rotation, and scale of a placed object
///
/// Rotation is an Euler triple in radians (roll about X, pitch about Y,
/// yaw about Z), which is also the form the overlap service expects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Position in 3D space (Y-up)
    pub position: Vec3,

    /// Euler rotation in radians
    pub rotation: Vec3,

    /// Scale factors per axis
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Builder pattern: Set rotation (Euler radians)
    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Builder pattern: Set scale (uniform)
    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::new(scale, scale, scale);
        self
    }

    /// Builder pattern: Set scale (non-uniform)
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Rotation as a unit quaternion
    pub fn quaternion(&self) -> Quat {
        Quat::from_euler_angles(self.rotation.x, self.rotation.y, self.rotation.z)
    }

    /// Rotation as a 3x3 matrix
    pub fn rotation_matrix(&self) -> Mat3 {
        self.quaternion().to_rotation_matrix().into_inner()
    }

    /// Convert to a transformation matrix (TRS order)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.quaternion().to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Apply this transform to a model-space point
    pub fn transform_point(&self, point: Point3) -> Point3 {
        self.to_matrix().transform_point(&point)
    }

    /// Check that every component is a finite number
    pub fn is_finite(&self) -> bool {
        [self.position, self.rotation, self.scale]
            .iter()
            .all(|v| v.iter().all(|c| c.is_finite()))
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_identity_keeps_points() {
        let transform = Transform::identity();
        let point = Point3::new(1.0, 2.0, 3.0);

        assert_relative_eq!(transform.transform_point(point), point, epsilon = EPSILON);
    }

    #[test]
    fn test_trs_order() {
        // Scale first, then rotate a quarter turn about Y, then translate
        let transform = Transform::from_position(Vec3::new(10.0, 0.0, 0.0))
            .with_rotation(Vec3::new(0.0, constants::HALF_PI, 0.0))
            .with_uniform_scale(2.0);

        let moved = transform.transform_point(Point3::new(1.0, 0.0, 0.0));

        assert_relative_eq!(moved, Point3::new(10.0, 0.0, -2.0), epsilon = EPSILON);
    }

    #[test]
    fn test_axis_unit_vectors() {
        assert_eq!(Axis::X.unit(), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(Axis::Y.unit(), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(Axis::Z.unit(), Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_non_finite_components_detected() {
        let transform = Transform::from_position(Vec3::new(1.0, 0.0, 0.0));
        assert!(transform.is_finite());

        assert!(!Transform::from_position(Vec3::new(f32::NAN, 0.0, 0.0)).is_finite());
        assert!(!transform.with_rotation(Vec3::new(0.0, f32::INFINITY, 0.0)).is_finite());
        assert!(!transform.with_uniform_scale(f32::NEG_INFINITY).is_finite());
    }
}
