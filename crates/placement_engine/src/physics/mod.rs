//! Physics module for placement validation
//!
//! Discrete validation only: room containment, coarse AABB overlap and the
//! precise overlap protocol. There is no simulation or collision response.

pub mod collision_detector;
pub mod obb;

pub use collision_detector::{CollisionDetector, ContainmentResult};
pub use obb::OrientedBox;
