//! Debug module for visualization and debugging tools
//!
//! The renderer pulls these shapes once per frame; nothing here draws.

pub mod draw;
pub mod collision_debug;

pub use draw::{DebugShape, DebugDrawSystem, ShapeKey};
pub use collision_debug::{CollisionDebugColors, CollisionDebugVisualizer};
