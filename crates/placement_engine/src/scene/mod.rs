//! Scene data: bounding boxes, the room boundary, placed objects, the
//! renderer-facing geometry seam and the serialized snapshot.

mod aabb;
mod boundary;
mod geometry;
mod object;
mod snapshot;

pub use aabb::AABB;
pub use boundary::{RoomBoundary, RoomBoundaryDocument};
pub use geometry::{GeometryProvider, ModelBoundsGeometry, ModelCatalog, WorldGeometry};
pub use object::{CategoryFlags, ObjectCategory, ObjectDescriptor, ObjectId, PlacedObject};
pub use snapshot::{ObjectSnapshot, SceneSnapshot, SnapshotError, RESERVED_W};
