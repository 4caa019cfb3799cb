//! Serialized scene snapshot
//!
//! A flat list of placed objects with their transforms, in the same layout
//! the overlap service uses for poses (position carries a reserved fourth
//! coordinate).

use serde::{Serialize, Deserialize};
use thiserror::Error;

use super::{CategoryFlags, PlacedObject, RoomBoundaryDocument};
use crate::foundation::math::{Transform, Vec3};

/// Value written into the reserved fourth position coordinate
pub const RESERVED_W: f32 = 0.0;

/// Snapshot errors
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// JSON encoding or decoding failed
    #[error("Snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One placed object in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    /// Catalog identifier
    pub catalog_id: String,
    /// Position x, y, z plus one reserved coordinate
    pub position: [f32; 4],
    /// Euler rotation in radians
    pub rotation: [f32; 3],
    /// Per-axis scale
    pub scale: [f32; 3],
    /// Object can hold other objects
    pub is_container: bool,
    /// Object is assembled from several parts
    pub is_composite: bool,
}

impl ObjectSnapshot {
    /// Capture a placed object
    pub fn from_object(object: &PlacedObject) -> Self {
        let transform = object.transform();
        let flags = object.category().flags();
        Self {
            catalog_id: object.catalog_id().to_string(),
            position: [transform.position.x, transform.position.y, transform.position.z, RESERVED_W],
            rotation: transform.rotation.into(),
            scale: transform.scale.into(),
            is_container: flags.contains(CategoryFlags::CONTAINER),
            is_composite: flags.contains(CategoryFlags::COMPOSITE),
        }
    }

    /// Transform stored in this snapshot
    pub fn transform(&self) -> Transform {
        Transform {
            position: Vec3::new(self.position[0], self.position[1], self.position[2]),
            rotation: Vec3::from(self.rotation),
            scale: Vec3::from(self.scale),
        }
    }
}

/// Snapshot of a whole scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    /// Room the objects were placed in
    pub room: RoomBoundaryDocument,
    /// Placed objects in insertion order
    pub objects: Vec<ObjectSnapshot>,
}

impl SceneSnapshot {
    /// Encode as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode from JSON
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}
