//! Wire payloads of the precise overlap service
//!
//! Request: two keyed structures (`object_a`, `object_b`), each mapping a
//! model id to a pose. Response: either a single `contain_overlap` flag or a
//! list of per-pair results.

use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};

use super::OverlapServiceError;
use crate::foundation::math::{Transform, Vec3};
use crate::scene::RESERVED_W;

/// Status string the service uses for pairs it could not evaluate
pub const STATUS_ERROR: &str = "error";

/// Pose of one model as sent to the service
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectPose {
    /// Position x, y, z plus a reserved placeholder coordinate
    pub position: [f32; 4],
    /// Euler rotation in radians
    pub rotation: [f32; 3],
    /// Per-axis scale
    pub scale: [f32; 3],
}

impl ObjectPose {
    /// Pose of a transform
    pub fn from_transform(transform: &Transform) -> Self {
        let p = transform.position;
        Self {
            position: [p.x, p.y, p.z, RESERVED_W],
            rotation: transform.rotation.into(),
            scale: transform.scale.into(),
        }
    }

    /// Transform described by this pose
    pub fn to_transform(&self) -> Transform {
        Transform {
            position: Vec3::new(self.position[0], self.position[1], self.position[2]),
            rotation: Vec3::from(self.rotation),
            scale: Vec3::from(self.scale),
        }
    }
}

/// Model id to pose
pub type PoseMap = BTreeMap<String, ObjectPose>;

/// One precise overlap query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlapRequest {
    /// The moving object
    pub object_a: PoseMap,
    /// The neighbor (or neighbors, when batched)
    pub object_b: PoseMap,
}

impl OverlapRequest {
    /// Query one moving model against one neighbor model
    pub fn pair(
        model_a: &str,
        transform_a: &Transform,
        model_b: &str,
        transform_b: &Transform,
    ) -> Self {
        let mut object_a = PoseMap::new();
        object_a.insert(model_a.to_string(), ObjectPose::from_transform(transform_a));
        let mut object_b = PoseMap::new();
        object_b.insert(model_b.to_string(), ObjectPose::from_transform(transform_b));
        Self { object_a, object_b }
    }

    /// Encode as JSON
    pub fn to_json(&self) -> Result<String, OverlapServiceError> {
        serde_json::to_string(self).map_err(|e| OverlapServiceError::Protocol(e.to_string()))
    }
}

/// Result for one evaluated pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairResult {
    /// `"ok"`, `"error"`, or any other service-defined status
    pub status: String,
    /// Whether the meshes overlap
    pub overlap: bool,
}

impl PairResult {
    /// Successful evaluation
    pub fn ok(overlap: bool) -> Self {
        Self {
            status: "ok".to_string(),
            overlap,
        }
    }

    /// Check if the service failed to evaluate this pair
    pub fn is_error(&self) -> bool {
        self.status == STATUS_ERROR
    }
}

/// Response of the precise overlap service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OverlapResponse {
    /// Single verdict for the whole request
    Single {
        /// Whether any overlap exists
        contain_overlap: bool,
    },
    /// Per-pair results wrapped in an object
    Wrapped {
        /// Per-pair results
        results: Vec<PairResult>,
    },
    /// Bare list of per-pair results
    Batch(Vec<PairResult>),
}

impl OverlapResponse {
    /// Decode a response body
    pub fn from_json(body: &str) -> Result<Self, OverlapServiceError> {
        serde_json::from_str(body).map_err(|e| OverlapServiceError::Protocol(e.to_string()))
    }

    /// Whether this response means the objects collide
    ///
    /// A pair with a non-error status and `overlap = true` is a collision. A
    /// pair the service failed to evaluate, or an empty result list, gives no
    /// answer at all and is also reported as a collision.
    pub fn has_overlap(&self) -> bool {
        match self {
            Self::Single { contain_overlap } => *contain_overlap,
            Self::Wrapped { results } | Self::Batch(results) => {
                results.is_empty() || results.iter().any(|pair| pair.is_error() || pair.overlap)
            }
        }
    }
}
