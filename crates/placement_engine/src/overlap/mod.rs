//! Precise (mesh-level) overlap checks
//!
//! The exact answer comes from a remote service. Everything in here is
//! fail-closed: transport errors, unparseable responses and missing model
//! metadata all come out as "collision present".

mod client;
mod local;
mod protocol;

pub use client::{JsonOverlapClient, OverlapTransport, TransportError};
pub use local::LocalOverlapService;
pub use protocol::{ObjectPose, OverlapRequest, OverlapResponse, PairResult, PoseMap, STATUS_ERROR};

use std::future::Future;

use log::warn;
use thiserror::Error;

use crate::scene::ObjectId;

/// Errors from the precise overlap round trip
///
/// These never reach a move outcome: [`resolve_precise`] folds every one of
/// them into a collision.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OverlapServiceError {
    /// The request could not be delivered or the reply never arrived
    #[error("Overlap service transport error: {0}")]
    Transport(String),

    /// The request or response could not be encoded or decoded
    #[error("Overlap service protocol error: {0}")]
    Protocol(String),

    /// An object has no model id, or the service does not know the model
    #[error("Missing model metadata: {0}")]
    MissingModel(String),
}

/// Remote service answering exact overlap queries
pub trait OverlapService {
    /// Evaluate one request
    fn check_overlap(
        &self,
        request: &OverlapRequest,
    ) -> impl Future<Output = Result<OverlapResponse, OverlapServiceError>>;
}

/// One neighbor to check against the moving object
///
/// The request is built up front, so a neighbor without model metadata is
/// carried as an error instead of being skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct PreciseRequest {
    /// Coarse-overlapping neighbor
    pub neighbor: ObjectId,
    /// Query to send, or the reason it cannot be built
    pub request: Result<OverlapRequest, OverlapServiceError>,
}

/// Outcome of a precise overlap check
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CollisionResult {
    /// Whether any neighbor collides (or could not be ruled out)
    pub has_collision: bool,
    /// Neighbors that collide or could not be ruled out
    pub colliding_ids: Vec<ObjectId>,
}

impl CollisionResult {
    /// No collision with anything
    pub fn clear() -> Self {
        Self::default()
    }

    /// Collision with the given neighbors
    pub fn colliding(colliding_ids: Vec<ObjectId>) -> Self {
        Self {
            has_collision: true,
            colliding_ids,
        }
    }

    /// Build from the list of colliding neighbors
    pub fn from_colliding(colliding_ids: Vec<ObjectId>) -> Self {
        Self {
            has_collision: !colliding_ids.is_empty(),
            colliding_ids,
        }
    }
}

/// Run every precise request against the service, one at a time
///
/// Any error for a neighbor counts as a collision with that neighbor.
pub async fn resolve_precise<S: OverlapService>(
    service: &S,
    requests: &[PreciseRequest],
) -> CollisionResult {
    let mut colliding = Vec::new();

    for precise in requests {
        let overlap = match &precise.request {
            Ok(request) => match service.check_overlap(request).await {
                Ok(response) => response.has_overlap(),
                Err(e) => {
                    warn!("Precise check against {:?} failed, assuming collision: {}", precise.neighbor, e);
                    true
                }
            },
            Err(e) => {
                warn!("Cannot query overlap with {:?}, assuming collision: {}", precise.neighbor, e);
                true
            }
        };

        if overlap {
            colliding.push(precise.neighbor);
        }
    }

    CollisionResult::from_colliding(colliding)
}
