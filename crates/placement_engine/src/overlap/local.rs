//! In-process reference overlap service
//!
//! Answers precise queries from a catalog of model-space boxes using
//! oriented-box SAT. Useful when no remote service is reachable (offline
//! sessions, tests, the demo app) and as a behavioural reference for one.

use log::debug;

use super::{ObjectPose, OverlapRequest, OverlapResponse, OverlapService, OverlapServiceError, PairResult};
use crate::physics::OrientedBox;
use crate::scene::ModelCatalog;

/// Overlap service evaluating oriented boxes locally
#[derive(Debug, Clone, Default)]
pub struct LocalOverlapService {
    catalog: ModelCatalog,
}

impl LocalOverlapService {
    /// Create a service over a catalog keyed by model id
    pub fn new(catalog: ModelCatalog) -> Self {
        Self { catalog }
    }

    fn oriented(&self, model_id: &str, pose: &ObjectPose) -> Result<OrientedBox, OverlapServiceError> {
        let local = self
            .catalog
            .get(model_id)
            .ok_or_else(|| OverlapServiceError::MissingModel(model_id.to_string()))?;
        Ok(OrientedBox::from_local(local, &pose.to_transform()))
    }

    /// Evaluate a request synchronously
    pub fn evaluate(&self, request: &OverlapRequest) -> Result<OverlapResponse, OverlapServiceError> {
        if request.object_a.is_empty() || request.object_b.is_empty() {
            return Err(OverlapServiceError::Protocol("request has an empty side".to_string()));
        }

        let mut results = Vec::with_capacity(request.object_a.len() * request.object_b.len());
        for (model_a, pose_a) in &request.object_a {
            let box_a = self.oriented(model_a, pose_a)?;
            for (model_b, pose_b) in &request.object_b {
                let box_b = self.oriented(model_b, pose_b)?;
                let overlap = box_a.intersects(&box_b);
                debug!("Local overlap {} vs {}: {}", model_a, model_b, overlap);
                results.push(PairResult::ok(overlap));
            }
        }

        Ok(OverlapResponse::Batch(results))
    }
}

impl OverlapService for LocalOverlapService {
    async fn check_overlap(&self, request: &OverlapRequest) -> Result<OverlapResponse, OverlapServiceError> {
        self.evaluate(request)
    }
}
