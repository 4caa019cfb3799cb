//! Collision detector
//!
//! Single source of truth for "is this placement physically valid". Keeps one
//! world-space box per registered object plus the room boundary, and answers
//! three tiers of questions:
//!
//! 1. containment in the room (walls and ceiling)
//! 2. coarse overlap: pairwise AABB test against every other object
//! 3. precise overlap: delegated to an [`OverlapService`], fail-closed
//!
//! The coarse tier scans every registered box, which is fine for a furnished
//! room but not for thousands of objects.

use log::{debug, info, warn};
use slotmap::SecondaryMap;

use crate::config::{ConfigError, PlacementConfig};
use crate::debug::CollisionDebugVisualizer;
use crate::foundation::math::{Axis, Transform, Vec3};
use crate::overlap::{
    resolve_precise, CollisionResult, OverlapRequest, OverlapService, OverlapServiceError, PreciseRequest,
};
use crate::scene::{ObjectId, RoomBoundary, WorldGeometry, AABB};

/// Result of a containment check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainmentResult {
    /// Whether the object is inside the room
    pub contained: bool,
    /// First axis found in violation
    pub violated_axis: Option<Axis>,
    /// Direction to nudge the object back inside
    pub normal: Option<Vec3>,
}

impl ContainmentResult {
    /// Object is inside the room
    pub fn contained() -> Self {
        Self {
            contained: true,
            violated_axis: None,
            normal: None,
        }
    }

    /// Object pokes out along `axis`; `normal`, if any, points back into the room
    pub fn violated(axis: Axis, normal: Option<Vec3>) -> Self {
        Self {
            contained: false,
            violated_axis: Some(axis),
            normal,
        }
    }

    /// Object is not registered, so it cannot be contained
    pub fn unknown() -> Self {
        Self {
            contained: false,
            violated_axis: None,
            normal: None,
        }
    }
}

/// Data stored per registered object
#[derive(Debug, Clone)]
struct ColliderRecord {
    bounds: AABB,
    transform: Transform,
    model_id: Option<String>,
}

/// Spatial index of placed objects for one scene session
#[derive(Debug)]
pub struct CollisionDetector {
    boundary: RoomBoundary,
    epsilon: f32,
    colliders: SecondaryMap<ObjectId, ColliderRecord>,
    debug: Option<CollisionDebugVisualizer>,
}

impl CollisionDetector {
    /// Create a detector for a room with the given containment tolerance
    pub fn new(boundary: RoomBoundary, epsilon: f32) -> Self {
        Self {
            boundary,
            epsilon,
            colliders: SecondaryMap::new(),
            debug: None,
        }
    }

    /// Create a detector from a validated configuration
    pub fn from_config(config: &PlacementConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let boundary = RoomBoundary::from_document(&config.room).map_err(ConfigError::Invalid)?;
        let mut detector = Self::new(boundary, config.containment_epsilon);
        detector.set_debug_draw(config.debug_draw);
        Ok(detector)
    }

    /// Turn bounding-box debug drawing on or off
    pub fn set_debug_draw(&mut self, enabled: bool) {
        if !enabled {
            self.debug = None;
            return;
        }
        if self.debug.is_some() {
            return;
        }

        let mut viz = CollisionDebugVisualizer::new();
        viz.draw_boundary(self.boundary.as_aabb());
        for (id, record) in &self.colliders {
            viz.draw_bounds(id, &record.bounds, false);
        }
        self.debug = Some(viz);
    }

    /// Debug shapes, when debug drawing is on
    pub fn debug_visualizer(&self) -> Option<&CollisionDebugVisualizer> {
        self.debug.as_ref()
    }

    /// Mutable access to the debug shapes (to expire temporary ones)
    pub fn debug_visualizer_mut(&mut self) -> Option<&mut CollisionDebugVisualizer> {
        self.debug.as_mut()
    }

    /// Replace the room boundary
    ///
    /// Objects already registered are not re-validated; callers must do that.
    pub fn set_boundary(&mut self, boundary: RoomBoundary) {
        info!("Room boundary replaced: {:?}", boundary.to_document());
        self.boundary = boundary;
        if let Some(viz) = self.debug.as_mut() {
            viz.draw_boundary(self.boundary.as_aabb());
        }
    }

    /// Current room boundary
    pub fn boundary(&self) -> &RoomBoundary {
        &self.boundary
    }

    /// Containment tolerance
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Recompute and store the world AABB of `id` from its rendered geometry
    ///
    /// Registers the object on first call. Must be called after every
    /// transform mutation before any query about `id` is trusted. A `None`
    /// model id keeps the one already stored.
    pub fn update_box(
        &mut self,
        id: ObjectId,
        geometry: &WorldGeometry,
        transform: &Transform,
        model_id: Option<&str>,
    ) {
        let bounds = geometry.bounds().unwrap_or_else(|| {
            warn!("Object {:?} has no rendered geometry, using a point box at its position", id);
            AABB::new(transform.position, transform.position)
        });

        let model_id = match model_id {
            Some(model) => Some(model.to_string()),
            None => self.colliders.get(id).and_then(|record| record.model_id.clone()),
        };

        if let Some(viz) = self.debug.as_mut() {
            viz.draw_bounds(id, &bounds, false);
        }

        self.colliders.insert(id, ColliderRecord {
            bounds,
            transform: *transform,
            model_id,
        });
    }

    /// Recolor the debug box of an object
    pub fn highlight(&mut self, id: ObjectId, colliding: bool) {
        if let Some(viz) = self.debug.as_mut() {
            viz.set_colliding(id, colliding);
        }
    }

    /// Flash a correction arrow from the center of an object's box
    pub fn show_correction(&mut self, id: ObjectId, normal: Vec3) {
        let Some(record) = self.colliders.get(id) else {
            return;
        };
        if let Some(viz) = self.debug.as_mut() {
            viz.draw_correction(record.bounds.center(), normal);
        }
    }

    /// Stored world AABB of an object
    pub fn bounds(&self, id: ObjectId) -> Option<&AABB> {
        self.colliders.get(id).map(|record| &record.bounds)
    }

    /// Check whether an object stays inside the room
    ///
    /// Walls on X and Z are checked on both sides, Y only against the
    /// ceiling. The floor is intentionally not checked. Correction normals are
    /// always horizontal: a wall gives its inward normal, the ceiling gives
    /// the direction toward the room centre, or none when the object is
    /// already centred. Boxes with non-finite corners are never contained.
    pub fn check_containment(&self, id: ObjectId) -> ContainmentResult {
        let Some(record) = self.colliders.get(id) else {
            debug!("Containment query for unknown object {:?}", id);
            return ContainmentResult::unknown();
        };

        let room = self.boundary.as_aabb();
        let bounds = &record.bounds;
        let eps = self.epsilon;

        if !bounds.is_finite() {
            warn!("Object {:?} has non-finite bounds {:?}, treating as outside the room", id, bounds);
            let axis = [Axis::X, Axis::Y, Axis::Z]
                .into_iter()
                .find(|axis| !(bounds.min[axis.index()].is_finite() && bounds.max[axis.index()].is_finite()))
                .unwrap_or(Axis::X);
            return ContainmentResult::violated(axis, None);
        }

        for axis in [Axis::X, Axis::Z] {
            let i = axis.index();
            if bounds.max[i] > room.max[i] + eps {
                return Self::violation(axis, Some(-axis.unit()));
            }
            if bounds.min[i] < room.min[i] - eps {
                return Self::violation(axis, Some(axis.unit()));
            }
        }

        if bounds.max.y > room.max.y + eps {
            let mut toward_centre = room.center() - bounds.center();
            toward_centre.y = 0.0;
            return Self::violation(Axis::Y, toward_centre.try_normalize(eps));
        }

        ContainmentResult::contained()
    }

    fn violation(axis: Axis, normal: Option<Vec3>) -> ContainmentResult {
        debug!("Containment violated on {:?}, correction normal {:?}", axis, normal);
        ContainmentResult::violated(axis, normal)
    }

    /// Objects whose boxes overlap the box of `id`
    pub fn coarse_neighbors(&self, id: ObjectId) -> Vec<ObjectId> {
        let Some(record) = self.colliders.get(id) else {
            return Vec::new();
        };

        self.colliders
            .iter()
            .filter(|(other, other_record)| *other != id && record.bounds.overlaps(&other_record.bounds))
            .map(|(other, _)| other)
            .collect()
    }

    /// Check if the box of `id` overlaps any other registered box
    ///
    /// Unknown objects report an overlap.
    pub fn check_coarse_overlap(&self, id: ObjectId) -> bool {
        let Some(record) = self.colliders.get(id) else {
            debug!("Coarse overlap query for unknown object {:?}", id);
            return true;
        };

        self.colliders
            .iter()
            .any(|(other, other_record)| other != id && record.bounds.overlaps(&other_record.bounds))
    }

    /// Build one precise request per coarse-overlapping neighbor
    ///
    /// Returns `None` for an unknown object. A missing model id on either
    /// side is carried as an error so it fails closed later.
    pub fn precise_requests(&self, id: ObjectId) -> Option<Vec<PreciseRequest>> {
        let record = self.colliders.get(id)?;

        let requests = self
            .coarse_neighbors(id)
            .into_iter()
            .filter_map(|neighbor| {
                let other = self.colliders.get(neighbor)?;
                let request = match (&record.model_id, &other.model_id) {
                    (Some(model_a), Some(model_b)) => Ok(OverlapRequest::pair(
                        model_a,
                        &record.transform,
                        model_b,
                        &other.transform,
                    )),
                    (None, _) => Err(OverlapServiceError::MissingModel(format!("{:?} has no model id", id))),
                    (_, None) => Err(OverlapServiceError::MissingModel(format!("{:?} has no model id", neighbor))),
                };
                Some(PreciseRequest { neighbor, request })
            })
            .collect();

        Some(requests)
    }

    /// Exact overlap check against every coarse-overlapping neighbor
    ///
    /// Fail-closed: an unknown object, a missing model id, a transport error
    /// or a malformed response all report a collision.
    pub async fn check_precise_overlap<S: OverlapService>(&self, id: ObjectId, service: &S) -> CollisionResult {
        match self.precise_requests(id) {
            Some(requests) => resolve_precise(service, &requests).await,
            None => {
                warn!("Precise overlap query for unknown object {:?}, assuming collision", id);
                CollisionResult::colliding(Vec::new())
            }
        }
    }

    /// Smallest gap between the box of `id` and any other box
    ///
    /// Advisory only. `None` when `id` is unknown or alone in the room.
    pub fn distance_to_nearest(&self, id: ObjectId) -> Option<f32> {
        let record = self.colliders.get(id)?;

        self.colliders
            .iter()
            .filter(|(other, _)| *other != id)
            .map(|(_, other_record)| record.bounds.gap_to(&other_record.bounds))
            .min_by(f32::total_cmp)
    }

    /// Drop the box and debug visualization of an object
    ///
    /// Returns false if the object was not registered.
    pub fn deregister(&mut self, id: ObjectId) -> bool {
        if let Some(viz) = self.debug.as_mut() {
            viz.clear_object(id);
        }
        self.colliders.remove(id).is_some()
    }

    /// Check if an object is registered
    pub fn contains(&self, id: ObjectId) -> bool {
        self.colliders.contains_key(id)
    }

    /// Number of registered objects
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    /// Check if no objects are registered
    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }
}
