use log::{debug, info, warn};
use slotmap::{SecondaryMap, SlotMap};

use crate::foundation::math::{Transform, Vec3};
use crate::overlap::{resolve_precise, CollisionResult, OverlapService, PreciseRequest};
use crate::physics::{CollisionDetector, ContainmentResult};
use crate::placement::outcome::{MoveFlags, MoveOutcome, PlacementError};
use crate::placement::state::{CheckState, PlacementState};
use crate::scene::{
    GeometryProvider, ObjectDescriptor, ObjectId, ObjectSnapshot, PlacedObject, RoomBoundary, SceneSnapshot,
};

/// Precise check handed out by [`PlacementController::begin_move`]
///
/// Owns everything the check needs, so the caller can await the overlap
/// service without holding a borrow of the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingCheck {
    id: ObjectId,
    ticket: u64,
    candidate: Transform,
    requests: Vec<PreciseRequest>,
}

impl PendingCheck {
    /// Object being moved
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Ticket matched against the controller's state on completion
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    /// Transform that will be committed if the check comes back clear
    pub fn candidate(&self) -> &Transform {
        &self.candidate
    }

    /// One request per coarse-overlapping neighbor
    pub fn requests(&self) -> &[PreciseRequest] {
        &self.requests
    }

    /// Run the requests against a service
    pub async fn resolve<S: OverlapService>(&self, service: &S) -> CollisionResult {
        resolve_precise(service, &self.requests).await
    }
}

/// What [`PlacementController::begin_move`] produced
#[derive(Debug, Clone, PartialEq)]
pub enum MoveStep {
    /// Move settled without a precise check
    Done(MoveOutcome),
    /// Move waits for a precise check; feed its result to
    /// [`PlacementController::complete_precise_check`]
    NeedsPrecise(PendingCheck),
}

/// Owns the placed objects of one scene session and validates every move
///
/// The detector is injected and scoped to the controller; geometry comes from
/// the renderer through `G`.
pub struct PlacementController<G: GeometryProvider> {
    objects: SlotMap<ObjectId, PlacedObject>,
    states: SecondaryMap<ObjectId, PlacementState>,
    detector: CollisionDetector,
    geometry: G,
    next_ticket: u64,
}

impl<G: GeometryProvider> PlacementController<G> {
    /// Create a controller over an empty scene
    pub fn new(detector: CollisionDetector, geometry: G) -> Self {
        Self {
            objects: SlotMap::with_key(),
            states: SecondaryMap::new(),
            detector,
            geometry,
            next_ticket: 0,
        }
    }

    /// Add an object and register its box in the same step
    ///
    /// The object is not validated; its first move seeds the last valid
    /// transform with wherever it was added.
    pub fn add_object(&mut self, descriptor: ObjectDescriptor) -> ObjectId {
        let id = self
            .objects
            .insert_with_key(|id| PlacedObject::new(id, descriptor));
        self.states.insert(id, PlacementState::default());
        self.refresh_box(id);

        debug!("Added object {:?}", id);
        id
    }

    /// Deregister and remove an object
    ///
    /// A precise check still in flight for it will be discarded on completion.
    pub fn remove_object(&mut self, id: ObjectId) -> Result<PlacedObject, PlacementError> {
        if !self.objects.contains_key(id) {
            return Err(PlacementError::UnknownObject(id));
        }

        self.detector.deregister(id);
        if self.states.remove(id).is_some_and(|state| state.is_checking()) {
            info!("Object {:?} removed with a precise check in flight", id);
        }

        self.objects
            .remove(id)
            .ok_or(PlacementError::UnknownObject(id))
    }

    /// Look up an object
    pub fn object(&self, id: ObjectId) -> Option<&PlacedObject> {
        self.objects.get(id)
    }

    /// All objects in the scene
    pub fn objects(&self) -> impl Iterator<Item = &PlacedObject> {
        self.objects.values()
    }

    /// Number of objects in the scene
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the scene is empty
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Last position known to be valid
    pub fn last_valid_position(&self, id: ObjectId) -> Option<Vec3> {
        self.last_valid_transform(id).map(|transform| transform.position)
    }

    /// Last transform known to be valid
    pub fn last_valid_transform(&self, id: ObjectId) -> Option<&Transform> {
        self.states.get(id).and_then(|state| state.last_valid.as_ref())
    }

    /// Check if a precise check is outstanding for an object
    pub fn is_checking(&self, id: ObjectId) -> bool {
        self.states.get(id).is_some_and(PlacementState::is_checking)
    }

    /// Shared spatial index
    pub fn detector(&self) -> &CollisionDetector {
        &self.detector
    }

    /// Turn bounding-box debug drawing on or off
    pub fn set_debug_draw(&mut self, enabled: bool) {
        self.detector.set_debug_draw(enabled);
        if enabled {
            for (id, object) in &self.objects {
                self.detector.highlight(id, object.colliding());
            }
        }
    }

    /// Advisory distance to the closest other object
    pub fn clearance(&self, id: ObjectId) -> Option<f32> {
        self.detector.distance_to_nearest(id)
    }

    /// Geometry provider
    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    /// Move an object to `position`, running the full validation pipeline
    ///
    /// Dropping the returned future while the precise check is outstanding
    /// abandons the check: the object goes back to its last valid transform
    /// and accepts moves again.
    pub async fn move_object<S: OverlapService>(
        &mut self,
        id: ObjectId,
        position: Vec3,
        flags: MoveFlags,
        service: &S,
    ) -> Result<MoveOutcome, PlacementError> {
        let candidate = self.current_transform(id)?;
        self.transform_object(id, Transform { position, ..candidate }, flags, service)
            .await
    }

    /// Rotate an object to the Euler angles `rotation`
    pub async fn rotate_object<S: OverlapService>(
        &mut self,
        id: ObjectId,
        rotation: Vec3,
        flags: MoveFlags,
        service: &S,
    ) -> Result<MoveOutcome, PlacementError> {
        let candidate = self.current_transform(id)?;
        self.transform_object(id, Transform { rotation, ..candidate }, flags, service)
            .await
    }

    /// Apply a whole candidate transform
    pub async fn transform_object<S: OverlapService>(
        &mut self,
        id: ObjectId,
        candidate: Transform,
        flags: MoveFlags,
        service: &S,
    ) -> Result<MoveOutcome, PlacementError> {
        match self.begin_transform(id, candidate, flags)? {
            MoveStep::Done(outcome) => Ok(outcome),
            MoveStep::NeedsPrecise(pending) => {
                let guard = CheckGuard {
                    controller: self,
                    id: pending.id,
                    ticket: pending.ticket,
                };
                let result = pending.resolve(service).await;
                guard.controller.complete_precise_check(pending, result)
            }
        }
    }

    /// Synchronous part of a move: containment and coarse overlap
    pub fn begin_move(&mut self, id: ObjectId, position: Vec3, flags: MoveFlags) -> Result<MoveStep, PlacementError> {
        let candidate = self.current_transform(id)?;
        self.begin_transform(id, Transform { position, ..candidate }, flags)
    }

    /// Synchronous part of a transform change
    ///
    /// Settles the move when no precise check is requested. Otherwise leaves
    /// the candidate applied, marks the object as checking and hands back a
    /// [`PendingCheck`].
    pub fn begin_transform(
        &mut self,
        id: ObjectId,
        candidate: Transform,
        flags: MoveFlags,
    ) -> Result<MoveStep, PlacementError> {
        let state = self
            .states
            .get_mut(id)
            .ok_or(PlacementError::UnknownObject(id))?;
        if state.is_checking() {
            return Err(PlacementError::PreciseCheckInFlight(id));
        }

        let pre_call = self.current_transform(id)?;
        if let Some(state) = self.states.get_mut(id) {
            state.last_valid.get_or_insert(pre_call);
        }

        if !candidate.is_finite() {
            self.set_colliding(id, true);
            warn!("Move of {:?} rejected: non-finite candidate {:?}", id, candidate);
            return Ok(MoveStep::Done(MoveOutcome::RejectedOutOfBounds));
        }

        self.apply_transform(id, candidate);

        let containment = self.detector.check_containment(id);
        if !containment.contained {
            self.apply_transform(id, pre_call);
            self.set_colliding(id, true);
            if let Some(normal) = containment.normal {
                self.detector.show_correction(id, normal);
            }
            debug!(
                "Move of {:?} rejected: out of bounds on {:?}",
                id, containment.violated_axis
            );
            return Ok(MoveStep::Done(MoveOutcome::RejectedOutOfBounds));
        }

        let coarse_overlap = self.detector.check_coarse_overlap(id);
        if coarse_overlap && !flags.allow_entering_coarse_zone {
            self.apply_transform(id, pre_call);
            self.set_colliding(id, true);
            debug!("Move of {:?} rejected: blocked by a neighbor's bounds", id);
            return Ok(MoveStep::Done(MoveOutcome::RejectedBlocked));
        }

        if !flags.run_precise_check {
            if coarse_overlap {
                self.set_colliding(id, true);
                debug!("Move of {:?} accepted provisionally inside a contested zone", id);
                return Ok(MoveStep::Done(MoveOutcome::AcceptedProvisional));
            }

            self.commit(id, candidate);
            return Ok(MoveStep::Done(MoveOutcome::AcceptedFinal));
        }

        let requests = self
            .detector
            .precise_requests(id)
            .ok_or(PlacementError::UnknownObject(id))?;
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        if let Some(state) = self.states.get_mut(id) {
            state.check = CheckState::Checking { ticket };
        }
        self.set_colliding(id, coarse_overlap);

        debug!(
            "Move of {:?} waiting on precise check #{} against {} neighbor(s)",
            id,
            ticket,
            requests.len()
        );
        Ok(MoveStep::NeedsPrecise(PendingCheck {
            id,
            ticket,
            candidate,
            requests,
        }))
    }

    /// Settle a move with the result of its precise check
    ///
    /// A collision sends the object back to its last valid transform, not the
    /// transform it had before this call. Results for removed objects and
    /// for cancelled or superseded checks are discarded.
    pub fn complete_precise_check(
        &mut self,
        pending: PendingCheck,
        result: CollisionResult,
    ) -> Result<MoveOutcome, PlacementError> {
        let id = pending.id;
        let Some(state) = self.states.get_mut(id) else {
            info!("Discarding precise check #{} for removed object {:?}", pending.ticket, id);
            return Err(PlacementError::UnknownObject(id));
        };
        if state.check != (CheckState::Checking { ticket: pending.ticket }) {
            info!("Discarding stale precise check #{} for {:?}", pending.ticket, id);
            return Err(PlacementError::StaleCheck(id));
        }
        state.check = CheckState::Idle;

        if result.has_collision {
            let last_valid = state.last_valid.unwrap_or(pending.candidate);
            self.apply_transform(id, last_valid);
            self.set_colliding(id, false);
            debug!(
                "Move of {:?} rejected by precise check, colliding with {:?}",
                id, result.colliding_ids
            );
            return Ok(MoveOutcome::RejectedPreciseOverlap);
        }

        self.apply_transform(id, pending.candidate);
        self.commit(id, pending.candidate);
        Ok(MoveOutcome::AcceptedFinal)
    }

    /// Drop the outstanding precise check of an object
    ///
    /// The object keeps its tentative transform; its next move validates it
    /// again. The result of the dropped check will be reported as stale.
    pub fn cancel_precise_check(&mut self, id: ObjectId) -> Result<bool, PlacementError> {
        let state = self
            .states
            .get_mut(id)
            .ok_or(PlacementError::UnknownObject(id))?;
        let was_checking = state.is_checking();
        state.check = CheckState::Idle;

        if was_checking {
            info!("Precise check for {:?} cancelled", id);
        }
        Ok(was_checking)
    }

    /// Roll back a check whose awaiting future went away before it settled
    fn abandon_precise_check(&mut self, id: ObjectId, ticket: u64) {
        let Some(state) = self.states.get_mut(id) else {
            return;
        };
        if state.check != (CheckState::Checking { ticket }) {
            return;
        }
        state.check = CheckState::Idle;
        let last_valid = state.last_valid;

        if let Some(last_valid) = last_valid {
            self.apply_transform(id, last_valid);
        }
        self.set_colliding(id, false);
        info!("Precise check #{} for {:?} abandoned, back at last valid transform", ticket, id);
    }

    /// Replace the room boundary
    ///
    /// Existing objects are not re-validated; call [`Self::revalidate`].
    pub fn set_boundary(&mut self, boundary: RoomBoundary) {
        self.detector.set_boundary(boundary);
    }

    /// Check every object against the current boundary
    ///
    /// Objects outside are flagged as colliding but not moved. Returns the
    /// violations.
    pub fn revalidate(&mut self) -> Vec<(ObjectId, ContainmentResult)> {
        let violations: Vec<_> = self
            .objects
            .keys()
            .map(|id| (id, self.detector.check_containment(id)))
            .filter(|(_, result)| !result.contained)
            .collect();

        for (id, result) in &violations {
            self.set_colliding(*id, true);
            debug!("Object {:?} outside the room on {:?}", id, result.violated_axis);
        }

        if !violations.is_empty() {
            info!("{} object(s) outside the room after revalidation", violations.len());
        }
        violations
    }

    /// Serializable snapshot of the scene
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            room: self.detector.boundary().to_document(),
            objects: self.objects.values().map(ObjectSnapshot::from_object).collect(),
        }
    }

    fn current_transform(&self, id: ObjectId) -> Result<Transform, PlacementError> {
        self.objects
            .get(id)
            .map(|object| *object.transform())
            .ok_or(PlacementError::UnknownObject(id))
    }

    /// Set the transform and recompute the box before anything queries it
    fn apply_transform(&mut self, id: ObjectId, transform: Transform) {
        let Some(object) = self.objects.get_mut(id) else {
            return;
        };
        object.set_transform(transform);
        let geometry = self.geometry.world_geometry(object);
        self.detector
            .update_box(id, &geometry, &transform, object.model_id());
    }

    fn refresh_box(&mut self, id: ObjectId) {
        if let Ok(transform) = self.current_transform(id) {
            self.apply_transform(id, transform);
        }
    }

    fn commit(&mut self, id: ObjectId, transform: Transform) {
        if let Some(state) = self.states.get_mut(id) {
            state.last_valid = Some(transform);
        }
        self.set_colliding(id, false);
        debug!("Move of {:?} committed at {:?}", id, transform.position);
    }

    fn set_colliding(&mut self, id: ObjectId, colliding: bool) {
        if let Some(object) = self.objects.get_mut(id) {
            object.set_colliding(colliding);
        }
        self.detector.highlight(id, colliding);
    }
}

/// Abandons the precise check of a move whose future is dropped mid-await
struct CheckGuard<'a, G: GeometryProvider> {
    controller: &'a mut PlacementController<G>,
    id: ObjectId,
    ticket: u64,
}

impl<G: GeometryProvider> Drop for CheckGuard<'_, G> {
    fn drop(&mut self) {
        self.controller.abandon_precise_check(self.id, self.ticket);
    }
}
