use std::cell::Cell;
use std::future::Future;
use std::sync::Arc;
use std::task::{Context, Wake, Waker};

use approx::assert_relative_eq;

use super::*;
use crate::foundation::math::constants::{HALF_PI, PI};
use crate::foundation::math::{Transform, Vec3};
use crate::overlap::{LocalOverlapService, OverlapRequest, OverlapResponse, OverlapService, OverlapServiceError};
use crate::physics::CollisionDetector;
use crate::scene::{
    ModelBoundsGeometry, ModelCatalog, ObjectCategory, ObjectDescriptor, ObjectId, RoomBoundary,
    RoomBoundaryDocument, SceneSnapshot,
};

/// Overlap service with a fixed answer that counts its calls
struct StubService {
    answer: Result<bool, OverlapServiceError>,
    calls: Cell<usize>,
}

impl StubService {
    fn answering(overlap: bool) -> Self {
        Self {
            answer: Ok(overlap),
            calls: Cell::new(0),
        }
    }

    fn failing(error: OverlapServiceError) -> Self {
        Self {
            answer: Err(error),
            calls: Cell::new(0),
        }
    }
}

impl OverlapService for StubService {
    async fn check_overlap(&self, _request: &OverlapRequest) -> Result<OverlapResponse, OverlapServiceError> {
        self.calls.set(self.calls.get() + 1);
        self.answer
            .clone()
            .map(|contain_overlap| OverlapResponse::Single { contain_overlap })
    }
}

/// Overlap service that never answers
struct SilentService;

impl OverlapService for SilentService {
    async fn check_overlap(&self, _request: &OverlapRequest) -> Result<OverlapResponse, OverlapServiceError> {
        std::future::pending().await
    }
}

struct NoopWake;

impl Wake for NoopWake {
    fn wake(self: Arc<Self>) {}
}

fn catalog() -> ModelCatalog {
    ModelCatalog::new()
        .with_model("cube", Vec3::new(0.5, 0.5, 0.5))
        .with_model("plank", Vec3::new(2.0, 0.25, 0.25))
}

fn controller() -> PlacementController<ModelBoundsGeometry> {
    let boundary = RoomBoundary::from_document(&RoomBoundaryDocument {
        min_x: -5.0,
        max_x: 5.0,
        min_y: 0.0,
        max_y: 3.0,
        min_z: -5.0,
        max_z: 5.0,
    })
    .unwrap();
    PlacementController::new(CollisionDetector::new(boundary, 1e-3), ModelBoundsGeometry::new(catalog()))
}

fn cube_at(x: f32, z: f32) -> ObjectDescriptor {
    ObjectDescriptor::new("cube", ObjectCategory::Chair).at(Vec3::new(x, 0.5, z))
}

fn position(controller: &PlacementController<ModelBoundsGeometry>, id: ObjectId) -> Vec3 {
    controller.object(id).unwrap().position()
}

/// Two cubes two units apart on X, A at the origin
fn two_cubes() -> (PlacementController<ModelBoundsGeometry>, ObjectId, ObjectId) {
    let mut controller = controller();
    let a = controller.add_object(cube_at(0.0, 0.0));
    let b = controller.add_object(cube_at(2.0, 0.0));
    (controller, a, b)
}

fn move_to(
    controller: &mut PlacementController<ModelBoundsGeometry>,
    id: ObjectId,
    target: Vec3,
    flags: MoveFlags,
    service: &StubService,
) -> MoveOutcome {
    pollster::block_on(controller.move_object(id, target, flags, service)).unwrap()
}

#[test]
fn test_add_registers_box() {
    let (controller, a, b) = two_cubes();

    assert!(controller.detector().contains(a));
    assert!(controller.detector().contains(b));
    assert_relative_eq!(controller.detector().bounds(b).unwrap().center(), Vec3::new(2.0, 0.5, 0.0));
    assert_eq!(controller.last_valid_position(a), None);
    assert_relative_eq!(controller.clearance(a).unwrap(), 1.0);
}

#[test]
fn test_out_of_bounds_restores_transform() {
    let mut controller = controller();
    let service = StubService::answering(false);
    let a = controller.add_object(ObjectDescriptor::new("cube", ObjectCategory::Chair));
    let before = *controller.object(a).unwrap().transform();

    let outcome = move_to(&mut controller, a, Vec3::new(6.0, 0.0, 0.0), MoveFlags::CONFIRM, &service);

    assert_eq!(outcome, MoveOutcome::RejectedOutOfBounds);
    assert!(!outcome.needs_confirmation());
    assert_eq!(*controller.object(a).unwrap().transform(), before);
    assert!(controller.object(a).unwrap().colliding());
    assert_relative_eq!(controller.detector().bounds(a).unwrap().center(), Vec3::zeros());
    assert!(controller.detector().check_containment(a).contained);
    assert_eq!(service.calls.get(), 0);
}

#[test]
fn test_blocked_then_provisional() {
    let (mut controller, a, _b) = two_cubes();
    let service = StubService::answering(false);
    let target = Vec3::new(1.5, 0.5, 0.0);

    let outcome = move_to(&mut controller, a, target, MoveFlags::DRAG, &service);
    assert_eq!(outcome, MoveOutcome::RejectedBlocked);
    assert!(outcome.needs_confirmation());
    assert_relative_eq!(position(&controller, a), Vec3::new(0.0, 0.5, 0.0));
    assert!(!controller.detector().check_coarse_overlap(a));

    let outcome = move_to(&mut controller, a, target, MoveFlags::PROVISIONAL, &service);
    assert_eq!(outcome, MoveOutcome::AcceptedProvisional);
    assert!(outcome.needs_precise_check());
    assert_relative_eq!(position(&controller, a), target);
    assert!(controller.object(a).unwrap().colliding());
    // Provisional placements are not committed
    assert_relative_eq!(controller.last_valid_position(a).unwrap(), Vec3::new(0.0, 0.5, 0.0));
    assert_eq!(service.calls.get(), 0);
}

#[test]
fn test_precise_clear_commits() {
    let (mut controller, a, b) = two_cubes();
    let service = StubService::answering(false);
    let target = Vec3::new(1.5, 0.5, 0.0);
    move_to(&mut controller, a, target, MoveFlags::DRAG, &service);
    move_to(&mut controller, a, target, MoveFlags::PROVISIONAL, &service);

    let outcome = move_to(&mut controller, a, target, MoveFlags::CONFIRM, &service);

    assert_eq!(outcome, MoveOutcome::AcceptedFinal);
    assert_relative_eq!(controller.last_valid_position(a).unwrap(), target);
    assert_relative_eq!(position(&controller, a), target);
    assert!(!controller.object(a).unwrap().colliding());
    assert_eq!(service.calls.get(), 1);
    // The exact check is authoritative over the boxes
    assert_eq!(controller.detector().coarse_neighbors(a), vec![b]);
}

#[test]
fn test_precise_overlap_reverts_to_last_valid() {
    let (mut controller, a, _b) = two_cubes();
    let clear = StubService::answering(false);
    let start = Vec3::new(0.0, 0.5, 0.0);
    move_to(&mut controller, a, Vec3::new(1.5, 0.5, 0.0), MoveFlags::DRAG, &clear);
    move_to(&mut controller, a, Vec3::new(1.5, 0.5, 0.0), MoveFlags::PROVISIONAL, &clear);
    // A second provisional frame drifts further from the pre-call position
    move_to(&mut controller, a, Vec3::new(1.4, 0.5, 0.2), MoveFlags::PROVISIONAL, &clear);

    let blocked = StubService::answering(true);
    let outcome = move_to(&mut controller, a, Vec3::new(1.4, 0.5, 0.2), MoveFlags::CONFIRM, &blocked);

    assert_eq!(outcome, MoveOutcome::RejectedPreciseOverlap);
    assert_relative_eq!(position(&controller, a), start);
    assert_relative_eq!(controller.last_valid_position(a).unwrap(), start);
    assert!(!controller.object(a).unwrap().colliding());
    assert!(!controller.detector().check_coarse_overlap(a));
}

#[test]
fn test_clean_move_is_final_and_valid() {
    let (mut controller, a, _b) = two_cubes();
    let service = StubService::answering(true);
    let target = Vec3::new(-2.0, 0.5, 3.0);

    let outcome = move_to(&mut controller, a, target, MoveFlags::DRAG, &service);

    assert_eq!(outcome, MoveOutcome::AcceptedFinal);
    assert!(outcome.is_accepted());
    assert_relative_eq!(controller.last_valid_position(a).unwrap(), target);
    assert!(controller.detector().check_containment(a).contained);
    assert!(!controller.detector().check_coarse_overlap(a));
    assert_eq!(service.calls.get(), 0);

    // Precise check without neighbors never reaches the service either
    let outcome = move_to(&mut controller, a, Vec3::new(-3.0, 0.5, 3.0), MoveFlags::CONFIRM, &service);
    assert_eq!(outcome, MoveOutcome::AcceptedFinal);
    assert_eq!(service.calls.get(), 0);
}

#[test]
fn test_confirmed_move_is_idempotent() {
    for overlap in [false, true] {
        let (mut controller, a, _b) = two_cubes();
        let service = StubService::answering(overlap);
        let target = Vec3::new(1.5, 0.5, 0.0);

        let first = move_to(&mut controller, a, target, MoveFlags::CONFIRM, &service);
        let first_position = position(&controller, a);
        let second = move_to(&mut controller, a, target, MoveFlags::CONFIRM, &service);

        assert_eq!(first, second);
        assert_relative_eq!(position(&controller, a), first_position);
    }
}

#[test]
fn test_transport_error_fails_closed() {
    let (mut controller, a, _b) = two_cubes();
    let service = StubService::failing(OverlapServiceError::Transport("connection refused".to_string()));

    let outcome = move_to(&mut controller, a, Vec3::new(1.5, 0.5, 0.0), MoveFlags::CONFIRM, &service);

    assert_eq!(outcome, MoveOutcome::RejectedPreciseOverlap);
    assert_relative_eq!(position(&controller, a), Vec3::new(0.0, 0.5, 0.0));
}

#[test]
fn test_missing_model_fails_closed() {
    let (mut controller, a, _b) = two_cubes();
    let anonymous = controller.add_object(cube_at(0.0, 3.0).with_model_id(None));
    let service = StubService::answering(false);

    let outcome = move_to(&mut controller, a, Vec3::new(0.0, 0.5, 2.5), MoveFlags::CONFIRM, &service);

    assert_eq!(outcome, MoveOutcome::RejectedPreciseOverlap);
    assert_eq!(service.calls.get(), 0);
    assert!(controller.detector().contains(anonymous));
}

#[test]
fn test_rotation_out_of_bounds_keeps_rotation() {
    let mut controller = controller();
    let service = StubService::answering(false);
    let plank = controller.add_object(
        ObjectDescriptor::new("plank", ObjectCategory::Shelf).at(Vec3::new(0.0, 0.25, 3.5)),
    );

    let outcome = pollster::block_on(controller.rotate_object(
        plank,
        Vec3::new(0.0, HALF_PI, 0.0),
        MoveFlags::DRAG,
        &service,
    ))
    .unwrap();

    assert_eq!(outcome, MoveOutcome::RejectedOutOfBounds);
    assert_relative_eq!(controller.object(plank).unwrap().rotation(), Vec3::zeros());

    let outcome = pollster::block_on(controller.rotate_object(
        plank,
        Vec3::new(0.0, PI, 0.0),
        MoveFlags::DRAG,
        &service,
    ))
    .unwrap();
    assert_eq!(outcome, MoveOutcome::AcceptedFinal);
    assert_relative_eq!(controller.last_valid_transform(plank).unwrap().rotation, Vec3::new(0.0, PI, 0.0));
}

#[test]
fn test_scale_into_neighbor_is_blocked() {
    let (mut controller, a, _b) = two_cubes();
    let service = StubService::answering(false);
    let grown = controller.object(a).unwrap().transform().with_uniform_scale(4.0);

    let outcome = pollster::block_on(controller.transform_object(a, grown, MoveFlags::DRAG, &service)).unwrap();

    assert_eq!(outcome, MoveOutcome::RejectedBlocked);
    assert_relative_eq!(controller.object(a).unwrap().scale(), Vec3::new(1.0, 1.0, 1.0));
}

#[test]
fn test_second_precise_check_is_rejected() {
    let (mut controller, a, _b) = two_cubes();
    let target = Vec3::new(1.5, 0.5, 0.0);

    let Ok(MoveStep::NeedsPrecise(pending)) = controller.begin_move(a, target, MoveFlags::CONFIRM) else {
        panic!("expected a pending precise check");
    };
    assert!(controller.is_checking(a));
    assert_eq!(pending.requests().len(), 1);
    assert!(controller.object(a).unwrap().colliding());

    assert_eq!(
        controller.begin_move(a, Vec3::zeros(), MoveFlags::DRAG),
        Err(PlacementError::PreciseCheckInFlight(a))
    );

    let outcome = controller
        .complete_precise_check(pending, crate::overlap::CollisionResult::clear())
        .unwrap();
    assert_eq!(outcome, MoveOutcome::AcceptedFinal);
    assert!(!controller.is_checking(a));
}

#[test]
fn test_cancelled_check_result_is_stale() {
    let (mut controller, a, b) = two_cubes();
    let target = Vec3::new(1.5, 0.5, 0.0);
    let Ok(MoveStep::NeedsPrecise(pending)) = controller.begin_move(a, target, MoveFlags::CONFIRM) else {
        panic!("expected a pending precise check");
    };

    assert_eq!(controller.cancel_precise_check(a), Ok(true));
    assert_eq!(controller.cancel_precise_check(a), Ok(false));

    let result = crate::overlap::CollisionResult::colliding(vec![b]);
    assert_eq!(
        controller.complete_precise_check(pending, result),
        Err(PlacementError::StaleCheck(a))
    );
    // Still at the tentative candidate, nothing rolled back
    assert_relative_eq!(position(&controller, a), target);
}

#[test]
fn test_superseded_check_result_is_stale() {
    let (mut controller, a, b) = two_cubes();
    let Ok(MoveStep::NeedsPrecise(first)) = controller.begin_move(a, Vec3::new(1.5, 0.5, 0.0), MoveFlags::CONFIRM)
    else {
        panic!("expected a pending precise check");
    };
    assert_eq!(controller.cancel_precise_check(a), Ok(true));

    let target = Vec3::new(1.2, 0.5, 0.0);
    let Ok(MoveStep::NeedsPrecise(second)) = controller.begin_move(a, target, MoveFlags::CONFIRM) else {
        panic!("expected a pending precise check");
    };
    assert_ne!(first.ticket(), second.ticket());

    // The old answer must not settle the new move
    assert_eq!(
        controller.complete_precise_check(first, crate::overlap::CollisionResult::colliding(vec![b])),
        Err(PlacementError::StaleCheck(a))
    );
    assert!(controller.is_checking(a));
    assert_relative_eq!(position(&controller, a), target);

    let outcome = controller
        .complete_precise_check(second, crate::overlap::CollisionResult::clear())
        .unwrap();
    assert_eq!(outcome, MoveOutcome::AcceptedFinal);
    assert!(!controller.is_checking(a));
    assert_eq!(controller.last_valid_position(a), Some(target));
}

#[test]
fn test_dropped_move_abandons_precise_check() {
    let (mut controller, a, _b) = two_cubes();
    let waker = Waker::from(Arc::new(NoopWake));
    let mut cx = Context::from_waker(&waker);

    {
        let mut future = Box::pin(controller.move_object(
            a,
            Vec3::new(1.5, 0.5, 0.0),
            MoveFlags::CONFIRM,
            &SilentService,
        ));
        assert!(future.as_mut().poll(&mut cx).is_pending());
    }

    assert!(!controller.is_checking(a));
    assert!(!controller.object(a).unwrap().colliding());
    assert_relative_eq!(position(&controller, a), Vec3::new(0.0, 0.5, 0.0));
    assert_relative_eq!(controller.detector().bounds(a).unwrap().center(), Vec3::new(0.0, 0.5, 0.0));

    let service = StubService::answering(false);
    let outcome = move_to(&mut controller, a, Vec3::new(-1.0, 0.5, 0.0), MoveFlags::DRAG, &service);
    assert_eq!(outcome, MoveOutcome::AcceptedFinal);
}

#[test]
fn test_non_finite_target_is_out_of_bounds() {
    let (mut controller, a, _b) = two_cubes();
    let service = StubService::answering(false);
    let before = *controller.object(a).unwrap().transform();

    for target in [
        Vec3::new(f32::NAN, 0.5, 0.0),
        Vec3::new(0.0, f32::INFINITY, 0.0),
        Vec3::new(0.0, 0.5, f32::NEG_INFINITY),
    ] {
        let outcome = move_to(&mut controller, a, target, MoveFlags::DRAG, &service);
        assert_eq!(outcome, MoveOutcome::RejectedOutOfBounds);
        assert_eq!(*controller.object(a).unwrap().transform(), before);
    }

    assert_eq!(controller.last_valid_position(a), Some(before.position));
    assert!(controller.detector().check_containment(a).contained);
    assert_eq!(service.calls.get(), 0);

    // A later precise rejection still has a real transform to fall back to
    let blocked = StubService::answering(true);
    let outcome = move_to(&mut controller, a, Vec3::new(1.5, 0.5, 0.0), MoveFlags::CONFIRM, &blocked);
    assert_eq!(outcome, MoveOutcome::RejectedPreciseOverlap);
    assert_relative_eq!(position(&controller, a), before.position);
}

#[test]
fn test_result_for_removed_object_is_discarded() {
    let (mut controller, a, _b) = two_cubes();
    let Ok(MoveStep::NeedsPrecise(pending)) = controller.begin_move(a, Vec3::new(1.5, 0.5, 0.0), MoveFlags::CONFIRM)
    else {
        panic!("expected a pending precise check");
    };

    let removed = controller.remove_object(a).unwrap();
    assert_eq!(removed.id(), a);
    assert!(!controller.detector().contains(a));

    let service = StubService::answering(false);
    let result = pollster::block_on(pending.resolve(&service));
    assert_eq!(
        controller.complete_precise_check(pending, result),
        Err(PlacementError::UnknownObject(a))
    );
    assert_eq!(controller.len(), 1);
}

#[test]
fn test_unknown_object_is_an_error() {
    let (mut controller, a, _b) = two_cubes();
    controller.remove_object(a).unwrap();
    let service = StubService::answering(false);

    let result = pollster::block_on(controller.move_object(a, Vec3::zeros(), MoveFlags::CONFIRM, &service));

    assert_eq!(result, Err(PlacementError::UnknownObject(a)));
    assert_eq!(controller.remove_object(a).err(), Some(PlacementError::UnknownObject(a)));
    assert_eq!(controller.cancel_precise_check(a), Err(PlacementError::UnknownObject(a)));
    assert_eq!(controller.last_valid_position(a), None);
}

#[test]
fn test_local_service_separates_rotated_neighbors() {
    let mut controller = controller();
    let service = LocalOverlapService::new(catalog());
    let turned = Transform::from_position(Vec3::new(3.0, 0.5, 3.0)).with_rotation(Vec3::new(0.0, PI / 4.0, 0.0));
    controller.add_object(cube_at(0.0, 0.0));
    let diamond = controller.add_object(ObjectDescriptor::new("cube", ObjectCategory::Lamp).with_transform(turned));

    // Boxes overlap, the rotated cube itself does not
    let outcome =
        pollster::block_on(controller.move_object(diamond, Vec3::new(1.05, 0.5, 1.05), MoveFlags::CONFIRM, &service))
            .unwrap();
    assert_eq!(outcome, MoveOutcome::AcceptedFinal);
    assert!(controller.detector().check_coarse_overlap(diamond));

    let outcome =
        pollster::block_on(controller.move_object(diamond, Vec3::new(0.8, 0.5, 0.8), MoveFlags::CONFIRM, &service))
            .unwrap();
    assert_eq!(outcome, MoveOutcome::RejectedPreciseOverlap);
    assert_relative_eq!(position(&controller, diamond), Vec3::new(1.05, 0.5, 1.05));
}

#[test]
fn test_revalidate_after_boundary_change() {
    let (mut controller, a, b) = two_cubes();
    let narrow = RoomBoundary::from_document(&RoomBoundaryDocument {
        min_x: -1.0,
        max_x: 1.0,
        ..RoomBoundaryDocument::default()
    })
    .unwrap();

    controller.set_boundary(narrow);
    assert!(!controller.object(b).unwrap().colliding());

    let violations = controller.revalidate();

    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].0, b);
    assert!(controller.object(b).unwrap().colliding());
    assert!(!controller.object(a).unwrap().colliding());
}

#[test]
fn test_snapshot_roundtrip() {
    let (mut controller, _a, _b) = two_cubes();
    controller.add_object(ObjectDescriptor::new("shelf", ObjectCategory::Shelf).at(Vec3::new(-3.0, 0.5, -3.0)));

    let snapshot = controller.snapshot();
    let json = snapshot.to_json().unwrap();
    let restored = SceneSnapshot::from_json(&json).unwrap();

    assert_eq!(restored, snapshot);
    assert_eq!(restored.objects.len(), 3);
    assert!(restored.objects[2].is_container);
    assert_relative_eq!(restored.room.max_y, 3.0);
}

#[test]
fn test_debug_highlight_follows_outcome() {
    let (mut controller, a, _b) = two_cubes();
    controller.set_debug_draw(true);
    let service = StubService::answering(false);

    move_to(&mut controller, a, Vec3::new(6.0, 0.5, 0.0), MoveFlags::DRAG, &service);

    let viz = controller.detector().debug_visualizer().unwrap();
    assert!(viz.has_object(a));
    // Both boxes, the room and the correction arrow
    assert_eq!(viz.shape_count(), 4);

    controller.remove_object(a).unwrap();
    assert!(!controller.detector().debug_visualizer().unwrap().has_object(a));
}
