//! # Placement Engine
//!
//! Collision-aware furniture placement for an interactive room editor.
//!
//! ## Features
//!
//! - **Room Containment**: Objects stay inside the walls and under the ceiling
//! - **Coarse Overlap**: Per-frame AABB tests keep dragging responsive
//! - **Precise Overlap**: Exact checks against a remote service, fail-closed
//! - **Move State Machine**: Every move returns an outcome tag, never a panic
//! - **Scene Snapshots**: JSON export of the placed furniture
//!
//! ## Quick Start
//!
//! ```rust
//! use placement_engine::prelude::*;
//!
//! let catalog = ModelCatalog::new().with_model("chair", Vec3::new(0.3, 0.45, 0.3));
//! let detector = CollisionDetector::new(RoomBoundary::default(), 1e-3);
//! let mut controller = PlacementController::new(detector, ModelBoundsGeometry::new(catalog.clone()));
//! let service = LocalOverlapService::new(catalog);
//!
//! let chair = controller.add_object(
//!     ObjectDescriptor::new("chair", ObjectCategory::Chair).at(Vec3::new(0.0, 0.45, 0.0)),
//! );
//!
//! let outcome = pollster::block_on(controller.move_object(
//!     chair,
//!     Vec3::new(1.0, 0.45, 0.0),
//!     MoveFlags::DRAG,
//!     &service,
//! ))?;
//! assert_eq!(outcome, MoveOutcome::AcceptedFinal);
//! # Ok::<(), PlacementError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names)]

pub mod config;
pub mod debug;
pub mod foundation;
pub mod overlap;
pub mod physics;
pub mod placement;
pub mod scene;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, PlacementConfig},
        foundation::math::{Transform, Vec3},
        overlap::{
            CollisionResult, JsonOverlapClient, LocalOverlapService, OverlapService, OverlapServiceError,
            OverlapTransport,
        },
        physics::{CollisionDetector, ContainmentResult},
        placement::{MoveFlags, MoveOutcome, MoveStep, PendingCheck, PlacementController, PlacementError},
        scene::{
            GeometryProvider, ModelBoundsGeometry, ModelCatalog, ObjectCategory, ObjectDescriptor, ObjectId,
            PlacedObject, RoomBoundary, RoomBoundaryDocument, SceneSnapshot,
        },
    };
}
