//! Placement controller
//!
//! Turns drag, rotate and scale input into validated moves. Every move runs
//! through containment, coarse overlap and (on request) the precise overlap
//! check, and comes back as a [`MoveOutcome`] the caller has to branch on.

mod controller;
mod outcome;
mod state;

#[cfg(test)]
mod tests;

pub use controller::{MoveStep, PendingCheck, PlacementController};
pub use outcome::{MoveFlags, MoveOutcome, PlacementError};
pub use state::{CheckState, PlacementState};
