use thiserror::Error;

use crate::scene::ObjectId;

/// Result of a single move request
///
/// Rejections are ordinary values. The caller decides whether to ask the
/// user for confirmation or run the precise check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveOutcome {
    /// Candidate leaves the room; transform unchanged
    RejectedOutOfBounds,
    /// Candidate overlaps a neighbor's box; transform unchanged. Retry with
    /// [`MoveFlags::allow_entering_coarse_zone`] if the user confirms.
    RejectedBlocked,
    /// Candidate overlaps a neighbor's box and was kept tentatively. Retry
    /// with [`MoveFlags::run_precise_check`] before treating it as final.
    AcceptedProvisional,
    /// Precise check found (or could not rule out) a collision; object is
    /// back at its last valid transform
    RejectedPreciseOverlap,
    /// Candidate committed as the new last valid transform
    AcceptedFinal,
}

impl MoveOutcome {
    /// Object ended up at the candidate transform
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::AcceptedProvisional | Self::AcceptedFinal)
    }

    /// Caller should ask the user whether to enter the contested zone
    pub fn needs_confirmation(self) -> bool {
        self == Self::RejectedBlocked
    }

    /// Caller still owes a precise check for this placement
    pub fn needs_precise_check(self) -> bool {
        self == Self::AcceptedProvisional
    }
}

/// Caller-held flags for a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveFlags {
    /// User agreed to slide into a neighbor's bounding box
    pub allow_entering_coarse_zone: bool,
    /// Run the precise overlap check before committing
    pub run_precise_check: bool,
}

impl MoveFlags {
    /// Per-frame drag: block at the first bounding-box contact
    pub const DRAG: Self = Self {
        allow_entering_coarse_zone: false,
        run_precise_check: false,
    };

    /// Confirmed drag inside a contested zone, no precise check yet
    pub const PROVISIONAL: Self = Self {
        allow_entering_coarse_zone: true,
        run_precise_check: false,
    };

    /// Drop: accept overlap candidates and settle them with the precise check
    pub const CONFIRM: Self = Self {
        allow_entering_coarse_zone: true,
        run_precise_check: true,
    };

    /// Build from the two flags
    pub fn new(allow_entering_coarse_zone: bool, run_precise_check: bool) -> Self {
        Self {
            allow_entering_coarse_zone,
            run_precise_check,
        }
    }
}

/// Requests the controller refuses to carry out
///
/// None of these mutate any state.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    /// Object was never added or has been removed
    #[error("Unknown object {0:?}")]
    UnknownObject(ObjectId),

    /// A precise check for this object has not resolved yet
    #[error("Precise check already in flight for {0:?}")]
    PreciseCheckInFlight(ObjectId),

    /// Result belongs to a cancelled or superseded check
    #[error("Stale precise check result for {0:?}")]
    StaleCheck(ObjectId),
}
