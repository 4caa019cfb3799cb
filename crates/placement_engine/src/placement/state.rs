use crate::foundation::math::Transform;

/// Precise check bookkeeping for one object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckState {
    /// No check outstanding
    #[default]
    Idle,
    /// Waiting for the result of the check with this ticket
    Checking {
        /// Matches the ticket of the outstanding [`super::PendingCheck`]
        ticket: u64,
    },
}

/// Per-object placement state kept by the controller
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacementState {
    /// Rollback target for a failed precise check; seeded on the first move
    pub last_valid: Option<Transform>,
    /// Outstanding precise check, if any
    pub check: CheckState,
}

impl PlacementState {
    /// Check if a precise check is outstanding
    pub fn is_checking(&self) -> bool {
        matches!(self.check, CheckState::Checking { .. })
    }
}
