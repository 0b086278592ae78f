//! Contribution review machine.
//!
//! Pure decision maker for the moderation lifecycle. NO IO, NO async.
//!
//! ```text
//! draft ──submit──► submitted_for_review ──approve──► approved
//!                          │    ▲                       │
//!                        reject └──────reset────────────┤
//!                          ▼                            │
//!                       rejected ───────reset───────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::common::GovernanceError;
use crate::domains::contributions::models::ContributionStatus;

/// A moderation action a caller asks the decision engine to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Submit,
    Approve,
    Reject,
    ResetToPending,
}

impl ReviewAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewAction::Submit => "submit",
            ReviewAction::Approve => "approve",
            ReviewAction::Reject => "reject",
            ReviewAction::ResetToPending => "reset",
        }
    }

    /// Whether the action needs a steward grant (submit is owner-only instead)
    pub fn requires_authority(&self) -> bool {
        !matches!(self, ReviewAction::Submit)
    }
}

impl std::fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of applying an action to a status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The item moves to a new status
    Moved(ContributionStatus),
    /// The item is already where this action would put it
    AlreadyApplied,
}

/// The action is not an edge of the lifecycle graph from this status
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Cannot {action} an item that is {from}")]
pub struct InvalidTransition {
    pub from: ContributionStatus,
    pub action: ReviewAction,
}

impl From<InvalidTransition> for GovernanceError {
    fn from(err: InvalidTransition) -> Self {
        GovernanceError::InvalidStatus {
            status: err.from.to_string(),
            action: err.action.to_string(),
        }
    }
}

/// Compute the next status for `action` applied to an item in `current`.
pub fn next_status(
    current: ContributionStatus,
    action: ReviewAction,
) -> Result<Transition, InvalidTransition> {
    use ContributionStatus::*;
    use ReviewAction::*;

    match (current, action) {
        (Draft, Submit) => Ok(Transition::Moved(SubmittedForReview)),
        (SubmittedForReview, Approve) => Ok(Transition::Moved(Approved)),
        (SubmittedForReview, Reject) => Ok(Transition::Moved(Rejected)),
        (Approved | Rejected, ResetToPending) => Ok(Transition::Moved(SubmittedForReview)),

        (SubmittedForReview, Submit | ResetToPending)
        | (Approved, Approve)
        | (Rejected, Reject) => Ok(Transition::AlreadyApplied),

        (from, action) => Err(InvalidTransition { from, action }),
    }
}
