// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Governance rules live in the domain activities that call these traits.
//
// Naming convention: Base* for trait names (e.g., BaseNotifier)

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::common::MemberId;

// =============================================================================
// Notification Dispatch Trait (Infrastructure - fire and forget)
// =============================================================================

/// What happened, from the recipient's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ContributionApproved,
    ContributionRejected,
    StewardGranted,
    StewardRevoked,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationKind::ContributionApproved => write!(f, "contribution_approved"),
            NotificationKind::ContributionRejected => write!(f, "contribution_rejected"),
            NotificationKind::StewardGranted => write!(f, "steward_granted"),
            NotificationKind::StewardRevoked => write!(f, "steward_revoked"),
        }
    }
}

#[async_trait]
pub trait BaseNotifier: Send + Sync {
    /// Deliver one notification. Callers never retry and never wait on the outcome
    /// of a state change for it.
    async fn notify(
        &self,
        recipient: MemberId,
        kind: NotificationKind,
        context: serde_json::Value,
    ) -> Result<()>;
}
