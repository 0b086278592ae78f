use serde::{Deserialize, Serialize};

use crate::common::entity_ids::JourneyId;

/// Scope of a steward grant
///
/// A global grant covers every journey. A journey grant covers exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "journey_id", rename_all = "snake_case")]
pub enum GrantScope {
    Global,
    Journey(JourneyId),
}

impl GrantScope {
    /// Does this grant give authority over items in `journey_id`?
    pub fn covers(&self, journey_id: JourneyId) -> bool {
        match self {
            GrantScope::Global => true,
            GrantScope::Journey(scoped) => *scoped == journey_id,
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, GrantScope::Global)
    }

    pub fn journey_id(&self) -> Option<JourneyId> {
        match self {
            GrantScope::Global => None,
            GrantScope::Journey(id) => Some(*id),
        }
    }

    /// Value stored in `steward_grants.scope_kind`
    pub fn kind_str(&self) -> &'static str {
        match self {
            GrantScope::Global => "global",
            GrantScope::Journey(_) => "journey",
        }
    }
}

impl std::fmt::Display for GrantScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrantScope::Global => write!(f, "global"),
            GrantScope::Journey(id) => write!(f, "journey:{}", id),
        }
    }
}

/// Capabilities a steward can exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StewardCapability {
    /// Approve, reject or reset items belonging to a journey
    ModerateJourney(JourneyId),

    /// Create or revoke steward grants
    ManageGrants,
}

impl StewardCapability {
    pub fn is_satisfied_by(&self, scope: &GrantScope) -> bool {
        match self {
            StewardCapability::ModerateJourney(journey_id) => scope.covers(*journey_id),
            StewardCapability::ManageGrants => scope.is_global(),
        }
    }
}

impl std::fmt::Display for StewardCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StewardCapability::ModerateJourney(id) => write!(f, "moderate journey {}", id),
            StewardCapability::ManageGrants => write!(f, "manage steward grants"),
        }
    }
}
