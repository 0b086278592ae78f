use async_trait::async_trait;
use tracing::debug;

use super::{AuthError, GrantScope, StewardCapability};
use crate::common::entity_ids::MemberId;

/// The identity behind a request
///
/// Constructed per request from the verified session and passed explicitly to
/// every operation. `claimed_steward` is whatever the client's token says
/// about its role; it is advisory only and never grants anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    member_id: MemberId,
    claimed_steward: bool,
}

impl Actor {
    pub fn new(member_id: MemberId, claimed_steward: bool) -> Self {
        Self {
            member_id,
            claimed_steward,
        }
    }

    /// Actor with no role claims, as used by tests and internal callers.
    pub fn member(member_id: MemberId) -> Self {
        Self::new(member_id, false)
    }

    pub fn member_id(&self) -> MemberId {
        self.member_id
    }

    pub fn claimed_steward(&self) -> bool {
        self.claimed_steward
    }

    /// Specify what capability the actor needs
    pub fn can(&self, capability: StewardCapability) -> CapabilityBuilder {
        CapabilityBuilder {
            actor: *self,
            capability,
        }
    }
}

/// Builder after specifying capability
pub struct CapabilityBuilder {
    actor: Actor,
    capability: StewardCapability,
}

impl CapabilityBuilder {
    /// Re-derive the actor's grants and check them against the capability.
    ///
    /// Returns the grant scope that satisfied the check.
    pub async fn check<G>(self, grants: &G) -> Result<GrantScope, AuthError>
    where
        G: GrantSource + ?Sized,
    {
        let scopes = grants.active_scopes(self.actor.member_id).await?;

        match authorize(self.capability, &scopes) {
            Some(scope) => Ok(scope),
            None => {
                if self.actor.claimed_steward {
                    debug!(
                        member_id = %self.actor.member_id,
                        capability = %self.capability,
                        "Client claimed steward role but holds no matching grant"
                    );
                }
                Err(AuthError::PermissionDenied(format!(
                    "no grant allows you to {}",
                    self.capability
                )))
            }
        }
    }
}

/// Anything that can report a member's currently active grant scopes
#[async_trait]
pub trait GrantSource: Send + Sync {
    async fn active_scopes(&self, member_id: MemberId) -> Result<Vec<GrantScope>, AuthError>;
}

/// Grants already loaded for the acting member (e.g. inside a transaction).
#[async_trait]
impl GrantSource for Vec<GrantScope> {
    async fn active_scopes(&self, _member_id: MemberId) -> Result<Vec<GrantScope>, AuthError> {
        Ok(self.clone())
    }
}

/// Pick the grant that satisfies `capability`, preferring the narrowest one.
pub fn authorize(capability: StewardCapability, scopes: &[GrantScope]) -> Option<GrantScope> {
    scopes
        .iter()
        .filter(|scope| capability.is_satisfied_by(scope))
        .min_by_key(|scope| scope.is_global())
        .copied()
}
