//! Who may read which contributions.
//!
//! An item reaches its declared audience only once approved. Until then it is
//! visible to its creator and to stewards whose grants cover the journey.

use crate::common::{authorize, Actor, GovernanceError, GrantSource, JourneyId, MemberId, StewardCapability};
use crate::domains::contributions::models::{Contribution, ContributionStatus, Visibility};
use crate::domains::journeys::{Journey, TrustedViewer, ViewerTier};
use crate::kernel::ServerDeps;

/// Everything the visibility rules need to know about a viewer and a journey
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewerContext {
    /// None for anonymous readers
    pub viewer: Option<MemberId>,
    pub is_journey_owner: bool,
    pub tier: Option<ViewerTier>,
    /// Holds a grant covering the journey
    pub is_steward: bool,
}

impl ViewerContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Visibility tiers of approved items this viewer may read
    pub fn allowed_visibilities(&self) -> Vec<Visibility> {
        if self.is_steward || self.is_journey_owner {
            return vec![
                Visibility::Public,
                Visibility::Connections,
                Visibility::Family,
                Visibility::PrivateDraft,
            ];
        }
        match self.tier {
            Some(ViewerTier::Family) => {
                vec![Visibility::Public, Visibility::Connections, Visibility::Family]
            }
            Some(ViewerTier::Connections) => vec![Visibility::Public, Visibility::Connections],
            None => vec![Visibility::Public],
        }
    }
}

/// Can this viewer read this item right now?
pub fn is_visible_to(item: &Contribution, ctx: &ViewerContext) -> bool {
    if ctx.is_steward || ctx.viewer == Some(item.created_by) {
        return true;
    }
    if item.status != ContributionStatus::Approved {
        return false;
    }
    ctx.allowed_visibilities().contains(&item.visibility)
}

/// Resolve the viewer's relationship to a journey
pub async fn viewer_context(
    viewer: Option<&Actor>,
    journey_id: JourneyId,
    deps: &ServerDeps,
) -> Result<ViewerContext, GovernanceError> {
    let Some(actor) = viewer else {
        return Ok(ViewerContext::anonymous());
    };
    let member_id = actor.member_id();

    let journey = Journey::find_by_id(journey_id, &deps.db_pool).await?;
    let is_journey_owner = journey.map(|j| j.owner_id == member_id).unwrap_or(false);
    let tier = TrustedViewer::find_tier(journey_id, member_id, &deps.db_pool).await?;
    let scopes = deps.db_pool.active_scopes(member_id).await?;
    let is_steward = authorize(StewardCapability::ModerateJourney(journey_id), &scopes).is_some();

    Ok(ViewerContext {
        viewer: Some(member_id),
        is_journey_owner,
        tier,
        is_steward,
    })
}

/// Contributions of a journey the viewer may read, oldest first.
///
/// Anonymous viewers get approved public items only.
pub async fn visible_contributions(
    viewer: Option<&Actor>,
    journey_id: JourneyId,
    deps: &ServerDeps,
) -> Result<Vec<Contribution>, GovernanceError> {
    if Journey::find_by_id(journey_id, &deps.db_pool).await?.is_none() {
        return Err(GovernanceError::not_found(format!("journey {}", journey_id)));
    }

    let ctx = viewer_context(viewer, journey_id, deps).await?;

    if ctx.is_steward {
        return Ok(Contribution::find_by_journey(journey_id, &deps.db_pool).await?);
    }

    let items = Contribution::find_visible(
        journey_id,
        &ctx.allowed_visibilities(),
        ctx.viewer,
        &deps.db_pool,
    )
    .await?;

    Ok(items
        .into_iter()
        .map(Contribution::without_review_notes)
        .collect())
}
