//! Review queue: scoped listings of contributions for moderators and members.

use tracing::debug;

use crate::common::{
    authorize, Actor, ContributionId, GovernanceError, GrantScope, GrantSource, MemberId, Page,
    StewardCapability,
};
use crate::domains::contributions::activities::visibility::{is_visible_to, viewer_context};
use crate::domains::contributions::models::{
    Contribution, ContributionFilter, ContributionStatus, ReviewScope,
};
use crate::kernel::ServerDeps;

/// One page of the review queue plus per-status totals
#[derive(Debug, Clone)]
pub struct ReviewQueuePage {
    pub items: Vec<Contribution>,
    /// Every status appears, zero when empty
    pub counts: Vec<(ContributionStatus, i64)>,
    pub page: Page,
}

impl ReviewQueuePage {
    pub fn count(&self, status: ContributionStatus) -> i64 {
        self.counts
            .iter()
            .find(|(s, _)| *s == status)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}

/// What a member may see in the review queue, given their active grants
pub fn review_scope(member_id: MemberId, scopes: &[GrantScope]) -> ReviewScope {
    if scopes.iter().any(GrantScope::is_global) {
        return ReviewScope::All;
    }

    let mut journeys: Vec<_> = scopes.iter().filter_map(GrantScope::journey_id).collect();
    if journeys.is_empty() {
        return ReviewScope::Own(member_id);
    }
    journeys.sort();
    journeys.dedup();

    ReviewScope::Journeys {
        journeys,
        member_id,
    }
}

/// List contributions the actor may review, oldest first.
pub async fn review_queue(
    actor: &Actor,
    filter: ContributionFilter,
    page: Page,
    deps: &ServerDeps,
) -> Result<ReviewQueuePage, GovernanceError> {
    let scopes = deps.db_pool.active_scopes(actor.member_id()).await?;
    let scope = review_scope(actor.member_id(), &scopes);

    debug!(member_id = %actor.member_id(), scope = ?scope, filter = ?filter, "Loading review queue");

    // A journey steward also sees their own items elsewhere; notes on those stay hidden.
    let items: Vec<Contribution> = Contribution::find_scoped(&scope, &filter, page, &deps.db_pool)
        .await?
        .into_iter()
        .map(|item| {
            if authorize(StewardCapability::ModerateJourney(item.journey_id), &scopes).is_some() {
                item
            } else {
                item.without_review_notes()
            }
        })
        .collect();
    let found = Contribution::count_by_status_scoped(&scope, &filter, &deps.db_pool).await?;

    let counts = ContributionStatus::ALL
        .iter()
        .map(|status| {
            let n = found
                .iter()
                .find(|(s, _)| s == status)
                .map(|(_, n)| *n)
                .unwrap_or(0);
            (*status, n)
        })
        .collect();

    Ok(ReviewQueuePage {
        items,
        counts,
        page,
    })
}

/// Fetch a single contribution if the viewer may see it.
///
/// Items outside the viewer's reach are reported as not found.
pub async fn get_contribution(
    viewer: Option<&Actor>,
    contribution_id: ContributionId,
    deps: &ServerDeps,
) -> Result<Contribution, GovernanceError> {
    let not_found = || GovernanceError::not_found(format!("contribution {}", contribution_id));

    let item = Contribution::find_by_id(contribution_id, &deps.db_pool)
        .await?
        .ok_or_else(not_found)?;

    let ctx = viewer_context(viewer, item.journey_id, deps).await?;
    if !is_visible_to(&item, &ctx) {
        return Err(not_found());
    }

    if ctx.is_steward {
        Ok(item)
    } else {
        Ok(item.without_review_notes())
    }
}
