//! Audit ledger reads. Writes happen inside the transactions that change state.

use crate::common::{
    authorize, Actor, GovernanceError, GrantScope, GrantSource, Page, StewardCapability,
};
use crate::domains::audit::models::{AuditActor, AuditEntry, AuditFilter};
use crate::domains::contributions::activities::review_scope;
use crate::kernel::ServerDeps;

/// Ledger entries the actor may read, newest first.
///
/// Scoping follows the review queue: global stewards read everything,
/// journey stewards their journeys, everyone their own history. Reviewer
/// notes are only shown to stewards of the entry's journey and to the member
/// who wrote them.
pub async fn list_entries(
    actor: &Actor,
    filter: AuditFilter,
    page: Page,
    deps: &ServerDeps,
) -> Result<Vec<AuditEntry>, GovernanceError> {
    let scopes = deps.db_pool.active_scopes(actor.member_id()).await?;
    let scope = review_scope(actor.member_id(), &scopes);

    let reader = AuditActor::Member(actor.member_id());
    let may_read_notes = |entry: &AuditEntry| {
        let moderates = match entry.journey_id {
            Some(journey_id) => {
                authorize(StewardCapability::ModerateJourney(journey_id), &scopes).is_some()
            }
            None => scopes.iter().any(GrantScope::is_global),
        };
        moderates || entry.actor == reader
    };

    let entries: Vec<AuditEntry> = AuditEntry::find_scoped(&scope, &filter, page, &deps.db_pool)
        .await?
        .into_iter()
        .map(|entry| {
            if may_read_notes(&entry) {
                entry
            } else {
                entry.without_review_notes()
            }
        })
        .collect();
    Ok(entries)
}
