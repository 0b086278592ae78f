//! Decision engine: moderation transitions, atomic with the audit ledger.
//!
//! Every transition runs in one transaction:
//!
//! 1. lock the item row (`SELECT ... FOR UPDATE`)
//! 2. re-derive the actor's grants inside the same transaction
//! 3. compute the next status with the pure review machine
//! 4. update the row and append the ledger entry
//! 5. commit, then fire notifications
//!
//! Two stewards deciding the same item serialize on the row lock; the second
//! one is evaluated against whatever the first one committed.

use serde_json::json;
use tracing::info;

use crate::common::{Actor, ContributionId, GovernanceError, StewardCapability};
use crate::domains::audit::models::{AuditAction, AuditActor, AuditEntry, AuditTarget, NewAuditEntry};
use crate::domains::contributions::machines::{next_status, ReviewAction, Transition};
use crate::domains::contributions::models::Contribution;
use crate::domains::stewards::models::StewardGrant;
use crate::kernel::{dispatch, NotificationKind, ServerDeps};

/// Apply a moderation action to an item.
///
/// Returns the item as committed. Re-applying an action that already took
/// effect returns the current item and writes nothing.
pub async fn apply_review_action(
    actor: &Actor,
    contribution_id: ContributionId,
    action: ReviewAction,
    note: Option<String>,
    deps: &ServerDeps,
) -> Result<Contribution, GovernanceError> {
    info!(
        contribution_id = %contribution_id,
        member_id = %actor.member_id(),
        action = %action,
        "Applying review action"
    );

    let mut tx = deps.db_pool.begin().await?;

    let item = Contribution::find_by_id_for_update(contribution_id, &mut *tx)
        .await?
        .ok_or_else(|| GovernanceError::not_found(format!("contribution {}", contribution_id)))?;

    if action.requires_authority() {
        let scopes = StewardGrant::active_scopes(actor.member_id(), &mut *tx).await?;
        actor
            .can(StewardCapability::ModerateJourney(item.journey_id))
            .check(&scopes)
            .await?;
    } else if item.created_by != actor.member_id() {
        return Err(GovernanceError::permission_denied(
            "only the member who created an item can submit it",
        ));
    }

    let next = match next_status(item.status, action)? {
        Transition::AlreadyApplied => {
            tx.rollback().await?;
            info!(
                contribution_id = %item.id,
                status = %item.status,
                "Review action already applied, nothing to do"
            );
            return Ok(item);
        }
        Transition::Moved(next) => next,
    };

    let note = note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
    let reviewer = actor.member_id();

    let (updated, audit_action) = match action {
        ReviewAction::Submit => (
            Contribution::mark_submitted(item.id, &mut *tx).await?,
            AuditAction::ItemSubmitted,
        ),
        ReviewAction::Approve => (
            Contribution::mark_approved(item.id, reviewer, &mut *tx).await?,
            AuditAction::ItemApproved,
        ),
        ReviewAction::Reject => (
            Contribution::mark_rejected(item.id, reviewer, note.as_deref(), &mut *tx).await?,
            AuditAction::ItemRejected,
        ),
        ReviewAction::ResetToPending => (
            Contribution::mark_reset(item.id, note.as_deref(), &mut *tx).await?,
            AuditAction::ItemReset,
        ),
    };
    debug_assert_eq!(updated.status, next);

    AuditEntry::append(
        NewAuditEntry::builder()
            .target_kind(AuditTarget::Contribution)
            .target_id(updated.id)
            .journey_id(Some(updated.journey_id))
            .actor(AuditActor::Member(reviewer))
            .action(audit_action)
            .before(Some(item.snapshot()))
            .after(updated.snapshot())
            .note(note)
            .build(),
        &mut *tx,
    )
    .await?;

    tx.commit().await?;

    info!(
        contribution_id = %updated.id,
        from = %item.status,
        to = %updated.status,
        "Review action committed"
    );

    let notification = match action {
        ReviewAction::Approve => Some(NotificationKind::ContributionApproved),
        ReviewAction::Reject => Some(NotificationKind::ContributionRejected),
        _ => None,
    };
    if let Some(kind) = notification {
        dispatch(
            deps.notifier.clone(),
            updated.created_by,
            kind,
            json!({
                "contribution_id": updated.id,
                "journey_id": updated.journey_id,
            }),
        );
    }

    Ok(updated)
}

/// draft -> submitted_for_review (item creator only)
///
/// The creator is answered without reviewer notes, which matters when the
/// item was already sent back to review with a reset note.
pub async fn submit_draft(
    actor: &Actor,
    contribution_id: ContributionId,
    deps: &ServerDeps,
) -> Result<Contribution, GovernanceError> {
    apply_review_action(actor, contribution_id, ReviewAction::Submit, None, deps)
        .await
        .map(Contribution::without_review_notes)
}

pub async fn approve_contribution(
    actor: &Actor,
    contribution_id: ContributionId,
    deps: &ServerDeps,
) -> Result<Contribution, GovernanceError> {
    apply_review_action(actor, contribution_id, ReviewAction::Approve, None, deps).await
}

pub async fn reject_contribution(
    actor: &Actor,
    contribution_id: ContributionId,
    note: Option<String>,
    deps: &ServerDeps,
) -> Result<Contribution, GovernanceError> {
    apply_review_action(actor, contribution_id, ReviewAction::Reject, note, deps).await
}

pub async fn reset_contribution(
    actor: &Actor,
    contribution_id: ContributionId,
    note: Option<String>,
    deps: &ServerDeps,
) -> Result<Contribution, GovernanceError> {
    apply_review_action(
        actor,
        contribution_id,
        ReviewAction::ResetToPending,
        note,
        deps,
    )
    .await
}
