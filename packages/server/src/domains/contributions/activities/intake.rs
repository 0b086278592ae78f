//! Submission intake: validate a new contribution and persist it as pending.

use tracing::info;

use crate::common::{Actor, GovernanceError, JourneyId};
use crate::domains::audit::models::{AuditAction, AuditActor, AuditEntry, AuditTarget, NewAuditEntry};
use crate::domains::contributions::models::{
    Contribution, ContributionStatus, ContributionType, CreateContribution, Visibility,
};
use crate::domains::contributions::payload::{validate_payload, MAX_BODY_CHARS};
use crate::domains::journeys::Journey;
use crate::kernel::ServerDeps;

const MAX_ATTRIBUTION_CHARS: usize = 200;

/// A contribution as submitted by a member
#[derive(Debug, Clone)]
pub struct NewContribution {
    pub journey_id: JourneyId,
    pub contribution_type: ContributionType,
    pub payload: serde_json::Value,
    /// Defaults to `private_draft`
    pub visibility: Option<Visibility>,
    pub attribution: Option<String>,
    pub provenance_note: Option<String>,
    /// Keep as `draft` instead of entering the review queue
    pub as_draft: bool,
}

/// Validate and persist a new contribution.
///
/// Nothing is written when validation fails. On success the item and its
/// `item_created` ledger entry commit together.
pub async fn submit_contribution(
    actor: &Actor,
    input: NewContribution,
    deps: &ServerDeps,
) -> Result<Contribution, GovernanceError> {
    info!(
        member_id = %actor.member_id(),
        journey_id = %input.journey_id,
        contribution_type = %input.contribution_type,
        "Submitting contribution"
    );

    let payload =
        validate_payload(input.contribution_type, input.payload, &deps.intake_limits)?.to_json()?;
    let attribution = optional_text("attribution", input.attribution, MAX_ATTRIBUTION_CHARS)?;
    let provenance_note = optional_text("provenance_note", input.provenance_note, MAX_BODY_CHARS)?;

    if Journey::find_by_id(input.journey_id, &deps.db_pool)
        .await?
        .is_none()
    {
        return Err(GovernanceError::validation(format!(
            "Journey {} does not exist",
            input.journey_id
        )));
    }

    let status = if input.as_draft {
        ContributionStatus::Draft
    } else {
        ContributionStatus::SubmittedForReview
    };

    let create = CreateContribution::builder()
        .journey_id(input.journey_id)
        .contribution_type(input.contribution_type)
        .status(status)
        .visibility(input.visibility.unwrap_or_default())
        .payload(payload)
        .attribution(attribution)
        .provenance_note(provenance_note)
        .created_by(actor.member_id())
        .build();

    let item = persist_with_audit(create, actor, deps).await?;

    info!(contribution_id = %item.id, status = %item.status, "Contribution submitted");

    Ok(item)
}

/// Insert an item and its `item_created` ledger entry in one transaction
pub(crate) async fn persist_with_audit(
    create: CreateContribution,
    actor: &Actor,
    deps: &ServerDeps,
) -> Result<Contribution, GovernanceError> {
    let mut tx = deps.db_pool.begin().await?;

    let item = Contribution::create(create, &mut *tx).await?;

    AuditEntry::append(
        NewAuditEntry::builder()
            .target_kind(AuditTarget::Contribution)
            .target_id(item.id)
            .journey_id(Some(item.journey_id))
            .actor(AuditActor::Member(actor.member_id()))
            .action(AuditAction::ItemCreated)
            .after(item.snapshot())
            .build(),
        &mut *tx,
    )
    .await?;

    tx.commit().await?;

    Ok(item)
}

fn optional_text(
    field: &str,
    value: Option<String>,
    max_chars: usize,
) -> Result<Option<String>, GovernanceError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if v.is_empty() => Ok(None),
        Some(v) if v.chars().count() > max_chars => Err(GovernanceError::validation(format!(
            "{} must be at most {} characters",
            field, max_chars
        ))),
        other => Ok(other),
    }
}
