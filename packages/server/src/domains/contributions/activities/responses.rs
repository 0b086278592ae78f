//! Responses to commendations.
//!
//! The member a commendation is about may answer it. The answer is a `text`
//! item linked through `in_reply_to` and goes through review like any other
//! contribution.

use serde_json::json;
use tracing::info;

use crate::common::{Actor, ContributionId, GovernanceError};
use crate::domains::contributions::activities::intake::persist_with_audit;
use crate::domains::contributions::models::{
    Contribution, ContributionStatus, ContributionType, CreateContribution,
};
use crate::domains::contributions::payload::{commendation_subject, validate_payload};
use crate::kernel::ServerDeps;

pub const RESPONSE_TITLE: &str = "Response to commendation";

pub async fn respond_to_commendation(
    actor: &Actor,
    commendation_id: ContributionId,
    body: String,
    deps: &ServerDeps,
) -> Result<Contribution, GovernanceError> {
    info!(
        commendation_id = %commendation_id,
        member_id = %actor.member_id(),
        "Responding to commendation"
    );

    let commendation = Contribution::find_by_id(commendation_id, &deps.db_pool)
        .await?
        .ok_or_else(|| GovernanceError::not_found(format!("contribution {}", commendation_id)))?;

    if commendation.contribution_type != ContributionType::Commendation {
        return Err(GovernanceError::validation(
            "Only commendations can be responded to",
        ));
    }

    if commendation_subject(&commendation.payload) != Some(actor.member_id()) {
        return Err(GovernanceError::permission_denied(
            "only the subject of a commendation can respond to it",
        ));
    }

    if commendation.status != ContributionStatus::Approved {
        return Err(GovernanceError::InvalidStatus {
            status: commendation.status.to_string(),
            action: "respond to".to_string(),
        });
    }

    let payload = validate_payload(
        ContributionType::Text,
        json!({ "title": RESPONSE_TITLE, "body": body }),
        &deps.intake_limits,
    )?
    .to_json()?;

    let create = CreateContribution::builder()
        .journey_id(commendation.journey_id)
        .contribution_type(ContributionType::Text)
        .status(ContributionStatus::SubmittedForReview)
        .visibility(commendation.visibility)
        .payload(payload)
        .in_reply_to(Some(commendation.id))
        .created_by(actor.member_id())
        .build();

    let response = persist_with_audit(create, actor, deps).await?;

    info!(contribution_id = %response.id, "Commendation response submitted");

    Ok(response)
}
