//! Test fixtures for creating test data.
//!
//! Fixtures go through the same model methods and activities as production
//! code, so every item they create has its ledger entries.

use anyhow::Result;
use serde_json::json;
use server_core::common::{Actor, GrantScope, JourneyId, MemberId};
use server_core::domains::contributions::activities::{submit_contribution, NewContribution};
use server_core::domains::contributions::{Contribution, ContributionType, Visibility};
use server_core::domains::journeys::{Journey, TrustedViewer, ViewerTier};
use server_core::domains::stewards::activities::grant_as_system;
use server_core::domains::stewards::StewardGrant;
use server_core::kernel::ServerDeps;
use sqlx::PgPool;

/// A fresh member id (members live in the identity provider)
pub fn new_member() -> MemberId {
    MemberId::new()
}

/// Create a journey with a fresh owner. Returns (journey, owner).
pub async fn create_test_journey(pool: &PgPool, name: &str) -> Result<(JourneyId, MemberId)> {
    let owner = new_member();
    let journey = Journey::create(owner, name, pool).await?;
    Ok((journey.id, owner))
}

pub async fn add_trusted_viewer(
    pool: &PgPool,
    journey_id: JourneyId,
    member_id: MemberId,
    tier: ViewerTier,
) -> Result<()> {
    TrustedViewer::upsert(journey_id, member_id, tier, pool).await?;
    Ok(())
}

/// A member holding a global steward grant
pub async fn create_global_steward(deps: &ServerDeps) -> Result<MemberId> {
    let member = new_member();
    grant_as_system(member, GrantScope::Global, deps).await?;
    Ok(member)
}

/// A member holding a steward grant for one journey
pub async fn create_journey_steward(
    deps: &ServerDeps,
    journey_id: JourneyId,
) -> Result<(MemberId, StewardGrant)> {
    let member = new_member();
    let grant = grant_as_system(member, GrantScope::Journey(journey_id), deps).await?;
    Ok((member, grant))
}

pub fn text_payload(title: &str) -> serde_json::Value {
    json!({ "title": title, "body": "A memory worth keeping." })
}

/// Submit a text item for review as `author`
pub async fn submit_text(
    deps: &ServerDeps,
    author: MemberId,
    journey_id: JourneyId,
    title: &str,
) -> Result<Contribution> {
    submit_text_with(deps, author, journey_id, title, Visibility::PrivateDraft, false).await
}

pub async fn submit_text_with(
    deps: &ServerDeps,
    author: MemberId,
    journey_id: JourneyId,
    title: &str,
    visibility: Visibility,
    as_draft: bool,
) -> Result<Contribution> {
    let item = submit_contribution(
        &Actor::member(author),
        NewContribution {
            journey_id,
            contribution_type: ContributionType::Text,
            payload: text_payload(title),
            visibility: Some(visibility),
            attribution: None,
            provenance_note: None,
            as_draft,
        },
        deps,
    )
    .await?;
    Ok(item)
}

/// Submit a commendation about `subject`
pub async fn submit_commendation(
    deps: &ServerDeps,
    author: MemberId,
    journey_id: JourneyId,
    subject: MemberId,
) -> Result<Contribution> {
    let item = submit_contribution(
        &Actor::member(author),
        NewContribution {
            journey_id,
            contribution_type: ContributionType::Commendation,
            payload: json!({
                "body": "Always the first to help set up the pitch.",
                "subject_member_id": subject,
            }),
            visibility: Some(Visibility::Public),
            attribution: Some("Club secretary".to_string()),
            provenance_note: None,
            as_draft: false,
        },
        deps,
    )
    .await?;
    Ok(item)
}
