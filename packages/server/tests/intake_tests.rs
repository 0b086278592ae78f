//! Integration tests for submission intake.

mod common;

use crate::common::*;
use serde_json::json;
use server_core::common::{Actor, GovernanceError, JourneyId};
use server_core::kernel::TestDependencies;
use server_core::domains::audit::{AuditAction, AuditEntry};
use server_core::domains::contributions::activities::{submit_contribution, NewContribution};
use server_core::domains::contributions::{
    Contribution, ContributionStatus, ContributionType, IntakeLimits, Visibility,
};
use test_context::test_context;

const MIB: i64 = 1024 * 1024;

fn new_item(
    journey_id: JourneyId,
    contribution_type: ContributionType,
    payload: serde_json::Value,
) -> NewContribution {
    NewContribution {
        journey_id,
        contribution_type,
        payload,
        visibility: None,
        attribution: None,
        provenance_note: None,
        as_draft: false,
    }
}

async fn items_in(ctx: &TestHarness, journey_id: JourneyId) -> Vec<Contribution> {
    Contribution::find_by_journey(journey_id, &ctx.db_pool)
        .await
        .unwrap()
}

#[test_context(TestHarness)]
#[tokio::test]
async fn valid_text_enters_review_queue(ctx: &TestHarness) {
    let deps = ctx.deps();
    let (journey_id, _) = create_test_journey(&ctx.db_pool, "Intake").await.unwrap();
    let author = new_member();

    let item = submit_contribution(
        &Actor::member(author),
        NewContribution {
            attribution: Some("  Grandma's diary ".to_string()),
            ..new_item(journey_id, ContributionType::Text, text_payload("Summer 1962"))
        },
        &deps,
    )
    .await
    .unwrap();

    assert_eq!(item.status, ContributionStatus::SubmittedForReview);
    assert_eq!(item.visibility, Visibility::PrivateDraft);
    assert_eq!(item.created_by, author);
    assert_eq!(item.attribution.as_deref(), Some("Grandma's diary"));
    assert!(item.reviewed_by.is_none());

    let entries = AuditEntry::find_for_target(item.id.into_uuid(), &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, AuditAction::ItemCreated);
    assert!(entries[0].before_snapshot.is_none());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn oversized_document_is_rejected_and_nothing_persists(ctx: &TestHarness) {
    let deps = ctx.deps();
    let (journey_id, _) = create_test_journey(&ctx.db_pool, "Big files").await.unwrap();

    let err = submit_contribution(
        &Actor::member(new_member()),
        new_item(
            journey_id,
            ContributionType::Document,
            json!({ "file_name": "scans.pdf", "size_bytes": 40 * MIB }),
        ),
        &deps,
    )
    .await
    .unwrap_err();

    match &err {
        GovernanceError::SizeExceeded {
            limit, reducible, ..
        } => {
            assert_eq!(*limit, 8 * MIB);
            assert!(!reducible);
        }
        other => panic!("expected size_exceeded, got {other:?}"),
    }
    assert!(items_in(ctx, journey_id).await.is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn limits_come_from_deps(ctx: &TestHarness) {
    let deps = ctx.deps_with(TestDependencies::new().intake_limits(IntakeLimits {
        max_document_bytes: 1024,
        ..IntakeLimits::default()
    }));
    let (journey_id, _) = create_test_journey(&ctx.db_pool, "Tight limits").await.unwrap();

    let err = submit_contribution(
        &Actor::member(new_member()),
        new_item(
            journey_id,
            ContributionType::Document,
            json!({ "file_name": "minutes.pdf", "size_bytes": 2048 }),
        ),
        &deps,
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), "size_exceeded");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn oversized_image_may_be_reduced_once(ctx: &TestHarness) {
    let deps = ctx.deps();
    let (journey_id, _) = create_test_journey(&ctx.db_pool, "Photos").await.unwrap();
    let actor = Actor::member(new_member());

    let err = submit_contribution(
        &actor,
        new_item(
            journey_id,
            ContributionType::Image,
            json!({ "file_name": "team.jpg", "content_type": "image/jpeg", "size_bytes": 12 * MIB }),
        ),
        &deps,
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        GovernanceError::SizeExceeded { reducible: true, .. }
    ));

    let item = submit_contribution(
        &actor,
        new_item(
            journey_id,
            ContributionType::Image,
            json!({
                "file_name": "team.jpg",
                "content_type": "image/jpeg",
                "size_bytes": 12 * MIB,
                "reduced_size_bytes": 3 * MIB,
            }),
        ),
        &deps,
    )
    .await
    .unwrap();

    assert_eq!(item.payload["size_bytes"].as_i64(), Some(3 * MIB));
    assert!(item.payload.get("reduced_size_bytes").map_or(true, |v| v.is_null()));
    assert_eq!(items_in(ctx, journey_id).await.len(), 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn malformed_payloads_are_validation_errors(ctx: &TestHarness) {
    let deps = ctx.deps();
    let (journey_id, _) = create_test_journey(&ctx.db_pool, "Bad input").await.unwrap();
    let actor = Actor::member(new_member());

    let cases = [
        (ContributionType::Text, json!({ "title": "", "body": "x" })),
        (ContributionType::Text, json!({ "title": "t" })),
        (ContributionType::Link, json!({ "url": "ftp://example.com/file" })),
        (ContributionType::Milestone, json!({ "title": "Founded", "occurred_on": "spring 1901" })),
        (ContributionType::Video, json!({ "file_name": "clip.mp4" })),
        (ContributionType::Commendation, json!({ "body": "Great", "subject_member_id": "nobody" })),
    ];

    for (contribution_type, payload) in cases {
        let err = submit_contribution(&actor, new_item(journey_id, contribution_type, payload.clone()), &deps)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "validation_error", "payload {payload} for {contribution_type}");
    }

    assert!(items_in(ctx, journey_id).await.is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn unknown_journey_is_a_validation_error(ctx: &TestHarness) {
    let deps = ctx.deps();

    let err = submit_contribution(
        &Actor::member(new_member()),
        new_item(JourneyId::new(), ContributionType::Text, text_payload("Lost")),
        &deps,
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), "validation_error");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn drafts_stay_out_of_review(ctx: &TestHarness) {
    let deps = ctx.deps();
    let (journey_id, _) = create_test_journey(&ctx.db_pool, "Drafting").await.unwrap();

    let item = submit_contribution(
        &Actor::member(new_member()),
        NewContribution {
            as_draft: true,
            visibility: Some(Visibility::Public),
            ..new_item(
                journey_id,
                ContributionType::Milestone,
                json!({ "title": "Club founded", "occurred_on": "1901-04-12" }),
            )
        },
        &deps,
    )
    .await
    .unwrap();

    assert_eq!(item.status, ContributionStatus::Draft);
    assert_eq!(item.visibility, Visibility::Public);
}
