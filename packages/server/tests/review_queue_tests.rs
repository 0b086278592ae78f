//! Integration tests for the scoped review queue and read visibility.

mod common;

use crate::common::*;
use server_core::common::{Actor, Page};
use server_core::domains::contributions::activities::{
    approve_contribution, get_contribution, review_queue, visible_contributions,
};
use server_core::domains::contributions::models::ContributionFilter;
use server_core::domains::contributions::{ContributionStatus, Visibility};
use server_core::domains::journeys::ViewerTier;
use test_context::test_context;

#[test_context(TestHarness)]
#[tokio::test]
async fn journey_steward_sees_only_their_journey(ctx: &TestHarness) {
    let deps = ctx.deps();
    let (journey_a, _) = create_test_journey(&ctx.db_pool, "Queue A").await.unwrap();
    let (journey_b, _) = create_test_journey(&ctx.db_pool, "Queue B").await.unwrap();
    let (steward, _) = create_journey_steward(&deps, journey_a).await.unwrap();

    let mine = submit_text(&deps, new_member(), journey_a, "In scope").await.unwrap();
    submit_text(&deps, new_member(), journey_b, "Out of scope").await.unwrap();

    let page = review_queue(
        &Actor::member(steward),
        ContributionFilter::default(),
        Page::default(),
        &deps,
    )
    .await
    .unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, mine.id);
    assert_eq!(page.count(ContributionStatus::SubmittedForReview), 1);

    // Asking for another journey narrows to nothing rather than widening scope.
    let filtered = review_queue(
        &Actor::member(steward),
        ContributionFilter {
            journey_id: Some(journey_b),
            ..Default::default()
        },
        Page::default(),
        &deps,
    )
    .await
    .unwrap();
    assert!(filtered.items.is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn member_without_grants_sees_own_items(ctx: &TestHarness) {
    let deps = ctx.deps();
    let (journey_id, _) = create_test_journey(&ctx.db_pool, "Own items").await.unwrap();
    let author = new_member();
    let own = submit_text(&deps, author, journey_id, "Mine").await.unwrap();
    submit_text(&deps, new_member(), journey_id, "Someone else's").await.unwrap();

    let page = review_queue(
        &Actor::member(author),
        ContributionFilter::default(),
        Page::default(),
        &deps,
    )
    .await
    .unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, own.id);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn counts_cover_every_status(ctx: &TestHarness) {
    let deps = ctx.deps();
    let (journey_id, _) = create_test_journey(&ctx.db_pool, "Counting").await.unwrap();
    let steward = create_global_steward(&deps).await.unwrap();
    let actor = Actor::member(steward);

    let first = submit_text(&deps, new_member(), journey_id, "One").await.unwrap();
    submit_text(&deps, new_member(), journey_id, "Two").await.unwrap();
    submit_text(&deps, new_member(), journey_id, "Three").await.unwrap();
    approve_contribution(&actor, first.id, &deps).await.unwrap();

    let page = review_queue(
        &actor,
        ContributionFilter {
            journey_id: Some(journey_id),
            status: Some(ContributionStatus::SubmittedForReview),
            ..Default::default()
        },
        Page::new(Some(1), Some(0)),
        &deps,
    )
    .await
    .unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].status, ContributionStatus::SubmittedForReview);
    assert_eq!(page.counts.len(), 4);
    assert_eq!(page.count(ContributionStatus::SubmittedForReview), 2);
    assert_eq!(page.count(ContributionStatus::Approved), 1);
    assert_eq!(page.count(ContributionStatus::Rejected), 0);
    assert_eq!(page.count(ContributionStatus::Draft), 0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn pending_items_are_hidden_from_readers(ctx: &TestHarness) {
    let deps = ctx.deps();
    let (journey_id, owner) = create_test_journey(&ctx.db_pool, "Reading").await.unwrap();
    let steward = create_global_steward(&deps).await.unwrap();
    let author = new_member();

    let pending = submit_text_with(&deps, author, journey_id, "Pending", Visibility::Public, false)
        .await
        .unwrap();
    let public = submit_text_with(&deps, author, journey_id, "Public", Visibility::Public, false)
        .await
        .unwrap();
    approve_contribution(&Actor::member(steward), public.id, &deps)
        .await
        .unwrap();

    let anonymous = visible_contributions(None, journey_id, &deps).await.unwrap();
    assert_eq!(anonymous.iter().map(|i| i.id).collect::<Vec<_>>(), vec![public.id]);

    let err = get_contribution(None, pending.id, &deps).await.unwrap_err();
    assert_eq!(err.public_kind(), "permission_denied");

    // The creator and stewards still see the pending item.
    assert!(get_contribution(Some(&Actor::member(author)), pending.id, &deps)
        .await
        .is_ok());
    assert_eq!(
        visible_contributions(Some(&Actor::member(steward)), journey_id, &deps)
            .await
            .unwrap()
            .len(),
        2
    );
    // Owners only see approved items of others.
    assert_eq!(
        visible_contributions(Some(&Actor::member(owner)), journey_id, &deps)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[test_context(TestHarness)]
#[tokio::test]
async fn trusted_tiers_widen_the_audience(ctx: &TestHarness) {
    let deps = ctx.deps();
    let (journey_id, owner) = create_test_journey(&ctx.db_pool, "Tiers").await.unwrap();
    let steward = create_global_steward(&deps).await.unwrap();
    let reviewer = Actor::member(steward);
    let author = new_member();

    let mut approved = Vec::new();
    for visibility in [
        Visibility::Public,
        Visibility::Connections,
        Visibility::Family,
        Visibility::PrivateDraft,
    ] {
        let item = submit_text_with(&deps, author, journey_id, "Tiered", visibility, false)
            .await
            .unwrap();
        approve_contribution(&reviewer, item.id, &deps).await.unwrap();
        approved.push(item);
    }

    let family = new_member();
    let connection = new_member();
    add_trusted_viewer(&ctx.db_pool, journey_id, family, ViewerTier::Family).await.unwrap();
    add_trusted_viewer(&ctx.db_pool, journey_id, connection, ViewerTier::Connections)
        .await
        .unwrap();

    let count_for = |member| {
        let deps = deps.clone();
        async move {
            visible_contributions(Some(&Actor::member(member)), journey_id, &deps)
                .await
                .unwrap()
                .len()
        }
    };

    assert_eq!(count_for(new_member()).await, 1);
    assert_eq!(count_for(connection).await, 2);
    assert_eq!(count_for(family).await, 3);
    assert_eq!(count_for(owner).await, 4);
}
