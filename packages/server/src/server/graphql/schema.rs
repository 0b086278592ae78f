//! GraphQL schema definition.
//!
//! Resolvers are thin: parse arguments, resolve the caller, call the domain
//! activity, convert the result.

use juniper::{DefaultScalarValue, EmptySubscription, FieldError, FieldResult, RootNode};
use tracing::{debug, error};
use uuid::Uuid;

use super::context::GraphQLContext;
use crate::common::{ContributionId, GovernanceError, GrantId, GrantScope, JourneyId, MemberId, Page};
use crate::domains::audit::activities as audit_activities;
use crate::domains::audit::{AuditEntryData, AuditFilterInput};
use crate::domains::contact::activities as contact_activities;
use crate::domains::contact::{ContactMessageData, SendContactMessageInput};
use crate::domains::contributions::activities as contribution_activities;
use crate::domains::contributions::{
    ContributionData, ReviewQueueData, ReviewQueueFilterInput, SubmitContributionInput,
};
use crate::domains::stewards::activities as steward_activities;
use crate::domains::stewards::StewardGrantData;

/// Convert a governance error into a GraphQL error with `extensions.code`.
///
/// Internal failures are logged here and reach the caller without diagnostics.
pub fn to_field_error(err: GovernanceError) -> FieldError {
    match &err {
        GovernanceError::Database(_) | GovernanceError::Internal(_) => {
            error!(error = %err, "Request failed");
        }
        GovernanceError::NotFound(_) => {
            debug!(error = %err, "Target not found, reporting permission_denied");
        }
        _ => {}
    }

    let mut extensions = juniper::Object::<DefaultScalarValue>::with_capacity(3);
    extensions.add_field("code", juniper::Value::scalar(err.public_kind().to_string()));
    if let GovernanceError::SizeExceeded {
        limit, reducible, ..
    } = &err
    {
        extensions.add_field(
            "limit",
            juniper::Value::scalar(i32::try_from(*limit).unwrap_or(i32::MAX)),
        );
        extensions.add_field("reducible", juniper::Value::scalar(*reducible));
    }

    FieldError::new(err.public_message(), juniper::Value::Object(extensions))
}

fn typed_id<T>(raw: Uuid) -> crate::common::Id<T> {
    crate::common::Id::from_uuid(raw)
}

pub struct Query;

#[juniper::graphql_object(context = GraphQLContext)]
impl Query {
    /// A single contribution, if the caller may see it
    async fn contribution(ctx: &GraphQLContext, id: Uuid) -> FieldResult<ContributionData> {
        let actor = ctx.actor();
        let id: ContributionId = typed_id(id);

        let item = contribution_activities::get_contribution(actor.as_ref(), id, ctx.deps())
            .await
            .map_err(to_field_error)?;

        Ok(item.into())
    }

    /// Items awaiting (or past) review, scoped to the caller's grants
    async fn review_queue(
        ctx: &GraphQLContext,
        filter: Option<ReviewQueueFilterInput>,
        limit: Option<i32>,
        offset: Option<i32>,
    ) -> FieldResult<ReviewQueueData> {
        let actor = ctx.require_actor()?;
        let filter = filter
            .unwrap_or_default()
            .into_filter()
            .map_err(to_field_error)?;

        let page = contribution_activities::review_queue(
            &actor,
            filter,
            Page::new(limit, offset),
            ctx.deps(),
        )
        .await
        .map_err(to_field_error)?;

        Ok(page.into())
    }

    /// Contributions of a journey visible to the caller (anonymous allowed)
    async fn visible_contributions(
        ctx: &GraphQLContext,
        journey_id: Uuid,
    ) -> FieldResult<Vec<ContributionData>> {
        let actor = ctx.actor();
        let journey_id: JourneyId = typed_id(journey_id);

        let items =
            contribution_activities::visible_contributions(actor.as_ref(), journey_id, ctx.deps())
                .await
                .map_err(to_field_error)?;

        Ok(items.into_iter().map(ContributionData::from).collect())
    }

    /// Audit ledger entries, newest first
    async fn audit_entries(
        ctx: &GraphQLContext,
        filter: Option<AuditFilterInput>,
        limit: Option<i32>,
        offset: Option<i32>,
    ) -> FieldResult<Vec<AuditEntryData>> {
        let actor = ctx.require_actor()?;
        let filter = filter
            .unwrap_or_default()
            .into_filter()
            .map_err(to_field_error)?;

        let entries =
            audit_activities::list_entries(&actor, filter, Page::new(limit, offset), ctx.deps())
                .await
                .map_err(to_field_error)?;

        Ok(entries.into_iter().map(AuditEntryData::from).collect())
    }

    /// Steward grants. Omit `memberId` for your own (or, as a global steward, everyone's).
    async fn steward_grants(
        ctx: &GraphQLContext,
        member_id: Option<Uuid>,
    ) -> FieldResult<Vec<StewardGrantData>> {
        let actor = ctx.require_actor()?;
        let member_id: Option<MemberId> = member_id.map(typed_id);

        let grants = steward_activities::list_grants(&actor, member_id, ctx.deps())
            .await
            .map_err(to_field_error)?;

        Ok(grants.into_iter().map(StewardGrantData::from).collect())
    }
}

pub struct Mutation;

#[juniper::graphql_object(context = GraphQLContext)]
impl Mutation {
    /// Submit a new contribution (enters review unless `asDraft`)
    async fn submit_contribution(
        ctx: &GraphQLContext,
        input: SubmitContributionInput,
    ) -> FieldResult<ContributionData> {
        let actor = ctx.require_actor()?;
        let input = input.into_new_contribution().map_err(to_field_error)?;

        let item = contribution_activities::submit_contribution(&actor, input, ctx.deps())
            .await
            .map_err(to_field_error)?;

        Ok(item.into())
    }

    /// Move your own draft into the review queue
    async fn submit_draft(ctx: &GraphQLContext, id: Uuid) -> FieldResult<ContributionData> {
        let actor = ctx.require_actor()?;

        let item = contribution_activities::submit_draft(&actor, typed_id(id), ctx.deps())
            .await
            .map_err(to_field_error)?;

        Ok(item.into())
    }

    async fn approve_contribution(ctx: &GraphQLContext, id: Uuid) -> FieldResult<ContributionData> {
        let actor = ctx.require_actor()?;

        let item = contribution_activities::approve_contribution(&actor, typed_id(id), ctx.deps())
            .await
            .map_err(to_field_error)?;

        Ok(item.into())
    }

    async fn reject_contribution(
        ctx: &GraphQLContext,
        id: Uuid,
        note: Option<String>,
    ) -> FieldResult<ContributionData> {
        let actor = ctx.require_actor()?;

        let item =
            contribution_activities::reject_contribution(&actor, typed_id(id), note, ctx.deps())
                .await
                .map_err(to_field_error)?;

        Ok(item.into())
    }

    /// Send an approved or rejected item back to review
    async fn reset_contribution(
        ctx: &GraphQLContext,
        id: Uuid,
        note: Option<String>,
    ) -> FieldResult<ContributionData> {
        let actor = ctx.require_actor()?;

        let item =
            contribution_activities::reset_contribution(&actor, typed_id(id), note, ctx.deps())
                .await
                .map_err(to_field_error)?;

        Ok(item.into())
    }

    /// Answer a commendation written about you
    async fn respond_to_commendation(
        ctx: &GraphQLContext,
        id: Uuid,
        body: String,
    ) -> FieldResult<ContributionData> {
        let actor = ctx.require_actor()?;

        let item =
            contribution_activities::respond_to_commendation(&actor, typed_id(id), body, ctx.deps())
                .await
                .map_err(to_field_error)?;

        Ok(item.into())
    }

    /// Make a member a steward of one journey (global stewards only)
    async fn grant_steward(
        ctx: &GraphQLContext,
        member_id: Uuid,
        journey_id: Uuid,
    ) -> FieldResult<StewardGrantData> {
        let actor = ctx.require_actor()?;
        let scope = GrantScope::Journey(typed_id(journey_id));

        let grant = steward_activities::grant_steward(&actor, typed_id(member_id), scope, ctx.deps())
            .await
            .map_err(to_field_error)?;

        Ok(grant.into())
    }

    async fn revoke_steward(ctx: &GraphQLContext, grant_id: Uuid) -> FieldResult<StewardGrantData> {
        let actor = ctx.require_actor()?;
        let grant_id: GrantId = typed_id(grant_id);

        let grant = steward_activities::revoke_steward(&actor, grant_id, ctx.deps())
            .await
            .map_err(to_field_error)?;

        Ok(grant.into())
    }

    /// Leave a message through the contact form (anonymous allowed)
    async fn send_contact_message(
        ctx: &GraphQLContext,
        input: SendContactMessageInput,
    ) -> FieldResult<ContactMessageData> {
        let input = input.into_new_message().map_err(to_field_error)?;

        let message = contact_activities::send_contact_message(input, ctx.deps())
            .await
            .map_err(to_field_error)?;

        Ok(message.into())
    }
}

pub type Schema = RootNode<'static, Query, Mutation, EmptySubscription<GraphQLContext>>;

pub fn create_schema() -> Schema {
    Schema::new(Query, Mutation, EmptySubscription::new())
}
