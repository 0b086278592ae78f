//! Moderation authority: checking, granting and revoking steward grants.
//!
//! Grants are always read fresh from the grant store. Nothing a client says
//! about its own role is consulted.

use serde_json::json;
use sqlx::PgConnection;
use tracing::info;
use uuid::Uuid;

use crate::common::{
    Actor, GovernanceError, GrantId, GrantScope, JourneyId, MemberId, StewardCapability,
};
use crate::domains::audit::models::{AuditAction, AuditActor, AuditEntry, AuditTarget, NewAuditEntry};
use crate::domains::journeys::Journey;
use crate::domains::stewards::models::StewardGrant;
use crate::kernel::{dispatch, NotificationKind, ServerDeps};

/// Check that the actor may moderate items of `journey_id`.
///
/// Returns the grant scope that allows it.
pub async fn authorize_moderation(
    actor: &Actor,
    journey_id: JourneyId,
    deps: &ServerDeps,
) -> Result<GrantScope, GovernanceError> {
    let scope = actor
        .can(StewardCapability::ModerateJourney(journey_id))
        .check(&deps.db_pool)
        .await?;
    Ok(scope)
}

/// Give a member steward authority over one journey. Requires a global grant.
///
/// Global grants are only issued by the system (bootstrap configuration or the
/// governance CLI). Granting a scope the member already holds returns the
/// existing grant.
pub async fn grant_steward(
    actor: &Actor,
    member_id: MemberId,
    scope: GrantScope,
    deps: &ServerDeps,
) -> Result<StewardGrant, GovernanceError> {
    info!(
        member_id = %member_id,
        scope = %scope,
        granted_by = %actor.member_id(),
        "Granting steward authority"
    );

    if scope.is_global() {
        return Err(GovernanceError::permission_denied(
            "global steward grants can only be issued by the system",
        ));
    }
    if let Some(journey_id) = scope.journey_id() {
        if Journey::find_by_id(journey_id, &deps.db_pool).await?.is_none() {
            return Err(GovernanceError::validation(format!(
                "Journey {} does not exist",
                journey_id
            )));
        }
    }

    let mut tx = deps.db_pool.begin().await?;

    let scopes = StewardGrant::active_scopes(actor.member_id(), &mut *tx).await?;
    actor
        .can(StewardCapability::ManageGrants)
        .check(&scopes)
        .await?;

    let (grant, created) = create_grant(
        member_id,
        scope,
        AuditActor::Member(actor.member_id()),
        &mut tx,
    )
    .await?;

    tx.commit().await?;

    if created {
        dispatch(
            deps.notifier.clone(),
            member_id,
            NotificationKind::StewardGranted,
            json!({ "grant_id": grant.id, "scope": scope }),
        );
    }

    Ok(grant)
}

/// Issue a grant as the system, bypassing authorization (bootstrap, CLI)
pub async fn grant_as_system(
    member_id: MemberId,
    scope: GrantScope,
    deps: &ServerDeps,
) -> Result<StewardGrant, GovernanceError> {
    let mut tx = deps.db_pool.begin().await?;
    let (grant, created) = create_grant(member_id, scope, AuditActor::System, &mut tx).await?;
    tx.commit().await?;

    if created {
        info!(member_id = %member_id, scope = %scope, grant_id = %grant.id, "System grant issued");
    }

    Ok(grant)
}

/// Seed global grants for the configured members. Safe to run on every start.
pub async fn bootstrap_global_stewards(
    members: &[Uuid],
    deps: &ServerDeps,
) -> Result<Vec<StewardGrant>, GovernanceError> {
    let mut grants = Vec::with_capacity(members.len());
    for member in members {
        let grant =
            grant_as_system(MemberId::from_uuid(*member), GrantScope::Global, deps).await?;
        grants.push(grant);
    }

    info!(count = grants.len(), "Bootstrap stewards ensured");
    Ok(grants)
}

/// End a journey-scoped grant. Requires a global grant.
///
/// Global grants cannot be revoked through this path. Revoking an already
/// revoked grant returns it unchanged.
pub async fn revoke_steward(
    actor: &Actor,
    grant_id: GrantId,
    deps: &ServerDeps,
) -> Result<StewardGrant, GovernanceError> {
    info!(grant_id = %grant_id, revoked_by = %actor.member_id(), "Revoking steward grant");

    let mut tx = deps.db_pool.begin().await?;

    let scopes = StewardGrant::active_scopes(actor.member_id(), &mut *tx).await?;
    actor
        .can(StewardCapability::ManageGrants)
        .check(&scopes)
        .await?;

    let grant = StewardGrant::find_by_id_for_update(grant_id, &mut *tx)
        .await?
        .ok_or_else(|| GovernanceError::not_found(format!("grant {}", grant_id)))?;

    if grant.scope().is_global() {
        return Err(GovernanceError::permission_denied(
            "global steward grants cannot be revoked",
        ));
    }

    let revoked = end_grant(grant, AuditActor::Member(actor.member_id()), &mut tx).await?;
    tx.commit().await?;

    if let Some(revoked) = &revoked {
        dispatch(
            deps.notifier.clone(),
            revoked.member_id,
            NotificationKind::StewardRevoked,
            json!({ "grant_id": revoked.id, "scope": revoked.scope() }),
        );
    }

    match revoked {
        Some(grant) => Ok(grant),
        None => StewardGrant::find_by_id(grant_id, &deps.db_pool)
            .await?
            .ok_or_else(|| GovernanceError::not_found(format!("grant {}", grant_id))),
    }
}

/// Revoke any grant, global ones included, as the system (CLI)
pub async fn revoke_as_system(
    grant_id: GrantId,
    deps: &ServerDeps,
) -> Result<StewardGrant, GovernanceError> {
    let mut tx = deps.db_pool.begin().await?;

    let grant = StewardGrant::find_by_id_for_update(grant_id, &mut *tx)
        .await?
        .ok_or_else(|| GovernanceError::not_found(format!("grant {}", grant_id)))?;
    let current = grant.clone();

    let revoked = end_grant(grant, AuditActor::System, &mut tx).await?;
    tx.commit().await?;

    Ok(revoked.unwrap_or(current))
}

/// Grants visible to the actor. Global stewards may list anyone's.
pub async fn list_grants(
    actor: &Actor,
    member_id: Option<MemberId>,
    deps: &ServerDeps,
) -> Result<Vec<StewardGrant>, GovernanceError> {
    let is_global = actor
        .can(StewardCapability::ManageGrants)
        .check(&deps.db_pool)
        .await
        .is_ok();

    if is_global {
        return Ok(StewardGrant::list(member_id, &deps.db_pool).await?);
    }

    match member_id {
        Some(other) if other != actor.member_id() => Err(GovernanceError::permission_denied(
            "only global stewards can list other members' grants",
        )),
        _ => Ok(StewardGrant::list(Some(actor.member_id()), &deps.db_pool).await?),
    }
}

/// Insert a grant and its ledger entry unless an identical active one exists.
async fn create_grant(
    member_id: MemberId,
    scope: GrantScope,
    actor: AuditActor,
    tx: &mut PgConnection,
) -> Result<(StewardGrant, bool), GovernanceError> {
    if let Some(existing) = StewardGrant::find_active(member_id, scope, &mut *tx).await? {
        return Ok((existing, false));
    }

    let grant = StewardGrant::create(member_id, scope, actor.member_id(), &mut *tx).await?;

    AuditEntry::append(
        NewAuditEntry::builder()
            .target_kind(AuditTarget::Grant)
            .target_id(grant.id)
            .journey_id(scope.journey_id())
            .actor(actor)
            .action(AuditAction::GrantCreated)
            .after(grant.snapshot())
            .build(),
        &mut *tx,
    )
    .await?;

    Ok((grant, true))
}

/// Soft-revoke a locked grant and record it. None when it was already revoked.
async fn end_grant(
    grant: StewardGrant,
    actor: AuditActor,
    tx: &mut PgConnection,
) -> Result<Option<StewardGrant>, GovernanceError> {
    if !grant.is_active() {
        return Ok(None);
    }

    let revoked = StewardGrant::revoke(grant.id, &mut *tx).await?;

    AuditEntry::append(
        NewAuditEntry::builder()
            .target_kind(AuditTarget::Grant)
            .target_id(revoked.id)
            .journey_id(revoked.journey_id)
            .actor(actor)
            .action(AuditAction::GrantRevoked)
            .before(Some(grant.snapshot()))
            .after(revoked.snapshot())
            .build(),
        &mut *tx,
    )
    .await?;

    info!(grant_id = %revoked.id, member_id = %revoked.member_id, "Steward grant revoked");

    Ok(Some(revoked))
}
