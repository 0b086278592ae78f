use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};

use crate::common::{AuthError, GrantId, GrantScope, GrantSource, JourneyId, MemberId};

/// Authority granted to a member, globally or for one journey
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StewardGrant {
    pub id: GrantId,
    pub member_id: MemberId,
    pub scope_kind: String,
    pub journey_id: Option<JourneyId>,
    /// None when seeded by the system (bootstrap, CLI)
    pub granted_by: Option<MemberId>,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl StewardGrant {
    /// The table's CHECK constraint ties `journey_id` to `scope_kind`.
    pub fn scope(&self) -> GrantScope {
        match self.journey_id {
            Some(journey_id) => GrantScope::Journey(journey_id),
            None => GrantScope::Global,
        }
    }

    pub fn is_active(&self) -> bool {
        self.revoked_at.is_none()
    }

    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    pub async fn create<'e, E>(
        member_id: MemberId,
        scope: GrantScope,
        granted_by: Option<MemberId>,
        executor: E,
    ) -> Result<Self>
    where
        E: PgExecutor<'e>,
    {
        let grant = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO steward_grants (id, member_id, scope_kind, journey_id, granted_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(GrantId::new())
        .bind(member_id)
        .bind(scope.kind_str())
        .bind(scope.journey_id())
        .bind(granted_by)
        .fetch_one(executor)
        .await?;
        Ok(grant)
    }

    pub async fn find_by_id<'e, E>(id: GrantId, executor: E) -> Result<Option<Self>>
    where
        E: PgExecutor<'e>,
    {
        let grant = sqlx::query_as::<_, Self>("SELECT * FROM steward_grants WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(grant)
    }

    pub async fn find_by_id_for_update<'e, E>(id: GrantId, executor: E) -> Result<Option<Self>>
    where
        E: PgExecutor<'e>,
    {
        let grant =
            sqlx::query_as::<_, Self>("SELECT * FROM steward_grants WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(grant)
    }

    /// The active grant a member holds for exactly this scope, if any
    pub async fn find_active<'e, E>(
        member_id: MemberId,
        scope: GrantScope,
        executor: E,
    ) -> Result<Option<Self>>
    where
        E: PgExecutor<'e>,
    {
        let grant = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM steward_grants
            WHERE member_id = $1
              AND scope_kind = $2
              AND journey_id IS NOT DISTINCT FROM $3
              AND revoked_at IS NULL
            "#,
        )
        .bind(member_id)
        .bind(scope.kind_str())
        .bind(scope.journey_id())
        .fetch_optional(executor)
        .await?;
        Ok(grant)
    }

    pub async fn find_active_by_member<'e, E>(member_id: MemberId, executor: E) -> Result<Vec<Self>>
    where
        E: PgExecutor<'e>,
    {
        let grants = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM steward_grants
            WHERE member_id = $1 AND revoked_at IS NULL
            ORDER BY created_at ASC
            "#,
        )
        .bind(member_id)
        .fetch_all(executor)
        .await?;
        Ok(grants)
    }

    /// Scopes of every active grant the member holds
    pub async fn active_scopes<'e, E>(member_id: MemberId, executor: E) -> Result<Vec<GrantScope>>
    where
        E: PgExecutor<'e>,
    {
        let grants = Self::find_active_by_member(member_id, executor).await?;
        Ok(grants.iter().map(Self::scope).collect())
    }

    /// All grants (active and revoked), optionally for one member, newest first
    pub async fn list<'e, E>(member_id: Option<MemberId>, executor: E) -> Result<Vec<Self>>
    where
        E: PgExecutor<'e>,
    {
        let grants = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM steward_grants
            WHERE ($1::uuid IS NULL OR member_id = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(member_id)
        .fetch_all(executor)
        .await?;
        Ok(grants)
    }

    /// End-date a grant; the row stays for the audit trail
    pub async fn revoke<'e, E>(id: GrantId, executor: E) -> Result<Self>
    where
        E: PgExecutor<'e>,
    {
        let grant = sqlx::query_as::<_, Self>(
            r#"
            UPDATE steward_grants
            SET revoked_at = NOW()
            WHERE id = $1 AND revoked_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(executor)
        .await?;
        Ok(grant)
    }
}

/// Grant lookups straight from the pool, for reads outside a transaction.
#[async_trait]
impl GrantSource for PgPool {
    async fn active_scopes(&self, member_id: MemberId) -> Result<Vec<GrantScope>, AuthError> {
        StewardGrant::active_scopes(member_id, self)
            .await
            .map_err(AuthError::InternalError)
    }
}
