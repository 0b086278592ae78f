use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, Postgres, QueryBuilder};
use typed_builder::TypedBuilder;
use uuid::Uuid;

use crate::common::{AuditEntryId, JourneyId, MemberId, Page};
use crate::domains::contributions::models::{ReviewScope, REVIEW_NOTE_FIELDS};

// ============================================================================
// Actor
// ============================================================================

/// Who caused a ledger entry. Stored as `"system"` or the member's UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditActor {
    System,
    Member(MemberId),
}

impl AuditActor {
    pub fn member_id(&self) -> Option<MemberId> {
        match self {
            AuditActor::System => None,
            AuditActor::Member(id) => Some(*id),
        }
    }
}

impl std::fmt::Display for AuditActor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditActor::System => f.write_str("system"),
            AuditActor::Member(id) => write!(f, "{}", id),
        }
    }
}

impl std::str::FromStr for AuditActor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == "system" {
            return Ok(AuditActor::System);
        }
        MemberId::parse(s)
            .map(AuditActor::Member)
            .map_err(|e| anyhow::anyhow!("Invalid audit actor '{}': {}", s, e))
    }
}

impl From<MemberId> for AuditActor {
    fn from(id: MemberId) -> Self {
        AuditActor::Member(id)
    }
}

impl Serialize for AuditActor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AuditActor {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl sqlx::Type<Postgres> for AuditActor {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl sqlx::Encode<'_, Postgres> for AuditActor {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<Postgres>>::encode(self.to_string(), buf)
    }
}

impl sqlx::Decode<'_, Postgres> for AuditActor {
    fn decode(value: sqlx::postgres::PgValueRef<'_>) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <&str as sqlx::Decode<Postgres>>::decode(value)?;
        raw.parse::<AuditActor>().map_err(Into::into)
    }
}

// ============================================================================
// Action / target
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    ItemCreated,
    ItemSubmitted,
    ItemApproved,
    ItemRejected,
    ItemReset,
    GrantCreated,
    GrantRevoked,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::ItemCreated => "item_created",
            AuditAction::ItemSubmitted => "item_submitted",
            AuditAction::ItemApproved => "item_approved",
            AuditAction::ItemRejected => "item_rejected",
            AuditAction::ItemReset => "item_reset",
            AuditAction::GrantCreated => "grant_created",
            AuditAction::GrantRevoked => "grant_revoked",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AuditAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "item_created" => Ok(AuditAction::ItemCreated),
            "item_submitted" => Ok(AuditAction::ItemSubmitted),
            "item_approved" => Ok(AuditAction::ItemApproved),
            "item_rejected" => Ok(AuditAction::ItemRejected),
            "item_reset" => Ok(AuditAction::ItemReset),
            "grant_created" => Ok(AuditAction::GrantCreated),
            "grant_revoked" => Ok(AuditAction::GrantRevoked),
            _ => Err(anyhow::anyhow!("Invalid audit action: {}", s)),
        }
    }
}

/// Kind of record an entry describes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditTarget {
    Contribution,
    Grant,
}

impl AuditTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditTarget::Contribution => "contribution",
            AuditTarget::Grant => "grant",
        }
    }
}

impl std::fmt::Display for AuditTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AuditTarget {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "contribution" => Ok(AuditTarget::Contribution),
            "grant" => Ok(AuditTarget::Grant),
            _ => Err(anyhow::anyhow!("Invalid audit target: {}", s)),
        }
    }
}

crate::text_column!(AuditAction);
crate::text_column!(AuditTarget);

// ============================================================================
// Model
// ============================================================================

/// One immutable ledger row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditEntry {
    pub id: AuditEntryId,
    pub target_kind: AuditTarget,
    pub target_id: Uuid,
    /// None for changes with global reach (global grants)
    pub journey_id: Option<JourneyId>,
    pub actor: AuditActor,
    pub action: AuditAction,
    pub before_snapshot: Option<serde_json::Value>,
    pub after_snapshot: serde_json::Value,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct NewAuditEntry {
    pub target_kind: AuditTarget,
    #[builder(setter(into))]
    pub target_id: Uuid,
    #[builder(default)]
    pub journey_id: Option<JourneyId>,
    #[builder(setter(into))]
    pub actor: AuditActor,
    pub action: AuditAction,
    #[builder(default)]
    pub before: Option<serde_json::Value>,
    pub after: serde_json::Value,
    #[builder(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub journey_id: Option<JourneyId>,
    pub target_id: Option<Uuid>,
    pub action: Option<AuditAction>,
}

fn strip_review_notes(snapshot: &mut serde_json::Value) {
    if let Some(fields) = snapshot.as_object_mut() {
        for name in REVIEW_NOTE_FIELDS {
            fields.remove(name);
        }
    }
}

impl AuditEntry {
    /// The entry as shown to a reader who does not moderate its journey.
    ///
    /// Drops the entry's note and the reviewer notes inside both snapshots.
    pub fn without_review_notes(mut self) -> Self {
        self.note = None;
        if let Some(before) = self.before_snapshot.as_mut() {
            strip_review_notes(before);
        }
        strip_review_notes(&mut self.after_snapshot);
        self
    }

    /// Insert a ledger row. Rows are never updated or deleted.
    pub async fn append<'e, E>(entry: NewAuditEntry, executor: E) -> Result<Self>
    where
        E: PgExecutor<'e>,
    {
        let row = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO audit_entries (
                id, target_kind, target_id, journey_id, actor, action,
                before_snapshot, after_snapshot, note
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(AuditEntryId::new())
        .bind(entry.target_kind)
        .bind(entry.target_id)
        .bind(entry.journey_id)
        .bind(entry.actor)
        .bind(entry.action)
        .bind(entry.before)
        .bind(entry.after)
        .bind(entry.note)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    pub async fn find_by_id<'e, E>(id: AuditEntryId, executor: E) -> Result<Option<Self>>
    where
        E: PgExecutor<'e>,
    {
        let row = sqlx::query_as::<_, Self>("SELECT * FROM audit_entries WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    /// Full history of one record, oldest first
    pub async fn find_for_target<'e, E>(target_id: Uuid, executor: E) -> Result<Vec<Self>>
    where
        E: PgExecutor<'e>,
    {
        let rows = sqlx::query_as::<_, Self>(
            "SELECT * FROM audit_entries WHERE target_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(target_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    /// Scoped listing, newest first
    ///
    /// Non-global readers see entries in their journeys, entries they caused,
    /// and entries about contributions they created.
    pub async fn find_scoped<'e, E>(
        scope: &ReviewScope,
        filter: &AuditFilter,
        page: Page,
        executor: E,
    ) -> Result<Vec<Self>>
    where
        E: PgExecutor<'e>,
    {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM audit_entries WHERE 1=1");

        match scope {
            ReviewScope::All => {}
            ReviewScope::Journeys {
                journeys,
                member_id,
            } => {
                let ids: Vec<Uuid> = journeys.iter().map(|j| j.into_uuid()).collect();
                query.push(" AND (journey_id = ANY(");
                query.push_bind(ids);
                query.push(")");
                push_own_clause(&mut query, *member_id);
                query.push(")");
            }
            ReviewScope::Own(member_id) => {
                query.push(" AND (FALSE");
                push_own_clause(&mut query, *member_id);
                query.push(")");
            }
        }

        if let Some(journey_id) = filter.journey_id {
            query.push(" AND journey_id = ");
            query.push_bind(journey_id);
        }
        if let Some(target_id) = filter.target_id {
            query.push(" AND target_id = ");
            query.push_bind(target_id);
        }
        if let Some(action) = filter.action {
            query.push(" AND action = ");
            query.push_bind(action);
        }

        query.push(" ORDER BY created_at DESC, id DESC LIMIT ");
        query.push_bind(page.limit);
        query.push(" OFFSET ");
        query.push_bind(page.offset);

        let rows = query.build_query_as::<Self>().fetch_all(executor).await?;
        Ok(rows)
    }
}

fn push_own_clause(query: &mut QueryBuilder<'_, Postgres>, member_id: MemberId) {
    query.push(" OR actor = ");
    query.push_bind(member_id.to_string());
    query.push(" OR target_id IN (SELECT id FROM contributions WHERE created_by = ");
    query.push_bind(member_id);
    query.push(")");
}
