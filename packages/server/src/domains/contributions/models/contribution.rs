use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, Postgres, QueryBuilder};
use typed_builder::TypedBuilder;
use uuid::Uuid;

use crate::common::{ContributionId, JourneyId, MemberId, Page};

// ============================================================================
// Enums
// ============================================================================

/// Kind of artifact being contributed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ContributionType {
    Image,
    Document,
    Text,
    Link,
    Video,
    Commendation,
    Milestone,
}

impl ContributionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContributionType::Image => "image",
            ContributionType::Document => "document",
            ContributionType::Text => "text",
            ContributionType::Link => "link",
            ContributionType::Video => "video",
            ContributionType::Commendation => "commendation",
            ContributionType::Milestone => "milestone",
        }
    }
}

impl std::fmt::Display for ContributionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContributionType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "image" => Ok(ContributionType::Image),
            "document" => Ok(ContributionType::Document),
            "text" => Ok(ContributionType::Text),
            "link" => Ok(ContributionType::Link),
            "video" => Ok(ContributionType::Video),
            "commendation" => Ok(ContributionType::Commendation),
            "milestone" => Ok(ContributionType::Milestone),
            _ => Err(anyhow::anyhow!("Invalid contribution type: {}", s)),
        }
    }
}

/// Moderation status. Only the decision engine moves an item between these.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ContributionStatus {
    Draft,
    SubmittedForReview,
    Approved,
    Rejected,
}

impl ContributionStatus {
    pub const ALL: [ContributionStatus; 4] = [
        ContributionStatus::Draft,
        ContributionStatus::SubmittedForReview,
        ContributionStatus::Approved,
        ContributionStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContributionStatus::Draft => "draft",
            ContributionStatus::SubmittedForReview => "submitted_for_review",
            ContributionStatus::Approved => "approved",
            ContributionStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ContributionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContributionStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "draft" => Ok(ContributionStatus::Draft),
            "submitted_for_review" => Ok(ContributionStatus::SubmittedForReview),
            "approved" => Ok(ContributionStatus::Approved),
            "rejected" => Ok(ContributionStatus::Rejected),
            _ => Err(anyhow::anyhow!("Invalid contribution status: {}", s)),
        }
    }
}

/// Declared audience, honored only once the item is approved
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    PrivateDraft,
    Family,
    Connections,
    Public,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::PrivateDraft => "private_draft",
            Visibility::Family => "family",
            Visibility::Connections => "connections",
            Visibility::Public => "public",
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Visibility {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "private_draft" => Ok(Visibility::PrivateDraft),
            "family" => Ok(Visibility::Family),
            "connections" => Ok(Visibility::Connections),
            "public" => Ok(Visibility::Public),
            _ => Err(anyhow::anyhow!("Invalid visibility: {}", s)),
        }
    }
}

crate::text_column!(ContributionType);
crate::text_column!(ContributionStatus);
crate::text_column!(Visibility);

// ============================================================================
// Model
// ============================================================================

/// A contributed artifact about a journey
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Contribution {
    pub id: ContributionId,
    pub journey_id: JourneyId,
    pub contribution_type: ContributionType,
    pub status: ContributionStatus,
    pub visibility: Visibility,

    // Type-specific content, validated at intake
    pub payload: serde_json::Value,

    // Attribution / provenance
    pub attribution: Option<String>,
    pub provenance_note: Option<String>,
    pub in_reply_to: Option<ContributionId>,

    pub created_by: MemberId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    // Review metadata
    pub reviewed_by: Option<MemberId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub rejection_note: Option<String>,
    pub reset_note: Option<String>,
}

/// Input for inserting a new contribution
#[derive(Debug, Clone, TypedBuilder)]
pub struct CreateContribution {
    pub journey_id: JourneyId,
    pub contribution_type: ContributionType,
    pub status: ContributionStatus,
    #[builder(default)]
    pub visibility: Visibility,
    pub payload: serde_json::Value,
    #[builder(default)]
    pub attribution: Option<String>,
    #[builder(default)]
    pub provenance_note: Option<String>,
    #[builder(default)]
    pub in_reply_to: Option<ContributionId>,
    pub created_by: MemberId,
}

/// Which items a review-queue listing may include
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewScope {
    /// Global steward: everything
    All,
    /// Journey-scoped steward: those journeys, plus their own items
    Journeys {
        journeys: Vec<JourneyId>,
        member_id: MemberId,
    },
    /// No grants: only items the member created
    Own(MemberId),
}

/// Filters a caller may request on a listing; scope is applied on top
#[derive(Debug, Clone, Default)]
pub struct ContributionFilter {
    pub status: Option<ContributionStatus>,
    pub contribution_type: Option<ContributionType>,
    pub journey_id: Option<JourneyId>,
}

/// Reviewer notes. Only stewards of the item's journey may read them.
pub const REVIEW_NOTE_FIELDS: [&str; 2] = ["rejection_note", "reset_note"];

impl Contribution {
    /// Lifecycle snapshot recorded in the audit ledger
    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// The item as shown to a reader who does not moderate its journey
    pub fn without_review_notes(mut self) -> Self {
        self.rejection_note = None;
        self.reset_note = None;
        self
    }

    pub async fn create<'e, E>(input: CreateContribution, executor: E) -> Result<Self>
    where
        E: PgExecutor<'e>,
    {
        let item = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO contributions (
                id, journey_id, contribution_type, status, visibility, payload,
                attribution, provenance_note, in_reply_to, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(ContributionId::new())
        .bind(input.journey_id)
        .bind(input.contribution_type)
        .bind(input.status)
        .bind(input.visibility)
        .bind(input.payload)
        .bind(input.attribution)
        .bind(input.provenance_note)
        .bind(input.in_reply_to)
        .bind(input.created_by)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    pub async fn find_by_id<'e, E>(id: ContributionId, executor: E) -> Result<Option<Self>>
    where
        E: PgExecutor<'e>,
    {
        let item = sqlx::query_as::<_, Self>("SELECT * FROM contributions WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(item)
    }

    /// Load and row-lock an item for the duration of the caller's transaction.
    ///
    /// Concurrent decisions on the same item serialize here; the second one
    /// sees the first one's committed status.
    pub async fn find_by_id_for_update<'e, E>(
        id: ContributionId,
        executor: E,
    ) -> Result<Option<Self>>
    where
        E: PgExecutor<'e>,
    {
        let item = sqlx::query_as::<_, Self>(
            "SELECT * FROM contributions WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(item)
    }

    /// draft -> submitted_for_review
    pub async fn mark_submitted<'e, E>(id: ContributionId, executor: E) -> Result<Self>
    where
        E: PgExecutor<'e>,
    {
        let item = sqlx::query_as::<_, Self>(
            r#"
            UPDATE contributions
            SET status = 'submitted_for_review', updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    /// submitted_for_review -> approved
    pub async fn mark_approved<'e, E>(
        id: ContributionId,
        reviewed_by: MemberId,
        executor: E,
    ) -> Result<Self>
    where
        E: PgExecutor<'e>,
    {
        let item = sqlx::query_as::<_, Self>(
            r#"
            UPDATE contributions
            SET status = 'approved',
                reviewed_by = $2,
                reviewed_at = NOW(),
                rejection_note = NULL,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(reviewed_by)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    /// submitted_for_review -> rejected
    pub async fn mark_rejected<'e, E>(
        id: ContributionId,
        reviewed_by: MemberId,
        note: Option<&str>,
        executor: E,
    ) -> Result<Self>
    where
        E: PgExecutor<'e>,
    {
        let item = sqlx::query_as::<_, Self>(
            r#"
            UPDATE contributions
            SET status = 'rejected',
                reviewed_by = $2,
                reviewed_at = NOW(),
                rejection_note = $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(reviewed_by)
        .bind(note)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    /// approved | rejected -> submitted_for_review
    pub async fn mark_reset<'e, E>(
        id: ContributionId,
        note: Option<&str>,
        executor: E,
    ) -> Result<Self>
    where
        E: PgExecutor<'e>,
    {
        let item = sqlx::query_as::<_, Self>(
            r#"
            UPDATE contributions
            SET status = 'submitted_for_review',
                reviewed_by = NULL,
                reviewed_at = NULL,
                reset_note = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(note)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    /// Scoped, filtered listing ordered oldest first
    pub async fn find_scoped<'e, E>(
        scope: &ReviewScope,
        filter: &ContributionFilter,
        page: Page,
        executor: E,
    ) -> Result<Vec<Self>>
    where
        E: PgExecutor<'e>,
    {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM contributions WHERE 1=1");
        push_scope(&mut query, scope);
        push_filter(&mut query, filter, true);
        query.push(" ORDER BY created_at ASC, id ASC LIMIT ");
        query.push_bind(page.limit);
        query.push(" OFFSET ");
        query.push_bind(page.offset);

        let items = query.build_query_as::<Self>().fetch_all(executor).await?;
        Ok(items)
    }

    /// Per-status counts under the same scope and filters (status filter ignored)
    pub async fn count_by_status_scoped<'e, E>(
        scope: &ReviewScope,
        filter: &ContributionFilter,
        executor: E,
    ) -> Result<Vec<(ContributionStatus, i64)>>
    where
        E: PgExecutor<'e>,
    {
        let mut query =
            QueryBuilder::<Postgres>::new("SELECT status, COUNT(*) FROM contributions WHERE 1=1");
        push_scope(&mut query, scope);
        push_filter(&mut query, filter, false);
        query.push(" GROUP BY status");

        let rows = query
            .build_query_as::<(ContributionStatus, i64)>()
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }

    /// Items of one journey that match a visibility rule
    ///
    /// Returns approved items whose visibility is in `tiers`, plus anything
    /// created by `own_items_of`.
    pub async fn find_visible<'e, E>(
        journey_id: JourneyId,
        tiers: &[Visibility],
        own_items_of: Option<MemberId>,
        executor: E,
    ) -> Result<Vec<Self>>
    where
        E: PgExecutor<'e>,
    {
        let tiers: Vec<String> = tiers.iter().map(|t| t.as_str().to_string()).collect();
        let owner: Option<Uuid> = own_items_of.map(|id| id.into_uuid());

        let items = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM contributions
            WHERE journey_id = $1
              AND ((status = 'approved' AND visibility = ANY($2))
                   OR ($3::uuid IS NOT NULL AND created_by = $3))
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(journey_id)
        .bind(tiers)
        .bind(owner)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    /// Every item of a journey regardless of status (stewards, journey owner)
    pub async fn find_by_journey<'e, E>(journey_id: JourneyId, executor: E) -> Result<Vec<Self>>
    where
        E: PgExecutor<'e>,
    {
        let items = sqlx::query_as::<_, Self>(
            "SELECT * FROM contributions WHERE journey_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(journey_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }
}

fn push_scope(query: &mut QueryBuilder<'_, Postgres>, scope: &ReviewScope) {
    match scope {
        ReviewScope::All => {}
        ReviewScope::Journeys {
            journeys,
            member_id,
        } => {
            let ids: Vec<Uuid> = journeys.iter().map(|j| j.into_uuid()).collect();
            query.push(" AND (journey_id = ANY(");
            query.push_bind(ids);
            query.push(") OR created_by = ");
            query.push_bind(*member_id);
            query.push(")");
        }
        ReviewScope::Own(member_id) => {
            query.push(" AND created_by = ");
            query.push_bind(*member_id);
        }
    }
}

fn push_filter(
    query: &mut QueryBuilder<'_, Postgres>,
    filter: &ContributionFilter,
    include_status: bool,
) {
    if include_status {
        if let Some(status) = filter.status {
            query.push(" AND status = ");
            query.push_bind(status);
        }
    }
    if let Some(contribution_type) = filter.contribution_type {
        query.push(" AND contribution_type = ");
        query.push_bind(contribution_type);
    }
    if let Some(journey_id) = filter.journey_id {
        query.push(" AND journey_id = ");
        query.push_bind(journey_id);
    }
}
