use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

use crate::common::{JourneyId, MemberId};

/// A person, club, event or organisation being documented
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Journey {
    pub id: JourneyId,
    pub owner_id: MemberId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Audience tier a journey owner can extend to a trusted viewer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViewerTier {
    Connections,
    Family,
}

impl ViewerTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewerTier::Connections => "connections",
            ViewerTier::Family => "family",
        }
    }
}

impl std::fmt::Display for ViewerTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ViewerTier {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "connections" => Ok(ViewerTier::Connections),
            "family" => Ok(ViewerTier::Family),
            _ => Err(anyhow::anyhow!("Invalid viewer tier: {}", s)),
        }
    }
}

crate::text_column!(ViewerTier);

/// Membership row in `journey_trusted_viewers`
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TrustedViewer {
    pub journey_id: JourneyId,
    pub member_id: MemberId,
    pub tier: ViewerTier,
    pub created_at: DateTime<Utc>,
}

impl Journey {
    pub async fn create<'e, E>(owner_id: MemberId, name: &str, executor: E) -> Result<Self>
    where
        E: PgExecutor<'e>,
    {
        let journey = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO journeys (id, owner_id, name)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(JourneyId::new())
        .bind(owner_id)
        .bind(name)
        .fetch_one(executor)
        .await?;
        Ok(journey)
    }

    pub async fn find_by_id<'e, E>(id: JourneyId, executor: E) -> Result<Option<Self>>
    where
        E: PgExecutor<'e>,
    {
        let journey = sqlx::query_as::<_, Self>("SELECT * FROM journeys WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(journey)
    }
}

impl TrustedViewer {
    /// Add or change a trusted viewer's tier
    pub async fn upsert<'e, E>(
        journey_id: JourneyId,
        member_id: MemberId,
        tier: ViewerTier,
        executor: E,
    ) -> Result<Self>
    where
        E: PgExecutor<'e>,
    {
        let viewer = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO journey_trusted_viewers (journey_id, member_id, tier)
            VALUES ($1, $2, $3)
            ON CONFLICT (journey_id, member_id) DO UPDATE SET tier = EXCLUDED.tier
            RETURNING *
            "#,
        )
        .bind(journey_id)
        .bind(member_id)
        .bind(tier)
        .fetch_one(executor)
        .await?;
        Ok(viewer)
    }

    pub async fn find_tier<'e, E>(
        journey_id: JourneyId,
        member_id: MemberId,
        executor: E,
    ) -> Result<Option<ViewerTier>>
    where
        E: PgExecutor<'e>,
    {
        let tier = sqlx::query_scalar::<_, ViewerTier>(
            "SELECT tier FROM journey_trusted_viewers WHERE journey_id = $1 AND member_id = $2",
        )
        .bind(journey_id)
        .bind(member_id)
        .fetch_optional(executor)
        .await?;
        Ok(tier)
    }
}
