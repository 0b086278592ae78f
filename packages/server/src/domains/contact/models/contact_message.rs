use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

use crate::common::{ContactMessageId, JourneyId};

/// A message left through the public contact form
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContactMessage {
    pub id: ContactMessageId,
    /// The journey page the message was sent from, if any
    pub journey_id: Option<JourneyId>,
    pub sender_name: String,
    pub sender_email: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl ContactMessage {
    pub async fn create<'e, E>(
        journey_id: Option<JourneyId>,
        sender_name: &str,
        sender_email: &str,
        body: &str,
        executor: E,
    ) -> Result<Self>
    where
        E: PgExecutor<'e>,
    {
        let message = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO contact_messages (id, journey_id, sender_name, sender_email, body)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(ContactMessageId::new())
        .bind(journey_id)
        .bind(sender_name)
        .bind(sender_email)
        .bind(body)
        .fetch_one(executor)
        .await?;
        Ok(message)
    }

    pub async fn find_by_id<'e, E>(id: ContactMessageId, executor: E) -> Result<Option<Self>>
    where
        E: PgExecutor<'e>,
    {
        let message = sqlx::query_as::<_, Self>("SELECT * FROM contact_messages WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(message)
    }
}
