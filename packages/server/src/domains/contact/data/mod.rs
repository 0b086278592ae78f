use chrono::{DateTime, Utc};
use juniper::{GraphQLInputObject, GraphQLObject};
use serde::{Deserialize, Serialize};

use crate::common::{GovernanceError, JourneyId};
use crate::domains::contact::activities::NewContactMessage;
use crate::domains::contact::models::ContactMessage;

#[derive(Debug, Clone, Serialize, Deserialize, GraphQLObject)]
#[graphql(description = "A message sent through the contact form")]
pub struct ContactMessageData {
    pub id: String,
    pub journey_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ContactMessage> for ContactMessageData {
    fn from(message: ContactMessage) -> Self {
        Self {
            id: message.id.to_string(),
            journey_id: message.journey_id.map(|id| id.to_string()),
            created_at: message.created_at,
        }
    }
}

#[derive(Debug, Clone, GraphQLInputObject)]
pub struct SendContactMessageInput {
    pub journey_id: Option<String>,
    pub sender_name: String,
    pub sender_email: String,
    pub body: String,
}

impl SendContactMessageInput {
    pub fn into_new_message(self) -> Result<NewContactMessage, GovernanceError> {
        let journey_id = self
            .journey_id
            .map(|j| JourneyId::parse(&j))
            .transpose()
            .map_err(|_| GovernanceError::validation("journey_id must be a UUID"))?;

        Ok(NewContactMessage {
            journey_id,
            sender_name: self.sender_name,
            sender_email: self.sender_email,
            body: self.body,
        })
    }
}
