use chrono::{DateTime, Utc};
use juniper::{GraphQLInputObject, GraphQLObject};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{GovernanceError, JourneyId};
use crate::domains::audit::models::{AuditAction, AuditEntry, AuditFilter};

/// Audit ledger GraphQL data type
#[derive(Debug, Clone, Serialize, Deserialize, GraphQLObject)]
#[graphql(description = "An immutable record of one state change")]
pub struct AuditEntryData {
    pub id: String,
    /// contribution or grant
    pub target_kind: String,
    pub target_id: String,
    pub journey_id: Option<String>,
    /// Member id, or "system"
    pub actor: String,
    pub action: String,
    pub before_json: Option<String>,
    pub after_json: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<AuditEntry> for AuditEntryData {
    fn from(entry: AuditEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            target_kind: entry.target_kind.to_string(),
            target_id: entry.target_id.to_string(),
            journey_id: entry.journey_id.map(|id| id.to_string()),
            actor: entry.actor.to_string(),
            action: entry.action.to_string(),
            before_json: entry.before_snapshot.map(|v| v.to_string()),
            after_json: entry.after_snapshot.to_string(),
            note: entry.note,
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, GraphQLInputObject)]
pub struct AuditFilterInput {
    pub journey_id: Option<String>,
    /// Contribution or grant id
    pub target_id: Option<String>,
    pub action: Option<String>,
}

impl AuditFilterInput {
    pub fn into_filter(self) -> Result<AuditFilter, GovernanceError> {
        Ok(AuditFilter {
            journey_id: self
                .journey_id
                .map(|j| JourneyId::parse(&j))
                .transpose()
                .map_err(|_| GovernanceError::validation("journey_id must be a UUID"))?,
            target_id: self
                .target_id
                .map(|t| Uuid::parse_str(&t))
                .transpose()
                .map_err(|_| GovernanceError::validation("target_id must be a UUID"))?,
            action: self
                .action
                .map(|a| a.parse::<AuditAction>())
                .transpose()
                .map_err(|e| GovernanceError::validation(e.to_string()))?,
        })
    }
}
