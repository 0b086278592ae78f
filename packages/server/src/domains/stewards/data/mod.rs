use chrono::{DateTime, Utc};
use juniper::GraphQLObject;
use serde::{Deserialize, Serialize};

use crate::domains::stewards::models::StewardGrant;

/// Steward grant GraphQL data type
#[derive(Debug, Clone, Serialize, Deserialize, GraphQLObject)]
#[graphql(description = "Moderation authority held by a member")]
pub struct StewardGrantData {
    pub id: String,
    pub member_id: String,

    /// global or journey
    pub scope_kind: String,

    /// Set for journey-scoped grants
    pub journey_id: Option<String>,

    /// Empty when issued by the system
    pub granted_by: Option<String>,

    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl From<StewardGrant> for StewardGrantData {
    fn from(grant: StewardGrant) -> Self {
        Self {
            id: grant.id.to_string(),
            member_id: grant.member_id.to_string(),
            scope_kind: grant.scope_kind,
            journey_id: grant.journey_id.map(|id| id.to_string()),
            granted_by: grant.granted_by.map(|id| id.to_string()),
            created_at: grant.created_at,
            revoked_at: grant.revoked_at,
        }
    }
}
