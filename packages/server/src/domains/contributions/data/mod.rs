//! GraphQL data types for contributions.

use chrono::{DateTime, Utc};
use juniper::{GraphQLInputObject, GraphQLObject};
use serde::{Deserialize, Serialize};

use crate::common::{GovernanceError, JourneyId};
use crate::domains::contributions::activities::{NewContribution, ReviewQueuePage};
use crate::domains::contributions::models::{
    Contribution, ContributionFilter, ContributionStatus, ContributionType, Visibility,
};

/// Contribution GraphQL data type
#[derive(Debug, Clone, Serialize, Deserialize, GraphQLObject)]
#[graphql(description = "An artifact contributed to a journey")]
pub struct ContributionData {
    pub id: String,
    pub journey_id: String,

    /// image, document, text, link, video, commendation or milestone
    pub contribution_type: String,

    /// draft, submitted_for_review, approved or rejected
    pub status: String,

    /// private_draft, family, connections or public
    pub visibility: String,

    /// Type-specific content as a JSON document
    pub payload_json: String,

    pub attribution: Option<String>,
    pub provenance_note: Option<String>,

    /// Set on responses to a commendation
    pub in_reply_to: Option<String>,

    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    // Review
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub rejection_note: Option<String>,
    pub reset_note: Option<String>,
}

impl From<Contribution> for ContributionData {
    fn from(item: Contribution) -> Self {
        Self {
            id: item.id.to_string(),
            journey_id: item.journey_id.to_string(),
            contribution_type: item.contribution_type.to_string(),
            status: item.status.to_string(),
            visibility: item.visibility.to_string(),
            payload_json: item.payload.to_string(),
            attribution: item.attribution,
            provenance_note: item.provenance_note,
            in_reply_to: item.in_reply_to.map(|id| id.to_string()),
            created_by: item.created_by.to_string(),
            created_at: item.created_at,
            updated_at: item.updated_at,
            reviewed_by: item.reviewed_by.map(|id| id.to_string()),
            reviewed_at: item.reviewed_at,
            rejection_note: item.rejection_note,
            reset_note: item.reset_note,
        }
    }
}

/// Number of items in one status
#[derive(Debug, Clone, Serialize, Deserialize, GraphQLObject)]
pub struct StatusCountData {
    pub status: String,
    pub count: i32,
}

/// One page of the review queue
#[derive(Debug, Clone, Serialize, Deserialize, GraphQLObject)]
pub struct ReviewQueueData {
    pub items: Vec<ContributionData>,
    pub counts: Vec<StatusCountData>,
    pub limit: i32,
    pub offset: i32,
}

impl From<ReviewQueuePage> for ReviewQueueData {
    fn from(page: ReviewQueuePage) -> Self {
        Self {
            items: page.items.into_iter().map(ContributionData::from).collect(),
            counts: page
                .counts
                .into_iter()
                .map(|(status, count)| StatusCountData {
                    status: status.to_string(),
                    count: i32::try_from(count).unwrap_or(i32::MAX),
                })
                .collect(),
            limit: page.page.limit as i32,
            offset: i32::try_from(page.page.offset).unwrap_or(i32::MAX),
        }
    }
}

/// Input for submitting a new contribution
#[derive(Debug, Clone, GraphQLInputObject)]
pub struct SubmitContributionInput {
    pub journey_id: String,
    pub contribution_type: String,
    /// Type-specific content as a JSON document
    pub payload_json: String,
    pub visibility: Option<String>,
    pub attribution: Option<String>,
    pub provenance_note: Option<String>,
    /// Keep the item as a draft instead of submitting it for review
    pub as_draft: Option<bool>,
}

impl SubmitContributionInput {
    pub fn into_new_contribution(self) -> Result<NewContribution, GovernanceError> {
        let journey_id = JourneyId::parse(&self.journey_id)
            .map_err(|_| GovernanceError::validation("journey_id must be a UUID"))?;
        let contribution_type: ContributionType = self
            .contribution_type
            .parse()
            .map_err(|e: anyhow::Error| GovernanceError::validation(e.to_string()))?;
        let payload: serde_json::Value = serde_json::from_str(&self.payload_json)
            .map_err(|e| GovernanceError::validation(format!("payload_json is not JSON: {}", e)))?;
        let visibility = self
            .visibility
            .map(|v| v.parse::<Visibility>())
            .transpose()
            .map_err(|e| GovernanceError::validation(e.to_string()))?;

        Ok(NewContribution {
            journey_id,
            contribution_type,
            payload,
            visibility,
            attribution: self.attribution,
            provenance_note: self.provenance_note,
            as_draft: self.as_draft.unwrap_or(false),
        })
    }
}

/// Review queue filters
#[derive(Debug, Clone, Default, GraphQLInputObject)]
pub struct ReviewQueueFilterInput {
    pub status: Option<String>,
    pub contribution_type: Option<String>,
    pub journey_id: Option<String>,
}

impl ReviewQueueFilterInput {
    pub fn into_filter(self) -> Result<ContributionFilter, GovernanceError> {
        let invalid = |e: anyhow::Error| GovernanceError::validation(e.to_string());
        Ok(ContributionFilter {
            status: self
                .status
                .map(|s| s.parse::<ContributionStatus>())
                .transpose()
                .map_err(invalid)?,
            contribution_type: self
                .contribution_type
                .map(|t| t.parse::<ContributionType>())
                .transpose()
                .map_err(invalid)?,
            journey_id: self
                .journey_id
                .map(|j| JourneyId::parse(&j))
                .transpose()
                .map_err(|_| GovernanceError::validation("journey_id must be a UUID"))?,
        })
    }
}
