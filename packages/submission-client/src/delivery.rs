//! What the client sends, and the seams it sends it through.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Which mutation a queued payload belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionKind {
    Contribution,
    ContactMessage,
}

impl std::fmt::Display for SubmissionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionKind::Contribution => write!(f, "contribution"),
            SubmissionKind::ContactMessage => write!(f, "contact_message"),
        }
    }
}

/// Input of `submitContribution`, field for field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionDraft {
    pub journey_id: String,
    pub contribution_type: String,
    /// Type-specific content, serialized JSON
    pub payload_json: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provenance_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_draft: Option<bool>,
}

impl ContributionDraft {
    pub fn is_image(&self) -> bool {
        self.contribution_type == "image"
    }

    /// Record the size of a client-side reduction in the image payload
    pub fn with_reduced_size(mut self, reduced_size_bytes: i64) -> Result<Self, ClientError> {
        let mut payload: serde_json::Value = serde_json::from_str(&self.payload_json)
            .map_err(|e| ClientError::Validation(format!("payload is not valid JSON: {}", e)))?;
        match payload.as_object_mut() {
            Some(fields) => {
                fields.insert(
                    "reduced_size_bytes".to_string(),
                    serde_json::Value::from(reduced_size_bytes),
                );
            }
            None => {
                return Err(ClientError::Validation(
                    "image payload must be a JSON object".to_string(),
                ))
            }
        }
        self.payload_json = payload.to_string();
        Ok(self)
    }
}

/// Input of `sendContactMessage`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journey_id: Option<String>,
    pub sender_name: String,
    pub sender_email: String,
    pub body: String,
}

/// Server acknowledgement of a delivered submission
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeliveryReceipt {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Moderation decision sent from the review screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject { note: Option<String> },
    Reset { note: Option<String> },
}

impl ReviewDecision {
    /// Status the item will have if the server accepts the decision
    pub fn expected_status(&self) -> &'static str {
        match self {
            ReviewDecision::Approve => "approved",
            ReviewDecision::Reject { .. } => "rejected",
            ReviewDecision::Reset { .. } => "submitted_for_review",
        }
    }
}

/// An item as the review screen shows it
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: String,
    pub journey_id: String,
    pub contribution_type: String,
    pub status: String,
    pub visibility: String,
    #[serde(default)]
    pub reviewed_by: Option<String>,
    #[serde(default)]
    pub rejection_note: Option<String>,
}

/// Delivers queued payloads to the server
#[async_trait]
pub trait SubmissionTransport: Send + Sync {
    async fn deliver(
        &self,
        kind: SubmissionKind,
        payload: &serde_json::Value,
    ) -> Result<DeliveryReceipt, ClientError>;
}

/// Sends moderation decisions
#[async_trait]
pub trait ReviewTransport: Send + Sync {
    async fn decide(&self, item_id: &str, decision: &ReviewDecision) -> Result<ItemView, ClientError>;
}

/// One-shot image size reduction.
///
/// Returns the reduced size in bytes. Compression itself lives in the host
/// application.
#[async_trait]
pub trait SizeReducer: Send + Sync {
    async fn reduce(&self, draft: &ContributionDraft) -> anyhow::Result<i64>;
}
