//! GraphQL client for the governance API

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::config::ClientConfig;
use crate::delivery::{
    DeliveryReceipt, ItemView, ReviewDecision, ReviewTransport, SubmissionKind,
    SubmissionTransport,
};
use crate::error::ClientError;

const SUBMIT_CONTRIBUTION: &str = r#"
    mutation SubmitContribution($input: SubmitContributionInput!) {
        submitContribution(input: $input) { id status }
    }
"#;

const SEND_CONTACT_MESSAGE: &str = r#"
    mutation SendContactMessage($input: SendContactMessageInput!) {
        sendContactMessage(input: $input) { id }
    }
"#;

const ITEM_FIELDS: &str =
    "id journeyId contributionType status visibility reviewedBy rejectionNote";

/// GraphQL request body
#[derive(Debug, Serialize)]
pub struct GraphQLRequest<'a, V: Serialize> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<V>,
}

/// GraphQL response wrapper
#[derive(Debug, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQLError>>,
}

/// GraphQL error
#[derive(Debug, Deserialize)]
pub struct GraphQLError {
    pub message: String,
    #[serde(default)]
    pub extensions: serde_json::Value,
}

impl From<GraphQLError> for ClientError {
    fn from(err: GraphQLError) -> Self {
        let code = err.extensions.get("code").and_then(|c| c.as_str());
        ClientError::from_code(code, err.message.clone(), &err.extensions)
    }
}

/// GraphQL client for making requests
#[derive(Clone)]
pub struct GraphQLClient {
    client: reqwest::Client,
    endpoint: String,
    auth_token: Option<String>,
}

impl GraphQLClient {
    /// Create a client; every request is bounded by the configured timeout
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            auth_token: config.auth_token.clone(),
        })
    }

    /// Create a client with authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Execute a GraphQL query or mutation
    pub async fn query<V, R>(&self, query: &str, variables: Option<V>) -> Result<R, ClientError>
    where
        V: Serialize,
        R: DeserializeOwned,
    {
        let request = GraphQLRequest { query, variables };

        let mut req = self.client.post(&self.endpoint).json(&request);

        if let Some(token) = &self.auth_token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let response = req.send().await?;
        let status = response.status();
        if status.is_server_error() {
            return Err(ClientError::TransientNetwork(format!(
                "server responded with {}",
                status
            )));
        }
        if status.is_client_error() {
            let body = response.text().await?;
            let first_error = serde_json::from_str::<GraphQLResponse<serde_json::Value>>(&body)
                .ok()
                .and_then(|r| r.errors)
                .and_then(|e| e.into_iter().next());
            debug!(status = %status, "GraphQL request rejected");
            return Err(match first_error {
                Some(err) => err.into(),
                None => ClientError::Rejected(format!("server responded with {}", status)),
            });
        }

        let graphql_response: GraphQLResponse<R> = response.json().await?;

        if let Some(first_error) = graphql_response.errors.and_then(|e| e.into_iter().next()) {
            debug!(message = %first_error.message, "GraphQL error");
            return Err(first_error.into());
        }

        graphql_response
            .data
            .ok_or_else(|| ClientError::Internal("No data returned".to_string()))
    }
}

#[async_trait]
impl SubmissionTransport for GraphQLClient {
    async fn deliver(
        &self,
        kind: SubmissionKind,
        payload: &serde_json::Value,
    ) -> Result<DeliveryReceipt, ClientError> {
        let variables = json!({ "input": payload });

        match kind {
            SubmissionKind::Contribution => {
                #[derive(Deserialize)]
                #[serde(rename_all = "camelCase")]
                struct Data {
                    submit_contribution: DeliveryReceipt,
                }
                let data: Data = self.query(SUBMIT_CONTRIBUTION, Some(variables)).await?;
                Ok(data.submit_contribution)
            }
            SubmissionKind::ContactMessage => {
                #[derive(Deserialize)]
                #[serde(rename_all = "camelCase")]
                struct Data {
                    send_contact_message: DeliveryReceipt,
                }
                let data: Data = self.query(SEND_CONTACT_MESSAGE, Some(variables)).await?;
                Ok(data.send_contact_message)
            }
        }
    }
}

#[async_trait]
impl ReviewTransport for GraphQLClient {
    async fn decide(&self, item_id: &str, decision: &ReviewDecision) -> Result<ItemView, ClientError> {
        let (field, variables) = match decision {
            ReviewDecision::Approve => ("approveContribution", json!({ "id": item_id })),
            ReviewDecision::Reject { note } => {
                ("rejectContribution", json!({ "id": item_id, "note": note }))
            }
            ReviewDecision::Reset { note } => {
                ("resetContribution", json!({ "id": item_id, "note": note }))
            }
        };

        let query = match decision {
            ReviewDecision::Approve => {
                format!("mutation Decide($id: Uuid!) {{ {field}(id: $id) {{ {ITEM_FIELDS} }} }}")
            }
            _ => format!(
                "mutation Decide($id: Uuid!, $note: String) {{ {field}(id: $id, note: $note) {{ {ITEM_FIELDS} }} }}"
            ),
        };

        let mut data: serde_json::Map<String, serde_json::Value> =
            self.query(&query, Some(variables)).await?;
        let item = data
            .remove(field)
            .ok_or_else(|| ClientError::Internal("No data returned".to_string()))?;

        serde_json::from_value(item).map_err(|e| ClientError::Internal(e.to_string()))
    }
}
