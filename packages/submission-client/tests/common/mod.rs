// Common test utilities

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use submission_client::{
    ClientError, ContactDraft, ContributionDraft, DeliveryReceipt, ItemView, OfflineQueue,
    ReviewDecision, ReviewTransport, SubmissionKind, SubmissionTransport,
};
use tempfile::TempDir;
use tokio::sync::Notify;

type Responder = Box<dyn Fn(SubmissionKind, &Value) -> Option<Result<DeliveryReceipt, ClientError>> + Send + Sync>;

/// Transport that records every attempt and answers from a script.
///
/// Answer order: scripted responses, then the responder, then
/// online/offline state.
pub struct ScriptedTransport {
    online: AtomicBool,
    script: Mutex<VecDeque<Result<DeliveryReceipt, ClientError>>>,
    responder: Option<Responder>,
    attempts: Mutex<Vec<(SubmissionKind, Value)>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedTransport {
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
            script: Mutex::new(VecDeque::new()),
            responder: None,
            attempts: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Hold every delivery until the gate is notified
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn with_responder(
        mut self,
        responder: impl Fn(SubmissionKind, &Value) -> Option<Result<DeliveryReceipt, ClientError>>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.responder = Some(Box::new(responder));
        self
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn push_response(&self, response: Result<DeliveryReceipt, ClientError>) {
        self.script.lock().unwrap().push_back(response);
    }

    pub fn attempts(&self) -> Vec<(SubmissionKind, Value)> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubmissionTransport for ScriptedTransport {
    async fn deliver(
        &self,
        kind: SubmissionKind,
        payload: &Value,
    ) -> Result<DeliveryReceipt, ClientError> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            attempts.push((kind, payload.clone()));
            attempts.len()
        };

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        if let Some(response) = self.script.lock().unwrap().pop_front() {
            return response;
        }
        if let Some(response) = self.responder.as_ref().and_then(|r| r(kind, payload)) {
            return response;
        }
        if !self.online.load(Ordering::SeqCst) {
            return Err(ClientError::TransientNetwork("connection refused".to_string()));
        }

        Ok(DeliveryReceipt {
            id: format!("server-{}", attempt),
            status: Some("submitted_for_review".to_string()),
        })
    }
}

/// Review transport that refuses or accepts every decision
pub struct ScriptedReviews {
    pub refuse_with: Mutex<Option<ClientError>>,
}

#[async_trait]
impl ReviewTransport for ScriptedReviews {
    async fn decide(&self, item_id: &str, decision: &ReviewDecision) -> Result<ItemView, ClientError> {
        if let Some(err) = self.refuse_with.lock().unwrap().take() {
            return Err(err);
        }
        Ok(ItemView {
            status: decision.expected_status().to_string(),
            reviewed_by: Some("steward".to_string()),
            ..item(item_id)
        })
    }
}

pub fn item(id: &str) -> ItemView {
    ItemView {
        id: id.to_string(),
        journey_id: "journey".to_string(),
        contribution_type: "text".to_string(),
        status: "submitted_for_review".to_string(),
        visibility: "public".to_string(),
        reviewed_by: None,
        rejection_note: None,
    }
}

pub fn temp_queue() -> (TempDir, Arc<OfflineQueue>) {
    let dir = TempDir::new().unwrap();
    let queue = OfflineQueue::open(dir.path().join("queue")).unwrap();
    (dir, Arc::new(queue))
}

pub fn text_draft(title: &str) -> ContributionDraft {
    ContributionDraft {
        journey_id: "0192f0c4-5b1e-7c3a-9d2f-1a2b3c4d5e6f".to_string(),
        contribution_type: "text".to_string(),
        payload_json: serde_json::json!({ "title": title, "body": "Notes from the archive" })
            .to_string(),
        visibility: None,
        attribution: None,
        provenance_note: None,
        as_draft: None,
    }
}

pub fn contact_draft() -> ContactDraft {
    ContactDraft {
        journey_id: None,
        sender_name: "Ada".to_string(),
        sender_email: "ada@example.org".to_string(),
        body: "Do you have photos of the 1978 team?".to_string(),
    }
}

/// Title of a queued or attempted contribution payload
pub fn title_of(payload: &Value) -> String {
    let inner: Value = serde_json::from_str(payload["payloadJson"].as_str().unwrap()).unwrap();
    inner["title"].as_str().unwrap().to_string()
}
