//! Optimistic moderation state for the review screen.
//!
//! `confirmed` holds what the server last said about each item. `pending`
//! overlays at most one in-flight decision per item. A refused decision is
//! rolled back by dropping its overlay.

use std::collections::HashMap;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use crate::delivery::{ItemView, ReviewDecision, ReviewTransport};
use crate::error::ClientError;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CacheError {
    #[error("A decision for item {0} is already in flight")]
    Busy(String),
}

/// An item merged with its pending decision, if any
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedItem {
    pub item: ItemView,
    /// Decision awaiting the server; drives the per-item spinner
    pub processing: Option<ReviewDecision>,
}

#[derive(Debug, Default)]
pub struct ReviewCache {
    confirmed: HashMap<String, ItemView>,
    pending: HashMap<String, ReviewDecision>,
}

impl ReviewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace confirmed state with a fresh server read.
    ///
    /// Items missing from the read are dropped unless a decision on them is
    /// still in flight.
    pub fn load(&mut self, items: impl IntoIterator<Item = ItemView>) {
        let pending = &self.pending;
        self.confirmed.retain(|id, _| pending.contains_key(id));
        for item in items {
            self.confirmed.insert(item.id.clone(), item);
        }
    }

    /// Start a decision. Fails if the item already has one in flight.
    pub fn begin(&mut self, item_id: &str, decision: ReviewDecision) -> Result<(), CacheError> {
        if self.pending.contains_key(item_id) {
            return Err(CacheError::Busy(item_id.to_string()));
        }
        self.pending.insert(item_id.to_string(), decision);
        Ok(())
    }

    /// Resolve the in-flight decision with the server's answer
    pub fn settle(&mut self, item_id: &str, outcome: &Result<ItemView, ClientError>) {
        self.pending.remove(item_id);
        match outcome {
            Ok(item) => {
                self.confirmed.insert(item_id.to_string(), item.clone());
            }
            Err(e) => {
                debug!(item_id = %item_id, error = %e, "Decision refused, rolling back");
            }
        }
    }

    pub fn is_processing(&self, item_id: &str) -> bool {
        self.pending.contains_key(item_id)
    }

    /// What the screen shows for an item
    pub fn view(&self, item_id: &str) -> Option<DisplayedItem> {
        let confirmed = self.confirmed.get(item_id)?;
        let processing = self.pending.get(item_id).cloned();

        let mut item = confirmed.clone();
        if let Some(decision) = &processing {
            item.status = decision.expected_status().to_string();
        }

        Some(DisplayedItem { item, processing })
    }
}

/// Show a decision optimistically, send it, then settle the cache.
///
/// Transport failures are returned to the caller; decisions are never queued.
pub async fn apply_decision<T: ReviewTransport + ?Sized>(
    cache: &Mutex<ReviewCache>,
    transport: &T,
    item_id: &str,
    decision: ReviewDecision,
) -> Result<ItemView, ClientError> {
    cache
        .lock()
        .await
        .begin(item_id, decision.clone())?;

    let outcome = transport.decide(item_id, &decision).await;

    cache.lock().await.settle(item_id, &outcome);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_item(id: &str) -> ItemView {
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

    #[test]
    fn test_overlay_shows_expected_status() {
        let mut cache = ReviewCache::new();
        cache.load([pending_item("a")]);

        cache.begin("a", ReviewDecision::Approve).unwrap();

        let shown = cache.view("a").unwrap();
        assert_eq!(shown.item.status, "approved");
        assert_eq!(shown.processing, Some(ReviewDecision::Approve));
    }

    #[test]
    fn test_second_decision_is_busy() {
        let mut cache = ReviewCache::new();
        cache.load([pending_item("a"), pending_item("b")]);

        cache.begin("a", ReviewDecision::Approve).unwrap();
        assert_eq!(
            cache.begin("a", ReviewDecision::Reject { note: None }),
            Err(CacheError::Busy("a".to_string()))
        );
        // Other items are independent
        assert!(cache.begin("b", ReviewDecision::Reject { note: None }).is_ok());
    }

    #[test]
    fn test_refusal_rolls_back() {
        let mut cache = ReviewCache::new();
        cache.load([pending_item("a")]);

        cache.begin("a", ReviewDecision::Approve).unwrap();
        cache.settle(
            "a",
            &Err(ClientError::PermissionDenied("no grant".to_string())),
        );

        let shown = cache.view("a").unwrap();
        assert_eq!(shown.item.status, "submitted_for_review");
        assert!(shown.processing.is_none());
    }

    #[test]
    fn test_success_replaces_confirmed_state() {
        let mut cache = ReviewCache::new();
        cache.load([pending_item("a")]);

        cache
            .begin("a", ReviewDecision::Reject { note: Some("blurry".to_string()) })
            .unwrap();
        let server = ItemView {
            status: "rejected".to_string(),
            rejection_note: Some("blurry".to_string()),
            reviewed_by: Some("steward".to_string()),
            ..pending_item("a")
        };
        cache.settle("a", &Ok(server.clone()));

        assert_eq!(cache.view("a").unwrap().item, server);
        assert!(!cache.is_processing("a"));
    }

    #[test]
    fn test_reload_drops_items_that_left_the_queue() {
        let mut cache = ReviewCache::new();
        cache.load([pending_item("a"), pending_item("b"), pending_item("c")]);
        cache.begin("b", ReviewDecision::Approve).unwrap();

        cache.load([pending_item("c")]);

        assert!(cache.view("a").is_none());
        // In flight, kept until settled
        assert!(cache.view("b").unwrap().processing.is_some());
        assert!(cache.view("c").is_some());
    }
}
