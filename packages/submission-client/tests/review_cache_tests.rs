//! Optimistic decisions against a scripted review transport.

mod common;

use std::sync::Mutex as StdMutex;

use common::*;
use submission_client::{apply_decision, ClientError, ReviewCache, ReviewDecision};
use tokio::sync::Mutex;

#[tokio::test]
async fn accepted_decision_becomes_confirmed() {
    let cache = Mutex::new(ReviewCache::new());
    cache.lock().await.load([item("a")]);
    let reviews = ScriptedReviews {
        refuse_with: StdMutex::new(None),
    };

    let updated = apply_decision(&cache, &reviews, "a", ReviewDecision::Approve)
        .await
        .unwrap();

    assert_eq!(updated.status, "approved");
    let shown = cache.lock().await.view("a").unwrap();
    assert_eq!(shown.item.status, "approved");
    assert!(shown.processing.is_none());
}

#[tokio::test]
async fn refused_decision_rolls_back() {
    let cache = Mutex::new(ReviewCache::new());
    cache.lock().await.load([item("a")]);
    let reviews = ScriptedReviews {
        refuse_with: StdMutex::new(Some(ClientError::InvalidStatus(
            "Cannot reject an item that is approved".to_string(),
        ))),
    };

    let err = apply_decision(&cache, &reviews, "a", ReviewDecision::Reject { note: None })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "invalid_status");
    let shown = cache.lock().await.view("a").unwrap();
    assert_eq!(shown.item.status, "submitted_for_review");
}

#[tokio::test]
async fn decisions_are_not_queued_when_offline() {
    let cache = Mutex::new(ReviewCache::new());
    cache.lock().await.load([item("a")]);
    let reviews = ScriptedReviews {
        refuse_with: StdMutex::new(Some(ClientError::TransientNetwork("timed out".to_string()))),
    };

    let err = apply_decision(&cache, &reviews, "a", ReviewDecision::Approve)
        .await
        .unwrap_err();

    assert!(err.is_transient());
    assert!(!cache.lock().await.is_processing("a"));
}

#[tokio::test]
async fn in_flight_item_is_busy() {
    let cache = Mutex::new(ReviewCache::new());
    cache.lock().await.load([item("a")]);
    cache
        .lock()
        .await
        .begin("a", ReviewDecision::Approve)
        .unwrap();
    let reviews = ScriptedReviews {
        refuse_with: StdMutex::new(None),
    };

    let err = apply_decision(&cache, &reviews, "a", ReviewDecision::Approve)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "busy");
}
