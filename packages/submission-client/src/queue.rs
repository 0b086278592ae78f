//! Durable offline submission queue
//!
//! Records live in a sled tree keyed by a monotonically increasing id, so
//! iteration order is insertion order and survives restarts. Payloads are
//! stored exactly as the caller handed them over.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sled::{Db, Tree};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::delivery::SubmissionKind;

/// Failed attempts after which a record is left for the user to retry
pub const MAX_RETRIES: u32 = 3;

const TREE_NAME: &str = "pending_submissions";

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Storage error: {0}")]
    Storage(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Queued submission {0} not found")]
    NotFound(Uuid),
}

/// A submission waiting for connectivity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedSubmission {
    pub id: Uuid,
    pub kind: SubmissionKind,
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    pub retry_count: u32,
    pub last_error: Option<String>,
    /// Position in the queue
    seq: u64,
}

impl QueuedSubmission {
    /// Still eligible for automatic replay
    pub fn is_retryable(&self) -> bool {
        self.retry_count < MAX_RETRIES
    }
}

/// Offline queue database
pub struct OfflineQueue {
    db: Db,
    tree: Tree,
}

impl OfflineQueue {
    /// Open or create the queue at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, QueueError> {
        let db = sled::open(path.as_ref())?;
        let tree = db.open_tree(TREE_NAME)?;
        info!(
            path = %path.as_ref().display(),
            pending = tree.len(),
            "Opened offline submission queue"
        );
        Ok(Self { db, tree })
    }

    /// Append a submission and flush it to disk before returning
    pub fn enqueue(
        &self,
        kind: SubmissionKind,
        payload: serde_json::Value,
    ) -> Result<QueuedSubmission, QueueError> {
        let seq = self.db.generate_id()?;
        let record = QueuedSubmission {
            id: Uuid::new_v4(),
            kind,
            payload,
            timestamp: Utc::now(),
            retry_count: 0,
            last_error: None,
            seq,
        };
        self.put(&record)?;
        self.tree.flush()?;

        info!(id = %record.id, kind = %kind, "Submission queued for later delivery");
        Ok(record)
    }

    /// All records, oldest first
    pub fn list(&self) -> Result<Vec<QueuedSubmission>, QueueError> {
        let mut records = Vec::new();
        for item in self.tree.iter() {
            let (_, value) = item?;
            records.push(serde_json::from_slice(&value)?);
        }
        Ok(records)
    }

    pub fn get(&self, id: Uuid) -> Result<Option<QueuedSubmission>, QueueError> {
        Ok(self.list()?.into_iter().find(|r| r.id == id))
    }

    /// Records that hit the retry bound and wait for a manual retry
    pub fn needs_manual_retry(&self) -> Result<Vec<QueuedSubmission>, QueueError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|r| !r.is_retryable())
            .collect())
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Count a failed delivery attempt
    pub fn record_failure(&self, id: Uuid, error: &str) -> Result<QueuedSubmission, QueueError> {
        let mut record = self.get(id)?.ok_or(QueueError::NotFound(id))?;
        record.retry_count += 1;
        record.last_error = Some(error.to_string());
        self.put(&record)?;
        self.tree.flush()?;

        debug!(id = %id, retry_count = record.retry_count, error = %error, "Delivery attempt failed");
        Ok(record)
    }

    /// Delete a record. Returns false if it was already gone.
    pub fn remove(&self, id: Uuid) -> Result<bool, QueueError> {
        let Some(record) = self.get(id)? else {
            return Ok(false);
        };
        self.tree.remove(record.seq.to_be_bytes())?;
        self.tree.flush()?;
        Ok(true)
    }

    fn put(&self, record: &QueuedSubmission) -> Result<(), QueueError> {
        let value = serde_json::to_vec(record)?;
        self.tree.insert(record.seq.to_be_bytes(), value)?;
        Ok(())
    }
}
