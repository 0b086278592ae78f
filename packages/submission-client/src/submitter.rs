//! Submitting with an offline fallback.
//!
//! A submission that fails for lack of connectivity is written to the
//! [`OfflineQueue`] and the caller gets a soft confirmation. Drains replay the
//! queue oldest first, one record at a time, and never overlap. A
//! reconnect that arrives while a drain holds the queue is remembered and
//! served by another pass once the queue is free.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::delivery::{
    ContactDraft, ContributionDraft, DeliveryReceipt, SizeReducer, SubmissionKind,
    SubmissionTransport,
};
use crate::error::ClientError;
use crate::queue::{OfflineQueue, QueuedSubmission};

/// What happened to a submission
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The server accepted it
    Delivered(DeliveryReceipt),
    /// Saved on this device; it will be sent when connectivity returns
    Queued { id: Uuid },
}

/// Result of a drain pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainReport {
    /// Another drain holds the queue
    AlreadyRunning,
    Finished {
        delivered: usize,
        failed: usize,
        /// Records still queued after the pass
        remaining: usize,
    },
}

pub struct Submitter<T> {
    transport: Arc<T>,
    queue: Arc<OfflineQueue>,
    reducer: Option<Arc<dyn SizeReducer>>,
    drain_lock: Mutex<()>,
    /// Set by the connectivity watcher, cleared by the pass that serves it
    drain_requested: AtomicBool,
}

impl<T: SubmissionTransport + 'static> Submitter<T> {
    pub fn new(transport: Arc<T>, queue: Arc<OfflineQueue>) -> Self {
        Self {
            transport,
            queue,
            reducer: None,
            drain_lock: Mutex::new(()),
            drain_requested: AtomicBool::new(false),
        }
    }

    /// Enable the single client-side reduction pass for oversized images
    pub fn with_size_reducer(mut self, reducer: Arc<dyn SizeReducer>) -> Self {
        self.reducer = Some(reducer);
        self
    }

    pub fn queue(&self) -> &OfflineQueue {
        &self.queue
    }

    /// Submit a contribution, queueing it if the server cannot be reached.
    ///
    /// Rejections from the server (validation, size, permission) are returned
    /// as errors and nothing is queued.
    pub async fn submit_contribution(
        &self,
        draft: ContributionDraft,
    ) -> Result<SubmitOutcome, ClientError> {
        let first_attempt = self.send_or_queue(SubmissionKind::Contribution, &draft).await;
        match first_attempt {
            Err(ClientError::SizeExceeded {
                reducible: true, ..
            }) if draft.is_image() && self.reducer.is_some() => {
                let reduced = self.reduce(draft).await?;
                self.send_or_queue(SubmissionKind::Contribution, &reduced)
                    .await
            }
            other => other,
        }
    }

    pub async fn send_contact_message(
        &self,
        draft: ContactDraft,
    ) -> Result<SubmitOutcome, ClientError> {
        self.send_or_queue(SubmissionKind::ContactMessage, &draft)
            .await
    }

    /// Replay retryable records. Returns `AlreadyRunning` if a drain is in progress.
    pub async fn drain(&self) -> Result<DrainReport, ClientError> {
        self.run_drain(|record| record.is_retryable()).await
    }

    /// Replay every record, including those past the retry bound
    pub async fn retry_all(&self) -> Result<DrainReport, ClientError> {
        self.run_drain(|_| true).await
    }

    /// Replay one record regardless of its retry count
    pub async fn retry_one(&self, id: Uuid) -> Result<DrainReport, ClientError> {
        if self.queue.get(id)?.is_none() {
            return Err(crate::queue::QueueError::NotFound(id).into());
        }
        self.run_drain(move |record| record.id == id).await
    }

    /// Drop a record the user gave up on
    pub async fn dismiss(&self, id: Uuid) -> Result<bool, ClientError> {
        let removed = {
            let _guard = self.drain_lock.lock().await;
            self.queue.remove(id)?
        };
        if removed {
            info!(id = %id, "Queued submission dismissed");
        }
        self.serve_drain_requests().await;
        Ok(removed)
    }

    /// Drain whenever `online` reports connectivity.
    ///
    /// Every notification that leaves the value online requests a pass, so a
    /// quick offline/online flap that the channel collapses into one `true`
    /// still counts. The task ends when the sender is dropped.
    pub fn watch_connectivity(self: Arc<Self>, mut online: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut was_online = *online.borrow_and_update();
            if was_online {
                self.request_drain();
            }

            while online.changed().await.is_ok() {
                let is_online = *online.borrow_and_update();
                if is_online {
                    if !was_online {
                        info!("Connectivity restored, draining offline queue");
                    }
                    self.request_drain();
                }
                was_online = is_online;
            }
        })
    }

    /// Ask for an automatic drain without waiting for it.
    ///
    /// If a drain is running, it makes the extra pass after it releases the
    /// queue.
    fn request_drain(self: &Arc<Self>) {
        self.drain_requested.store(true, Ordering::SeqCst);
        let submitter = Arc::clone(self);
        tokio::spawn(async move { submitter.serve_drain_requests().await });
    }

    /// Run automatic passes until no request is outstanding.
    ///
    /// Must be called without holding `drain_lock`. Whoever holds the lock
    /// calls this again after releasing it, so a request is never stranded.
    async fn serve_drain_requests(&self) {
        while self.drain_requested.load(Ordering::SeqCst) {
            let Ok(_guard) = self.drain_lock.try_lock() else {
                return;
            };
            if !self.drain_requested.swap(false, Ordering::SeqCst) {
                return;
            }

            match self.drain_locked(|record| record.is_retryable()).await {
                Ok(report) => info!(report = ?report, "Offline queue drain finished"),
                Err(e) => warn!(error = %e, "Offline queue drain failed"),
            }
        }
    }

    async fn send_or_queue<D: Serialize>(
        &self,
        kind: SubmissionKind,
        draft: &D,
    ) -> Result<SubmitOutcome, ClientError> {
        let payload = serde_json::to_value(draft)
            .map_err(|e| ClientError::Validation(format!("cannot encode submission: {}", e)))?;

        match self.transport.deliver(kind, &payload).await {
            Ok(receipt) => Ok(SubmitOutcome::Delivered(receipt)),
            Err(e) if e.is_transient() => {
                warn!(kind = %kind, error = %e, "Delivery failed, queueing submission");
                let record = self.queue.enqueue(kind, payload)?;
                Ok(SubmitOutcome::Queued { id: record.id })
            }
            Err(e) => Err(e),
        }
    }

    async fn reduce(&self, draft: ContributionDraft) -> Result<ContributionDraft, ClientError> {
        let Some(reducer) = &self.reducer else {
            return Ok(draft);
        };
        let reduced_size = reducer
            .reduce(&draft)
            .await
            .map_err(|e| ClientError::Validation(format!("could not reduce image: {}", e)))?;

        info!(reduced_size_bytes = reduced_size, "Image reduced, resubmitting");
        draft.with_reduced_size(reduced_size)
    }

    async fn run_drain<F>(&self, eligible: F) -> Result<DrainReport, ClientError>
    where
        F: Fn(&QueuedSubmission) -> bool,
    {
        let report = {
            let Ok(_guard) = self.drain_lock.try_lock() else {
                return Ok(DrainReport::AlreadyRunning);
            };
            self.drain_locked(eligible).await
        };
        self.serve_drain_requests().await;
        report
    }

    /// One pass over the queue. The caller holds `drain_lock`.
    async fn drain_locked<F>(&self, eligible: F) -> Result<DrainReport, ClientError>
    where
        F: Fn(&QueuedSubmission) -> bool,
    {
        let mut delivered = 0;
        let mut failed = 0;

        for record in self.queue.list()? {
            if !eligible(&record) {
                continue;
            }

            match self.transport.deliver(record.kind, &record.payload).await {
                Ok(receipt) => {
                    self.queue.remove(record.id)?;
                    delivered += 1;
                    info!(id = %record.id, server_id = %receipt.id, "Queued submission delivered");
                }
                Err(e) => {
                    self.queue.record_failure(record.id, &e.to_string())?;
                    failed += 1;
                    if e.is_transient() {
                        // Still offline; keep the rest for the next pass.
                        warn!(id = %record.id, error = %e, "Drain stopped on transient failure");
                        break;
                    }
                    warn!(id = %record.id, error = %e, "Queued submission rejected by server");
                }
            }
        }

        debug!(delivered, failed, "Drain pass complete");
        Ok(DrainReport::Finished {
            delivered,
            failed,
            remaining: self.queue.len(),
        })
    }
}
