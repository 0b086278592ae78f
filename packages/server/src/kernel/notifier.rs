//! Notification dispatch helpers.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use super::{BaseNotifier, NotificationKind};
use crate::common::MemberId;

/// Notifier that only records the event in the log.
///
/// Delivery channels (email, push) are outside this service; deployments
/// that have one plug in their own `BaseNotifier`.
pub struct TracingNotifier;

#[async_trait]
impl BaseNotifier for TracingNotifier {
    async fn notify(
        &self,
        recipient: MemberId,
        kind: NotificationKind,
        context: serde_json::Value,
    ) -> Result<()> {
        info!(recipient = %recipient, kind = %kind, context = %context, "Notification dispatched");
        Ok(())
    }
}

/// Send a notification on a detached task.
///
/// The caller's state change has already committed; a failing or slow
/// notifier can only produce a warning.
pub fn dispatch(
    notifier: Arc<dyn BaseNotifier>,
    recipient: MemberId,
    kind: NotificationKind,
    context: serde_json::Value,
) {
    tokio::spawn(async move {
        if let Err(e) = notifier.notify(recipient, kind, context).await {
            warn!(recipient = %recipient, kind = %kind, error = %e, "Notification failed");
        }
    });
}
