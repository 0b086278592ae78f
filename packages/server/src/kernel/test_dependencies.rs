// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into ServerDeps for tests.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::{Arc, Mutex};

use super::{BaseNotifier, NotificationKind, ServerDeps};
use crate::common::MemberId;
use crate::domains::auth::JwtService;
use crate::domains::contributions::IntakeLimits;

// =============================================================================
// Spy Notifier
// =============================================================================

/// A notification captured by [`SpyNotifier`]
#[derive(Debug, Clone)]
pub struct SentNotification {
    pub recipient: MemberId,
    pub kind: NotificationKind,
    pub context: serde_json::Value,
}

pub struct SpyNotifier {
    sent: Arc<Mutex<Vec<SentNotification>>>,
}

impl SpyNotifier {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get all notifications that were sent
    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().unwrap().clone()
    }

    /// Check if a notification of this kind went to this recipient
    pub fn was_sent(&self, recipient: MemberId, kind: NotificationKind) -> bool {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .any(|n| n.recipient == recipient && n.kind == kind)
    }
}

impl Default for SpyNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseNotifier for SpyNotifier {
    async fn notify(
        &self,
        recipient: MemberId,
        kind: NotificationKind,
        context: serde_json::Value,
    ) -> Result<()> {
        self.sent.lock().unwrap().push(SentNotification {
            recipient,
            kind,
            context,
        });
        Ok(())
    }
}

// =============================================================================
// Failing Notifier
// =============================================================================

/// Notifier whose every delivery fails; state changes must still commit.
pub struct FailingNotifier;

#[async_trait]
impl BaseNotifier for FailingNotifier {
    async fn notify(
        &self,
        _recipient: MemberId,
        _kind: NotificationKind,
        _context: serde_json::Value,
    ) -> Result<()> {
        Err(anyhow::anyhow!("notification channel unavailable"))
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

pub const TEST_JWT_SECRET: &str = "test_secret";
pub const TEST_JWT_ISSUER: &str = "journeys-test";

pub struct TestDependencies {
    pub notifier: Arc<dyn BaseNotifier>,
    pub intake_limits: IntakeLimits,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            notifier: Arc::new(SpyNotifier::new()),
            intake_limits: IntakeLimits::default(),
        }
    }

    /// Set a notifier (e.g. a shared `Arc<SpyNotifier>` the test keeps a handle to)
    pub fn notifier(mut self, notifier: Arc<dyn BaseNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn intake_limits(mut self, limits: IntakeLimits) -> Self {
        self.intake_limits = limits;
        self
    }

    pub fn into_server_deps(self, db_pool: PgPool) -> ServerDeps {
        ServerDeps::new(
            db_pool,
            self.notifier,
            Arc::new(JwtService::new(TEST_JWT_SECRET, TEST_JWT_ISSUER.to_string())),
            self.intake_limits,
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
