//! Server dependencies for domain activities (using traits for testability)
//!
//! Every activity receives `&ServerDeps`; external services sit behind traits
//! so tests can swap them out.

use sqlx::PgPool;
use std::sync::Arc;

use crate::domains::auth::JwtService;
use crate::domains::contributions::IntakeLimits;
use crate::kernel::BaseNotifier;

/// Server dependencies accessible to activities
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    /// Fire-and-forget notification sink
    pub notifier: Arc<dyn BaseNotifier>,
    /// JWT service for verifying (and, in tooling, issuing) session tokens
    pub jwt_service: Arc<JwtService>,
    /// Per-type size ceilings applied by Submission Intake
    pub intake_limits: IntakeLimits,
}

impl ServerDeps {
    pub fn new(
        db_pool: PgPool,
        notifier: Arc<dyn BaseNotifier>,
        jwt_service: Arc<JwtService>,
        intake_limits: IntakeLimits,
    ) -> Self {
        Self {
            db_pool,
            notifier,
            jwt_service,
            intake_limits,
        }
    }
}
