use std::time::Duration;

use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;
use tracing::warn;

use crate::server::app::AxumAppState;

const DB_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    database: &'static str,
    pool_size: u32,
    pool_idle: usize,
}

/// Liveness plus a database round trip. 503 when the database does not answer.
pub async fn health_handler(
    Extension(state): Extension<AxumAppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let pool = &state.server_deps.db_pool;

    let probe = tokio::time::timeout(DB_PROBE_TIMEOUT, sqlx::query("SELECT 1").execute(pool)).await;
    let database = match probe {
        Ok(Ok(_)) => "ok",
        Ok(Err(e)) => {
            warn!(error = %e, "Health check query failed");
            "error"
        }
        Err(_) => {
            warn!("Health check query timed out");
            "timeout"
        }
    };

    let (code, status) = if database == "ok" {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        code,
        Json(HealthResponse {
            status,
            database,
            pool_size: pool.size(),
            pool_idle: pool.num_idle(),
        }),
    )
}
