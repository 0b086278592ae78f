// Main entry point for the governance API server

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use server_core::domains::auth::JwtService;
use server_core::domains::stewards::activities::bootstrap_global_stewards;
use server_core::kernel::{ServerDeps, TracingNotifier};
use server_core::{server::build_app, Config};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting journey contribution governance API");

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    let server_deps = ServerDeps::new(
        pool,
        Arc::new(TracingNotifier),
        Arc::new(JwtService::new(&config.jwt_secret, config.jwt_issuer.clone())),
        config.intake_limits,
    );

    if !config.bootstrap_global_stewards.is_empty() {
        bootstrap_global_stewards(&config.bootstrap_global_stewards, &server_deps)
            .await
            .context("Failed to seed bootstrap stewards")?;
    }

    let app = build_app(
        server_deps,
        &config.allowed_origins,
        Duration::from_secs(config.request_timeout_secs),
    );

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("GraphQL endpoint: http://localhost:{}/graphql", config.port);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
