//! Test harness with testcontainers for integration testing.
//!
//! One Postgres container is shared by every test in a binary. It is started
//! and migrated on first use, then reused.

use anyhow::{Context, Result};
use server_core::common::MemberId;
use server_core::domains::auth::SessionIdentity;
use server_core::kernel::{ServerDeps, SpyNotifier, TestDependencies};
use server_core::server::middleware::AuthUser;
use sqlx::PgPool;
use std::sync::Arc;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

use super::GraphQLClient;

struct SharedTestInfra {
    db_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let postgres = Postgres::default()
            .with_tag("16")
            .with_cmd(["-c", "max_connections=200"])
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let pg_host = postgres.get_host().await?;
        let pg_port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!(
            "postgresql://postgres:postgres@{}:{}/postgres",
            pg_host, pg_port
        );

        let pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// Test harness that manages test infrastructure.
///
/// Tests share one database, so every fixture creates its own journey and
/// members and assertions stay inside them.
///
/// ```ignore
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let deps = ctx.deps();
/// }
/// ```
pub struct TestHarness {
    pub db_pool: PgPool,
    /// Records notifications dispatched through [`TestHarness::deps`]
    pub notifier: Arc<SpyNotifier>,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {}
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;

        let db_pool = PgPool::connect(&infra.db_url)
            .await
            .context("Failed to connect to test database")?;

        Ok(Self {
            db_pool,
            notifier: Arc::new(SpyNotifier::new()),
        })
    }

    /// Server deps wired to this harness's spy notifier
    pub fn deps(&self) -> ServerDeps {
        self.deps_with(TestDependencies::new().notifier(self.notifier.clone()))
    }

    pub fn deps_with(&self, test_deps: TestDependencies) -> ServerDeps {
        test_deps.into_server_deps(self.db_pool.clone())
    }

    /// GraphQL client without an authenticated member
    pub fn graphql(&self) -> GraphQLClient {
        GraphQLClient::new(Arc::new(self.deps()), None)
    }

    /// GraphQL client acting as `member_id`
    pub fn graphql_as(&self, member_id: MemberId) -> GraphQLClient {
        self.graphql_with_claims(member_id, false)
    }

    /// GraphQL client whose token claims a steward role (advisory only).
    ///
    /// The session goes through a real signed token, the same way the HTTP
    /// middleware resolves one.
    pub fn graphql_with_claims(&self, member_id: MemberId, claims_steward: bool) -> GraphQLClient {
        let deps = self.deps();
        let token = deps
            .jwt_service
            .issue(&SessionIdentity {
                member_id,
                display_name: "Test Member".to_string(),
                claims_steward,
            })
            .expect("Failed to sign test session");
        let identity = deps
            .jwt_service
            .verify(&token)
            .expect("Failed to verify test session");

        GraphQLClient::new(Arc::new(deps), Some(AuthUser::from(identity)))
    }

    /// Wait for detached notification tasks to run.
    pub async fn settle(&self) {
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    }
}
