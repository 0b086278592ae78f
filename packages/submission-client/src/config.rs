use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Client configuration loaded from the environment
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// GraphQL endpoint, e.g. `http://localhost:8080/graphql`
    pub endpoint: String,
    /// Directory of the sled database holding the offline queue
    pub queue_path: PathBuf,
    pub request_timeout: Duration,
    pub auth_token: Option<String>,
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let endpoint = env::var("JOURNEYS_API_URL")
            .unwrap_or_else(|_| "http://localhost:8080/graphql".to_string());

        let queue_path = env::var("SUBMISSION_QUEUE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./submission-queue"));

        let request_timeout = env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .map(Duration::from_secs)
            .context("REQUEST_TIMEOUT_SECS must be a whole number of seconds")?;

        let auth_token = env::var("JOURNEYS_AUTH_TOKEN").ok().filter(|t| !t.is_empty());

        Ok(Self {
            endpoint,
            queue_path,
            request_timeout,
            auth_token,
        })
    }
}
