use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use uuid::Uuid;

use crate::domains::contributions::IntakeLimits;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub allowed_origins: Vec<String>,
    /// Members seeded with a global steward grant at startup
    pub bootstrap_global_stewards: Vec<Uuid>,
    pub intake_limits: IntakeLimits,
    pub request_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let defaults = IntakeLimits::default();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "journeys".to_string()),
            allowed_origins: parse_list(&env::var("ALLOWED_ORIGINS").unwrap_or_default()),
            bootstrap_global_stewards: parse_list(
                &env::var("BOOTSTRAP_GLOBAL_STEWARDS").unwrap_or_default(),
            )
            .iter()
            .map(|raw| Uuid::parse_str(raw))
            .collect::<Result<Vec<_>, _>>()
            .context("BOOTSTRAP_GLOBAL_STEWARDS must be a comma-separated list of UUIDs")?,
            intake_limits: IntakeLimits {
                max_image_bytes: env_bytes("MAX_IMAGE_BYTES", defaults.max_image_bytes)?,
                max_document_bytes: env_bytes("MAX_DOCUMENT_BYTES", defaults.max_document_bytes)?,
                max_video_bytes: env_bytes("MAX_VIDEO_BYTES", defaults.max_video_bytes)?,
            },
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .context("REQUEST_TIMEOUT_SECS must be a valid number")?,
        })
    }
}

fn env_bytes(key: &str, default: i64) -> Result<i64> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{} must be a number of bytes", key)),
        Err(_) => Ok(default),
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
