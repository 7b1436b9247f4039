//! Listings proxy configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `HUBSPOT_API_KEY` - CRM private app token (bearer auth)
//!
//! ## Optional
//! - `LISTINGS_HOST` - Bind address (default: 127.0.0.1)
//! - `LISTINGS_PORT` - Listen port (default: 3100)
//! - `HUBSPOT_API_BASE` - CRM API base URL (default: https://api.hubapi.com)
//! - `LISTINGS_OBJECT_TYPE` - CRM custom object type for listings (default: 0-420)
//! - `LISTINGS_API_TIMEOUT_SECS` - Deadline for CRM calls (default: 20)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Sentry tracing sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE: &str = "https://api.hubapi.com";
const DEFAULT_OBJECT_TYPE: &str = "0-420";
const DEFAULT_API_TIMEOUT_SECS: u64 = 20;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Listings proxy configuration.
#[derive(Debug, Clone)]
pub struct ListingsConfig {
    /// IP address to bind the server to.
    pub host: IpAddr,
    /// Port to listen on.
    pub port: u16,
    /// CRM API base URL (no trailing slash).
    pub api_base: String,
    /// CRM private app token.
    pub api_key: SecretString,
    /// CRM custom object type holding the listings.
    pub object_type: String,
    /// Deadline applied to every CRM call.
    pub api_timeout: Duration,
    /// Sentry DSN for error tracking.
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag (e.g. production, staging).
    pub sentry_environment: Option<String>,
    /// Fraction of errors reported to Sentry.
    pub sentry_sample_rate: f32,
    /// Fraction of requests traced to Sentry.
    pub sentry_traces_sample_rate: f32,
}

impl ListingsConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or any value
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("LISTINGS_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("LISTINGS_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("LISTINGS_PORT", "3100")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("LISTINGS_PORT".to_string(), e.to_string()))?;
        let api_base = match get_optional_env("HUBSPOT_API_BASE") {
            Some(raw) => validate_url("HUBSPOT_API_BASE", &raw)?,
            None => DEFAULT_API_BASE.to_owned(),
        };
        let api_key = SecretString::from(get_required_env("HUBSPOT_API_KEY")?);
        let object_type = get_env_or_default("LISTINGS_OBJECT_TYPE", DEFAULT_OBJECT_TYPE);
        let api_timeout = Duration::from_secs(parse_env_or(
            "LISTINGS_API_TIMEOUT_SECS",
            DEFAULT_API_TIMEOUT_SECS,
        )?);

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = parse_f32_env("SENTRY_SAMPLE_RATE", 1.0)?;
        let sentry_traces_sample_rate = parse_f32_env("SENTRY_TRACES_SAMPLE_RATE", 0.0)?;

        Ok(Self {
            host,
            port,
            api_base,
            api_key,
            object_type,
            api_timeout,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn validate_url(key: &str, raw: &str) -> Result<String, ConfigError> {
    let url =
        Url::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected an http(s) URL, got scheme '{}'", url.scheme()),
        ));
    }
    Ok(raw.trim_end_matches('/').to_owned())
}

/// Parse an optional numeric environment variable.
fn parse_env_or(key: &str, default: u64) -> Result<u64, ConfigError> {
    match get_optional_env(key) {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

/// Parse an optional float environment variable.
fn parse_f32_env(key: &str, default: f32) -> Result<f32, ConfigError> {
    match get_optional_env(key) {
        Some(raw) => raw
            .parse::<f32>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}
