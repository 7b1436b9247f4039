//! Gate configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `GATE_BACKEND_URL` - Base URL of the contact verification backend
//!
//! ## Optional
//! - `GATE_DATA_DIR` - Directory for profile/session/cache state (default: .stonebridge)
//! - `GATE_API_TIMEOUT_SECS` - Deadline for backend/CRM calls (default: 20)
//! - `GATE_STUCK_CHECK_SECS` - Grace before the stuck-loading probe (default: 5)
//! - `GATE_DEV_MODE` - Enable developer bypasses (default: false)
//! - `GATE_TRUST_EXISTING_CONTACTS` - Admit known contacts without verification (default: true)
//! - `GATE_BYPASS_AUTH` - Skip the gate entirely (default: false)
//! - `HUBSPOT_PORTAL_ID` / `HUBSPOT_FORM_ID` - Enable the forms-submission transport (set both)
//! - `HUBSPOT_FORMS_API_BASE` - Forms submission endpoint base (default: https://api.hsforms.com)
//! - `HUBSPOT_FORM_URL` - Hosted shared-form URL for the last-resort transport

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_DATA_DIR: &str = ".stonebridge";
const DEFAULT_API_TIMEOUT_SECS: u64 = 20;
const DEFAULT_STUCK_CHECK_SECS: u64 = 5;
const DEFAULT_FORMS_API_BASE: &str = "https://api.hsforms.com";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Immutable gate configuration.
///
/// Built once at startup and shared by reference; nothing mutates it at
/// runtime. Behavior toggles that change admission decisions
/// (`trust_existing_contacts`, `bypass_auth`, `dev_mode`) live here so a
/// deployment's policy is visible in one place.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Base URL of the contact verification backend (no trailing slash).
    pub backend_url: String,
    /// Directory holding the profile slot, session state, and lookup cache.
    pub data_dir: PathBuf,
    /// Deadline applied to every outbound HTTP call.
    pub api_timeout: Duration,
    /// Grace period before probing the listings surface for a stuck loading
    /// state after the gate opens.
    pub stuck_check_delay: Duration,
    /// Developer bypasses: test-address sign-in and confirm-to-continue on
    /// backend failure.
    pub dev_mode: bool,
    /// Admit any contact the CRM knows, verified or not. When false, only
    /// verified contacts get in without the verification round-trip.
    pub trust_existing_contacts: bool,
    /// Skip the gate entirely and treat every visitor as admitted.
    pub bypass_auth: bool,
    /// Forms-submission transport, available when portal and form are set.
    pub forms: Option<FormsConfig>,
    /// Hosted shared-form URL for the fire-and-forget transport.
    pub hosted_form_url: Option<String>,
}

/// CRM form-submission endpoint binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormsConfig {
    /// CRM portal (account) identifier.
    pub portal_id: String,
    /// Identifier of the gateway signup form.
    pub form_id: String,
    /// Base URL of the form-submission API.
    pub submit_base: String,
}

impl GateConfig {
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

        let backend_url = get_valid_base_url("GATE_BACKEND_URL")?;
        let data_dir = PathBuf::from(get_env_or_default("GATE_DATA_DIR", DEFAULT_DATA_DIR));
        let api_timeout = Duration::from_secs(parse_env_or(
            "GATE_API_TIMEOUT_SECS",
            DEFAULT_API_TIMEOUT_SECS,
        )?);
        let stuck_check_delay = Duration::from_secs(parse_env_or(
            "GATE_STUCK_CHECK_SECS",
            DEFAULT_STUCK_CHECK_SECS,
        )?);
        let dev_mode = parse_bool_env("GATE_DEV_MODE", false)?;
        let trust_existing_contacts = parse_bool_env("GATE_TRUST_EXISTING_CONTACTS", true)?;
        let bypass_auth = parse_bool_env("GATE_BYPASS_AUTH", false)?;
        let forms = forms_from_env()?;
        let hosted_form_url = match get_optional_env("HUBSPOT_FORM_URL") {
            Some(raw) => Some(validate_url("HUBSPOT_FORM_URL", &raw)?),
            None => None,
        };

        Ok(Self {
            backend_url,
            data_dir,
            api_timeout,
            stuck_check_delay,
            dev_mode,
            trust_existing_contacts,
            bypass_auth,
            forms,
            hosted_form_url,
        })
    }
}

fn forms_from_env() -> Result<Option<FormsConfig>, ConfigError> {
    let portal_id = get_optional_env("HUBSPOT_PORTAL_ID");
    let form_id = get_optional_env("HUBSPOT_FORM_ID");
    match (portal_id, form_id) {
        (Some(portal_id), Some(form_id)) => Ok(Some(FormsConfig {
            portal_id,
            form_id,
            submit_base: get_env_or_default("HUBSPOT_FORMS_API_BASE", DEFAULT_FORMS_API_BASE)
                .trim_end_matches('/')
                .to_owned(),
        })),
        (None, None) => Ok(None),
        (Some(_), None) => Err(ConfigError::InvalidEnvVar(
            "HUBSPOT_FORM_ID".to_owned(),
            "HUBSPOT_PORTAL_ID is set but HUBSPOT_FORM_ID is not".to_owned(),
        )),
        (None, Some(_)) => Err(ConfigError::InvalidEnvVar(
            "HUBSPOT_PORTAL_ID".to_owned(),
            "HUBSPOT_FORM_ID is set but HUBSPOT_PORTAL_ID is not".to_owned(),
        )),
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

/// Get a required environment variable that must parse as an http(s) URL.
/// The value is normalized to have no trailing slash.
fn get_valid_base_url(key: &str) -> Result<String, ConfigError> {
    let raw = get_required_env(key)?;
    validate_url(key, &raw)
}

fn validate_url(key: &str, raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
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

/// Parse an optional boolean environment variable.
///
/// Accepts `1`/`true`/`yes`/`on` and `0`/`false`/`no`/`off`, case-insensitive.
fn parse_bool_env(key: &str, default: bool) -> Result<bool, ConfigError> {
    match get_optional_env(key) {
        Some(raw) => parse_bool(&raw)
            .ok_or_else(|| ConfigError::InvalidEnvVar(key.to_string(), format!("'{raw}' is not a boolean"))),
        None => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
