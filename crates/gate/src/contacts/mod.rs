//! HTTP client for the contact verification backend.
//!
//! The backend fronts the CRM for everything identity-related: contact
//! lookups, verification emails, and property updates. Lookups try the
//! CRM-backed endpoint first and fall back to the simpler email check when
//! it fails, and successful results are cached for an hour.

mod types;

pub use types::ContactRecord;

use std::time::Duration;

use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use stonebridge_core::Email;

use crate::store::ContactCacheStore;

use types::ResendResponse;

/// CRM-backed contact lookup.
const PRIMARY_LOOKUP_PATH: &str = "/check-hubspot-contact";
/// Plain email check, used when the primary lookup fails.
const FALLBACK_LOOKUP_PATH: &str = "/check-email";
const RESEND_PATH: &str = "/resend-verification";
const UPDATE_CONTACT_PATH: &str = "/update-contact";

/// Errors that can occur when talking to the verification backend.
#[derive(Debug, Error)]
pub enum ContactsError {
    /// HTTP request failed (connect, timeout, or body decode).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned a non-success status.
    #[error("Backend error: {status} - {body}")]
    Api { status: u16, body: String },
}

/// Client for the verification backend.
#[derive(Debug, Clone)]
pub struct ContactsClient {
    client: reqwest::Client,
    base_url: String,
    cache: ContactCacheStore,
}

impl ContactsClient {
    /// Create a new backend client.
    ///
    /// `base_url` must not end with a slash (the config layer normalizes
    /// this). Every request carries `timeout` as a hard deadline.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        cache: ContactCacheStore,
    ) -> Result<Self, ContactsError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            cache,
        })
    }

    /// Look up a contact by email.
    ///
    /// Consults the 1-hour cache first. On a miss, queries the primary
    /// lookup endpoint; any failure there (timeout, HTTP error, bad body)
    /// falls through to the fallback endpoint. Successful lookups are
    /// cached.
    ///
    /// # Errors
    ///
    /// Returns the fallback's error when both endpoints fail.
    pub async fn check_contact(&self, email: &Email) -> Result<ContactRecord, ContactsError> {
        if let Some(record) = self.cache.get(email).await {
            debug!(email = %email, "Contact lookup served from cache");
            return Ok(record);
        }

        let record = match self.lookup(PRIMARY_LOOKUP_PATH, email).await {
            Ok(record) => record,
            Err(e) => {
                warn!(email = %email, error = %e, "Primary contact lookup failed; trying fallback");
                self.lookup(FALLBACK_LOOKUP_PATH, email).await?
            }
        };

        if let Err(e) = self.cache.put(email, &record).await {
            warn!(error = %e, "Failed to cache contact lookup");
        }
        Ok(record)
    }

    /// Ask the backend to resend the verification email.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails; `Ok(false)` means the backend
    /// answered but declined.
    pub async fn resend_verification(&self, email: &Email) -> Result<bool, ContactsError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, RESEND_PATH))
            .json(&json!({ "email": email.as_str() }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ContactsError::Api {
                status: status.as_u16(),
                body: snippet(&body),
            });
        }

        let body: ResendResponse = response.json().await?;
        Ok(body.success)
    }

    /// Push contact properties to the CRM through the backend.
    ///
    /// # Errors
    ///
    /// Returns error on any non-2xx response.
    pub async fn update_contact(
        &self,
        email: &str,
        properties: &serde_json::Value,
    ) -> Result<(), ContactsError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, UPDATE_CONTACT_PATH))
            .json(&json!({ "email": email, "properties": properties }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ContactsError::Api {
                status: status.as_u16(),
                body: snippet(&body),
            });
        }
        Ok(())
    }

    async fn lookup(&self, path: &str, email: &Email) -> Result<ContactRecord, ContactsError> {
        let url = format!(
            "{}{}?email={}",
            self.base_url,
            path,
            urlencoding::encode(email.as_str())
        );
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ContactsError::Api {
                status: status.as_u16(),
                body: snippet(&body),
            });
        }

        Ok(response.json().await?)
    }
}

/// First part of a response body, for error messages and logs.
fn snippet(body: &str) -> String {
    body.chars().take(300).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_truncates() {
        let long = "x".repeat(1000);
        assert_eq!(snippet(&long).len(), 300);
        assert_eq!(snippet("short"), "short");
    }

    #[test]
    fn test_base_url_trailing_slash_normalized() {
        let cache = ContactCacheStore::new(&std::env::temp_dir());
        let client =
            ContactsClient::new("https://backend.example.com/", Duration::from_secs(5), cache)
                .unwrap();
        assert_eq!(client.base_url, "https://backend.example.com");
    }
}
