//! Forms API transport: submit through the CRM's public form endpoint.
//!
//! Replaces the embedded forms widget the website used to carry. The
//! observable behavior is kept: a short settle delay before submitting
//! (the widget needed one between "ready" and a reliable submit), and only
//! the fields the signup form actually defines are sent.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::config::FormsConfig;

use super::{ContactPayload, Transport, TransportError};

/// Settle time between building the submission and sending it.
const SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Field names defined on the gateway signup form. Values for anything
/// else would be rejected by the CRM, so they are filtered out up front.
const FORM_FIELDS: &[&str] = &[
    "email",
    "firstname",
    "lastname",
    "phone",
    "sb_listings_of_interest",
];

/// Submission context sent alongside the fields.
const PAGE_URI: &str = "https://stonebridge.estate/listings";
const PAGE_NAME: &str = "Property Listings";

/// Second transport in the cascade.
pub struct FormsApiTransport {
    client: reqwest::Client,
    config: Option<FormsConfig>,
}

impl FormsApiTransport {
    /// `config` being `None` makes every attempt fail with `Unavailable`,
    /// which sends the cascade on to the next transport.
    #[must_use]
    pub const fn new(client: reqwest::Client, config: Option<FormsConfig>) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl Transport for FormsApiTransport {
    fn name(&self) -> &'static str {
        "forms-api"
    }

    async fn attempt(&self, payload: &ContactPayload) -> Result<(), TransportError> {
        let Some(config) = &self.config else {
            return Err(TransportError::Unavailable("forms portal/form not configured"));
        };

        tokio::time::sleep(SETTLE_DELAY).await;

        let fields = form_fields(payload);
        debug!(form_id = %config.form_id, field_count = fields.len(), "Submitting CRM form");

        let url = format!(
            "{}/submissions/v3/integration/submit/{}/{}",
            config.submit_base, config.portal_id, config.form_id
        );
        let response = self
            .client
            .post(url)
            .json(&json!({
                "fields": fields,
                "context": {
                    "pageUri": PAGE_URI,
                    "pageName": PAGE_NAME,
                },
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Api {
                status: status.as_u16(),
                body: body.chars().take(300).collect(),
            });
        }
        Ok(())
    }
}

/// The payload's values, restricted to fields the form defines.
fn form_fields(payload: &ContactPayload) -> Vec<serde_json::Value> {
    payload
        .form_values()
        .into_iter()
        .filter(|(name, _)| FORM_FIELDS.contains(name))
        .map(|(name, value)| json!({ "name": name, "value": value }))
        .collect()
}
