//! Hosted form transport: last resort in the cascade.
//!
//! Loads the CRM's hosted form page with the contact's values in the
//! query string, the way the website did from a hidden frame. There is no
//! way to observe whether the CRM accepted the submission, so dispatch
//! counts as success and the request itself runs in the background.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{ContactPayload, Transport, TransportError};

/// How long the background request is given before it is abandoned.
const DISPATCH_GRACE: Duration = Duration::from_secs(5);

/// Third and final transport in the cascade.
pub struct HostedFormTransport {
    client: reqwest::Client,
    url: Option<String>,
}

impl HostedFormTransport {
    /// `url` being `None` makes every attempt fail with `Unavailable`.
    #[must_use]
    pub const fn new(client: reqwest::Client, url: Option<String>) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl Transport for HostedFormTransport {
    fn name(&self) -> &'static str {
        "hosted-form"
    }

    async fn attempt(&self, payload: &ContactPayload) -> Result<(), TransportError> {
        let Some(url) = &self.url else {
            return Err(TransportError::Unavailable("hosted form URL not configured"));
        };

        let request = self
            .client
            .get(url)
            .query(&payload.form_values())
            .timeout(DISPATCH_GRACE);

        let email = payload.email.clone();
        tokio::spawn(async move {
            match request.send().await {
                Ok(response) => {
                    debug!(status = %response.status(), %email, "Hosted form request completed");
                }
                Err(err) => {
                    warn!(error = %err, %email, "Hosted form request failed");
                }
            }
        });

        // Success is unobservable here; dispatching is the best we can do.
        Ok(())
    }
}
