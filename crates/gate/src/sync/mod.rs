//! CRM contact synchronization.
//!
//! One payload, several ways to deliver it. Transports are tried in order
//! and the first success wins:
//!
//! 1. [`DirectApiTransport`] - contact-update endpoint on the backend
//! 2. [`FormsApiTransport`] - CRM form-submission API (the embedded
//!    widget's path, minus the widget)
//! 3. [`HostedFormTransport`] - fire-and-forget ping of the hosted form
//!
//! A transport failure is logged and the cascade moves on; all transports
//! failing is reported to the caller as `false`, never as an error, because
//! nothing in the visitor flow depends on the CRM hearing about it.

mod direct;
mod forms;
mod hosted;
mod payload;

pub use direct::DirectApiTransport;
pub use forms::FormsApiTransport;
pub use hosted::HostedFormTransport;
pub use payload::ContactPayload;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use stonebridge_core::InterestEvent;

use crate::config::GateConfig;
use crate::contacts::{ContactsClient, ContactsError};
use crate::models::Profile;

/// Why a single transport attempt failed.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed (connect, timeout, or body decode).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// CRM endpoint returned a non-success status.
    #[error("CRM error: {status} - {body}")]
    Api { status: u16, body: String },

    /// The verification backend rejected the call.
    #[error("Backend error: {0}")]
    Backend(#[from] ContactsError),

    /// The transport is not configured in this deployment.
    #[error("Transport unavailable: {0}")]
    Unavailable(&'static str),
}

/// One way of delivering a [`ContactPayload`] to the CRM.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Try to deliver the payload. An `Err` sends the cascade to the next
    /// transport.
    async fn attempt(&self, payload: &ContactPayload) -> Result<(), TransportError>;
}

/// Ordered transport cascade.
pub struct SyncEngine {
    transports: Vec<Box<dyn Transport>>,
}

impl SyncEngine {
    /// Build an engine over an explicit transport list. Order is delivery
    /// preference.
    #[must_use]
    pub fn new(transports: Vec<Box<dyn Transport>>) -> Self {
        Self { transports }
    }

    /// Build the standard three-transport cascade for a deployment.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client for the CRM transports fails to
    /// build.
    pub fn from_config(
        config: &GateConfig,
        contacts: ContactsClient,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.api_timeout)
            .build()?;
        Ok(Self::new(vec![
            Box::new(DirectApiTransport::new(contacts)),
            Box::new(FormsApiTransport::new(client.clone(), config.forms.clone())),
            Box::new(HostedFormTransport::new(
                client,
                config.hosted_form_url.clone(),
            )),
        ]))
    }

    /// Sync a profile, optionally enriched with an inquiry event.
    ///
    /// Returns false without attempting any transport when the profile has
    /// no email.
    pub async fn sync_profile(&self, profile: &Profile, context: Option<&InterestEvent>) -> bool {
        let Some(payload) = ContactPayload::from_profile(profile, context) else {
            debug!("Skipping CRM sync: profile has no email");
            return false;
        };
        self.sync(&payload).await
    }

    /// Run the cascade. True iff some transport delivered the payload.
    pub async fn sync(&self, payload: &ContactPayload) -> bool {
        for transport in &self.transports {
            match transport.attempt(payload).await {
                Ok(()) => {
                    info!(
                        transport = transport.name(),
                        email = %payload.email,
                        "Contact synced to CRM"
                    );
                    return true;
                }
                Err(e) => {
                    warn!(
                        transport = transport.name(),
                        error = %e,
                        "CRM transport failed; trying next"
                    );
                }
            }
        }
        warn!(email = %payload.email, "All CRM transports failed");
        false
    }
}
