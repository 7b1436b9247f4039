//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ListingsConfig;
use crate::hubspot::{HubspotClient, HubspotError};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ListingsConfig,
    hubspot: HubspotClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the CRM client cannot be built.
    pub fn new(config: ListingsConfig) -> Result<Self, HubspotError> {
        let hubspot = HubspotClient::new(&config)?;
        Ok(Self {
            inner: Arc::new(AppStateInner { config, hubspot }),
        })
    }

    /// Get a reference to the proxy configuration.
    #[must_use]
    pub fn config(&self) -> &ListingsConfig {
        &self.inner.config
    }

    /// Get a reference to the CRM client.
    #[must_use]
    pub fn hubspot(&self) -> &HubspotClient {
        &self.inner.hubspot
    }
}
