//! Direct API transport: the backend's contact-update endpoint.

use async_trait::async_trait;

use crate::contacts::ContactsClient;

use super::{ContactPayload, Transport, TransportError};

/// Preferred transport. Posts the full property map to the verification
/// backend, which writes it to the CRM server-side.
pub struct DirectApiTransport {
    contacts: ContactsClient,
}

impl DirectApiTransport {
    #[must_use]
    pub const fn new(contacts: ContactsClient) -> Self {
        Self { contacts }
    }
}

#[async_trait]
impl Transport for DirectApiTransport {
    fn name(&self) -> &'static str {
        "direct-api"
    }

    async fn attempt(&self, payload: &ContactPayload) -> Result<(), TransportError> {
        self.contacts
            .update_contact(&payload.email, &payload.properties())
            .await?;
        Ok(())
    }
}
