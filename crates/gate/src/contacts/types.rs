//! Wire types for the verification backend.

use serde::{Deserialize, Serialize};

/// Result of a contact lookup, as returned by both lookup endpoints.
///
/// The backend speaks camelCase; every field defaults so older backend
/// deployments that omit fields still parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactRecord {
    /// The CRM has a contact for this address.
    pub exists: bool,
    /// The contact completed email verification.
    pub verified: bool,
    /// A verification email is outstanding for this contact.
    pub needs_verification: bool,
    pub first_name: String,
    pub last_name: String,
    /// Lookup qualifier; `"uncertain"` means the backend could not reach
    /// the CRM definitively and `exists` is a guess.
    pub status: Option<String>,
}

impl ContactRecord {
    /// Whether the backend flagged this lookup as inconclusive.
    #[must_use]
    pub fn is_uncertain(&self) -> bool {
        self.status.as_deref() == Some("uncertain")
    }
}

/// Body of `POST /resend-verification` responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ResendResponse {
    #[serde(default)]
    pub success: bool,
}
