//! Visitor profile model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stonebridge_core::Email;
use uuid::Uuid;

/// Durable record for one visitor of the listings website.
///
/// Serialized as JSON into the profile slot. Every field defaults, so a
/// record written by an older deployment (or with fields missing) still
/// loads; a record that fails to parse at all is treated as absent by the
/// store, never as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Stable opaque identifier for this browser's profile.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// Set at signup/login; absent for visitors who never passed the gate.
    #[serde(default)]
    pub email: Option<Email>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    /// True only after the gate admits the visitor. Listing access is never
    /// granted while this is false.
    #[serde(default)]
    pub authenticated: bool,
    /// When the visitor last passed the gate.
    #[serde(default)]
    pub verification_date: Option<DateTime<Utc>>,
    /// Listing titles the visitor favorited. Insertion-ordered, no
    /// duplicates.
    #[serde(default)]
    pub listings_of_interest: Vec<String>,
    /// Canonical project names derived from favorites and comparisons.
    /// Insertion-ordered, no duplicates, and never pruned: removing a
    /// favorite keeps its project.
    #[serde(default)]
    pub projects_of_interest: Vec<String>,
    /// CRM-reported verification state from the last lookup.
    #[serde(default)]
    pub verified: Option<bool>,
    /// Opaque CRM-issued verification token.
    #[serde(default)]
    pub verification_token: Option<String>,
    /// CRM-reported flag that a verification email is outstanding.
    #[serde(default)]
    pub needs_verification: Option<bool>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            email: None,
            first_name: String::new(),
            last_name: String::new(),
            phone: String::new(),
            authenticated: false,
            verification_date: None,
            listings_of_interest: Vec::new(),
            projects_of_interest: Vec::new(),
            verified: None,
            verification_token: None,
            needs_verification: None,
        }
    }
}

impl Profile {
    /// Add a listing title to the interest list. Returns true if it was not
    /// already present.
    pub fn add_listing(&mut self, title: &str) -> bool {
        if self.listings_of_interest.iter().any(|t| t == title) {
            return false;
        }
        self.listings_of_interest.push(title.to_owned());
        true
    }

    /// Remove a listing title from the interest list. Returns true if it was
    /// present.
    pub fn remove_listing(&mut self, title: &str) -> bool {
        let before = self.listings_of_interest.len();
        self.listings_of_interest.retain(|t| t != title);
        self.listings_of_interest.len() != before
    }

    /// Add a project to the interest list. Returns true if it was not
    /// already present.
    pub fn add_project(&mut self, project: &str) -> bool {
        if self.projects_of_interest.iter().any(|p| p == project) {
            return false;
        }
        self.projects_of_interest.push(project.to_owned());
        true
    }

    /// "First Last", with whichever parts are present.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        name.trim().to_owned()
    }
}
