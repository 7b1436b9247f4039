//! The contact payload pushed to the CRM.

use serde_json::{Value, json};
use stonebridge_core::InterestEvent;

use crate::models::Profile;

/// Contact identity and interest data flattened for one sync attempt.
///
/// Every transport renders the same payload its own way: the direct API
/// sends the full property map, the forms transport only the fields the
/// signup form defines, the hosted form nothing at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactPayload {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub listings_of_interest: Vec<String>,
    pub projects_of_interest: Vec<String>,
    pub verified: bool,
    pub verification_token: Option<String>,
    pub needs_verification: bool,
}

impl ContactPayload {
    /// Build a payload from the stored profile.
    ///
    /// Returns `None` when the profile has no email: there is nothing to
    /// key the CRM record on, so no transport should run. An inquiry
    /// context contributes its listing and project to the payload without
    /// touching the stored lists.
    #[must_use]
    pub fn from_profile(profile: &Profile, context: Option<&InterestEvent>) -> Option<Self> {
        let email = profile.email.as_ref()?.as_str().to_owned();

        let mut listings = profile.listings_of_interest.clone();
        let mut projects = profile.projects_of_interest.clone();
        if let Some(event) = context {
            if !event.listing_title.is_empty() && !listings.contains(&event.listing_title) {
                listings.push(event.listing_title.clone());
            }
            if !event.project.is_empty() && !projects.contains(&event.project) {
                projects.push(event.project.clone());
            }
        }

        Some(Self {
            email,
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            phone: profile.phone.clone(),
            listings_of_interest: listings,
            projects_of_interest: projects,
            verified: profile.verified.unwrap_or(false),
            verification_token: profile.verification_token.clone(),
            needs_verification: profile.needs_verification.unwrap_or(false),
        })
    }

    /// CRM property map for the contact-update endpoint.
    ///
    /// Identity fields are omitted when empty so a provisional login (no
    /// names known) cannot blank out what the CRM already has.
    #[must_use]
    pub fn properties(&self) -> Value {
        let mut props = serde_json::Map::new();
        if !self.first_name.is_empty() {
            props.insert("firstname".to_owned(), json!(self.first_name));
        }
        if !self.last_name.is_empty() {
            props.insert("lastname".to_owned(), json!(self.last_name));
        }
        if !self.phone.is_empty() {
            props.insert("phone".to_owned(), json!(self.phone));
        }
        props.insert(
            "sb_listings_of_interest".to_owned(),
            json!(self.listings_of_interest.join("\n")),
        );
        props.insert(
            "all_projects_of_interest".to_owned(),
            json!(self.projects_of_interest),
        );
        props.insert(
            "sb_verified".to_owned(),
            json!(if self.verified { "Yes" } else { "No" }),
        );
        if let Some(token) = &self.verification_token
            && !token.is_empty()
        {
            props.insert("sb_verification_token".to_owned(), json!(token));
        }
        if self.needs_verification {
            props.insert("sb_needs_verification".to_owned(), json!("Yes"));
        }
        Value::Object(props)
    }

    /// Candidate form field values as (name, value) pairs. The forms
    /// transport filters these against the fields its form defines.
    #[must_use]
    pub fn form_values(&self) -> Vec<(&'static str, String)> {
        let mut values = vec![("email", self.email.clone())];
        if !self.first_name.is_empty() {
            values.push(("firstname", self.first_name.clone()));
        }
        if !self.last_name.is_empty() {
            values.push(("lastname", self.last_name.clone()));
        }
        if !self.phone.is_empty() {
            values.push(("phone", self.phone.clone()));
        }
        if !self.listings_of_interest.is_empty() {
            values.push((
                "sb_listings_of_interest",
                self.listings_of_interest.join("\n"),
            ));
        }
        values
    }
}
