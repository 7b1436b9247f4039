//! Applies listing interactions to the profile and schedules CRM pushes.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use stonebridge_core::{Email, InterestEvent, InterestKind, ListingId};

use crate::app::InterestObserver;
use crate::classifier::classify;
use crate::models::Profile;
use crate::store::{ProfileStore, StoreError};
use crate::sync::SyncEngine;

/// Contact details an inquiry form collected.
///
/// `Some` fields overwrite what the profile already stores; `None` fields
/// leave the stored value alone. An anonymous visitor who types an email
/// into the form gets a profile created on the spot.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InquiryContact {
    pub email: Option<Email>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

impl InquiryContact {
    fn merge_into(&self, profile: &mut Profile) {
        if let Some(email) = &self.email {
            profile.email = Some(email.clone());
        }
        if let Some(first) = &self.first_name {
            profile.first_name.clone_from(first);
        }
        if let Some(last) = &self.last_name {
            profile.last_name.clone_from(last);
        }
        if let Some(phone) = &self.phone {
            profile.phone.clone_from(phone);
        }
    }
}

/// Records interaction events against the stored profile.
pub struct InterestRecorder {
    store: Arc<ProfileStore>,
    sync: Arc<SyncEngine>,
}

impl InterestRecorder {
    #[must_use]
    pub const fn new(store: Arc<ProfileStore>, sync: Arc<SyncEngine>) -> Self {
        Self { store, sync }
    }

    /// Record one interaction.
    ///
    /// Every kind except unfavoriting adds the listing title to the stored
    /// interest list, creating the profile when none exists; favoriting and
    /// comparing additionally store the listing's project. Unfavoriting
    /// removes the title but keeps the project. When the profile carries an
    /// email address the CRM push runs in the background; the returned
    /// event does not wait for it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` when persisting the updated profile fails. The
    /// event is not synced in that case.
    pub async fn record_interest(
        &self,
        listing_title: &str,
        listing_id: Option<ListingId>,
        kind: InterestKind,
    ) -> Result<InterestEvent, StoreError> {
        let (event, profile) = self.apply(listing_title, listing_id, kind).await?;
        if profile.email.is_some() {
            let sync = Arc::clone(&self.sync);
            let context = event.clone();
            tokio::spawn(async move {
                sync.sync_profile(&profile, Some(&context)).await;
            });
        }
        Ok(event)
    }

    /// Record one interaction and wait for the CRM push.
    ///
    /// Same persistence rules as [`Self::record_interest`], but the push is
    /// awaited and its outcome returned. Command-line drivers use this
    /// variant; a background push would race process exit there. The flag
    /// is `false` when no transport accepted the contact, or when the
    /// profile carries no email address to push under.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` when persisting the updated profile fails.
    pub async fn record_interest_synced(
        &self,
        listing_title: &str,
        listing_id: Option<ListingId>,
        kind: InterestKind,
    ) -> Result<(InterestEvent, bool), StoreError> {
        let (event, profile) = self.apply(listing_title, listing_id, kind).await?;
        if profile.email.is_none() {
            return Ok((event, false));
        }
        let accepted = self.sync.sync_profile(&profile, Some(&event)).await;
        Ok((event, accepted))
    }

    async fn apply(
        &self,
        listing_title: &str,
        listing_id: Option<ListingId>,
        kind: InterestKind,
    ) -> Result<(InterestEvent, Profile), StoreError> {
        let project = classify(listing_title);
        let event = InterestEvent::new(listing_title, listing_id, project, kind);
        debug!(kind = %kind, title = listing_title, project, "Recording interest");

        let profile = self
            .store
            .update(|p| {
                if kind == InterestKind::Unfavorite {
                    p.remove_listing(listing_title);
                } else {
                    p.add_listing(listing_title);
                    if kind.tracks_project() {
                        p.add_project(project);
                    }
                }
            })
            .await?;
        Ok((event, profile))
    }

    /// Record an inquiry submission, waiting for the CRM push to finish so
    /// the form can report the outcome.
    ///
    /// The form's contact fields are merged into the stored profile first
    /// (form values win over stored ones, and a profile is created when
    /// none exists), the listing title is appended to the interest list,
    /// and the merged profile is saved. `project_override` replaces the
    /// classified project in the pushed payload when the form carried an
    /// explicit project choice. Returns whether any transport accepted the
    /// contact; `false` when neither the form nor the stored profile
    /// supplied an email address.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` when persisting the merged profile fails.
    /// Nothing is pushed in that case.
    pub async fn record_inquiry(
        &self,
        listing_title: &str,
        listing_id: Option<ListingId>,
        contact: &InquiryContact,
        project_override: Option<&str>,
    ) -> Result<bool, StoreError> {
        let project = project_override.unwrap_or_else(|| classify(listing_title));
        let event = InterestEvent::new(listing_title, listing_id, project, InterestKind::Inquiry);
        debug!(title = listing_title, project, "Recording inquiry");

        let profile = self
            .store
            .update(|p| {
                contact.merge_into(p);
                p.add_listing(listing_title);
            })
            .await?;

        if profile.email.is_none() {
            debug!(title = listing_title, "Inquiry without an email address; nothing to push");
            return Ok(false);
        }
        Ok(self.sync.sync_profile(&profile, Some(&event)).await)
    }
}

/// The gate's subscription to application interest events.
///
/// Store failures are logged and swallowed here: a tracking failure must
/// never break the page interaction that raised it.
pub struct GateSubscription {
    recorder: Arc<InterestRecorder>,
}

impl GateSubscription {
    #[must_use]
    pub const fn new(recorder: Arc<InterestRecorder>) -> Self {
        Self { recorder }
    }
}

#[async_trait]
impl InterestObserver for GateSubscription {
    async fn favorite_toggled(&self, title: &str, id: Option<&ListingId>, now_favorite: bool) {
        let kind = if now_favorite {
            InterestKind::Favorite
        } else {
            InterestKind::Unfavorite
        };
        if let Err(e) = self.recorder.record_interest(title, id.cloned(), kind).await {
            warn!(error = %e, title, "Failed to record favorite toggle");
        }
    }

    async fn compare_toggled(&self, title: &str, id: Option<&ListingId>, added: bool) {
        if !added {
            return;
        }
        let result = self
            .recorder
            .record_interest(title, id.cloned(), InterestKind::Compare)
            .await;
        if let Err(e) = result {
            warn!(error = %e, title, "Failed to record comparison");
        }
    }

    async fn inquiry_clicked(&self, title: &str, id: Option<&ListingId>) {
        let result = self
            .recorder
            .record_interest(title, id.cloned(), InterestKind::InquiryClick)
            .await;
        if let Err(e) = result {
            warn!(error = %e, title, "Failed to record inquiry click");
        }
    }

    async fn inquiry_submitted(
        &self,
        title: &str,
        id: Option<&ListingId>,
        contact: &InquiryContact,
        project: Option<&str>,
    ) {
        let result = self
            .recorder
            .record_inquiry(title, id.cloned(), contact, project)
            .await;
        match result {
            Ok(true) => debug!(title, "Inquiry pushed to CRM"),
            Ok(false) => warn!(title, "Inquiry was not accepted by any transport"),
            Err(e) => warn!(error = %e, title, "Failed to record inquiry"),
        }
    }
}
