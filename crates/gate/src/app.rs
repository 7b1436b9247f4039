//! Traits the embedding application implements.
//!
//! The gate never reaches into the listings page. The application hands the
//! gate a [`Notifier`] and a [`ListingsApp`] at construction, and reports
//! listing interactions through an [`InterestObserver`] registered with it
//! (see [`crate::recorder::GateSubscription`]). Defaults that log and do
//! nothing else are provided for headless use.

use async_trait::async_trait;
use tracing::{error, info, warn};

use stonebridge_core::ListingId;

use crate::recorder::InquiryContact;

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// User-facing messages and confirmations.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Show a notice to the visitor.
    fn notify(&self, level: NoticeLevel, message: &str);

    /// Ask a yes/no question and wait for the answer.
    async fn confirm(&self, message: &str) -> bool;
}

/// The listings surface the gate sits in front of.
pub trait ListingsApp: Send + Sync {
    /// Whether the listings view still looks stuck on its loading state.
    fn is_loading_stuck(&self) -> bool;

    /// Ask the application to reload the listings view.
    fn request_reload(&self);
}

/// Listing interactions reported by the application.
///
/// Registration replaces the old arrangement where the gate overwrote the
/// page's favorite and compare handlers in place.
#[async_trait]
pub trait InterestObserver: Send + Sync {
    /// A favorite toggle. `now_favorite` is the state after the toggle.
    async fn favorite_toggled(&self, title: &str, id: Option<&ListingId>, now_favorite: bool);

    /// A comparison toggle. Removals are not tracked.
    async fn compare_toggled(&self, title: &str, id: Option<&ListingId>, added: bool);

    /// An inquiry button was clicked. The form may never be submitted.
    async fn inquiry_clicked(&self, title: &str, id: Option<&ListingId>);

    /// An inquiry form was submitted, with the contact fields and project
    /// choice the form carried. Fire-and-forget; callers that need the
    /// sync outcome use
    /// [`InterestRecorder::record_inquiry`](crate::recorder::InterestRecorder::record_inquiry)
    /// directly.
    async fn inquiry_submitted(
        &self,
        title: &str,
        id: Option<&ListingId>,
        contact: &InquiryContact,
        project: Option<&str>,
    );
}

/// Notifier that writes notices to the log and declines every confirmation.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Info | NoticeLevel::Success => info!(notice = message),
            NoticeLevel::Error => error!(notice = message),
        }
    }

    async fn confirm(&self, message: &str) -> bool {
        warn!(prompt = message, "No confirmation surface attached; declining");
        false
    }
}

/// Listings surface that is never stuck and cannot reload.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdleListingsApp;

impl ListingsApp for IdleListingsApp {
    fn is_loading_stuck(&self) -> bool {
        false
    }

    fn request_reload(&self) {
        info!("Reload requested, but no listings surface is attached");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_notifier_declines_confirmations() {
        assert!(!LogNotifier.confirm("Proceed anyway?").await);
    }

    #[test]
    fn test_idle_app_is_never_stuck() {
        assert!(!IdleListingsApp.is_loading_stuck());
    }
}
