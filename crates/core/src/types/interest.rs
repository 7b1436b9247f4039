//! Interest interaction events.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::ListingId;

/// The kind of listing interaction a visitor performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestKind {
    /// Listing added to the visitor's favorites.
    Favorite,
    /// Listing removed from the visitor's favorites.
    Unfavorite,
    /// Listing added to a side-by-side comparison.
    Compare,
    /// An inquiry form was submitted for the listing.
    Inquiry,
    /// An inquiry button was clicked (form not necessarily submitted).
    InquiryClick,
}

impl InterestKind {
    /// Wire/name form, matching the serde representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Favorite => "favorite",
            Self::Unfavorite => "unfavorite",
            Self::Compare => "compare",
            Self::Inquiry => "inquiry",
            Self::InquiryClick => "inquiry_click",
        }
    }

    /// Whether this kind records interest in the project behind the listing.
    /// Favorites and comparisons do; inquiry kinds record the listing title
    /// only.
    #[must_use]
    pub const fn tracks_project(self) -> bool {
        matches!(self, Self::Favorite | Self::Compare)
    }
}

impl fmt::Display for InterestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded listing interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestEvent {
    /// Listing title exactly as displayed to the visitor.
    pub listing_title: String,
    /// CRM object id of the listing, when the page knows it.
    pub listing_id: Option<ListingId>,
    /// Canonical project name derived from the title.
    pub project: String,
    /// What the visitor did.
    pub kind: InterestKind,
    /// When the event was recorded.
    pub timestamp: DateTime<Utc>,
}

impl InterestEvent {
    /// Build an event stamped with the current time.
    #[must_use]
    pub fn new(
        listing_title: impl Into<String>,
        listing_id: Option<ListingId>,
        project: impl Into<String>,
        kind: InterestKind,
    ) -> Self {
        Self {
            listing_title: listing_title.into(),
            listing_id,
            project: project.into(),
            kind,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serde_names() {
        assert_eq!(
            serde_json::to_string(&InterestKind::InquiryClick).unwrap(),
            "\"inquiry_click\""
        );
        let kind: InterestKind = serde_json::from_str("\"unfavorite\"").unwrap();
        assert_eq!(kind, InterestKind::Unfavorite);
    }

    #[test]
    fn test_kind_as_str_matches_serde() {
        for kind in [
            InterestKind::Favorite,
            InterestKind::Unfavorite,
            InterestKind::Compare,
            InterestKind::Inquiry,
            InterestKind::InquiryClick,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_tracks_project() {
        assert!(InterestKind::Favorite.tracks_project());
        assert!(InterestKind::Compare.tracks_project());
        assert!(!InterestKind::Unfavorite.tracks_project());
        assert!(!InterestKind::Inquiry.tracks_project());
        assert!(!InterestKind::InquiryClick.tracks_project());
    }

    #[test]
    fn test_event_new() {
        let event = InterestEvent::new(
            "Botanica Lot 12",
            Some(ListingId::new("42")),
            "Botanica",
            InterestKind::Favorite,
        );
        assert_eq!(event.listing_title, "Botanica Lot 12");
        assert_eq!(event.project, "Botanica");
        assert_eq!(event.kind, InterestKind::Favorite);
    }
}
