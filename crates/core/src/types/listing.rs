//! Listing records and statuses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Sale status of a listing, as modelled in the CRM.
///
/// The website only ever shows listings in one of these states; everything
/// else (sold, settled, withdrawn, draft) is filtered out at the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Exclusive,
    Available,
    UnderOffer,
    Hold,
}

impl ListingStatus {
    /// Every status the website is allowed to display, in filter order.
    pub const INCLUDED: [Self; 4] = [Self::Exclusive, Self::Available, Self::UnderOffer, Self::Hold];

    /// The raw CRM property value, including the `sb_` namespace prefix.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Exclusive => "sb_exclusive",
            Self::Available => "sb_available",
            Self::UnderOffer => "sb_under_offer",
            Self::Hold => "sb_hold",
        }
    }

    /// The status without the namespace prefix.
    #[must_use]
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::Exclusive => "exclusive",
            Self::Available => "available",
            Self::UnderOffer => "under_offer",
            Self::Hold => "hold",
        }
    }

    /// Match a status value regardless of prefix, case, or whether
    /// underscores were turned into spaces by display formatting.
    #[must_use]
    pub fn matches_value(self, value: &str) -> bool {
        let normalized = value
            .trim()
            .to_lowercase()
            .replace([' ', '-'], "_");
        let normalized = normalized.strip_prefix("sb_").unwrap_or(&normalized);
        normalized == self.short_name()
    }
}

/// One listing as served to the website: the CRM object id plus a flat map
/// of display-ready property values. Values stay strings end-to-end; null
/// CRM values are preserved as null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub id: String,
    pub properties: BTreeMap<String, Option<String>>,
}

impl ListingRecord {
    /// Property value lookup, treating null and missing alike.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Option::as_deref)
    }

    /// The listing's status property, if present.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.property("status")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_carry_prefix() {
        for status in ListingStatus::INCLUDED {
            assert!(status.wire_name().starts_with("sb_"));
            assert!(status.wire_name().ends_with(status.short_name()));
        }
    }

    #[test]
    fn test_matches_value_forms() {
        assert!(ListingStatus::UnderOffer.matches_value("sb_under_offer"));
        assert!(ListingStatus::UnderOffer.matches_value("under_offer"));
        assert!(ListingStatus::UnderOffer.matches_value("Under Offer"));
        assert!(ListingStatus::UnderOffer.matches_value("UNDER-OFFER"));
        assert!(!ListingStatus::UnderOffer.matches_value("available"));
    }

    #[test]
    fn test_record_property_lookup() {
        let mut properties = BTreeMap::new();
        properties.insert("status".to_owned(), Some("Available".to_owned()));
        properties.insert("frontage".to_owned(), None);
        let record = ListingRecord {
            id: "101".to_owned(),
            properties,
        };

        assert_eq!(record.status(), Some("Available"));
        assert_eq!(record.property("frontage"), None);
        assert_eq!(record.property("missing"), None);
    }
}
