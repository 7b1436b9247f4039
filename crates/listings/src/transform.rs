//! Display transformation for raw CRM listing records.
//!
//! The CRM stores listing properties under an `sb_` namespace with
//! machine-shaped values (`sb_under_offer`, `single_storey`). The website
//! wants plain keys and human-readable values, so every record passes
//! through here before it leaves the proxy:
//!
//! - `sb_`-prefixed keys lose the prefix, and their string values are
//!   title-cased (split on underscores, hyphens, whitespace) unless the
//!   value is purely numeric, which passes through untouched.
//! - Properties outside the namespace (`name`, `hs_*`, `createdate`) are
//!   kept exactly as the CRM sent them.
//! - Null values stay null.
//!
//! The status re-check and the land-focused sort also live here since both
//! operate on the transformed shape.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use stonebridge_core::{ListingRecord, ListingStatus};

/// Values that are purely numeric are never title-cased.
static NUMERIC_VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(\.\d+)?$").expect("Invalid regex"));

const NAMESPACE_PREFIX: &str = "sb_";

/// Transform one raw property map into its display shape.
#[must_use]
pub fn transform_properties(
    raw: BTreeMap<String, Option<String>>,
) -> BTreeMap<String, Option<String>> {
    raw.into_iter()
        .map(|(key, value)| match key.strip_prefix(NAMESPACE_PREFIX) {
            Some(stripped) => (stripped.to_owned(), value.map(|v| format_value(&v))),
            None => (key, value),
        })
        .collect()
}

/// Drop every record whose status is missing or outside the allow-list.
///
/// The CRM-side filter should already guarantee this, but display
/// formatting has mangled status casing before ("Under Offer" vs
/// `sb_under_offer`), so the check is repeated on the transformed shape
/// with normalization on both sides.
pub fn retain_included(records: &mut Vec<ListingRecord>) {
    records.retain(|record| {
        record.status().is_some_and(|status| {
            ListingStatus::INCLUDED
                .iter()
                .any(|included| included.matches_value(status))
        })
    });
}

/// Sort listings for the land-focused default view: available first, then
/// records with a frontage, then records with a lot size, then land-only
/// listings, and finally by frontage descending. Missing or non-numeric
/// values rank as zero.
pub fn sort_listings(records: &mut [ListingRecord]) {
    records.sort_by(compare_listings);
}

fn compare_listings(a: &ListingRecord, b: &ListingRecord) -> Ordering {
    let by_available = is_available(b).cmp(&is_available(a));
    if by_available != Ordering::Equal {
        return by_available;
    }

    let frontage_a = numeric_property(a, "frontage");
    let frontage_b = numeric_property(b, "frontage");
    let by_has_frontage = (frontage_b > 0.0).cmp(&(frontage_a > 0.0));
    if by_has_frontage != Ordering::Equal {
        return by_has_frontage;
    }

    let by_has_lot_size =
        (numeric_property(b, "hs_lot_size") > 0.0).cmp(&(numeric_property(a, "hs_lot_size") > 0.0));
    if by_has_lot_size != Ordering::Equal {
        return by_has_lot_size;
    }

    let by_land_only = is_land_only(b).cmp(&is_land_only(a));
    if by_land_only != Ordering::Equal {
        return by_land_only;
    }

    frontage_b.total_cmp(&frontage_a)
}

fn is_available(record: &ListingRecord) -> bool {
    record
        .status()
        .is_some_and(|status| ListingStatus::Available.matches_value(status))
}

fn is_land_only(record: &ListingRecord) -> bool {
    record
        .property("hs_listing_type")
        .is_some_and(|value| value.to_lowercase().contains("land"))
}

fn numeric_property(record: &ListingRecord, key: &str) -> f64 {
    record
        .property(key)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0.0)
}

fn format_value(value: &str) -> String {
    if NUMERIC_VALUE_RE.is_match(value) {
        return value.to_owned();
    }
    title_case(value)
}

fn title_case(value: &str) -> String {
    value
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
    })
}
