//! Listing title classification.
//!
//! Maps free-text listing titles ("Botanica Lot 12 - 350m² Corner Block")
//! onto the canonical development project names used in the CRM. Titles come
//! from several page templates and a decade of naming drift, so matching is
//! substring-based over a curated table rather than anything structural.

/// Project recorded when no table entry or compound rule matches.
pub const FALLBACK_PROJECT: &str = "General Enquiry";

/// Ordered substring table. Scanned top to bottom against the lowercased
/// title; the first hit wins, so more specific keys must sit above the
/// shorter keys they contain (e.g. `garfield` above `grange`).
const PROJECT_TABLE: &[(&str, &str)] = &[
    ("ashton gardens", "Ashton Gardens"),
    ("bloomfield", "Bloomfield"),
    ("botanica", "Botanica"),
    ("garfield", "Garfield Grange"),
    ("grange", "Garfield Grange"),
    ("one fairway", "One FairWay"),
    ("onefairway", "One FairWay"),
    ("fairway", "One FairWay"),
    ("paddington", "Paddington Estate"),
    ("park avenue", "Park Avenue"),
    ("parkave", "Park Avenue"),
    ("park ave ii", "Park Avenue II"),
    ("parkave2", "Park Avenue II"),
    ("river oaks", "River Oaks"),
    ("riviere", "Rivière"),
    ("the grace", "The Grace"),
    ("grace", "The Grace"),
    ("rouse hill", "The Rouse Hill Estate"),
    ("valley rise", "Valley Rise"),
    ("30-32 advance", "Advance St"),
    ("advance st", "Advance St"),
    ("ed.ave", "Ed.Ave (350 Edmondson Ave)"),
    ("edmondson", "Ed.Ave (350 Edmondson Ave)"),
    ("172 guntawong", "172 Guntawong Rd"),
    ("guntawong", "172 Guntawong Rd"),
    ("627 windsor", "627 Windsor Rd"),
    ("567 windsor", "567 Windsor Rd"),
    ("505-535 fifteenth", "505-535 Fifteenth Ave"),
    ("fifteenth ave", "505-535 Fifteenth Ave"),
    ("155 boyd", "155 Boyd St"),
    ("boyd st", "155 Boyd St"),
    ("castle luxe", "Castle Luxe"),
    ("luxe", "Castle Luxe"),
    // Legacy aliases from retired page templates
    ("coastal heights", "One FairWay"),
    ("ocean view", "One FairWay"),
    ("bay apartments", "Botanica"),
    ("harbourside", "Rivière"),
    ("sydney central", "The Grace"),
    ("city view", "The Grace"),
    ("sky tower", "Park Avenue"),
    ("the parkside", "Park Avenue II"),
    ("garden villas", "Garfield Grange"),
    ("metro apartments", "Bloomfield"),
    ("urban lofts", "Ashton Gardens"),
];

/// How a compound rule combines its two substring probes.
#[derive(Debug, Clone, Copy)]
enum Combine {
    /// Both substrings must be present.
    All,
    /// Either substring is enough.
    Any,
}

struct CompoundRule {
    first: &'static str,
    second: &'static str,
    combine: Combine,
    project: &'static str,
}

impl CompoundRule {
    fn matches(&self, lowered: &str) -> bool {
        match self.combine {
            Combine::All => lowered.contains(self.first) && lowered.contains(self.second),
            Combine::Any => lowered.contains(self.first) || lowered.contains(self.second),
        }
    }
}

/// Address-style titles that slip past the table: street numbers and street
/// names get reordered by the listing templates, so these match on the
/// pieces. Applied after the table, in order.
const COMPOUND_RULES: &[CompoundRule] = &[
    CompoundRule {
        first: "advance",
        second: "30",
        combine: Combine::All,
        project: "Advance St",
    },
    CompoundRule {
        first: "windsor",
        second: "627",
        combine: Combine::All,
        project: "627 Windsor Rd",
    },
    CompoundRule {
        first: "windsor",
        second: "567",
        combine: Combine::All,
        project: "567 Windsor Rd",
    },
    CompoundRule {
        first: "edmondson",
        second: "350",
        combine: Combine::Any,
        project: "Ed.Ave (350 Edmondson Ave)",
    },
    CompoundRule {
        first: "guntawong",
        second: "172",
        combine: Combine::Any,
        project: "172 Guntawong Rd",
    },
    CompoundRule {
        first: "fifteenth",
        second: "505",
        combine: Combine::Any,
        project: "505-535 Fifteenth Ave",
    },
    CompoundRule {
        first: "boyd",
        second: "155",
        combine: Combine::Any,
        project: "155 Boyd St",
    },
];

/// Classify a listing title into a canonical project name.
///
/// Pure and deterministic: lowercases the title, scans [`PROJECT_TABLE`] in
/// order (first match wins), then the compound address rules, and falls back
/// to [`FALLBACK_PROJECT`]. Never fails; the empty title classifies as the
/// fallback.
#[must_use]
pub fn classify(title: &str) -> &'static str {
    let lowered = title.to_lowercase();

    for (needle, project) in PROJECT_TABLE {
        if lowered.contains(needle) {
            return project;
        }
    }

    for rule in COMPOUND_RULES {
        if rule.matches(&lowered) {
            return rule.project;
        }
    }

    FALLBACK_PROJECT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_title_is_fallback() {
        assert_eq!(classify(""), FALLBACK_PROJECT);
        assert_eq!(classify("   "), FALLBACK_PROJECT);
    }

    #[test]
    fn test_unknown_title_is_fallback() {
        assert_eq!(classify("Completely Unrelated Villa"), FALLBACK_PROJECT);
    }

    #[test]
    fn test_deterministic() {
        let title = "Botanica Lot 12 - Corner Block";
        assert_eq!(classify(title), classify(title));
    }

    #[test]
    fn test_simple_match_case_insensitive() {
        assert_eq!(classify("BOTANICA Lot 12"), "Botanica");
        assert_eq!(classify("botanica lot 12"), "Botanica");
    }

    #[test]
    fn test_garfield_beats_grange() {
        // "Garfield Grange ..." must resolve via the earlier `garfield` key,
        // and plain "grange" titles land on the same project anyway.
        assert_eq!(classify("Garfield Grange Stage 3 Lot 45"), "Garfield Grange");
        assert_eq!(classify("The Grange Release"), "Garfield Grange");
    }

    #[test]
    fn test_table_order_shadows_later_keys() {
        // "parkave2" contains "parkave", which sits earlier in the table, so
        // order (not key length) decides.
        assert_eq!(classify("parkave2 release"), "Park Avenue");
        // The spaced spelling reaches its own entry.
        assert_eq!(classify("Park Ave II Tower"), "Park Avenue II");
    }

    #[test]
    fn test_every_entry_agrees_with_reference_scan() {
        // classify() must behave exactly like a first-match scan of the
        // table for titles built from each key.
        for (needle, _) in PROJECT_TABLE {
            let title = format!("Stage 9 {needle} display home");
            let lowered = title.to_lowercase();
            let expected = PROJECT_TABLE
                .iter()
                .find(|(key, _)| lowered.contains(key))
                .map(|(_, project)| *project)
                .unwrap_or(FALLBACK_PROJECT);
            assert_eq!(classify(&title), expected, "title: {title}");
        }
    }

    #[test]
    fn test_compound_all_requires_both() {
        // Neither "advance st" nor "30-32 advance" appear, so the table
        // misses and the AND rule decides.
        assert_eq!(classify("Lot 30 Advance Road"), "Advance St");
        assert_eq!(classify("Advance Road release"), FALLBACK_PROJECT);
    }

    #[test]
    fn test_compound_windsor_split_by_number() {
        assert_eq!(classify("Windsor Rd site no. 627"), "627 Windsor Rd");
        assert_eq!(classify("Windsor Rd site no. 567"), "567 Windsor Rd");
    }

    #[test]
    fn test_compound_any_fires_on_either() {
        // Number-only titles miss the table and land on the OR rules.
        assert_eq!(classify("350 development site"), "Ed.Ave (350 Edmondson Ave)");
        assert_eq!(classify("Site 172 coming soon"), "172 Guntawong Rd");
    }

    #[test]
    fn test_legacy_aliases() {
        assert_eq!(classify("Ocean View Apartments"), "One FairWay");
        assert_eq!(classify("Harbourside Penthouse"), "Rivière");
        assert_eq!(classify("Urban Lofts 2BR"), "Ashton Gardens");
    }
}
