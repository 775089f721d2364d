// service/purpose.rs
use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical transaction intent of a listing.
///
/// Listings are written with free-text purposes ("For Sale", "rent", "BUY",
/// "commercial space", or nothing at all), so every value is folded into this
/// taxonomy both when it is stored and when it is read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalPurpose {
    ForSale,
    ForRent,
    Commercial,
    Project,
}

impl CanonicalPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalPurpose::ForSale => "ForSale",
            CanonicalPurpose::ForRent => "ForRent",
            CanonicalPurpose::Commercial => "Commercial",
            CanonicalPurpose::Project => "Project",
        }
    }
}

impl fmt::Display for CanonicalPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Folds a raw purpose into the canonical taxonomy.
///
/// Matching is a case-insensitive substring test, checked in priority order:
/// a blank purpose falls back to the title ("rent" or sale), then
/// rent > sale/buy > commercial > project, defaulting to sale.
pub fn normalize(raw_purpose: Option<&str>, title: &str) -> CanonicalPurpose {
    let purpose = match raw_purpose.map(str::trim).filter(|p| !p.is_empty()) {
        Some(p) => p.to_lowercase(),
        None => {
            return if title.to_lowercase().contains("rent") {
                CanonicalPurpose::ForRent
            } else {
                CanonicalPurpose::ForSale
            };
        }
    };

    if purpose.contains("rent") {
        CanonicalPurpose::ForRent
    } else if purpose.contains("sale") || purpose.contains("buy") {
        CanonicalPurpose::ForSale
    } else if purpose.contains("commercial") {
        CanonicalPurpose::Commercial
    } else if purpose.contains("project") {
        CanonicalPurpose::Project
    } else {
        CanonicalPurpose::ForSale
    }
}

/// Turns a purpose filter into `ILIKE` patterns for the keyword bucket it
/// names. "sale" and "buy" share a bucket; unknown keywords match themselves.
///
/// Returns `None` for a blank filter, meaning "no constraint".
pub fn purpose_filter_patterns(filter: Option<&str>) -> Option<Vec<String>> {
    let keyword = filter.map(str::trim).filter(|f| !f.is_empty())?.to_lowercase();

    let keywords: Vec<&str> = if keyword.contains("rent") {
        vec!["rent"]
    } else if keyword.contains("sale") || keyword.contains("buy") {
        vec!["sale", "buy"]
    } else if keyword.contains("commercial") {
        vec!["commercial"]
    } else if keyword.contains("project") {
        vec!["project"]
    } else {
        vec![keyword.as_str()]
    };

    Some(
        keywords
            .into_iter()
            .map(|k| format!("%{}%", escape_like(k)))
            .collect(),
    )
}

fn escape_like(keyword: &str) -> String {
    keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_purpose_uses_title() {
        assert_eq!(normalize(None, "2BHK for rent"), CanonicalPurpose::ForRent);
        assert_eq!(normalize(None, "2BHK flat"), CanonicalPurpose::ForSale);
        assert_eq!(normalize(Some("   "), "Studio for Rent"), CanonicalPurpose::ForRent);
        assert_eq!(normalize(Some(""), "Villa"), CanonicalPurpose::ForSale);
    }

    #[test]
    fn test_keyword_priority() {
        assert_eq!(normalize(Some("BUY"), "anything"), CanonicalPurpose::ForSale);
        assert_eq!(normalize(Some("For Sale"), "x"), CanonicalPurpose::ForSale);
        assert_eq!(normalize(Some("commercial space"), "x"), CanonicalPurpose::Commercial);
        assert_eq!(normalize(Some("New Project"), "x"), CanonicalPurpose::Project);
        // rent outranks everything else
        assert_eq!(normalize(Some("commercial rent"), "x"), CanonicalPurpose::ForRent);
        assert_eq!(normalize(Some("sale or project"), "x"), CanonicalPurpose::ForSale);
        assert_eq!(normalize(Some("lease"), "for rent"), CanonicalPurpose::ForSale);
    }

    #[test]
    fn test_title_ignored_when_purpose_present() {
        assert_eq!(normalize(Some("sale"), "Flat for rent"), CanonicalPurpose::ForSale);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            None,
            Some(""),
            Some("rent"),
            Some("For Sale"),
            Some("BUY"),
            Some("commercial space"),
            Some("project"),
            Some("lease"),
            Some("RENTAL"),
        ];
        for title in ["Studio for Rent", "2BHK flat", ""] {
            for raw in inputs {
                let once = normalize(raw, title);
                let twice = normalize(Some(once.as_str()), title);
                assert_eq!(once, twice, "raw={:?} title={:?}", raw, title);
            }
        }
    }

    #[test]
    fn test_filter_patterns() {
        assert_eq!(purpose_filter_patterns(None), None);
        assert_eq!(purpose_filter_patterns(Some("  ")), None);
        assert_eq!(
            purpose_filter_patterns(Some("Buy")),
            Some(vec!["%sale%".to_string(), "%buy%".to_string()])
        );
        assert_eq!(
            purpose_filter_patterns(Some("ForRent")),
            Some(vec!["%rent%".to_string()])
        );
        assert_eq!(
            purpose_filter_patterns(Some("Commercial")),
            Some(vec!["%commercial%".to_string()])
        );
        assert_eq!(
            purpose_filter_patterns(Some("50%_off")),
            Some(vec!["%50\\%\\_off%".to_string()])
        );
    }

    #[test]
    fn test_display_matches_storage_form() {
        assert_eq!(CanonicalPurpose::ForRent.to_string(), "ForRent");
        assert_eq!(
            serde_json::to_string(&CanonicalPurpose::Commercial).unwrap(),
            "\"Commercial\""
        );
    }
}
