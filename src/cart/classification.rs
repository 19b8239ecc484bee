//! Line Classification
//!
//! Department and poster detection is driven by a single ordered table. The first
//! entry whose signal matches decides the classification; lines matching nothing
//! are adult apparel.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Storefront department a cart line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Department {
    /// Adult apparel
    Adult,
    /// Youth apparel
    Youth,
    /// Posters and other non-apparel goods
    Homeware,
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Department::Adult => "adult",
            Department::Youth => "youth",
            Department::Homeware => "homeware",
        })
    }
}

/// Result of classifying a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Department of the line
    pub department: Department,

    /// Whether the line is a poster
    pub is_poster: bool,
}

impl Classification {
    /// Poster classification; posters always belong to homeware.
    pub const POSTER: Self = Self {
        department: Department::Homeware,
        is_poster: true,
    };

    /// Youth apparel classification.
    pub const YOUTH: Self = Self {
        department: Department::Youth,
        is_poster: false,
    };

    /// Adult apparel classification, used when no table entry matches.
    pub const ADULT: Self = Self {
        department: Department::Adult,
        is_poster: false,
    };
}

/// A signal read from a line's SKU or title.
#[derive(Debug, Clone, Copy)]
pub enum Signal {
    /// The upper-cased SKU contains any of these markers.
    SkuContains(&'static [&'static str]),

    /// The upper-cased SKU starts with any of these prefixes.
    SkuPrefix(&'static [&'static str]),

    /// The title contains any of these fragments, ignoring case.
    TitleContains(&'static [&'static str]),

    /// The title contains any of these whole words, ignoring case.
    TitleWord(&'static [&'static str]),
}

impl Signal {
    /// Check whether this signal is present for the given SKU and title.
    pub fn matches(&self, sku: &str, title: &str) -> bool {
        match self {
            Signal::SkuContains(markers) => {
                let sku = sku.to_ascii_uppercase();
                markers.iter().any(|marker| sku.contains(marker))
            }
            Signal::SkuPrefix(prefixes) => {
                let sku = sku.to_ascii_uppercase();
                prefixes.iter().any(|prefix| sku.starts_with(prefix))
            }
            Signal::TitleContains(fragments) => {
                let title = title.to_lowercase();
                fragments.iter().any(|fragment| title.contains(fragment))
            }
            Signal::TitleWord(words) => title
                .split(|c: char| !c.is_alphanumeric())
                .any(|token| words.iter().any(|word| token.eq_ignore_ascii_case(word))),
        }
    }
}

/// One entry of the classification table.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationRule {
    /// Signal that triggers this entry
    pub signal: Signal,

    /// Classification assigned when the signal matches
    pub classification: Classification,
}

/// Classification table, in priority order.
pub const CLASSIFICATION_TABLE: [ClassificationRule; 4] = [
    ClassificationRule {
        signal: Signal::SkuContains(&["POSTER", "PST"]),
        classification: Classification::POSTER,
    },
    ClassificationRule {
        signal: Signal::TitleContains(&["poster"]),
        classification: Classification::POSTER,
    },
    ClassificationRule {
        signal: Signal::SkuPrefix(&[
            "YTH-", "YTH_", "YOUTH-", "YOUTH_", "KID-", "KID_", "KIDS-", "KIDS_",
        ]),
        classification: Classification::YOUTH,
    },
    ClassificationRule {
        signal: Signal::TitleWord(&["youth", "kids"]),
        classification: Classification::YOUTH,
    },
];

/// Classify a line by its SKU and title using [`CLASSIFICATION_TABLE`].
pub fn classify(sku: &str, title: &str) -> Classification {
    CLASSIFICATION_TABLE
        .iter()
        .find(|rule| rule.signal.matches(sku, title))
        .map_or(Classification::ADULT, |rule| rule.classification)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poster_sku_marker_is_homeware() {
        assert_eq!(classify("POSTER-LEO-A3", "Leo Print"), Classification::POSTER);
        assert_eq!(classify("pst-ari", "Aries"), Classification::POSTER);
    }

    #[test]
    fn poster_title_is_homeware() {
        assert_eq!(
            classify("ART-TAU-01", "Taurus Constellation Poster"),
            Classification::POSTER
        );
    }

    #[test]
    fn poster_wins_over_youth_prefix() {
        assert_eq!(classify("YTH-POSTER-GEM", "Kids room"), Classification::POSTER);
    }

    #[test]
    fn youth_prefix_is_youth() {
        assert_eq!(classify("YTH-ARI-S", "Aries Tee"), Classification::YOUTH);
        assert_eq!(classify("kids_leo_m", "Leo Tee"), Classification::YOUTH);
    }

    #[test]
    fn youth_prefix_requires_separator() {
        // "KIDNEY" is not a youth prefix.
        assert_eq!(classify("KIDNEY-BEAN", "Bean Tee"), Classification::ADULT);
    }

    #[test]
    fn youth_title_word_is_youth() {
        assert_eq!(classify("TEE-VIR-S", "Virgo Youth Tee"), Classification::YOUTH);
        assert_eq!(classify("TEE-VIR-S", "Virgo Tee (Kids)"), Classification::YOUTH);
    }

    #[test]
    fn unmatched_line_is_adult() {
        assert_eq!(classify("TEE-SCO-L", "Scorpio Tee"), Classification::ADULT);
        assert_eq!(classify("", ""), Classification::ADULT);
    }

    #[test]
    fn table_order_is_poster_then_youth() {
        let departments: Vec<Department> = CLASSIFICATION_TABLE
            .iter()
            .map(|rule| rule.classification.department)
            .collect();

        assert_eq!(
            departments,
            vec![
                Department::Homeware,
                Department::Homeware,
                Department::Youth,
                Department::Youth,
            ]
        );
    }
}
