//! Spread names to canonical spread ids

use super::matcher::KeywordTable;

pub const DEFAULT_SPREAD_ID: &str = "three-card";

/// Keyword table for spread names, in match priority order
pub const SPREAD_KEYWORDS: KeywordTable = KeywordTable::new(&[
    ("켈틱", "celtic-cross"),
    ("celtic", "celtic-cross"),
    ("10장", "celtic-cross"),
    ("관계", "relationship"),
    ("relationship", "relationship"),
    ("궁합", "relationship"),
    ("예/아니오", "yes-no"),
    ("예스", "yes-no"),
    ("yes", "yes-no"),
    ("원카드", "single-card"),
    ("원 카드", "single-card"),
    ("1장", "single-card"),
    ("한 장", "single-card"),
    ("한장", "single-card"),
    ("one card", "single-card"),
    ("one-card", "single-card"),
    ("single", "single-card"),
    ("5장", "five-card"),
    ("다섯", "five-card"),
    ("five", "five-card"),
    ("3장", "three-card"),
    ("세 장", "three-card"),
    ("세장", "three-card"),
    ("three", "three-card"),
    ("과거", "three-card"),
]);

/// Canonical spread id for a free-form spread name
pub fn extract_spread_type(spread_name: &str) -> &'static str {
    SPREAD_KEYWORDS
        .find_contained(spread_name)
        .unwrap_or(DEFAULT_SPREAD_ID)
}

/// Every known spread id, in table order
pub fn spread_ids() -> Vec<&'static str> {
    SPREAD_KEYWORDS.ids()
}
