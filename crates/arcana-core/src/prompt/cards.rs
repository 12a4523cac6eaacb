//! Card listings to canonical card ids
//!
//! A listing is free text with one card per line:
//!
//! ```text
//! 1. 과거: The Fool (정방향)
//! 2. Ace of Cups (역방향)
//! - 현재: 여황제 (reversed)
//! ```
//!
//! Lines that do not look like `name (orientation)` or whose name is not a
//! known card are skipped.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{CardDraw, Orientation};

/// Major Arcana ids with every accepted name, lower-case, without a leading "the"
const MAJOR_ARCANA: &[(&str, &[&str])] = &[
    ("0-fool", &["fool", "바보"]),
    ("1-magician", &["magician", "마법사"]),
    ("2-high-priestess", &["high priestess", "여사제", "여교황"]),
    ("3-empress", &["empress", "여황제"]),
    ("4-emperor", &["emperor", "황제"]),
    ("5-hierophant", &["hierophant", "교황"]),
    ("6-lovers", &["lovers", "연인", "연인들"]),
    ("7-chariot", &["chariot", "전차"]),
    ("8-strength", &["strength", "힘"]),
    ("9-hermit", &["hermit", "은둔자"]),
    ("10-wheel-of-fortune", &["wheel of fortune", "운명의 수레바퀴"]),
    ("11-justice", &["justice", "정의"]),
    ("12-hanged-man", &["hanged man", "매달린 사람"]),
    ("13-death", &["death", "죽음"]),
    ("14-temperance", &["temperance", "절제"]),
    ("15-devil", &["devil", "악마"]),
    ("16-tower", &["tower", "탑"]),
    ("17-star", &["star", "별"]),
    ("18-moon", &["moon", "달"]),
    ("19-sun", &["sun", "태양"]),
    ("20-judgement", &["judgement", "judgment", "심판"]),
    ("21-world", &["world", "세계"]),
];

/// Optional numbering or bullet, then `label (orientation)`
static CARD_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:\d+\s*[.)]\s*|[-*•·]\s*)?([^\(\[]+?)\s*[\(\[]([^\)\]]*)[\)\]]")
        .expect("card line pattern is valid")
});

/// `<rank> of <suit>`; any deck's ranks and suits
static MINOR_ARCANA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\w+) of (\w+)$").expect("minor arcana pattern is valid")
});

fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Canonical id for a card name, or `None` if it is not a card we know
///
/// Major Arcana names map to their numbered ids. Anything shaped like
/// `<rank> of <suit>` becomes `rank-of-suit`, lower-cased as written.
///
/// ```
/// use arcana_core::prompt::card_id_for_name;
///
/// assert_eq!(card_id_for_name("The Hanged Man").as_deref(), Some("12-hanged-man"));
/// assert_eq!(card_id_for_name("7 of Swords").as_deref(), Some("7-of-swords"));
/// assert_eq!(card_id_for_name("Princess of Disks").as_deref(), Some("princess-of-disks"));
/// ```
pub fn card_id_for_name(name: &str) -> Option<String> {
    let normalized = normalize(name);
    let bare = normalized.strip_prefix("the ").unwrap_or(&normalized);

    if let Some((id, _)) = MAJOR_ARCANA.iter().find(|(_, names)| names.contains(&bare)) {
        return Some(id.to_string());
    }

    let captures = MINOR_ARCANA.captures(bare)?;
    let rank = captures.get(1)?.as_str();
    let suit = captures.get(2)?.as_str();
    Some(format!("{}-of-{}", rank, suit))
}

fn parse_line(line: &str) -> Option<CardDraw> {
    let captures = CARD_LINE.captures(line)?;
    let label = captures.get(1)?.as_str().trim();
    let orientation = Orientation::parse(captures.get(2)?.as_str());

    let (position, name) = match label.rfind(|c: char| c == ':' || c == '：') {
        Some(idx) => {
            let separator_len = label[idx..].chars().next().map(char::len_utf8).unwrap_or(1);
            let position = label[..idx].trim();
            let name = label[idx + separator_len..].trim();
            ((!position.is_empty()).then(|| position.to_string()), name)
        }
        None => (None, label),
    };

    let card_id = card_id_for_name(name)?;
    Some(CardDraw {
        card_id,
        name: name.to_string(),
        position,
        orientation,
    })
}

/// Every recognised card in a listing, in listing order
pub fn extract_card_draws(card_text: &str) -> Vec<CardDraw> {
    card_text.lines().filter_map(parse_line).collect()
}

/// Card ids of every recognised card in a listing, in listing order
pub fn extract_card_ids(card_text: &str) -> Vec<String> {
    extract_card_draws(card_text)
        .into_iter()
        .map(|draw| draw.card_id)
        .collect()
}
