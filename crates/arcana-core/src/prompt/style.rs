//! Reading-style directives embedded in questions

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::matcher::KeywordTable;

/// Style used when a question names none, or names one we do not know
pub const DEFAULT_STYLE_ID: &str = "traditional-rws";

/// Keyword table for style names, in match priority order
pub const STYLE_KEYWORDS: KeywordTable = KeywordTable::new(&[
    ("전통", "traditional-rws"),
    ("traditional", "traditional-rws"),
    ("rws", "traditional-rws"),
    ("라이더", "traditional-rws"),
    ("웨이트", "traditional-rws"),
    ("심리", "psychological-jungian"),
    ("psycholog", "psychological-jungian"),
    ("융", "psychological-jungian"),
    ("jung", "psychological-jungian"),
    ("토트", "thoth-crowley"),
    ("thoth", "thoth-crowley"),
    ("크로울리", "thoth-crowley"),
    ("crowley", "thoth-crowley"),
    ("뉴에이지", "new-age"),
    ("new age", "new-age"),
    ("new-age", "new-age"),
    ("영적", "spiritual-growth"),
    ("영성", "spiritual-growth"),
    ("spiritual", "spiritual-growth"),
    ("실용", "practical-advice"),
    ("현실", "practical-advice"),
    ("practical", "practical-advice"),
]);

const STYLE_NAMES: &[(&str, &str)] = &[
    ("traditional-rws", "전통 라이더-웨이트"),
    ("psychological-jungian", "심리학적 (융)"),
    ("thoth-crowley", "토트 (크로울리)"),
    ("new-age", "뉴에이지"),
    ("spiritual-growth", "영적 성장"),
    ("practical-advice", "실용적 조언"),
];

/// `(스타일: X)`, `[style: X]` and the like, full-width colon included
static DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[\(\[]\s*(?:스타일|style)\s*[:：]\s*([^\)\]]*?)\s*[\)\]]")
        .expect("style directive pattern is valid")
});

/// Display name of a style id, if it is one we know
pub fn style_name(style_id: &str) -> Option<&'static str> {
    STYLE_NAMES
        .iter()
        .find(|(id, _)| *id == style_id)
        .map(|(_, name)| *name)
}

/// Every known style id, default first
pub fn style_ids() -> Vec<&'static str> {
    STYLE_KEYWORDS.ids()
}

/// Outcome of reading a question for a style directive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedStyle {
    pub style_id: String,
    pub style_name: String,
    /// The question with the directive removed
    pub clean_question: String,
}

impl ExtractedStyle {
    fn resolved(style_id: &'static str, clean_question: String) -> Self {
        Self {
            style_id: style_id.to_string(),
            style_name: style_name(style_id).unwrap_or(style_id).to_string(),
            clean_question,
        }
    }
}

/// Pull a style directive out of a question
///
/// A recognised directive is removed and its style returned. With no directive,
/// or one naming an unknown style, the default style is returned and the
/// question is left untouched.
pub fn extract_style(question: &str) -> ExtractedStyle {
    let Some(captures) = DIRECTIVE.captures(question) else {
        return ExtractedStyle::resolved(DEFAULT_STYLE_ID, question.to_string());
    };
    let (Some(whole), Some(value)) = (captures.get(0), captures.get(1)) else {
        return ExtractedStyle::resolved(DEFAULT_STYLE_ID, question.to_string());
    };

    match STYLE_KEYWORDS.find_either_way(value.as_str()) {
        Some(style_id) => {
            let before = question[..whole.start()].trim_end();
            let after = question[whole.end()..].trim_start();
            let clean = format!("{} {}", before, after).trim().to_string();
            ExtractedStyle::resolved(style_id, clean)
        }
        None => ExtractedStyle::resolved(DEFAULT_STYLE_ID, question.to_string()),
    }
}
