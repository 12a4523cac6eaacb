//! Card draws and per-card interpretation guidance

use serde::{Deserialize, Serialize};

/// Per-card, per-style guidance used to steer generated interpretations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInstruction {
    #[serde(alias = "cardId")]
    pub card_id: String,
    #[serde(alias = "styleId")]
    pub style_id: String,
    #[serde(alias = "uprightText")]
    pub upright_text: String,
    #[serde(alias = "reversedText")]
    pub reversed_text: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, alias = "customAddition", skip_serializing_if = "Option::is_none")]
    pub custom_addition: Option<String>,
}

impl CardInstruction {
    pub fn new(
        card_id: impl Into<String>,
        style_id: impl Into<String>,
        upright_text: impl Into<String>,
        reversed_text: impl Into<String>,
    ) -> Self {
        Self {
            card_id: card_id.into(),
            style_id: style_id.into(),
            upright_text: upright_text.into(),
            reversed_text: reversed_text.into(),
            keywords: Vec::new(),
            custom_addition: None,
        }
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_custom_addition(mut self, addition: impl Into<String>) -> Self {
        self.custom_addition = Some(addition.into());
        self
    }
}

/// Which way up a card was drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Upright,
    Reversed,
}

impl Orientation {
    /// Read an orientation label such as `정방향`, `역방향`, `upright` or `reversed`
    ///
    /// Anything not recognisably reversed counts as upright.
    pub fn parse(label: &str) -> Self {
        let lower = label.trim().to_lowercase();
        if lower.starts_with('역') || lower.starts_with("rev") {
            Orientation::Reversed
        } else {
            Orientation::Upright
        }
    }
}

/// One card parsed out of a textual card listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardDraw {
    /// Canonical card id, e.g. `0-fool` or `ace-of-cups`
    pub card_id: String,
    /// Card name as written in the listing
    pub name: String,
    /// Position label (`과거`, `Present`, ...) when the line had one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    pub orientation: Orientation,
}
