//! AI provider identities and their naming conventions

use std::fmt;

use serde::{Deserialize, Serialize};

/// A named AI backend
///
/// The declaration order is the resolution priority order: when several
/// providers are usable, earlier variants are preferred for generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Provider {
    #[serde(rename = "gemini", alias = "googleai", alias = "google")]
    Gemini,
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "anthropic", alias = "claude")]
    Anthropic,
}

impl Provider {
    /// All known providers, in priority order
    pub const ALL: [Provider; 3] = [Provider::Gemini, Provider::OpenAi, Provider::Anthropic];

    /// Canonical lower-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
        }
    }

    /// Legacy or alternate names that resolve to the same canonical slot
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Provider::Gemini => &["googleai", "google", "google-ai"],
            Provider::OpenAi => &["open-ai"],
            Provider::Anthropic => &["claude"],
        }
    }

    /// Environment variables consulted, in order, when no stored key is usable
    pub fn default_env_vars(&self) -> &'static [&'static str] {
        match self {
            Provider::Gemini => &["GEMINI_API_KEY", "GOOGLE_API_KEY", "GOOGLE_GENAI_API_KEY"],
            Provider::OpenAi => &["OPENAI_API_KEY"],
            Provider::Anthropic => &["ANTHROPIC_API_KEY"],
        }
    }

    /// Model used for generation when the configuration names none
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini-2.0-flash",
            Provider::OpenAi => "gpt-4o-mini",
            Provider::Anthropic => "claude-3-5-haiku-latest",
        }
    }

    /// Parse a canonical name or alias, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == lower || p.aliases().contains(&lower.as_str()))
    }

    /// Whether `name` is the canonical spelling (as opposed to an alias)
    pub fn is_canonical_name(&self, name: &str) -> bool {
        name.trim().eq_ignore_ascii_case(self.as_str())
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
