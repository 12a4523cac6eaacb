//! Prompt side: style and spread resolution, card parsing, composition
//!
//! Everything here is synchronous and pure except instruction lookup, which
//! goes through an `InstructionSource` and is driven by
//! `StyledPromptGenerator::generate_styled_prompt`.

mod matcher;
mod style;
mod spread;
mod cards;
mod instructions;
mod templates;
mod composer;

pub use matcher::KeywordTable;
pub use style::{extract_style, style_ids, style_name, ExtractedStyle, DEFAULT_STYLE_ID, STYLE_KEYWORDS};
pub use spread::{extract_spread_type, spread_ids, DEFAULT_SPREAD_ID, SPREAD_KEYWORDS};
pub use cards::{card_id_for_name, extract_card_draws, extract_card_ids};
pub use instructions::{
    CardInstructionAggregator, FileInstructionSource, InstructionLookupError, InstructionLookupResult,
    InstructionSource, MemoryInstructionSource,
};
pub use templates::TemplateCatalog;
pub use composer::{PromptComposer, StyledPromptGenerator};
