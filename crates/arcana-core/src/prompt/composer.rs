//! Final prompt assembly

use std::fmt::Write;

use super::instructions::CardInstructionAggregator;
use super::style::style_name;
use super::templates::TemplateCatalog;
use crate::types::CardInstruction;

const ANSWER_FORMAT: &str = "## 답변 형식\n\
다음 네 부분으로 나누어 답변하세요.\n\
1. 전체 흐름 요약\n\
2. 카드별 상세 해석\n\
3. 종합 해석\n\
4. 마무리 조언";

/// Builds the prompt text from resolved ids, the question and the guidance
///
/// Sections, in order: base template, question, spread and cards, per-card
/// guidance (only when there is any), answer format, style reminder.
/// Output depends on nothing but the inputs and the catalog.
#[derive(Debug, Clone, Default)]
pub struct PromptComposer {
    catalog: TemplateCatalog,
}

impl PromptComposer {
    pub fn new(catalog: TemplateCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn compose(
        &self,
        style_id: &str,
        spread_id: &str,
        card_ids: &[String],
        question: &str,
        card_interpretations_text: &str,
        instructions: &[CardInstruction],
    ) -> String {
        let mut sections = vec![
            self.catalog.base_template(style_id, spread_id),
            format!("## 질문\n{}", question.trim()),
            cards_section(spread_id, card_ids, card_interpretations_text),
        ];
        if !instructions.is_empty() {
            sections.push(guidance_section(instructions));
        }
        sections.push(ANSWER_FORMAT.to_string());
        sections.push(format!(
            "반드시 '{}' ({}) 스타일로 해석하세요.",
            style_name(style_id).unwrap_or(style_id),
            style_id
        ));
        sections.join("\n\n")
    }
}

fn cards_section(spread_id: &str, card_ids: &[String], card_interpretations_text: &str) -> String {
    let mut section = format!("## 스프레드 및 카드\n스프레드: {}\n", spread_id);
    if card_ids.is_empty() {
        section.push_str("카드: (없음)");
    } else {
        let _ = write!(section, "카드: {}", card_ids.join(", "));
    }
    let text = card_interpretations_text.trim();
    if !text.is_empty() {
        section.push_str("\n\n");
        section.push_str(text);
    }
    section
}

fn guidance_section(instructions: &[CardInstruction]) -> String {
    let mut section = String::from("## 카드별 해석 지침");
    for instruction in instructions {
        let _ = write!(
            section,
            "\n\n### {}\n- 정방향: {}\n- 역방향: {}",
            instruction.card_id, instruction.upright_text, instruction.reversed_text
        );
        if !instruction.keywords.is_empty() {
            let _ = write!(section, "\n- 키워드: {}", instruction.keywords.join(", "));
        }
        if let Some(addition) = instruction.custom_addition.as_deref().filter(|a| !a.trim().is_empty()) {
            let _ = write!(section, "\n- 추가 지침: {}", addition.trim());
        }
    }
    section
}

/// Looks up card guidance and composes the final prompt
pub struct StyledPromptGenerator {
    aggregator: CardInstructionAggregator,
    composer: PromptComposer,
}

impl StyledPromptGenerator {
    pub fn new(aggregator: CardInstructionAggregator, composer: PromptComposer) -> Self {
        Self { aggregator, composer }
    }

    /// The prompt for one reading; the only step that touches the instruction source
    pub async fn generate_styled_prompt(
        &self,
        style_id: &str,
        spread_id: &str,
        card_ids: &[String],
        question: &str,
        card_interpretations_text: &str,
    ) -> String {
        let instructions = self.aggregator.aggregate(card_ids, style_id).await;
        self.composer.compose(
            style_id,
            spread_id,
            card_ids,
            question,
            card_interpretations_text,
            &instructions,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::logging::NoOpLogger;
    use crate::prompt::MemoryInstructionSource;

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn fool() -> CardInstruction {
        CardInstruction::new("0-fool", "spiritual-growth", "새로운 시작", "무모함")
            .with_keywords(["시작", "믿음"])
            .with_custom_addition("영혼의 여정을 강조하세요")
    }

    #[test]
    fn test_sections_in_order() {
        let composer = PromptComposer::default();
        let prompt = composer.compose(
            "spiritual-growth",
            "three-card",
            &ids(&["0-fool"]),
            "제 진로는?",
            "1. The Fool (정방향)",
            &[fool()],
        );

        let order = [
            composer.catalog().style_text("spiritual-growth"),
            "## 질문\n제 진로는?",
            "## 스프레드 및 카드\n스프레드: three-card\n카드: 0-fool\n\n1. The Fool (정방향)",
            "## 카드별 해석 지침",
            "### 0-fool\n- 정방향: 새로운 시작\n- 역방향: 무모함\n- 키워드: 시작, 믿음\n- 추가 지침: 영혼의 여정을 강조하세요",
            "## 답변 형식",
            "4. 마무리 조언",
            "반드시 '영적 성장' (spiritual-growth) 스타일로 해석하세요.",
        ];
        let mut from = 0;
        for part in order {
            let at = prompt[from..].find(part).unwrap_or_else(|| panic!("missing or out of order: {}", part));
            from += at + part.len();
        }
        assert!(prompt.ends_with("스타일로 해석하세요."));
    }

    #[test]
    fn test_no_instructions_omits_guidance() {
        let prompt = PromptComposer::default().compose("traditional-rws", "single-card", &[], "Q", "", &[]);
        assert!(!prompt.contains("## 카드별 해석 지침"));
        assert!(prompt.contains("## 질문\nQ"));
        assert!(prompt.contains("스프레드: single-card\n카드: (없음)"));
        assert!(prompt.contains("## 답변 형식"));
    }

    #[test]
    fn test_keywords_line_omitted_when_empty() {
        let bare = CardInstruction::new("13-death", "new-age", "변화", "저항");
        let prompt = PromptComposer::default().compose("new-age", "three-card", &ids(&["13-death"]), "Q", "", &[bare]);
        assert!(prompt.contains("- 역방향: 저항"));
        assert!(!prompt.contains("- 키워드:"));
        assert!(!prompt.contains("- 추가 지침:"));
    }

    #[tokio::test]
    async fn test_generate_is_deterministic_and_skips_missing_cards() {
        let source = Arc::new(MemoryInstructionSource::with_instructions([
            fool(),
            CardInstruction::new("ace-of-cups", "spiritual-growth", "사랑", "공허"),
        ]));
        let generator = StyledPromptGenerator::new(
            CardInstructionAggregator::new(source, Arc::new(NoOpLogger)),
            PromptComposer::default(),
        );
        let cards = ids(&["ace-of-cups", "16-tower", "0-fool"]);

        let first = generator
            .generate_styled_prompt("spiritual-growth", "three-card", &cards, "Q", "text")
            .await;
        let second = generator
            .generate_styled_prompt("spiritual-growth", "three-card", &cards, "Q", "text")
            .await;

        assert_eq!(first, second);
        assert!(!first.contains("### 16-tower"));
        let ace = first.find("### ace-of-cups").unwrap();
        let fool = first.find("### 0-fool").unwrap();
        assert!(ace < fool);
    }
}
