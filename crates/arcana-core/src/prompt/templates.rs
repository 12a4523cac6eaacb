//! Base prompt texts per style and per spread

use std::collections::BTreeMap;

use super::spread::DEFAULT_SPREAD_ID;
use super::style::DEFAULT_STYLE_ID;
use crate::config::TemplateOverrides;

const STYLE_TEXTS: &[(&str, &str)] = &[
    (
        "traditional-rws",
        "당신은 라이더-웨이트 전통을 따르는 숙련된 타로 리더입니다. 카드의 전통적인 상징과 이미지에 근거하여 균형 잡힌 해석을 제공하세요.",
    ),
    (
        "psychological-jungian",
        "당신은 융 심리학에 기반한 타로 리더입니다. 카드를 원형과 무의식의 상징으로 읽고, 질문자의 내면 상태와 성장 과제를 중심으로 해석하세요.",
    ),
    (
        "thoth-crowley",
        "당신은 토트 타로와 크로울리의 체계에 정통한 리더입니다. 점성술과 카발라의 대응 관계를 활용하여 깊이 있는 해석을 제공하세요.",
    ),
    (
        "new-age",
        "당신은 뉴에이지 관점의 타로 리더입니다. 에너지의 흐름과 직관을 중시하며, 긍정적이고 열린 시각으로 해석하세요.",
    ),
    (
        "spiritual-growth",
        "당신은 영적 성장을 안내하는 타로 리더입니다. 카드가 보여주는 영혼의 여정과 배움에 초점을 맞추어 해석하세요.",
    ),
    (
        "practical-advice",
        "당신은 현실적인 조언을 주는 타로 리더입니다. 상징 설명은 간결히 하고, 질문자가 바로 실천할 수 있는 구체적인 행동을 제시하세요.",
    ),
];

const SPREAD_TEXTS: &[(&str, &str)] = &[
    (
        "three-card",
        "이 리딩은 과거, 현재, 미래를 나타내는 3장 스프레드입니다. 세 카드의 흐름을 시간 순서로 연결하여 설명하세요.",
    ),
    (
        "celtic-cross",
        "이 리딩은 10장으로 구성된 켈틱 크로스 스프레드입니다. 각 위치의 의미를 고려하여 상황, 장애물, 기반, 결과를 종합적으로 해석하세요.",
    ),
    (
        "relationship",
        "이 리딩은 관계 스프레드입니다. 질문자와 상대방의 감정, 관계의 현재 상태와 앞으로의 방향을 중심으로 해석하세요.",
    ),
    (
        "yes-no",
        "이 리딩은 예/아니오 스프레드입니다. 카드의 방향과 의미를 바탕으로 답의 경향을 분명히 밝히고 그 이유를 설명하세요.",
    ),
    (
        "single-card",
        "이 리딩은 원카드 리딩입니다. 한 장의 카드가 전하는 핵심 메시지에 집중하여 해석하세요.",
    ),
    (
        "five-card",
        "이 리딩은 5장 스프레드입니다. 현재 상황, 원인, 숨은 영향, 조언, 결과의 흐름으로 해석하세요.",
    ),
];

/// Base texts keyed by canonical style and spread id
///
/// Unknown ids fall back to the default style or spread text, so a base
/// template is always available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateCatalog {
    styles: BTreeMap<String, String>,
    spreads: BTreeMap<String, String>,
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TemplateCatalog {
    pub fn builtin() -> Self {
        let collect = |texts: &[(&str, &str)]| {
            texts
                .iter()
                .map(|(id, text)| (id.to_string(), text.to_string()))
                .collect::<BTreeMap<_, _>>()
        };
        Self {
            styles: collect(STYLE_TEXTS),
            spreads: collect(SPREAD_TEXTS),
        }
    }

    /// Built-in texts with configured replacements applied
    pub fn with_overrides(overrides: &TemplateOverrides) -> Self {
        let mut catalog = Self::builtin();
        catalog.styles.extend(overrides.styles.clone());
        catalog.spreads.extend(overrides.spreads.clone());
        catalog
    }

    pub fn style_text(&self, style_id: &str) -> &str {
        self.styles
            .get(style_id)
            .or_else(|| self.styles.get(DEFAULT_STYLE_ID))
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn spread_text(&self, spread_id: &str) -> &str {
        self.spreads
            .get(spread_id)
            .or_else(|| self.spreads.get(DEFAULT_SPREAD_ID))
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Style text followed by spread text
    pub fn base_template(&self, style_id: &str, spread_id: &str) -> String {
        format!("{}\n\n{}", self.style_text(style_id), self.spread_text(spread_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{spread_ids, style_ids};

    #[test]
    fn test_every_known_id_has_text() {
        let catalog = TemplateCatalog::builtin();
        for id in style_ids() {
            assert!(catalog.styles.contains_key(id), "missing style text for {}", id);
        }
        for id in spread_ids() {
            assert!(catalog.spreads.contains_key(id), "missing spread text for {}", id);
        }
    }

    #[test]
    fn test_unknown_ids_fall_back_to_defaults() {
        let catalog = TemplateCatalog::builtin();
        assert_eq!(catalog.style_text("tarot-de-marseille"), catalog.style_text(DEFAULT_STYLE_ID));
        assert_eq!(catalog.spread_text("horseshoe"), catalog.spread_text(DEFAULT_SPREAD_ID));
    }

    #[test]
    fn test_overrides_replace_builtin_text() {
        let mut overrides = TemplateOverrides::default();
        overrides.styles.insert("new-age".to_string(), "Custom new age voice.".to_string());

        let catalog = TemplateCatalog::with_overrides(&overrides);
        assert_eq!(catalog.style_text("new-age"), "Custom new age voice.");
        assert!(catalog
            .base_template("new-age", "single-card")
            .starts_with("Custom new age voice.\n\n이 리딩은 원카드"));
    }
}
