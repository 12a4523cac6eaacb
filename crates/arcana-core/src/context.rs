//! Process-wide context wiring credentials, the client and prompt generation
//!
//! `ArcanaContext` is built once at startup and shared by request handlers.
//! A reading runs in two phases: `ensure_client` obtains the shared client,
//! then `invoke` turns a request into a prompt and a generated answer.
//! `interpret` runs both.
//!
//! ```rust,ignore
//! use arcana_core::{ArcanaConfig, ArcanaContext, InterpretationRequest};
//!
//! let context = ArcanaContext::builder()
//!     .config(ArcanaConfig::load_default()?)
//!     .credential_source(Arc::new(FileCredentialSource::new("credentials.yaml")))
//!     .build();
//!
//! let request = InterpretationRequest::new(
//!     "이직해도 될까요? (스타일: 실용)",
//!     "3장 스프레드",
//!     "1. 과거: The Tower (역방향)\n2. 현재: Ace of Cups (정방향)\n3. 미래: The Star (정방향)",
//! );
//! let reading = context.interpret(&request).await?;
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::{AiClient, ClientRegistry, GenaiIntegrationFactory, GenerationError, IntegrationFactory};
use crate::config::ArcanaConfig;
use crate::credentials::{
    Clock, CredentialCache, CredentialSource, CredentialStore, Decryptor, MemoryCredentialSource,
    PassthroughDecryptor, SystemClock,
};
use crate::logging::{SharedLogger, TracingLogger};
use crate::prompt::{
    extract_card_draws, extract_card_ids, extract_spread_type, extract_style, CardInstructionAggregator, ExtractedStyle,
    InstructionSource, MemoryInstructionSource, PromptComposer, StyledPromptGenerator, TemplateCatalog,
};
use crate::secrets::{EnvSecretStore, SecretStore};
use crate::types::{CardDraw, Provider, ResolvedCredentialSet};
use crate::{log_debug, log_info, log_warn};

/// Errors from running a reading
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),
}

pub type FlowResult<T> = Result<T, FlowError>;

/// One reading request as it arrives from a handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpretationRequest {
    /// The question, possibly carrying a `(스타일: ...)` directive
    pub question: String,
    #[serde(default, alias = "spreadName")]
    pub spread_name: String,
    /// Card listing, one `name (orientation)` per line
    #[serde(default, alias = "cardsText")]
    pub cards_text: String,
}

impl InterpretationRequest {
    pub fn new(question: impl Into<String>, spread_name: impl Into<String>, cards_text: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            spread_name: spread_name.into(),
            cards_text: cards_text.into(),
        }
    }
}

/// A generated reading together with everything resolved on the way
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interpretation {
    pub style: ExtractedStyle,
    pub spread_id: String,
    pub card_ids: Vec<String>,
    /// Parsed cards with their position labels and orientations
    pub draws: Vec<CardDraw>,
    pub prompt: String,
    pub provider: Provider,
    pub text: String,
}

/// Shared state for every request
pub struct ArcanaContext {
    cache: Arc<CredentialCache>,
    registry: ClientRegistry,
    prompts: StyledPromptGenerator,
    logger: SharedLogger,
}

impl ArcanaContext {
    pub fn builder() -> ArcanaContextBuilder {
        ArcanaContextBuilder::default()
    }

    /// The shared client, built on first use
    pub async fn get_client(&self) -> Arc<AiClient> {
        self.registry.get_client().await
    }

    /// First phase of a reading: make sure the shared client exists
    pub async fn ensure_client(&self) -> Arc<AiClient> {
        let client = self.get_client().await;
        log_debug!(self.logger, "Client ready with {} provider(s)", client.provider_count());
        client
    }

    /// Drop the memoized client and cached credentials
    ///
    /// The next request re-resolves keys and registers integrations again.
    /// Nothing calls this automatically; hosts call it after rotating keys.
    pub fn invalidate_client(&self) {
        self.registry.invalidate();
        self.cache.invalidate();
    }

    /// Current credentials through the cache
    pub async fn credentials(&self) -> Arc<ResolvedCredentialSet> {
        self.cache.get_credentials().await
    }

    pub fn extract_style_from_question(&self, question: &str) -> ExtractedStyle {
        extract_style(question)
    }

    pub fn extract_spread_type(&self, spread_name: &str) -> &'static str {
        extract_spread_type(spread_name)
    }

    pub fn extract_card_ids(&self, card_text: &str) -> Vec<String> {
        extract_card_ids(card_text)
    }

    pub async fn generate_styled_prompt(
        &self,
        style_id: &str,
        spread_id: &str,
        card_ids: &[String],
        question: &str,
        card_interpretations_text: &str,
    ) -> String {
        self.prompts
            .generate_styled_prompt(style_id, spread_id, card_ids, question, card_interpretations_text)
            .await
    }

    /// Second phase of a reading: build the prompt and generate with `client`
    pub async fn invoke(&self, client: &AiClient, request: &InterpretationRequest) -> FlowResult<Interpretation> {
        let style = self.extract_style_from_question(&request.question);
        let spread_id = self.extract_spread_type(&request.spread_name);
        let draws = extract_card_draws(&request.cards_text);
        let card_ids: Vec<String> = draws.iter().map(|draw| draw.card_id.clone()).collect();
        log_debug!(
            self.logger,
            "Reading: style={}, spread={}, cards={}",
            style.style_id,
            spread_id,
            card_ids.len()
        );

        let prompt = self
            .generate_styled_prompt(
                &style.style_id,
                spread_id,
                &card_ids,
                &style.clean_question,
                &request.cards_text,
            )
            .await;

        let (provider, text) = client.generate(&prompt).await.map_err(|e| {
            log_warn!(self.logger, "Reading generation failed: {}", e);
            e
        })?;
        log_info!(self.logger, "Generated {} reading with {}", style.style_id, provider);

        Ok(Interpretation {
            style,
            spread_id: spread_id.to_string(),
            card_ids,
            draws,
            prompt,
            provider,
            text,
        })
    }

    /// Both phases in one call
    pub async fn interpret(&self, request: &InterpretationRequest) -> FlowResult<Interpretation> {
        let client = self.ensure_client().await;
        self.invoke(&client, request).await
    }
}

/// Builder for `ArcanaContext`
///
/// Anything left unset gets a default: no stored records, passthrough
/// decryption, environment fallback, genai integrations, the system clock,
/// tracing output and no card instructions.
#[derive(Default)]
pub struct ArcanaContextBuilder {
    config: Option<ArcanaConfig>,
    credential_source: Option<Arc<dyn CredentialSource>>,
    decryptor: Option<Arc<dyn Decryptor>>,
    fallback: Option<Arc<dyn SecretStore>>,
    factory: Option<Arc<dyn IntegrationFactory>>,
    clock: Option<Arc<dyn Clock>>,
    logger: Option<SharedLogger>,
    instructions: Option<Arc<dyn InstructionSource>>,
}

impl ArcanaContextBuilder {
    pub fn config(mut self, config: ArcanaConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn credential_source(mut self, source: Arc<dyn CredentialSource>) -> Self {
        self.credential_source = Some(source);
        self
    }

    pub fn decryptor(mut self, decryptor: Arc<dyn Decryptor>) -> Self {
        self.decryptor = Some(decryptor);
        self
    }

    /// Where keys are looked up when no stored record is usable
    pub fn fallback(mut self, fallback: Arc<dyn SecretStore>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn integration_factory(mut self, factory: Arc<dyn IntegrationFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn logger(mut self, logger: SharedLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn instruction_source(mut self, source: Arc<dyn InstructionSource>) -> Self {
        self.instructions = Some(source);
        self
    }

    pub fn build(self) -> ArcanaContext {
        let config = self.config.unwrap_or_default();
        let logger: SharedLogger = self
            .logger
            .unwrap_or_else(|| Arc::new(TracingLogger::new("arcana")));

        let mut store = CredentialStore::new(
            self.credential_source
                .unwrap_or_else(|| Arc::new(MemoryCredentialSource::new())),
            self.decryptor.unwrap_or_else(|| Arc::new(PassthroughDecryptor)),
            self.fallback.unwrap_or_else(|| Arc::new(EnvSecretStore::new())),
            Arc::clone(&logger),
        );
        for (provider, vars) in &config.env_vars {
            store = store.with_env_vars(*provider, vars.clone());
        }

        let cache = Arc::new(CredentialCache::new(
            store,
            config.credential_ttl(),
            self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            Arc::clone(&logger),
        ));

        let factory = self
            .factory
            .unwrap_or_else(|| Arc::new(GenaiIntegrationFactory::from_config(&config, Arc::clone(&logger))));
        let registry = ClientRegistry::new(Arc::clone(&cache), factory, Arc::clone(&logger));

        let instructions = self
            .instructions
            .unwrap_or_else(|| Arc::new(MemoryInstructionSource::new()));
        let prompts = StyledPromptGenerator::new(
            CardInstructionAggregator::new(instructions, Arc::clone(&logger)),
            PromptComposer::new(TemplateCatalog::with_overrides(&config.templates)),
        );

        ArcanaContext {
            cache,
            registry,
            prompts,
            logger,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::client::MockIntegrationFactory;
    use crate::credentials::ManualClock;
    use crate::logging::{LogLevel, MemoryLogger};
    use crate::secrets::MemorySecretStore;
    use crate::types::{CardInstruction, Orientation, ProviderCredentialRecord};

    struct Harness {
        context: ArcanaContext,
        source: Arc<MemoryCredentialSource>,
        factory: Arc<MockIntegrationFactory>,
        clock: Arc<ManualClock>,
        logger: Arc<MemoryLogger>,
    }

    fn harness(records: Vec<ProviderCredentialRecord>, env: &[(&str, &str)]) -> Harness {
        let source = Arc::new(MemoryCredentialSource::with_records(records));
        let factory = Arc::new(MockIntegrationFactory::new());
        let clock = Arc::new(ManualClock::new());
        let logger = Arc::new(MemoryLogger::new());
        let instructions = Arc::new(MemoryInstructionSource::with_instructions([
            CardInstruction::new("0-fool", "spiritual-growth", "순수한 출발", "경솔함").with_keywords(["여정"]),
            CardInstruction::new("ace-of-cups", "spiritual-growth", "넘치는 사랑", "메마른 마음"),
        ]));

        let context = ArcanaContext::builder()
            .credential_source(source.clone())
            .fallback(Arc::new(MemorySecretStore::with_secrets(env.iter().copied())))
            .integration_factory(factory.clone())
            .clock(clock.clone())
            .logger(logger.clone())
            .instruction_source(instructions)
            .build();

        Harness {
            context,
            source,
            factory,
            clock,
            logger,
        }
    }

    fn reading() -> InterpretationRequest {
        InterpretationRequest::new(
            "새 직장으로 옮겨도 될까요? (스타일: 영적)",
            "3장 스프레드",
            "1. The Fool (정방향)\n2. Ace of Cups (역방향)",
        )
    }

    #[tokio::test]
    async fn test_interpret_end_to_end() {
        let h = harness(vec![ProviderCredentialRecord::new("openai", "sk-stored")], &[]);

        let result = h.context.interpret(&reading()).await.unwrap();

        assert_eq!(result.style.style_id, "spiritual-growth");
        assert_eq!(result.style.clean_question, "새 직장으로 옮겨도 될까요?");
        assert_eq!(result.spread_id, "three-card");
        assert_eq!(result.card_ids, vec!["0-fool", "ace-of-cups"]);
        assert_eq!(result.draws[0].orientation, Orientation::Upright);
        assert_eq!(result.draws[1].orientation, Orientation::Reversed);
        assert_eq!(result.draws[1].name, "Ace of Cups");
        assert_eq!(result.provider, Provider::OpenAi);
        assert!(result.prompt.contains("## 질문\n새 직장으로 옮겨도 될까요?"));
        assert!(result.prompt.contains("### 0-fool\n- 정방향: 순수한 출발"));
        assert!(!result.prompt.contains("스타일: 영적"));
        assert_eq!(result.text, format!("[openai] {}", result.prompt));
    }

    #[tokio::test]
    async fn test_client_registered_once_per_keyed_provider() {
        let h = harness(
            vec![ProviderCredentialRecord::new("googleai", "g-legacy")],
            &[("ANTHROPIC_API_KEY", "sk-ant")],
        );

        let first = h.context.ensure_client().await;
        let second = h.context.get_client().await;
        h.context.interpret(&reading()).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.providers(), vec![Provider::Gemini, Provider::Anthropic]);
        assert_eq!(
            h.factory.registrations(),
            vec![
                (Provider::Gemini, "g-legacy".to_string()),
                (Provider::Anthropic, "sk-ant".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_credentials_cached_for_ttl() {
        let h = harness(vec![ProviderCredentialRecord::new("openai", "sk-1")], &[]);

        h.context.credentials().await;
        h.clock.advance(Duration::from_secs(299));
        h.context.credentials().await;
        assert_eq!(h.source.read_count(), 1);

        h.clock.advance(Duration::from_secs(1));
        h.context.credentials().await;
        assert_eq!(h.source.read_count(), 2);
    }

    #[tokio::test]
    async fn test_no_providers_surfaces_only_at_generation() {
        let h = harness(vec![], &[]);

        let client = h.context.ensure_client().await;
        h.context.ensure_client().await;
        assert!(!client.has_capability());
        assert_eq!(
            h.logger.messages_at(LogLevel::Warn),
            vec!["No AI provider credentials available; client has no generation capability"]
        );

        let err = h.context.invoke(&client, &reading()).await.unwrap_err();
        assert!(matches!(err, FlowError::Generation(GenerationError::NoProviders)));
    }

    #[tokio::test]
    async fn test_store_outage_uses_environment() {
        let h = harness(
            vec![ProviderCredentialRecord::new("openai", "sk-stored")],
            &[("OPENAI_API_KEY", "sk-env")],
        );
        h.source.set_unavailable(true);

        let result = h.context.interpret(&reading()).await.unwrap();
        assert_eq!(result.provider, Provider::OpenAi);
        assert_eq!(h.factory.registrations(), vec![(Provider::OpenAi, "sk-env".to_string())]);
    }

    #[tokio::test]
    async fn test_invalidate_picks_up_rotated_key() {
        let h = harness(vec![ProviderCredentialRecord::new("openai", "sk-1")], &[]);
        let before = h.context.get_client().await;

        h.source.set_records(vec![ProviderCredentialRecord::new("openai", "sk-2")]);
        h.clock.advance(Duration::from_secs(600));
        assert!(Arc::ptr_eq(&before, &h.context.get_client().await));

        h.context.invalidate_client();
        let after = h.context.get_client().await;
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(h.factory.registration_count(), 2);
        assert_eq!(h.factory.registrations()[1].1, "sk-2");
    }

    #[tokio::test]
    async fn test_prompt_without_cards_keeps_other_sections() {
        let h = harness(vec![], &[]);

        let prompt = h
            .context
            .generate_styled_prompt("traditional-rws", "single-card", &[], "오늘의 조언은?", "")
            .await;
        assert!(!prompt.contains("## 카드별 해석 지침"));
        assert!(prompt.contains("## 질문\n오늘의 조언은?"));
        assert!(prompt.contains("스프레드: single-card"));
        assert!(prompt.contains("## 답변 형식"));
    }

    #[tokio::test]
    async fn test_config_drives_ttl_env_vars_and_templates() {
        let config = ArcanaConfig::from_yaml_str(
            "credential_ttl_secs: 10\nenv_vars:\n  gemini: [TAROT_GEMINI_KEY]\ntemplates:\n  spreads:\n    yes-no: \"Answer plainly.\"\n",
        )
        .unwrap();
        let source = Arc::new(MemoryCredentialSource::new());
        let clock = Arc::new(ManualClock::new());
        let context = ArcanaContext::builder()
            .config(config)
            .credential_source(source.clone())
            .fallback(Arc::new(MemorySecretStore::with_secrets([
                ("GEMINI_API_KEY", "ignored"),
                ("TAROT_GEMINI_KEY", "g-custom"),
            ])))
            .integration_factory(Arc::new(MockIntegrationFactory::new()))
            .clock(clock.clone())
            .logger(Arc::new(MemoryLogger::new()))
            .build();

        assert_eq!(context.credentials().await.key(Provider::Gemini), Some("g-custom"));
        clock.advance(Duration::from_secs(10));
        context.credentials().await;
        assert_eq!(source.read_count(), 2);

        let prompt = context.generate_styled_prompt("new-age", "yes-no", &[], "Q", "").await;
        assert!(prompt.contains("Answer plainly."));
    }

    #[test]
    fn test_request_accepts_camel_case() {
        let request: InterpretationRequest =
            serde_json::from_str(r#"{"question":"Q","spreadName":"원카드","cardsText":"The Sun (정방향)"}"#).unwrap();
        assert_eq!(request, InterpretationRequest::new("Q", "원카드", "The Sun (정방향)"));
    }
}
