//! Integrations backed by the genai crate
//!
//! Auth flows through the key handed to `register`, never through genai's own
//! environment lookup, so the credential store stays the single source of keys.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use genai::chat::{ChatMessage, ChatOptions, ChatRequest, ChatStreamEvent};
use genai::resolver::{AuthData, AuthResolver};
use genai::{Client, ModelIden};

use super::error::{GenerationError, GenerationResult, IntegrationError};
use super::integration::{BackendIntegration, IntegrationFactory};
use crate::config::{ArcanaConfig, GenerationSettings};
use crate::logging::SharedLogger;
use crate::types::Provider;
use crate::{log_debug, log_error};

/// Create a genai client whose every request authenticates with `api_key`
fn client_with_key(api_key: &str) -> Client {
    let key = api_key.to_string();

    let auth_resolver = AuthResolver::from_resolver_async_fn(
        move |_model_iden: ModelIden| -> Pin<Box<dyn Future<Output = genai::resolver::Result<Option<AuthData>>> + Send>> {
            let key = key.clone();
            Box::pin(async move { Ok(Some(AuthData::from_single(key))) })
        },
    );

    Client::builder().with_auth_resolver(auth_resolver).build()
}

fn to_genai_options(settings: &GenerationSettings) -> ChatOptions {
    let mut options = ChatOptions::default();
    if let Some(temperature) = settings.temperature {
        options = options.with_temperature(temperature as f64);
    }
    if let Some(max_tokens) = settings.max_tokens {
        options = options.with_max_tokens(max_tokens);
    }
    options
}

/// A provider integration holding its own genai client
pub struct GenaiIntegration {
    provider: Provider,
    model: String,
    client: Client,
    options: ChatOptions,
    logger: SharedLogger,
}

impl GenaiIntegration {
    pub fn new(
        provider: Provider,
        model: impl Into<String>,
        api_key: &str,
        settings: &GenerationSettings,
        logger: SharedLogger,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            client: client_with_key(api_key),
            options: to_genai_options(settings),
            logger,
        }
    }
}

#[async_trait]
impl BackendIntegration for GenaiIntegration {
    fn provider(&self) -> Provider {
        self.provider
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> GenerationResult<String> {
        log_debug!(
            self.logger,
            "[{}] generate: model={}, prompt={} chars",
            self.provider,
            self.model,
            prompt.chars().count()
        );

        let request = ChatRequest::new(vec![ChatMessage::user(prompt.to_string())]);
        let chat_stream = self
            .client
            .exec_chat_stream(self.model.as_str(), request, Some(&self.options))
            .await
            .map_err(|e| {
                log_error!(self.logger, "[{}] request failed: {}", self.provider, e);
                GenerationError::api(self.provider, e.to_string())
            })?;

        let mut stream = chat_stream.stream;
        let mut text = String::new();
        while let Some(event) = stream.next().await {
            match event {
                Ok(ChatStreamEvent::Chunk(chunk)) => text.push_str(&chunk.content),
                Ok(_) => {}
                Err(e) => {
                    log_error!(self.logger, "[{}] stream error: {}", self.provider, e);
                    return Err(GenerationError::api(self.provider, e.to_string()));
                }
            }
        }

        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse(self.provider));
        }
        Ok(text)
    }
}

/// Builds `GenaiIntegration`s using the configured model per provider
pub struct GenaiIntegrationFactory {
    config: ArcanaConfig,
    logger: SharedLogger,
}

impl GenaiIntegrationFactory {
    pub fn new(logger: SharedLogger) -> Self {
        Self::from_config(&ArcanaConfig::default(), logger)
    }

    pub fn from_config(config: &ArcanaConfig, logger: SharedLogger) -> Self {
        Self {
            config: config.clone(),
            logger,
        }
    }
}

impl IntegrationFactory for GenaiIntegrationFactory {
    fn register(&self, provider: Provider, api_key: &str) -> Result<Arc<dyn BackendIntegration>, IntegrationError> {
        if api_key.trim().is_empty() {
            return Err(IntegrationError::build(provider, "empty API key"));
        }
        let integration = GenaiIntegration::new(
            provider,
            self.config.model_for(provider),
            api_key,
            &self.config.generation,
            Arc::clone(&self.logger),
        );
        Ok(Arc::new(integration))
    }
}
