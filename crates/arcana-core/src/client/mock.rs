//! Mock integrations for testing
//!
//! Deterministic responses, no network. The factory records every
//! registration so tests can check that each provider was registered once.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::error::{GenerationError, GenerationResult, IntegrationError};
use super::integration::{BackendIntegration, IntegrationFactory};
use crate::types::Provider;

/// Integration that answers every prompt the same way
#[derive(Debug, Clone)]
pub struct MockIntegration {
    provider: Provider,
    api_key: String,
    response: Option<String>,
}

impl MockIntegration {
    /// Echo mode: responds with `[provider] <prompt>`
    pub fn echo(provider: Provider, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            response: None,
        }
    }

    pub fn fixed(provider: Provider, api_key: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            response: Some(response.into()),
        }
    }

    /// The key this integration was registered with
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

#[async_trait]
impl BackendIntegration for MockIntegration {
    fn provider(&self) -> Provider {
        self.provider
    }

    fn model(&self) -> &str {
        "mock"
    }

    async fn generate(&self, prompt: &str) -> GenerationResult<String> {
        let text = match &self.response {
            Some(fixed) => fixed.clone(),
            None => format!("[{}] {}", self.provider, prompt),
        };
        if text.is_empty() {
            return Err(GenerationError::EmptyResponse(self.provider));
        }
        Ok(text)
    }
}

/// Factory producing `MockIntegration`s and recording each registration
#[derive(Debug, Default)]
pub struct MockIntegrationFactory {
    response: Option<String>,
    failing: Vec<Provider>,
    registrations: Mutex<Vec<(Provider, String)>>,
}

impl MockIntegrationFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every integration answers with `response`
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response = Some(response.into());
        self
    }

    /// Registration fails for `provider`
    pub fn failing_for(mut self, provider: Provider) -> Self {
        self.failing.push(provider);
        self
    }

    /// `(provider, key)` for every successful registration, in call order
    pub fn registrations(&self) -> Vec<(Provider, String)> {
        self.registrations.lock().clone()
    }

    pub fn registration_count(&self) -> usize {
        self.registrations.lock().len()
    }
}

impl IntegrationFactory for MockIntegrationFactory {
    fn register(&self, provider: Provider, api_key: &str) -> Result<Arc<dyn BackendIntegration>, IntegrationError> {
        if self.failing.contains(&provider) {
            return Err(IntegrationError::build(provider, "mock registration failure"));
        }
        self.registrations.lock().push((provider, api_key.to_string()));
        let integration = match &self.response {
            Some(response) => MockIntegration::fixed(provider, api_key, response.clone()),
            None => MockIntegration::echo(provider, api_key),
        };
        Ok(Arc::new(integration))
    }
}
