//! The multi-provider client handle

use std::fmt;
use std::sync::Arc;

use super::error::{GenerationError, GenerationResult};
use super::integration::BackendIntegration;
use crate::types::Provider;

/// One registered integration per provider, in provider priority order
///
/// Built once by `ClientRegistry` and shared as `Arc<AiClient>`. A client with
/// no integrations is valid; calls to `generate` on it fail with
/// `GenerationError::NoProviders`.
pub struct AiClient {
    integrations: Vec<Arc<dyn BackendIntegration>>,
}

impl AiClient {
    pub fn new(mut integrations: Vec<Arc<dyn BackendIntegration>>) -> Self {
        integrations.sort_by_key(|i| i.provider());
        integrations.dedup_by_key(|i| i.provider());
        Self { integrations }
    }

    /// A client with no generation capability
    pub fn empty() -> Self {
        Self {
            integrations: Vec::new(),
        }
    }

    pub fn providers(&self) -> Vec<Provider> {
        self.integrations.iter().map(|i| i.provider()).collect()
    }

    pub fn provider_count(&self) -> usize {
        self.integrations.len()
    }

    /// True when at least one provider is registered
    pub fn has_capability(&self) -> bool {
        !self.integrations.is_empty()
    }

    pub fn integration(&self, provider: Provider) -> Option<&Arc<dyn BackendIntegration>> {
        self.integrations.iter().find(|i| i.provider() == provider)
    }

    /// Provider used by `generate`
    pub fn primary(&self) -> Option<Provider> {
        self.integrations.first().map(|i| i.provider())
    }

    /// Generate with the highest-priority registered provider
    pub async fn generate(&self, prompt: &str) -> GenerationResult<(Provider, String)> {
        let integration = self.integrations.first().ok_or(GenerationError::NoProviders)?;
        let text = integration.generate(prompt).await?;
        Ok((integration.provider(), text))
    }

    /// Generate with a specific provider
    pub async fn generate_with(&self, provider: Provider, prompt: &str) -> GenerationResult<String> {
        let integration = self
            .integration(provider)
            .ok_or(GenerationError::ProviderNotRegistered(provider))?;
        integration.generate(prompt).await
    }
}

impl fmt::Debug for AiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiClient")
            .field("providers", &self.providers())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockIntegration;

    fn mock(provider: Provider) -> Arc<dyn BackendIntegration> {
        Arc::new(MockIntegration::echo(provider, "k"))
    }

    #[test]
    fn test_integrations_ordered_by_priority() {
        let client = AiClient::new(vec![mock(Provider::Anthropic), mock(Provider::Gemini)]);
        assert_eq!(client.providers(), vec![Provider::Gemini, Provider::Anthropic]);
        assert_eq!(client.primary(), Some(Provider::Gemini));
    }

    #[tokio::test]
    async fn test_generate_uses_primary() {
        let client = AiClient::new(vec![mock(Provider::OpenAi), mock(Provider::Anthropic)]);
        let (provider, text) = client.generate("hi").await.unwrap();
        assert_eq!(provider, Provider::OpenAi);
        assert_eq!(text, "[openai] hi");
    }

    #[tokio::test]
    async fn test_generate_with_unregistered_provider() {
        let client = AiClient::new(vec![mock(Provider::OpenAi)]);
        assert!(matches!(
            client.generate_with(Provider::Gemini, "hi").await,
            Err(GenerationError::ProviderNotRegistered(Provider::Gemini))
        ));
        assert_eq!(client.generate_with(Provider::OpenAi, "hi").await.unwrap(), "[openai] hi");
    }

    #[tokio::test]
    async fn test_empty_client_has_no_capability() {
        let client = AiClient::empty();
        assert!(!client.has_capability());
        assert_eq!(client.provider_count(), 0);
        assert!(matches!(client.generate("hi").await, Err(GenerationError::NoProviders)));
    }
}
