//! Backend integration seam

use std::sync::Arc;

use async_trait::async_trait;

use super::error::{GenerationResult, IntegrationError};
use crate::types::Provider;

/// One provider's text-generation capability, bound to a resolved key
#[async_trait]
pub trait BackendIntegration: Send + Sync {
    fn provider(&self) -> Provider;

    /// Model identifier requests are sent to
    fn model(&self) -> &str;

    /// Generate a complete response for a single-turn prompt
    async fn generate(&self, prompt: &str) -> GenerationResult<String>;
}

/// Registration call: turn a plaintext key into an integration handle
pub trait IntegrationFactory: Send + Sync {
    fn register(&self, provider: Provider, api_key: &str) -> Result<Arc<dyn BackendIntegration>, IntegrationError>;
}
