//! Client error types

use thiserror::Error;

use crate::types::Provider;

/// Building an integration for a provider failed
#[derive(Error, Debug)]
pub enum IntegrationError {
    #[error("Failed to build {provider} integration: {message}")]
    Build { provider: Provider, message: String },
}

impl IntegrationError {
    pub fn build(provider: Provider, message: impl Into<String>) -> Self {
        Self::Build {
            provider,
            message: message.into(),
        }
    }
}

/// Errors surfaced at the generation call site
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The client was built without any usable provider key
    #[error("No AI provider is configured")]
    NoProviders,

    #[error("Provider {0} is not registered on this client")]
    ProviderNotRegistered(Provider),

    #[error("{provider} API error: {message}")]
    Api { provider: Provider, message: String },

    #[error("{0} returned an empty response")]
    EmptyResponse(Provider),
}

impl GenerationError {
    pub fn api(provider: Provider, message: impl Into<String>) -> Self {
        Self::Api {
            provider,
            message: message.into(),
        }
    }
}

pub type GenerationResult<T> = Result<T, GenerationError>;
