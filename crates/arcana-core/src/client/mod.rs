//! The shared AI client and the registry that builds it
//!
//! ## Architecture
//!
//! `ClientRegistry` asks the credential cache for keys once, registers one
//! `BackendIntegration` per provider that has a key, and memoizes the
//! resulting `AiClient`. Integrations are produced by an `IntegrationFactory`:
//! `GenaiIntegrationFactory` talks to real APIs through the `genai` crate, and
//! `MockIntegrationFactory` is kept for tests.

mod error;
mod integration;
mod genai_integration;
mod mock;
mod ai_client;
mod registry;

pub use error::{GenerationError, GenerationResult, IntegrationError};
pub use integration::{BackendIntegration, IntegrationFactory};
pub use genai_integration::{GenaiIntegration, GenaiIntegrationFactory};
pub use mock::{MockIntegration, MockIntegrationFactory};
pub use ai_client::AiClient;
pub use registry::ClientRegistry;
