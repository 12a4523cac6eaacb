//! Arcana Core
//!
//! AI provider configuration and prompt composition for tarot readings.
//!
//! Two halves meet in `ArcanaContext`:
//!
//! - **Credentials and client**: provider keys are resolved from stored,
//!   encrypted records with an environment fallback, cached for a fixed
//!   window, and used once to build a shared multi-provider `AiClient`.
//! - **Prompts**: a reader's question, spread name and card listing are
//!   resolved to a style id, a spread id and card ids, per-card guidance is
//!   looked up, and everything is composed into one deterministic prompt.
//!
//! ```rust,ignore
//! use arcana_core::{ArcanaContext, InterpretationRequest};
//!
//! let context = ArcanaContext::builder().build();
//! let client = context.ensure_client().await;
//! let reading = context
//!     .invoke(&client, &InterpretationRequest::new("올해 운세는? (스타일: 심리)", "켈틱 크로스", cards))
//!     .await?;
//! ```

pub mod types;
pub mod logging;
pub mod config;
pub mod secrets;
pub mod credentials;
pub mod client;
pub mod prompt;
pub mod context;

// Re-export commonly used types
pub use types::{
    CardDraw, CardInstruction, KeyOrigin, Orientation, Provider, ProviderCredentialRecord,
    ResolvedCredentialSet,
};

pub use logging::{init_tracing, Logger, NoOpLogger, SharedLogger, TracingLogger};

pub use config::{ArcanaConfig, ConfigError, ConfigResult};

pub use secrets::{EnvSecretStore, MemorySecretStore, SecretStore};

pub use credentials::{
    Clock, CredentialCache, CredentialSource, CredentialSourceError, CredentialStore, Decryptor, DecryptError,
    FileCredentialSource, MemoryCredentialSource, SystemClock, DEFAULT_CREDENTIAL_TTL,
};

pub use client::{
    AiClient, BackendIntegration, ClientRegistry, GenaiIntegrationFactory, GenerationError, IntegrationError,
    IntegrationFactory,
};

pub use prompt::{
    extract_card_draws, extract_card_ids, extract_spread_type, extract_style, CardInstructionAggregator,
    ExtractedStyle, FileInstructionSource, InstructionLookupError, InstructionSource, PromptComposer,
    StyledPromptGenerator,
};

pub use context::{ArcanaContext, ArcanaContextBuilder, FlowError, FlowResult, Interpretation, InterpretationRequest};
