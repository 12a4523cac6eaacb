//! Read-only secret lookup used as the environment fallback
//!
//! - `SecretStore` trait for plugging in a lookup
//! - `EnvSecretStore` reads process environment variables
//! - `MemorySecretStore` stands in for the environment in tests

mod traits;
mod env_store;
mod memory_store;

pub use traits::SecretStore;
pub use env_store::EnvSecretStore;
pub use memory_store::MemorySecretStore;
