//! Provider credential resolution
//!
//! Keys come from two places with different trust levels: admin-managed
//! records in a configuration store (encrypted), and process environment
//! variables (plaintext, fallback only). `CredentialStore` merges them per
//! provider and `CredentialCache` keeps the result for a fixed window.

mod source;
mod file_source;
mod decrypt;
mod clock;
mod store;
mod cache;

pub use source::{CredentialSource, CredentialSourceError, CredentialSourceResult, MemoryCredentialSource};
#[cfg(test)]
pub(crate) use source::GatedCredentialSource;
pub use file_source::FileCredentialSource;
pub use decrypt::{Decryptor, DecryptError, FnDecryptor, PassthroughDecryptor};
pub use clock::{Clock, ManualClock, SystemClock};
pub use store::CredentialStore;
pub use cache::{CredentialCache, DEFAULT_CREDENTIAL_TTL};
