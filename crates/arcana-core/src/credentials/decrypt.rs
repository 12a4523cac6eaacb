//! Decryption seam for stored keys

use async_trait::async_trait;

/// A stored key could not be decrypted
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Decryption failed: {0}")]
pub struct DecryptError(pub String);

/// Opaque `decrypt(ciphertext) -> plaintext` capability
///
/// The cipher is the host's choice. Each call fails independently, so one bad
/// record never affects another provider.
#[async_trait]
pub trait Decryptor: Send + Sync {
    async fn decrypt(&self, ciphertext: &str) -> Result<String, DecryptError>;
}

/// Treats stored keys as plaintext
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughDecryptor;

#[async_trait]
impl Decryptor for PassthroughDecryptor {
    async fn decrypt(&self, ciphertext: &str) -> Result<String, DecryptError> {
        Ok(ciphertext.to_string())
    }
}

/// Adapts a synchronous closure into a `Decryptor`
pub struct FnDecryptor<F> {
    f: F,
}

impl<F> FnDecryptor<F>
where
    F: Fn(&str) -> Result<String, DecryptError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> Decryptor for FnDecryptor<F>
where
    F: Fn(&str) -> Result<String, DecryptError> + Send + Sync,
{
    async fn decrypt(&self, ciphertext: &str) -> Result<String, DecryptError> {
        (self.f)(ciphertext)
    }
}
