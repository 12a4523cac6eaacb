//! Core trait for secret lookup

/// Trait for read-only secret lookup
///
/// The credential store consults one of these, variable by variable, when a
/// provider has no usable stored key.
///
/// # Example
///
/// ```
/// use arcana_core::secrets::{SecretStore, MemorySecretStore};
///
/// let store = MemorySecretStore::new();
/// store.insert("OPENAI_API_KEY", "sk-test");
/// assert_eq!(store.get("OPENAI_API_KEY"), Some("sk-test".to_string()));
/// ```
pub trait SecretStore: Send + Sync {
    /// Human-readable name of this store
    fn name(&self) -> &str;

    /// Retrieve a secret by key; empty values count as absent
    fn get(&self, key: &str) -> Option<String>;

    /// Check if a secret exists
    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}
