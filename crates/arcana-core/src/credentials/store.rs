//! Per-provider credential resolution with environment fallback

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use super::decrypt::Decryptor;
use super::source::CredentialSource;
use crate::logging::SharedLogger;
use crate::secrets::SecretStore;
use crate::types::{KeyOrigin, Provider, ProviderCredentialRecord, ResolvedCredentialSet};
use crate::{log_debug, log_info, log_warn};

/// Resolves the plaintext key for every known provider
///
/// For each provider, in priority order:
/// 1. stored records under the canonical name, then under each alias, decrypted
/// 2. the provider's environment variables, in order
/// 3. otherwise the provider is absent
///
/// Nothing here fails outward. An unreachable source means environment-only
/// resolution; a record that fails to decrypt falls through to the next
/// candidate.
pub struct CredentialStore {
    source: Arc<dyn CredentialSource>,
    decryptor: Arc<dyn Decryptor>,
    fallback: Arc<dyn SecretStore>,
    env_vars: BTreeMap<Provider, Vec<String>>,
    logger: SharedLogger,
}

impl CredentialStore {
    pub fn new(
        source: Arc<dyn CredentialSource>,
        decryptor: Arc<dyn Decryptor>,
        fallback: Arc<dyn SecretStore>,
        logger: SharedLogger,
    ) -> Self {
        Self {
            source,
            decryptor,
            fallback,
            env_vars: BTreeMap::new(),
            logger,
        }
    }

    /// Replace the fallback variable names for one provider
    pub fn with_env_vars(mut self, provider: Provider, vars: Vec<String>) -> Self {
        self.env_vars.insert(provider, vars);
        self
    }

    /// Fallback variable names for a provider, in lookup order
    pub fn env_vars_for(&self, provider: Provider) -> Vec<String> {
        match self.env_vars.get(&provider) {
            Some(vars) => vars.clone(),
            None => provider.default_env_vars().iter().map(|v| v.to_string()).collect(),
        }
    }

    /// Resolve now, stamped with the current instant
    pub async fn resolve(&self) -> ResolvedCredentialSet {
        self.resolve_at(Instant::now()).await
    }

    /// Resolve and stamp the result with `resolved_at`
    pub async fn resolve_at(&self, resolved_at: Instant) -> ResolvedCredentialSet {
        let records = match self.source.active_records().await {
            Ok(records) => records,
            Err(err) => {
                log_warn!(
                    self.logger,
                    "Credential source '{}' unavailable, resolving from environment only: {}",
                    self.source.name(),
                    err
                );
                Vec::new()
            }
        };

        let mut resolved = ResolvedCredentialSet::new(resolved_at);
        for provider in Provider::ALL {
            match self.resolve_provider(provider, &records).await {
                Some((key, origin)) => {
                    log_debug!(self.logger, "{}: key from {}", provider, origin);
                    resolved = resolved.with_key(provider, key, origin);
                }
                None => log_debug!(self.logger, "{}: no usable key", provider),
            }
        }

        log_info!(
            self.logger,
            "Resolved credentials for {} of {} providers",
            resolved.len(),
            Provider::ALL.len()
        );
        resolved
    }

    async fn resolve_provider(
        &self,
        provider: Provider,
        records: &[ProviderCredentialRecord],
    ) -> Option<(String, KeyOrigin)> {
        let mut candidates: Vec<&ProviderCredentialRecord> = records
            .iter()
            .filter(|r| r.is_active && r.canonical_provider() == Some(provider))
            .collect();
        // Stable sort keeps store order among records of the same kind
        candidates.sort_by_key(|r| !provider.is_canonical_name(&r.provider));

        for record in candidates {
            match self.decryptor.decrypt(&record.encrypted_key).await {
                Ok(plaintext) => {
                    let key = plaintext.trim();
                    if key.is_empty() {
                        log_warn!(self.logger, "Stored key for '{}' decrypted to an empty value", record.provider);
                        continue;
                    }
                    return Some((
                        key.to_string(),
                        KeyOrigin::Record {
                            stored_name: record.provider.clone(),
                        },
                    ));
                }
                Err(err) => {
                    log_warn!(self.logger, "Could not decrypt stored key for '{}': {}", record.provider, err);
                }
            }
        }

        for variable in self.env_vars_for(provider) {
            if let Some(value) = self.fallback.get(&variable) {
                return Some((value, KeyOrigin::Environment { variable }));
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{DecryptError, FnDecryptor, MemoryCredentialSource, PassthroughDecryptor};
    use crate::logging::{LogLevel, MemoryLogger};
    use crate::secrets::MemorySecretStore;

    fn envelope_decryptor() -> Arc<dyn Decryptor> {
        Arc::new(FnDecryptor::new(|c: &str| {
            c.strip_prefix("enc:")
                .map(str::to_string)
                .ok_or_else(|| DecryptError("not an envelope".to_string()))
        }))
    }

    fn store_with(
        records: Vec<ProviderCredentialRecord>,
        env: &[(&str, &str)],
    ) -> (CredentialStore, Arc<MemoryCredentialSource>, Arc<MemoryLogger>) {
        let source = Arc::new(MemoryCredentialSource::with_records(records));
        let logger = Arc::new(MemoryLogger::new());
        let fallback = Arc::new(MemorySecretStore::with_secrets(env.iter().copied()));
        let store = CredentialStore::new(source.clone(), envelope_decryptor(), fallback, logger.clone());
        (store, source, logger)
    }

    #[tokio::test]
    async fn test_record_preferred_over_env() {
        let (store, _, _) = store_with(
            vec![ProviderCredentialRecord::new("openai", "enc:sk-stored")],
            &[("OPENAI_API_KEY", "sk-env")],
        );

        let set = store.resolve().await;
        assert_eq!(set.key(Provider::OpenAi), Some("sk-stored"));
        assert_eq!(set.source(Provider::OpenAi).unwrap().to_string(), "record:openai");
    }

    #[tokio::test]
    async fn test_missing_record_falls_back_to_env() {
        let (store, _, _) = store_with(vec![], &[("ANTHROPIC_API_KEY", "sk-ant")]);

        let set = store.resolve().await;
        assert_eq!(set.len(), 1);
        assert_eq!(set.key(Provider::Anthropic), Some("sk-ant"));
        assert_eq!(set.key(Provider::Gemini), None);
    }

    #[tokio::test]
    async fn test_decrypt_failure_falls_back_to_env_and_logs() {
        let (store, _, logger) = store_with(
            vec![ProviderCredentialRecord::new("openai", "corrupted")],
            &[("OPENAI_API_KEY", "sk-env")],
        );

        let set = store.resolve().await;
        assert_eq!(set.key(Provider::OpenAi), Some("sk-env"));
        assert_eq!(set.source(Provider::OpenAi).unwrap().to_string(), "env:OPENAI_API_KEY");
        assert!(logger.contains(LogLevel::Warn, "Could not decrypt stored key for 'openai'"));
    }

    #[tokio::test]
    async fn test_decrypt_failure_without_env_leaves_provider_absent() {
        let (store, _, _) = store_with(vec![ProviderCredentialRecord::new("openai", "corrupted")], &[]);
        assert!(store.resolve().await.is_empty());
    }

    #[tokio::test]
    async fn test_legacy_alias_fills_canonical_slot() {
        let (store, _, _) = store_with(
            vec![ProviderCredentialRecord::new("googleai", "enc:g-legacy")],
            &[("GEMINI_API_KEY", "g-env")],
        );

        let set = store.resolve().await;
        assert_eq!(set.key(Provider::Gemini), Some("g-legacy"));
        assert_eq!(set.source(Provider::Gemini).unwrap().to_string(), "record:googleai");
    }

    #[tokio::test]
    async fn test_canonical_record_beats_alias_record() {
        let (store, _, _) = store_with(
            vec![
                ProviderCredentialRecord::new("googleai", "enc:g-legacy"),
                ProviderCredentialRecord::new("gemini", "enc:g-current"),
            ],
            &[],
        );
        assert_eq!(store.resolve().await.key(Provider::Gemini), Some("g-current"));
    }

    #[tokio::test]
    async fn test_alias_used_when_canonical_fails_to_decrypt() {
        let (store, _, _) = store_with(
            vec![
                ProviderCredentialRecord::new("gemini", "corrupted"),
                ProviderCredentialRecord::new("googleai", "enc:g-legacy"),
            ],
            &[("GEMINI_API_KEY", "g-env")],
        );
        assert_eq!(store.resolve().await.key(Provider::Gemini), Some("g-legacy"));
    }

    #[tokio::test]
    async fn test_inactive_records_ignored() {
        let source = Arc::new(MemoryCredentialSource::new());
        let fallback = Arc::new(MemorySecretStore::with_secrets([("OPENAI_API_KEY", "sk-env")]));
        let store = CredentialStore::new(
            source.clone(),
            Arc::new(PassthroughDecryptor),
            fallback,
            Arc::new(MemoryLogger::new()),
        );
        source.set_records(vec![ProviderCredentialRecord::new("openai", "sk-old").inactive()]);

        assert_eq!(store.resolve().await.key(Provider::OpenAi), Some("sk-env"));
    }

    #[tokio::test]
    async fn test_unreachable_source_degrades_to_env_only() {
        let (store, source, logger) = store_with(
            vec![ProviderCredentialRecord::new("openai", "enc:sk-stored")],
            &[("GEMINI_API_KEY", "g-env"), ("OPENAI_API_KEY", "sk-env")],
        );
        source.set_unavailable(true);

        let set = store.resolve().await;
        assert_eq!(set.key(Provider::Gemini), Some("g-env"));
        assert_eq!(set.key(Provider::OpenAi), Some("sk-env"));
        assert!(logger.contains(LogLevel::Warn, "resolving from environment only"));
    }

    #[tokio::test]
    async fn test_env_var_override_and_order() {
        let (store, _, _) = store_with(
            vec![],
            &[("GOOGLE_API_KEY", "g-second"), ("TAROT_GEMINI", "g-custom")],
        );
        let set = store.resolve().await;
        assert_eq!(set.key(Provider::Gemini), Some("g-second"));

        let store = store.with_env_vars(Provider::Gemini, vec!["TAROT_GEMINI".to_string()]);
        let set = store.resolve().await;
        assert_eq!(set.key(Provider::Gemini), Some("g-custom"));
    }

    #[tokio::test]
    async fn test_empty_decrypted_key_is_skipped() {
        let (store, _, logger) = store_with(
            vec![ProviderCredentialRecord::new("anthropic", "enc:   ")],
            &[],
        );
        assert!(store.resolve().await.key(Provider::Anthropic).is_none());
        assert!(logger.contains(LogLevel::Warn, "empty value"));
    }

    #[tokio::test]
    async fn test_resolved_keys_never_logged() {
        let (store, _, logger) = store_with(
            vec![ProviderCredentialRecord::new("openai", "enc:sk-secret-123")],
            &[],
        );
        store.resolve().await;
        assert!(logger.entries().iter().all(|(_, m)| !m.contains("sk-secret-123")));
    }
}
