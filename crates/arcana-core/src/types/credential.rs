//! Credential records as stored, and credential sets as resolved

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::provider::Provider;

/// A provider credential as kept in the persistent configuration store
///
/// `provider` is the name exactly as stored, which may be a legacy alias.
/// Records are admin-managed; this crate only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCredentialRecord {
    pub provider: String,
    #[serde(alias = "encryptedKey")]
    pub encrypted_key: String,
    #[serde(default = "default_active", alias = "isActive")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl ProviderCredentialRecord {
    /// Create an active record
    pub fn new(provider: impl Into<String>, encrypted_key: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            encrypted_key: encrypted_key.into(),
            is_active: true,
        }
    }

    /// Mark the record inactive
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// The canonical provider this record belongs to, if the stored name is known
    pub fn canonical_provider(&self) -> Option<Provider> {
        Provider::from_name(&self.provider)
    }
}

/// Where a resolved key came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOrigin {
    /// Decrypted from a stored record (under the name it was stored as)
    Record { stored_name: String },
    /// Read from an environment variable
    Environment { variable: String },
}

impl fmt::Display for KeyOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyOrigin::Record { stored_name } => write!(f, "record:{}", stored_name),
            KeyOrigin::Environment { variable } => write!(f, "env:{}", variable),
        }
    }
}

#[derive(Clone)]
struct ResolvedKey {
    value: String,
    origin: KeyOrigin,
}

/// The plaintext keys usable at one instant
///
/// Built once per resolution pass and never mutated afterwards; a later
/// pass produces a new set. Providers without a usable key are simply absent.
#[derive(Clone)]
pub struct ResolvedCredentialSet {
    keys: BTreeMap<Provider, ResolvedKey>,
    resolved_at: Instant,
}

impl ResolvedCredentialSet {
    /// Start an empty set stamped with `resolved_at`
    pub fn new(resolved_at: Instant) -> Self {
        Self {
            keys: BTreeMap::new(),
            resolved_at,
        }
    }

    /// Add a key for a provider
    pub fn with_key(mut self, provider: Provider, value: impl Into<String>, origin: KeyOrigin) -> Self {
        self.keys.insert(
            provider,
            ResolvedKey {
                value: value.into(),
                origin,
            },
        );
        self
    }

    /// Plaintext key for a provider
    pub fn key(&self, provider: Provider) -> Option<&str> {
        self.keys.get(&provider).map(|k| k.value.as_str())
    }

    /// Where the provider's key came from
    pub fn source(&self, provider: Provider) -> Option<&KeyOrigin> {
        self.keys.get(&provider).map(|k| &k.origin)
    }

    /// Providers with a key, in priority order
    pub fn providers(&self) -> impl Iterator<Item = Provider> + '_ {
        self.keys.keys().copied()
    }

    /// `(provider, key)` pairs in priority order
    pub fn iter(&self) -> impl Iterator<Item = (Provider, &str)> + '_ {
        self.keys.iter().map(|(p, k)| (*p, k.value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn resolved_at(&self) -> Instant {
        self.resolved_at
    }

    /// Whether the set may still be served at `now` under `ttl`
    ///
    /// Fresh strictly before `resolved_at + ttl`; stale at that instant and after.
    pub fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.resolved_at) < ttl
    }
}

// Keys are redacted; only providers and origins are printed
impl fmt::Debug for ResolvedCredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let origins: BTreeMap<&str, String> = self
            .keys
            .iter()
            .map(|(p, k)| (p.as_str(), k.origin.to_string()))
            .collect();
        f.debug_struct("ResolvedCredentialSet")
            .field("keys", &origins)
            .field("resolved_at", &self.resolved_at)
            .finish()
    }
}
