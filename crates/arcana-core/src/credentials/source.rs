//! Configuration-store seam for credential records

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::types::ProviderCredentialRecord;

/// Errors reading credential records
#[derive(Debug, thiserror::Error)]
pub enum CredentialSourceError {
    #[error("Credential source unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse credential records: {0}")]
    Parse(String),
}

pub type CredentialSourceResult<T> = Result<T, CredentialSourceError>;

/// Read access to the persistent configuration store
///
/// Implementations:
/// - `MemoryCredentialSource`: in-memory, for tests and embedding
/// - `FileCredentialSource`: YAML list of records
/// - host adapters over a document store
///
/// The store is treated as eventually consistent and possibly unreachable.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// All records with `is_active = true`
    async fn active_records(&self) -> CredentialSourceResult<Vec<ProviderCredentialRecord>>;
}

/// In-memory credential source
///
/// Counts reads and can be switched to fail, which makes cache behaviour and
/// store outages observable in tests.
#[derive(Debug, Default)]
pub struct MemoryCredentialSource {
    records: RwLock<Vec<ProviderCredentialRecord>>,
    reads: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryCredentialSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<ProviderCredentialRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            ..Default::default()
        }
    }

    /// Replace all records (an admin rotating keys)
    pub fn set_records(&self, records: Vec<ProviderCredentialRecord>) {
        *self.records.write() = records;
    }

    /// Make subsequent reads fail as if the backing service were down
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `active_records` calls so far, failed ones included
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialSource for MemoryCredentialSource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn active_records(&self) -> CredentialSourceResult<Vec<ProviderCredentialRecord>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CredentialSourceError::Unavailable(
                "memory source switched off".to_string(),
            ));
        }
        Ok(self
            .records
            .read()
            .iter()
            .filter(|r| r.is_active)
            .cloned()
            .collect())
    }
}

/// Source whose reads pause until released, for tests that interleave with a read
#[cfg(test)]
pub(crate) struct GatedCredentialSource {
    records: Vec<ProviderCredentialRecord>,
    entered: tokio::sync::Notify,
    gate: tokio::sync::Notify,
}

#[cfg(test)]
impl GatedCredentialSource {
    pub(crate) fn with_records(records: Vec<ProviderCredentialRecord>) -> Self {
        Self {
            records,
            entered: tokio::sync::Notify::new(),
            gate: tokio::sync::Notify::new(),
        }
    }

    /// Wait until a read has started
    pub(crate) async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    /// Let the paused read finish
    pub(crate) fn release(&self) {
        self.gate.notify_one();
    }
}

#[cfg(test)]
#[async_trait]
impl CredentialSource for GatedCredentialSource {
    fn name(&self) -> &str {
        "gated"
    }

    async fn active_records(&self) -> CredentialSourceResult<Vec<ProviderCredentialRecord>> {
        self.entered.notify_one();
        self.gate.notified().await;
        Ok(self.records.clone())
    }
}
