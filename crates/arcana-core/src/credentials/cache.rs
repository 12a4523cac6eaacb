//! Time-boxed cache in front of the credential store

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use super::clock::Clock;
use super::store::CredentialStore;
use crate::logging::SharedLogger;
use crate::types::ResolvedCredentialSet;
use crate::log_debug;

/// Bound on staleness after an admin rotates a key
pub const DEFAULT_CREDENTIAL_TTL: Duration = Duration::from_secs(5 * 60);

/// Serves the last resolved credential set until its TTL runs out
///
/// A set resolved at `t` is returned verbatim for calls before `t + ttl` and
/// replaced by a fresh resolution from `t + ttl` on. No lock is held while
/// resolving, so concurrent misses may each hit the store; every caller still
/// receives a complete, recent set.
///
/// `invalidate` bumps a generation counter; a resolution that started before
/// it is returned to its caller but not stored.
pub struct CredentialCache {
    store: CredentialStore,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    cached: RwLock<CacheSlot>,
    logger: SharedLogger,
}

#[derive(Default)]
struct CacheSlot {
    set: Option<Arc<ResolvedCredentialSet>>,
    generation: u64,
}

impl CredentialCache {
    pub fn new(store: CredentialStore, ttl: Duration, clock: Arc<dyn Clock>, logger: SharedLogger) -> Self {
        Self {
            store,
            ttl,
            clock,
            cached: RwLock::new(CacheSlot::default()),
            logger,
        }
    }

    /// Current credentials, resolving only when the cached set is missing or stale
    pub async fn get_credentials(&self) -> Arc<ResolvedCredentialSet> {
        let now = self.clock.now();

        let (fresh, generation) = {
            let cached = self.cached.read();
            let fresh = cached.set.as_ref().filter(|set| set.is_fresh(now, self.ttl)).cloned();
            (fresh, cached.generation)
        };
        if let Some(set) = fresh {
            return set;
        }

        log_debug!(self.logger, "Credential cache miss, resolving");
        let resolved = Arc::new(self.store.resolve_at(now).await);

        let mut cached = self.cached.write();
        if cached.generation == generation {
            cached.set = Some(Arc::clone(&resolved));
        } else {
            log_debug!(self.logger, "Cache invalidated during resolution, result not stored");
        }
        resolved
    }

    /// The cached set, fresh or not, without resolving
    pub fn peek(&self) -> Option<Arc<ResolvedCredentialSet>> {
        self.cached.read().set.clone()
    }

    /// Drop the cached set so the next call resolves again
    ///
    /// Resolutions already in flight do not repopulate the cache.
    pub fn invalidate(&self) {
        let mut cached = self.cached.write();
        cached.set = None;
        cached.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{GatedCredentialSource, ManualClock, MemoryCredentialSource, PassthroughDecryptor};
    use crate::logging::NoOpLogger;
    use crate::secrets::MemorySecretStore;
    use crate::types::{Provider, ProviderCredentialRecord};

    struct Fixture {
        cache: CredentialCache,
        source: Arc<MemoryCredentialSource>,
        clock: Arc<ManualClock>,
    }

    fn fixture() -> Fixture {
        let source = Arc::new(MemoryCredentialSource::with_records(vec![
            ProviderCredentialRecord::new("openai", "sk-1"),
        ]));
        let clock = Arc::new(ManualClock::new());
        let store = CredentialStore::new(
            source.clone(),
            Arc::new(PassthroughDecryptor),
            Arc::new(MemorySecretStore::new()),
            Arc::new(NoOpLogger),
        );
        let cache = CredentialCache::new(store, DEFAULT_CREDENTIAL_TTL, clock.clone(), Arc::new(NoOpLogger));
        Fixture { cache, source, clock }
    }

    #[tokio::test]
    async fn test_hit_within_ttl_does_not_read_store() {
        let f = fixture();

        let first = f.cache.get_credentials().await;
        f.clock.advance(Duration::from_secs(299));
        let second = f.cache.get_credentials().await;

        assert_eq!(f.source.read_count(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_expiry_triggers_exactly_one_read() {
        let f = fixture();

        f.cache.get_credentials().await;
        f.clock.advance(DEFAULT_CREDENTIAL_TTL);
        f.cache.get_credentials().await;
        assert_eq!(f.source.read_count(), 2);

        f.cache.get_credentials().await;
        assert_eq!(f.source.read_count(), 2);
    }

    #[tokio::test]
    async fn test_rotation_visible_after_expiry() {
        let f = fixture();

        assert_eq!(f.cache.get_credentials().await.key(Provider::OpenAi), Some("sk-1"));

        f.source.set_records(vec![ProviderCredentialRecord::new("openai", "sk-2")]);
        f.clock.advance(Duration::from_secs(60));
        assert_eq!(f.cache.get_credentials().await.key(Provider::OpenAi), Some("sk-1"));

        f.clock.advance(DEFAULT_CREDENTIAL_TTL);
        assert_eq!(f.cache.get_credentials().await.key(Provider::OpenAi), Some("sk-2"));
    }

    #[tokio::test]
    async fn test_fresh_set_restamped_on_refresh() {
        let f = fixture();

        let first = f.cache.get_credentials().await;
        f.clock.advance(Duration::from_secs(301));
        let second = f.cache.get_credentials().await;

        assert_eq!(second.resolved_at() - first.resolved_at(), Duration::from_secs(301));
    }

    #[tokio::test]
    async fn test_invalidate_forces_resolution() {
        let f = fixture();

        f.cache.get_credentials().await;
        assert!(f.cache.peek().is_some());

        f.cache.invalidate();
        assert!(f.cache.peek().is_none());

        f.cache.get_credentials().await;
        assert_eq!(f.source.read_count(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_during_resolution_is_not_undone() {
        let source = Arc::new(GatedCredentialSource::with_records(vec![
            ProviderCredentialRecord::new("openai", "sk-1"),
        ]));
        let store = CredentialStore::new(
            source.clone(),
            Arc::new(PassthroughDecryptor),
            Arc::new(MemorySecretStore::new()),
            Arc::new(NoOpLogger),
        );
        let cache = Arc::new(CredentialCache::new(
            store,
            DEFAULT_CREDENTIAL_TTL,
            Arc::new(ManualClock::new()),
            Arc::new(NoOpLogger),
        ));

        let in_flight = tokio::spawn({
            let cache = cache.clone();
            async move { cache.get_credentials().await }
        });
        source.wait_entered().await;
        cache.invalidate();
        source.release();

        let resolved = in_flight.await.unwrap();
        assert_eq!(resolved.key(Provider::OpenAi), Some("sk-1"));
        assert!(cache.peek().is_none());
    }
}
