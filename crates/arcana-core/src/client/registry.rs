//! Lazily built, process-wide AI client

use std::sync::Arc;

use parking_lot::RwLock;

use super::ai_client::AiClient;
use super::integration::{BackendIntegration, IntegrationFactory};
use crate::credentials::CredentialCache;
use crate::logging::SharedLogger;
use crate::{log_debug, log_error, log_info, log_warn};

/// Builds the `AiClient` on first use and hands out the same instance after
///
/// The build reads credentials through the cache and registers every provider
/// that has a key. When two callers race on the first build, both may build,
/// but the first client stored wins and both callers receive it.
///
/// The memoized client is not rebuilt when credentials rotate; call
/// `invalidate` to force the next `get_client` to rebuild. A build already in
/// flight when `invalidate` runs is handed to its caller but not memoized.
pub struct ClientRegistry {
    cache: Arc<CredentialCache>,
    factory: Arc<dyn IntegrationFactory>,
    slot: RwLock<ClientSlot>,
    logger: SharedLogger,
}

#[derive(Default)]
struct ClientSlot {
    client: Option<Arc<AiClient>>,
    generation: u64,
}

impl ClientRegistry {
    pub fn new(cache: Arc<CredentialCache>, factory: Arc<dyn IntegrationFactory>, logger: SharedLogger) -> Self {
        Self {
            cache,
            factory,
            slot: RwLock::new(ClientSlot::default()),
            logger,
        }
    }

    /// The shared client, building it if this is the first call
    pub async fn get_client(&self) -> Arc<AiClient> {
        let (memoized, generation) = {
            let slot = self.slot.read();
            (slot.client.clone(), slot.generation)
        };
        if let Some(client) = memoized {
            return client;
        }

        let built = Arc::new(self.build().await);

        let mut slot = self.slot.write();
        if slot.generation != generation {
            log_debug!(self.logger, "Client invalidated during build, result not memoized");
            return built;
        }
        match slot.client.as_ref() {
            Some(existing) => {
                log_debug!(self.logger, "Client already initialized by a concurrent caller");
                Arc::clone(existing)
            }
            None => {
                slot.client = Some(Arc::clone(&built));
                built
            }
        }
    }

    async fn build(&self) -> AiClient {
        let credentials = self.cache.get_credentials().await;

        let mut integrations: Vec<Arc<dyn BackendIntegration>> = Vec::new();
        for (provider, key) in credentials.iter() {
            match self.factory.register(provider, key) {
                Ok(integration) => {
                    log_info!(self.logger, "Registered {} (model: {})", provider, integration.model());
                    integrations.push(integration);
                }
                Err(e) => log_error!(self.logger, "Skipping {}: {}", provider, e),
            }
        }

        if integrations.is_empty() {
            log_warn!(
                self.logger,
                "No AI provider credentials available; client has no generation capability"
            );
        }

        AiClient::new(integrations)
    }

    pub fn is_initialized(&self) -> bool {
        self.slot.read().client.is_some()
    }

    /// Forget the memoized client; the next `get_client` rebuilds it
    pub fn invalidate(&self) {
        let mut slot = self.slot.write();
        slot.generation += 1;
        if slot.client.take().is_some() {
            log_info!(self.logger, "AI client invalidated");
        }
    }
}
