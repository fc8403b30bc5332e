pub mod firestore_store;
pub mod http_client;
pub mod memory_store;

use std::sync::Arc;

use crate::app::ports::CatalogStorePort;
use crate::app::EnrichUseCase;
use crate::config::{Config, StoreBackend};
use crate::error::ConfigError;

pub use firestore_store::FirestoreStore;
pub use http_client::MusicApiClient;
pub use memory_store::InMemoryCatalogStore;

/// Store adapter selected by `[store].backend`.
pub fn catalog_store_from_config(config: &Config) -> Result<Arc<dyn CatalogStorePort>, ConfigError> {
    Ok(match config.store.backend {
        StoreBackend::Memory => Arc::new(InMemoryCatalogStore::new()),
        StoreBackend::Firestore => Arc::new(FirestoreStore::new(&config.store)?),
    })
}

/// Wire the use case with the reqwest provider client and the given store.
pub fn enrich_use_case(
    config: &Config,
    store: Arc<dyn CatalogStorePort>,
) -> Result<EnrichUseCase, ConfigError> {
    let api = Arc::new(MusicApiClient::new(&config.provider)?);
    Ok(EnrichUseCase::new(api.clone(), api, store))
}
