use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::app::ports::CatalogStorePort;
use crate::domain::{CatalogRecord, RecordKey};
use crate::error::Result;

/// In-memory catalog for development and tests.
///
/// Unlike a real document store, updating a key that was never inserted
/// creates a record holding only the cover.
#[derive(Default)]
pub struct InMemoryCatalogStore {
    records: Mutex<HashMap<RecordKey, CatalogRecord>>,
    updates: Mutex<Vec<(RecordKey, String)>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, key: RecordKey, record: CatalogRecord) {
        self.records.lock().await.insert(key, record);
    }

    pub async fn get(&self, key: &RecordKey) -> Option<CatalogRecord> {
        self.records.lock().await.get(key).cloned()
    }

    /// Every cover update applied so far, in order.
    pub async fn updates(&self) -> Vec<(RecordKey, String)> {
        self.updates.lock().await.clone()
    }
}

#[async_trait]
impl CatalogStorePort for InMemoryCatalogStore {
    async fn update_cover(&self, key: &RecordKey, url: &str) -> Result<()> {
        let mut records = self.records.lock().await;
        records.entry(key.clone()).or_default().url_cover = Some(url.to_string());
        self.updates.lock().await.push((key.clone(), url.to_string()));

        debug!("Updated cover for record {}", key);
        Ok(())
    }
}
