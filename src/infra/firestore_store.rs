use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde_json::json;
use tracing::{debug, instrument};

use crate::app::ports::CatalogStorePort;
use crate::config::StoreConfig;
use crate::constants::COVER_FIELD;
use crate::domain::RecordKey;
use crate::error::{ClientError, ConfigError, Result};

/// Firestore document store accessed through its REST API.
///
/// Updates are field-masked PATCHes that require the document to exist, so
/// only `urlCover` is ever written.
/// Config via `[store]` and env:
/// - project_id, database, collection, base_url
/// - FIRESTORE_ACCESS_TOKEN (OAuth bearer; omit for the local emulator)
///
/// The bearer is read once when the store is built and never refreshed. OAuth
/// access tokens typically expire after an hour, so a long-running `serve`
/// starts failing writes with 401 (logged as write failures) once it lapses
/// and must be restarted with a fresh token.
pub struct FirestoreStore {
    client: reqwest::Client,
    documents_url: String,
    collection: String,
    access_token: Option<String>,
}

impl FirestoreStore {
    pub fn new(settings: &StoreConfig) -> Result<Self, ConfigError> {
        let project = settings
            .project_id
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing("store.project_id".to_string()))?;

        let documents_url = format!(
            "{}/projects/{}/databases/{}/documents",
            settings.base_url.trim_end_matches('/'),
            project,
            settings.database
        );

        Ok(Self {
            client: reqwest::Client::new(),
            documents_url,
            collection: settings.collection.trim_matches('/').to_string(),
            access_token: settings.access_token.clone().filter(|t| !t.is_empty()),
        })
    }

    pub fn document_url(&self, key: &RecordKey) -> String {
        format!(
            "{}/{}/{}",
            self.documents_url,
            self.collection,
            urlencoding::encode(key.as_str())
        )
    }
}

#[async_trait]
impl CatalogStorePort for FirestoreStore {
    #[instrument(skip(self, url))]
    async fn update_cover(&self, key: &RecordKey, url: &str) -> Result<()> {
        let body = json!({
            "fields": { COVER_FIELD: { "stringValue": url } }
        });

        let mut request = self
            .client
            .patch(self.document_url(key))
            .query(&[
                ("updateMask.fieldPaths", COVER_FIELD),
                ("currentDocument.exists", "true"),
            ])
            .json(&body);
        if let Some(token) = &self.access_token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!("Firestore document {} updated", key);
        Ok(())
    }
}
