use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::app::ports::{ArtistSearchPort, CatalogStorePort, CredentialPort};
use crate::domain::{AccessCredential, CatalogRecord, CoverImage, RecordKey};
use crate::error::{EnrichError, SearchFailure};
use crate::observability::EnrichMetrics;

/// Use case for decorating a newly created song record with its artist's cover image.
///
/// One invocation runs: validate artist -> acquire token -> search -> write.
/// Every step returns a typed error and the first failure stops the pipeline.
/// Nothing is shared between invocations, so concurrent calls are independent.
pub struct EnrichUseCase {
    credentials: Arc<dyn CredentialPort>,
    search: Arc<dyn ArtistSearchPort>,
    store: Arc<dyn CatalogStorePort>,
}

/// Result of one invocation as reported to logs and diagnostic callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EnrichOutcome {
    Written {
        key: RecordKey,
        #[serde(rename = "urlCover")]
        url_cover: String,
    },
    Skipped {
        key: RecordKey,
        reason: &'static str,
        detail: String,
    },
}

impl EnrichOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, EnrichOutcome::Written { .. })
    }
}

impl EnrichUseCase {
    pub fn new(
        credentials: Arc<dyn CredentialPort>,
        search: Arc<dyn ArtistSearchPort>,
        store: Arc<dyn CatalogStorePort>,
    ) -> Self {
        Self {
            credentials,
            search,
            store,
        }
    }

    /// Handle a record-creation event. Failures are logged and absorbed.
    pub async fn handle_created(&self, key: &RecordKey, snapshot: &CatalogRecord) -> EnrichOutcome {
        let span = info_span!("enrich", key = %key, invocation = %Uuid::new_v4());
        async move {
            EnrichMetrics::invocation();
            let artist = snapshot.artist_name().unwrap_or_default();
            match self.run(key, snapshot).await {
                Ok(cover) => EnrichOutcome::Written {
                    key: key.clone(),
                    url_cover: cover.url,
                },
                Err(e) => {
                    log_failure(artist, &e);
                    EnrichOutcome::Skipped {
                        key: key.clone(),
                        reason: e.kind(),
                        detail: e.to_string(),
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Run the full pipeline and return the cover that was written.
    pub async fn run(&self, key: &RecordKey, snapshot: &CatalogRecord) -> Result<CoverImage, EnrichError> {
        let artist = snapshot.artist_name().ok_or(EnrichError::MissingInput)?;
        info!("Searching cover image for artist: {}", artist);

        let cover = self.lookup_cover(artist).await?;
        info!("Cover image found: {}", cover.url);

        self.write_cover(key, &cover).await?;
        Ok(cover)
    }

    /// Token exchange followed by the artist search, without touching the store.
    pub async fn lookup_cover(&self, artist: &str) -> Result<CoverImage, EnrichError> {
        if artist.trim().is_empty() {
            return Err(EnrichError::MissingInput);
        }
        let credential = self.acquire_credential().await?;
        self.search_cover(&credential, artist.trim()).await
    }

    async fn acquire_credential(&self) -> Result<AccessCredential, EnrichError> {
        self.credentials
            .acquire_token()
            .await
            .map_err(EnrichError::CredentialFailure)
    }

    async fn search_cover(
        &self,
        credential: &AccessCredential,
        artist: &str,
    ) -> Result<CoverImage, EnrichError> {
        let response = self
            .search
            .search_artist(credential, artist)
            .await
            .map_err(SearchFailure::Request)?;

        let top = response.first_artist().ok_or(SearchFailure::NoArtist)?;
        let url = top.first_image_url().ok_or(SearchFailure::NoImages)?;

        Ok(CoverImage {
            url: url.to_string(),
            artist_id: top.id.clone(),
            matched_name: top.name.clone(),
        })
    }

    async fn write_cover(&self, key: &RecordKey, cover: &CoverImage) -> Result<(), EnrichError> {
        match self.store.update_cover(key, &cover.url).await {
            Ok(()) => {
                EnrichMetrics::cover_written();
                info!("Record updated with cover {}", cover.url);
                Ok(())
            }
            Err(e) => Err(EnrichError::WriteFailure(e)),
        }
    }
}

fn log_failure(artist: &str, err: &EnrichError) {
    match err {
        EnrichError::MissingInput => {
            EnrichMetrics::skipped_missing_artist();
            info!("Artist name not found; nothing to enrich");
        }
        EnrichError::CredentialFailure(e) => {
            EnrichMetrics::credential_failure();
            error!(artist = %artist, "Could not obtain access token, stopping: {}", e);
        }
        EnrichError::SearchFailure(SearchFailure::NoArtist | SearchFailure::NoImages) => {
            EnrichMetrics::no_cover();
            info!(artist = %artist, "No cover image found for {}: {}", artist, err);
        }
        EnrichError::SearchFailure(SearchFailure::Request(e)) => {
            EnrichMetrics::search_failure();
            error!(artist = %artist, "Error contacting music API: {}", e);
        }
        EnrichError::WriteFailure(e) => {
            EnrichMetrics::write_failure();
            error!(artist = %artist, "Failed to write cover: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ArtistSearchResponse;
    use crate::error::{ClientError, Result};
    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::Mutex;

    type CallLog = Arc<Mutex<Vec<String>>>;

    struct MockCredentials {
        calls: CallLog,
        token: Option<&'static str>,
    }

    #[async_trait]
    impl CredentialPort for MockCredentials {
        async fn acquire_token(&self) -> Result<AccessCredential> {
            self.calls.lock().await.push("token".to_string());
            match self.token {
                Some(t) => Ok(AccessCredential::new(t)),
                None => Err(ClientError::Status {
                    status: 400,
                    body: r#"{"error":"invalid_client"}"#.to_string(),
                }),
            }
        }
    }

    struct MockSearch {
        calls: CallLog,
        body: Option<serde_json::Value>,
    }

    #[async_trait]
    impl ArtistSearchPort for MockSearch {
        async fn search_artist(
            &self,
            credential: &AccessCredential,
            artist: &str,
        ) -> Result<ArtistSearchResponse> {
            self.calls
                .lock()
                .await
                .push(format!("search:{}:{}", credential.secret(), artist));
            match &self.body {
                Some(body) => Ok(serde_json::from_value(body.clone())?),
                None => Err(ClientError::Status {
                    status: 503,
                    body: String::new(),
                }),
            }
        }
    }

    struct MockStore {
        calls: CallLog,
        fail: bool,
    }

    #[async_trait]
    impl CatalogStorePort for MockStore {
        async fn update_cover(&self, key: &RecordKey, url: &str) -> Result<()> {
            self.calls.lock().await.push(format!("write:{}:{}", key, url));
            if self.fail {
                return Err(ClientError::Store("permission denied".to_string()));
            }
            Ok(())
        }
    }

    fn use_case(
        token: Option<&'static str>,
        search_body: Option<serde_json::Value>,
        store_fails: bool,
    ) -> (EnrichUseCase, CallLog) {
        let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
        let uc = EnrichUseCase::new(
            Arc::new(MockCredentials {
                calls: calls.clone(),
                token,
            }),
            Arc::new(MockSearch {
                calls: calls.clone(),
                body: search_body,
            }),
            Arc::new(MockStore {
                calls: calls.clone(),
                fail: store_fails,
            }),
        );
        (uc, calls)
    }

    fn two_images() -> serde_json::Value {
        json!({
            "artists": { "items": [{
                "id": "4tZwfgrHOc3mvqYlEYSvVi",
                "name": "Daft Punk",
                "images": [
                    { "url": "https://img/a.jpg" },
                    { "url": "https://img/b.jpg" }
                ]
            }]}
        })
    }

    #[tokio::test]
    async fn writes_first_image_of_first_artist() {
        let (uc, calls) = use_case(Some("T1"), Some(two_images()), false);
        let key = RecordKey::new("song-1");

        let outcome = uc
            .handle_created(&key, &CatalogRecord::with_artist("Daft Punk"))
            .await;

        assert_eq!(
            outcome,
            EnrichOutcome::Written {
                key: key.clone(),
                url_cover: "https://img/a.jpg".to_string()
            }
        );
        assert_eq!(
            *calls.lock().await,
            vec![
                "token".to_string(),
                "search:T1:Daft Punk".to_string(),
                "write:song-1:https://img/a.jpg".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn missing_artist_makes_no_calls() {
        let (uc, calls) = use_case(Some("T1"), Some(two_images()), false);

        for record in [CatalogRecord::default(), CatalogRecord::with_artist("")] {
            let outcome = uc.handle_created(&RecordKey::new("song-2"), &record).await;
            assert!(matches!(
                outcome,
                EnrichOutcome::Skipped { reason: "missing_input", .. }
            ));
        }
        assert!(calls.lock().await.is_empty());
    }

    #[tokio::test]
    async fn token_failure_stops_before_search() {
        let (uc, calls) = use_case(None, Some(two_images()), false);

        let outcome = uc
            .handle_created(&RecordKey::new("song-3"), &CatalogRecord::with_artist("Daft Punk"))
            .await;

        assert!(matches!(
            outcome,
            EnrichOutcome::Skipped { reason: "credential_failure", .. }
        ));
        assert_eq!(*calls.lock().await, vec!["token".to_string()]);
    }

    #[tokio::test]
    async fn empty_search_result_does_not_write() {
        let (uc, calls) = use_case(Some("T1"), Some(json!({ "artists": { "items": [] } })), false);

        let result = uc
            .run(&RecordKey::new("song-4"), &CatalogRecord::with_artist("Unknown Artist XYZ"))
            .await;

        assert!(matches!(
            result,
            Err(EnrichError::SearchFailure(SearchFailure::NoArtist))
        ));
        let calls = calls.lock().await;
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|c| !c.starts_with("write")));
    }

    #[tokio::test]
    async fn artist_without_images_does_not_write() {
        let body = json!({ "artists": { "items": [{ "name": "Obscure", "images": [] }] } });
        let (uc, calls) = use_case(Some("T1"), Some(body), false);

        let result = uc
            .run(&RecordKey::new("song-5"), &CatalogRecord::with_artist("Obscure"))
            .await;

        assert!(matches!(
            result,
            Err(EnrichError::SearchFailure(SearchFailure::NoImages))
        ));
        assert!(calls.lock().await.iter().all(|c| !c.starts_with("write")));
    }

    #[tokio::test]
    async fn search_error_is_absorbed() {
        let (uc, calls) = use_case(Some("T1"), None, false);

        let outcome = uc
            .handle_created(&RecordKey::new("song-6"), &CatalogRecord::with_artist("Daft Punk"))
            .await;

        assert!(matches!(
            outcome,
            EnrichOutcome::Skipped { reason: "search_failure", .. }
        ));
        assert_eq!(calls.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn write_failure_is_reported() {
        let (uc, calls) = use_case(Some("T1"), Some(two_images()), true);

        let outcome = uc
            .handle_created(&RecordKey::new("song-7"), &CatalogRecord::with_artist("Daft Punk"))
            .await;

        match outcome {
            EnrichOutcome::Skipped { reason, detail, .. } => {
                assert_eq!(reason, "write_failure");
                assert!(detail.contains("permission denied"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(calls.lock().await.len(), 3);
    }

    #[tokio::test]
    async fn rerunning_produces_same_write() {
        let (uc, calls) = use_case(Some("T1"), Some(two_images()), false);
        let key = RecordKey::new("song-8");
        let record = CatalogRecord::with_artist("Daft Punk");

        let first = uc.handle_created(&key, &record).await;
        let second = uc.handle_created(&key, &record).await;

        assert_eq!(first, second);
        let writes: Vec<_> = calls
            .lock()
            .await
            .iter()
            .filter(|c| c.starts_with("write"))
            .cloned()
            .collect();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0], writes[1]);
    }

    #[tokio::test]
    async fn lookup_does_not_write() {
        let (uc, calls) = use_case(Some("T1"), Some(two_images()), false);

        let cover = uc.lookup_cover("Daft Punk").await.unwrap();

        assert_eq!(cover.url, "https://img/a.jpg");
        assert_eq!(cover.matched_name.as_deref(), Some("Daft Punk"));
        assert!(calls.lock().await.iter().all(|c| !c.starts_with("write")));
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let outcome = EnrichOutcome::Written {
            key: RecordKey::new("abc"),
            url_cover: "https://img/a.jpg".to_string(),
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], "written");
        assert_eq!(value["key"], "abc");
        assert_eq!(value["urlCover"], "https://img/a.jpg");
    }

    #[tokio::test]
    async fn image_list_with_missing_later_url_still_writes() {
        let body = json!({ "artists": { "items": [{ "images": [
            { "url": "https://img/a.jpg" },
            { "url": null }
        ]}]}});
        let (uc, calls) = use_case(Some("T1"), Some(body), false);

        let outcome = uc
            .handle_created(&RecordKey::new("song-9"), &CatalogRecord::with_artist("Daft Punk"))
            .await;

        assert!(outcome.is_written());
        assert_eq!(
            calls.lock().await.last().map(String::as_str),
            Some("write:song-9:https://img/a.jpg")
        );
    }

    #[tokio::test]
    async fn first_image_without_url_counts_as_no_images() {
        let body = json!({ "artists": { "items": [{ "images": [
            { "url": null },
            { "url": "https://img/b.jpg" }
        ]}]}});
        let (uc, calls) = use_case(Some("T1"), Some(body), false);

        let result = uc
            .run(&RecordKey::new("song-10"), &CatalogRecord::with_artist("Daft Punk"))
            .await;

        assert!(matches!(
            result,
            Err(EnrichError::SearchFailure(SearchFailure::NoImages))
        ));
        assert!(calls.lock().await.iter().all(|c| !c.starts_with("write")));
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn lines(&self) -> Vec<String> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    /// Run one invocation under a subscriber that writes plain-text lines into a buffer.
    fn handle_with_logs(uc: &EnrichUseCase, key: &str, record: &CatalogRecord) -> (EnrichOutcome, Vec<String>) {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();

        let key = RecordKey::new(key);
        let outcome = tracing::subscriber::with_default(subscriber, || {
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap()
                .block_on(uc.handle_created(&key, record))
        });
        (outcome, buffer.lines())
    }

    #[test]
    fn unknown_artist_logs_one_no_cover_entry() {
        let (uc, _calls) = use_case(Some("T1"), Some(json!({ "artists": { "items": [] } })), false);

        let (outcome, lines) =
            handle_with_logs(&uc, "song-11", &CatalogRecord::with_artist("Unknown Artist XYZ"));

        assert!(!outcome.is_written());
        let no_cover: Vec<_> = lines
            .iter()
            .filter(|l| l.contains("No cover image found"))
            .collect();
        assert_eq!(no_cover.len(), 1, "{:#?}", lines);
        assert!(no_cover[0].contains("Unknown Artist XYZ"));
        assert!(no_cover[0].contains("no artist matched the query"));
        assert!(lines.iter().all(|l| !l.contains("ERROR")), "{:#?}", lines);
    }

    #[test]
    fn credential_failure_logs_one_error_with_detail() {
        let (uc, _calls) = use_case(None, Some(two_images()), false);

        let (_outcome, lines) =
            handle_with_logs(&uc, "song-12", &CatalogRecord::with_artist("Daft Punk"));

        let errors: Vec<_> = lines.iter().filter(|l| l.contains("ERROR")).collect();
        assert_eq!(errors.len(), 1, "{:#?}", lines);
        assert!(errors[0].contains("Could not obtain access token"));
        assert!(errors[0].contains("artist=Daft Punk"));
        assert!(errors[0].contains("invalid_client"));
    }

    #[test]
    fn search_and_write_failures_log_errors() {
        let (uc, _calls) = use_case(Some("T1"), None, false);
        let (_outcome, lines) =
            handle_with_logs(&uc, "song-13", &CatalogRecord::with_artist("Daft Punk"));
        let errors: Vec<_> = lines.iter().filter(|l| l.contains("ERROR")).collect();
        assert_eq!(errors.len(), 1, "{:#?}", lines);
        assert!(errors[0].contains("Error contacting music API"));
        assert!(errors[0].contains("503"));

        let (uc, _calls) = use_case(Some("T1"), Some(two_images()), true);
        let (_outcome, lines) =
            handle_with_logs(&uc, "song-14", &CatalogRecord::with_artist("Daft Punk"));
        let errors: Vec<_> = lines.iter().filter(|l| l.contains("ERROR")).collect();
        assert_eq!(errors.len(), 1, "{:#?}", lines);
        assert!(errors[0].contains("Failed to write cover"));
        assert!(errors[0].contains("permission denied"));
    }

    #[test]
    fn missing_artist_logs_without_error() {
        let (uc, _calls) = use_case(Some("T1"), Some(two_images()), false);

        let (_outcome, lines) = handle_with_logs(&uc, "song-15", &CatalogRecord::default());

        assert_eq!(
            lines
                .iter()
                .filter(|l| l.contains("Artist name not found"))
                .count(),
            1
        );
        assert!(lines.iter().all(|l| !l.contains("ERROR")));
    }
}
