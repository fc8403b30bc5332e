use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use tracing::{debug, instrument};

use crate::app::ports::{ArtistSearchPort, CredentialPort};
use crate::config::ProviderConfig;
use crate::constants::{GRANT_TYPE, SEARCH_LIMIT, SEARCH_TYPE};
use crate::domain::{AccessCredential, ArtistSearchResponse, TokenResponse};
use crate::error::{ClientError, ConfigError, Result};

/// reqwest-backed client for the music catalog provider: token exchange and artist search.
pub struct MusicApiClient {
    client: reqwest::Client,
    token_url: String,
    search_url: String,
    client_id: String,
    client_secret: String,
}

impl MusicApiClient {
    pub fn new(settings: &ProviderConfig) -> Result<Self, ConfigError> {
        let (client_id, client_secret) = settings.credentials()?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ConfigError::Invalid(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            token_url: settings.token_url.clone(),
            search_url: settings.search_url.clone(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        })
    }

    /// `Basic base64(id:secret)`
    pub fn basic_authorization(&self) -> String {
        let raw = format!("{}:{}", self.client_id, self.client_secret);
        format!("Basic {}", STANDARD.encode(raw))
    }

    /// Search URL with the artist percent-encoded component-style (spaces as `%20`).
    pub fn search_url_for(&self, artist: &str) -> String {
        let separator = if self.search_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}q={}&type={}&limit={}",
            self.search_url,
            separator,
            urlencoding::encode(artist),
            SEARCH_TYPE,
            SEARCH_LIMIT
        )
    }
}

/// Read the body and turn non-2xx answers into `ClientError::Status`.
async fn success_body(resp: reqwest::Response) -> Result<String> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(ClientError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

#[async_trait]
impl CredentialPort for MusicApiClient {
    #[instrument(skip(self))]
    async fn acquire_token(&self) -> Result<AccessCredential> {
        let resp = self
            .client
            .post(&self.token_url)
            .header(AUTHORIZATION, self.basic_authorization())
            .form(&[("grant_type", GRANT_TYPE)])
            .send()
            .await?;
        let body = success_body(resp).await?;

        let token: TokenResponse = serde_json::from_str(&body)?;
        let access_token = token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ClientError::MissingField("access_token".to_string()))?;

        debug!(
            "Token acquired (type={:?}, expires_in={:?})",
            token.token_type, token.expires_in
        );
        Ok(AccessCredential::new(access_token))
    }
}

#[async_trait]
impl ArtistSearchPort for MusicApiClient {
    #[instrument(skip(self, credential))]
    async fn search_artist(
        &self,
        credential: &AccessCredential,
        artist: &str,
    ) -> Result<ArtistSearchResponse> {
        let resp = self
            .client
            .get(self.search_url_for(artist))
            .header(AUTHORIZATION, credential.bearer())
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let body = success_body(resp).await?;
        Ok(serde_json::from_str(&body)?)
    }
}
