//! Data shapes shared by the use case, the adapters and the trigger receiver.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Opaque identifier of a catalog record inside its collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordKey(String);

impl RecordKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of a song document. Fields other than `artist` and `urlCover`
/// are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(rename = "urlCover", default, skip_serializing_if = "Option::is_none")]
    pub url_cover: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CatalogRecord {
    pub fn with_artist(artist: impl Into<String>) -> Self {
        Self {
            artist: Some(artist.into()),
            ..Self::default()
        }
    }

    /// Artist name to search for, or `None` when absent or blank.
    pub fn artist_name(&self) -> Option<&str> {
        self.artist
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Payload delivered by the change notification for a newly created record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedEvent {
    pub key: RecordKey,
    #[serde(default)]
    pub record: CatalogRecord,
}

/// Bearer token for a single invocation. Never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessCredential(String);

impl AccessCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessCredential(***)")
    }
}

/// Body returned by the token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Body returned by the search endpoint for `type=artist`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ArtistSearchResponse {
    #[serde(default)]
    pub artists: Option<ArtistPage>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ArtistPage {
    #[serde(default)]
    pub items: Option<Vec<ArtistItem>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ArtistItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<ImageDescriptor>>,
}

/// Provider lists images largest first. Only the first entry is ever read,
/// so a malformed later entry must not reject the whole response.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ImageDescriptor {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl ArtistSearchResponse {
    /// Top-ranked artist, if any.
    pub fn first_artist(&self) -> Option<&ArtistItem> {
        self.artists.as_ref()?.items.as_ref()?.first()
    }
}

impl ArtistItem {
    pub fn first_image(&self) -> Option<&ImageDescriptor> {
        self.images.as_ref()?.first()
    }

    /// URL of the highest-resolution image; `None` when that image has no usable URL.
    pub fn first_image_url(&self) -> Option<&str> {
        self.first_image()?
            .url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// Cover chosen for a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverImage {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_name: Option<String>,
}
