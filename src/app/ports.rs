use async_trait::async_trait;

use crate::domain::{AccessCredential, ArtistSearchResponse, RecordKey};
use crate::error::Result;

/// Client-credential exchange with the music catalog provider.
#[async_trait]
pub trait CredentialPort: Send + Sync {
    async fn acquire_token(&self) -> Result<AccessCredential>;
}

/// Artist search against the music catalog provider.
#[async_trait]
pub trait ArtistSearchPort: Send + Sync {
    async fn search_artist(
        &self,
        credential: &AccessCredential,
        artist: &str,
    ) -> Result<ArtistSearchResponse>;
}

/// Partial update of a record in the document store.
#[async_trait]
pub trait CatalogStorePort: Send + Sync {
    /// Set only the cover field of the record identified by `key`.
    async fn update_cover(&self, key: &RecordKey, url: &str) -> Result<()>;
}
