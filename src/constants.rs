/// Endpoint and naming constants shared across the crate.
/// Defaults here can be overridden through `config.toml`.

// Music catalog provider
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_SEARCH_URL: &str = "https://api.spotify.com/v1/search";
pub const GRANT_TYPE: &str = "client_credentials";
pub const SEARCH_TYPE: &str = "artist";
pub const SEARCH_LIMIT: u32 = 1;

// Document store
pub const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";
pub const DEFAULT_DATABASE: &str = "(default)";
pub const DEFAULT_COLLECTION: &str = "songs";
pub const COVER_FIELD: &str = "urlCover";

// Service
pub const SERVICE_NAME: &str = "cover-enricher";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

// Environment overrides
pub const ENV_CLIENT_ID: &str = "MUSIC_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "MUSIC_CLIENT_SECRET";
pub const ENV_FIRESTORE_TOKEN: &str = "FIRESTORE_ACCESS_TOKEN";
pub const ENV_PORT: &str = "PORT";
