use thiserror::Error;

/// Failures raised by the adapters that talk to the music API or the document store.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Store error: {0}")]
    Store(String),
}

/// Why the search step produced no usable cover.
#[derive(Error, Debug)]
pub enum SearchFailure {
    #[error("search request failed: {0}")]
    Request(#[source] ClientError),

    #[error("no artist matched the query")]
    NoArtist,

    #[error("artist has no images")]
    NoImages,
}

/// Every way an enrichment invocation can stop short of writing a cover.
#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("record has no artist name")]
    MissingInput,

    #[error("could not obtain access token: {0}")]
    CredentialFailure(#[source] ClientError),

    #[error(transparent)]
    SearchFailure(#[from] SearchFailure),

    #[error("could not update record: {0}")]
    WriteFailure(#[source] ClientError),
}

impl EnrichError {
    /// Stable snake_case label used in logs, metrics and JSON outcomes.
    pub fn kind(&self) -> &'static str {
        match self {
            EnrichError::MissingInput => "missing_input",
            EnrichError::CredentialFailure(_) => "credential_failure",
            EnrichError::SearchFailure(_) => "search_failure",
            EnrichError::WriteFailure(_) => "write_failure",
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Missing configuration value: {0}")]
    Missing(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
