use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid manifest URL: {0}")]
    InvalidUrl(String),
}

/// Failures surfaced to the listener for a single check
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Failed to fetch manifest: {0}")]
    Network(#[from] FetchError),

    #[error("Malformed manifest: {0}")]
    MalformedManifest(String),

    #[error("Manifest entry has neither minVersionName nor minVersionCode")]
    MissingVersionField,

    #[error("Manifest response was empty")]
    NullResult,

    #[error("State store error: {0}")]
    Store(#[from] StoreError),
}
