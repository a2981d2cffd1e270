// error.rs - Engine error type
//
// Nothing here is fatal to the host page. Callers at the wasm boundary log
// these and fall back to rendering nothing.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Host could not provide a drawing surface (no canvas, no 2d context).
    #[error("rendering context unavailable: {0}")]
    MissingContext(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed toml: {0}")]
    Toml(#[from] toml::de::Error),

    /// Network request failed or returned a non-success status.
    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn missing_context(what: impl Into<String>) -> Self {
        Self::MissingContext(what.into())
    }

    pub fn invalid(what: impl Into<String>) -> Self {
        Self::InvalidConfig(what.into())
    }
}
