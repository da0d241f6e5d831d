//! Error types for the importer.
//!
//! The acquisition and parse layers may abort the whole import; every
//! post-parse transform is best-effort and reports through the import
//! report instead of failing.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImporterError {
    /// Alias not present in the known-laws table.
    #[error("Unknown law alias: '{0}'. Pass --urn with the full LexML URN")]
    UnknownAlias(String),

    /// Neither a URN nor an alias was supplied.
    #[error("A URN (--urn) or a law alias (--lei) is required")]
    MissingUrn,

    /// HTTP transport failure (DNS, timeout, connection reset).
    #[error("Network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-200 response from the normas endpoints.
    #[error("HTTP error {status} fetching {url}")]
    Http { status: u16, url: String },

    /// Metadata listed no binary-text variant to fall back to.
    #[error("No binary-text variant available for {urn}")]
    NoVariantAvailable { urn: String },

    /// Local file could not be decoded with any of the known encodings.
    #[error("Could not decode {path} as utf-8, latin-1 or cp1252")]
    Undecodable { path: String },

    /// Every parser strategy failed or produced zero articles.
    #[error("Parsing produced no articles: {0}")]
    ParseFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ImporterError>;
