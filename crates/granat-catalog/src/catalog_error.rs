//! Error types for catalog fetch and parse operations.

use thiserror::Error;

/// Errors raised while fetching or parsing the catalog table.
///
/// None of these reach a conversation: [`crate::CatalogCache`] absorbs them
/// into its stale-fallback policy and only logs them.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The request never produced a response.
    #[error("catalog request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The data source answered with a non-success status.
    #[error("catalog request to {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// The response body could not be read as text.
    #[error("catalog response body from {url} could not be decoded: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The header row is missing one of the columns the parser depends on.
    #[error("catalog table is missing required column '{column}'")]
    MissingColumn { column: &'static str },

    /// The table could not be read at all (e.g. no header row).
    #[error("catalog table is malformed: {message}")]
    MalformedTable { message: String },

    /// The table parsed but no row survived validation.
    #[error("catalog table contained no valid rows")]
    EmptyCatalog,
}

impl CatalogError {
    /// Stable reason code used in structured log fields.
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "catalog_transport_error",
            Self::HttpStatus { .. } => "catalog_http_status",
            Self::Body { .. } => "catalog_body_decode_failed",
            Self::MissingColumn { .. } => "catalog_missing_column",
            Self::MalformedTable { .. } => "catalog_malformed_table",
            Self::EmptyCatalog => "catalog_empty",
        }
    }
}
