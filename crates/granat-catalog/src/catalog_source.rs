//! Data-source seam for the catalog table.

use std::time::Duration;

use async_trait::async_trait;

use crate::catalog_error::CatalogError;

/// Delivers the raw catalog table text.
///
/// One call is one bounded round-trip; implementations must not retry
/// internally past their own timeout.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Human-readable location used in log fields.
    fn location(&self) -> &str;

    /// Fetches the full table text.
    async fn fetch_table(&self) -> Result<String, CatalogError>;
}

#[derive(Debug, Clone)]
/// Configuration for [`HttpCatalogSource`].
pub struct HttpCatalogSourceConfig {
    pub url: String,
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone)]
/// Fetches the catalog table with a single HTTP GET.
pub struct HttpCatalogSource {
    http: reqwest::Client,
    url: String,
}

impl HttpCatalogSource {
    pub fn new(config: HttpCatalogSourceConfig) -> Result<Self, CatalogError> {
        let url = config.url.trim().to_string();
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("granat-catalog"),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.request_timeout_ms.max(1)))
            .build()
            .map_err(|source| CatalogError::Transport {
                url: url.clone(),
                source,
            })?;
        Ok(Self { http, url })
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    fn location(&self) -> &str {
        &self.url
    }

    async fn fetch_table(&self) -> Result<String, CatalogError> {
        let response = self
            .http
            .get(self.url.as_str())
            .send()
            .await
            .map_err(|source| CatalogError::Transport {
                url: self.url.clone(),
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::HttpStatus {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(|source| CatalogError::Body {
            url: self.url.clone(),
            source,
        })
    }
}
