//! HTTP-based specification loader

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use super::parser::{DocumentFormat, OpenApiParser, decode_document};
use crate::generation::{GenerationError, Specification, SpecificationLoader};

/// Loads OpenAPI documents from HTTP/HTTPS URLs
#[derive(Debug, Clone)]
pub struct HttpSpecLoader {
    client: Client,
}

impl HttpSpecLoader {
    pub fn new() -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| GenerationError::LoadError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// True for `http` and `https` URLs
    pub fn handles(source: &str) -> bool {
        Url::parse(source)
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false)
    }
}

#[async_trait]
impl SpecificationLoader for HttpSpecLoader {
    async fn load(&self, source: &str) -> Result<Specification, GenerationError> {
        let url = match Url::parse(source) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url,
            _ => {
                return Err(GenerationError::LoadError(format!(
                    "HttpSpecLoader only handles HTTP(S) URLs, got: {source}"
                )));
            }
        };

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            GenerationError::LoadError(format!("Failed to fetch OpenAPI document from {source}: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::LoadError(format!(
                "HTTP {status} when fetching {source}"
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let content = response.text().await.map_err(|e| {
            GenerationError::LoadError(format!("Failed to read response body: {e}"))
        })?;

        // Content type wins over the URL extension when it names a format
        let format = match DocumentFormat::from_content_type(&content_type) {
            DocumentFormat::Unknown => DocumentFormat::from_path(url.path()),
            known => known,
        };
        let document = decode_document(&content, format)?;
        OpenApiParser::new(document).parse()
    }
}
