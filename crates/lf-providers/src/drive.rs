//! Image retrieval from Google Drive by file id.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{FetchError, FetchResult};
use crate::http::HttpClient;
use crate::ImageSource;

/// Drive API settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveConfig {
    /// API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API key (usually injected from `GOOGLE_DRIVE_API_KEY`).
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_base_url() -> String {
    "https://www.googleapis.com".into()
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
        }
    }
}

/// Downloads file content via `files/{id}?alt=media`.
pub struct DriveImageSource {
    http: HttpClient,
    config: DriveConfig,
}

impl DriveImageSource {
    pub fn new(http: HttpClient, config: DriveConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl ImageSource for DriveImageSource {
    async fn fetch(&self, image_id: &str) -> FetchResult<Vec<u8>> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| FetchError::Config("missing Drive API key".into()))?;

        let url = format!(
            "{}/drive/v3/files/{image_id}",
            self.config.base_url.trim_end_matches('/')
        );
        tracing::info!(image_id, "downloading image");

        let response = self
            .http
            .get(&url)
            .query(&[("alt", "media"), ("key", api_key)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(FetchError::Empty(image_id.to_string()));
        }
        tracing::debug!(image_id, size = bytes.len(), "image downloaded");
        Ok(bytes.to_vec())
    }
}
