//! Shared HTTP plumbing: one client with a bounded per-request timeout, and
//! the status/payload checks every adapter applies before touching fields.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::{StrategyError, StrategyResult};

/// Longest slice of an error body kept in `StrategyError::Status`.
const MAX_ERROR_BODY: usize = 512;

/// reqwest client plus the timeout it was built with.
///
/// Cheap to clone; every adapter of a run shares one connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    timeout_secs: u64,
}

impl HttpClient {
    pub fn new(timeout_secs: u64) -> Result<Self, reqwest::Error> {
        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("leaf-finder/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            inner,
            timeout_secs,
        })
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    pub fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.inner.get(url)
    }

    pub fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.inner.post(url)
    }

    pub fn put(&self, url: &str) -> reqwest::RequestBuilder {
        self.inner.put(url)
    }

    /// Send a request and reject non-2xx statuses.
    pub async fn send(&self, request: reqwest::RequestBuilder) -> StrategyResult<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(|e| StrategyError::from_reqwest(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StrategyError::Status {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY),
            });
        }
        Ok(response)
    }

    /// Send a request and decode a typed JSON body.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> StrategyResult<T> {
        let response = self.send(request).await?;
        let body = response
            .text()
            .await
            .map_err(|e| StrategyError::from_reqwest(e, self.timeout_secs))?;
        decode_json(&body)
    }
}

/// Decode a provider payload, reporting schema mismatches as `Malformed`.
pub fn decode_json<T: DeserializeOwned>(body: &str) -> StrategyResult<T> {
    serde_json::from_str(body).map_err(|e| {
        StrategyError::Malformed(format!("{e} (body: {})", truncate(body, MAX_ERROR_BODY)))
    })
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
