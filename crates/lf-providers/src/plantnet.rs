//! Species identification via the Pl@ntNet `identify` API.
//!
//! Also hosts `PrefetchedLookup`, which replays an identify response that an
//! upstream job already obtained, so the tier runs without network egress.

use async_trait::async_trait;
use lf_protocol::SpeciesMatch;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::error::{StrategyError, StrategyResult};
use crate::http::{decode_json, HttpClient};
use crate::SpeciesLookup;

/// Pl@ntNet API settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PlantNetConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Flora project to search ("all" or a regional project id).
    #[serde(default = "default_project")]
    pub project: String,
    /// API key (usually injected from `PLANTNET_API_KEY`).
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_nb_results")]
    pub nb_results: u32,
    /// Language of returned common names.
    #[serde(default = "default_lang")]
    pub lang: String,
}

fn default_base_url() -> String {
    "https://my-api.plantnet.org".into()
}
fn default_project() -> String {
    "all".into()
}
fn default_nb_results() -> u32 {
    10
}
fn default_lang() -> String {
    "en".into()
}

impl Default for PlantNetConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            project: default_project(),
            api_key: None,
            nb_results: default_nb_results(),
            lang: default_lang(),
        }
    }
}

// ── Wire types ───────────────────────────────────────────────

#[derive(Deserialize)]
struct IdentifyResponse {
    /// Required: a payload without it is malformed, an empty list is "no match".
    results: Option<Vec<IdentifyResult>>,
    error: Option<String>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct IdentifyResult {
    score: f64,
    species: Species,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Species {
    scientific_name_without_author: String,
    #[serde(default)]
    common_names: Vec<String>,
}

/// Parse an identify payload and keep the highest-ranked entry.
///
/// Pl@ntNet returns results sorted by score, so the first entry wins.
pub fn parse_identify(body: &str) -> StrategyResult<Option<SpeciesMatch>> {
    let response: IdentifyResponse = decode_json(body)?;

    if let Some(error) = response.error {
        let detail = response.message.unwrap_or_default();
        return Err(StrategyError::Provider(format!("{error}: {detail}")));
    }

    let results = response
        .results
        .ok_or_else(|| StrategyError::Malformed("identify response has no results field".into()))?;

    Ok(results.into_iter().next().map(|best| SpeciesMatch {
        scientific_name: best.species.scientific_name_without_author,
        score: best.score,
        common_names: best.species.common_names,
    }))
}

/// Live Pl@ntNet client.
pub struct PlantNetLookup {
    http: HttpClient,
    config: PlantNetConfig,
}

impl PlantNetLookup {
    pub fn new(http: HttpClient, config: PlantNetConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl SpeciesLookup for PlantNetLookup {
    async fn identify(&self, image: &[u8]) -> StrategyResult<Option<SpeciesMatch>> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| StrategyError::Config("missing Pl@ntNet API key".into()))?;

        let part = Part::bytes(image.to_vec())
            .file_name("plant_image.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| StrategyError::Transport(e.to_string()))?;
        let form = Form::new().part("images", part);

        let url = format!(
            "{}/v2/identify/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.project
        );
        let nb_results = self.config.nb_results.to_string();
        let request = self
            .http
            .post(&url)
            .header("accept", "application/json")
            .query(&[
                ("include-related-images", "false"),
                ("no-reject", "false"),
                ("nb-results", nb_results.as_str()),
                ("lang", self.config.lang.as_str()),
                ("api-key", api_key),
            ])
            .multipart(form);

        let body = self
            .http
            .send(request)
            .await?
            .text()
            .await
            .map_err(|e| StrategyError::from_reqwest(e, self.http.timeout_secs()))?;

        parse_identify(&body)
    }

    fn provider_name(&self) -> &str {
        "plantnet"
    }
}

/// Replays an identify response supplied with the run inputs.
pub struct PrefetchedLookup {
    payload: String,
}

impl PrefetchedLookup {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
        }
    }
}

#[async_trait]
impl SpeciesLookup for PrefetchedLookup {
    async fn identify(&self, _image: &[u8]) -> StrategyResult<Option<SpeciesMatch>> {
        parse_identify(&self.payload)
    }

    fn provider_name(&self) -> &str {
        "plantnet-prefetched"
    }
}
