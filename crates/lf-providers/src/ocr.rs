//! OCR via the Cloud Vision `images:annotate` endpoint (TEXT_DETECTION).

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::{StrategyError, StrategyResult};
use crate::http::HttpClient;
use crate::TextExtractor;

/// Cloud Vision settings.
#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API key (usually injected from `GOOGLE_VISION_API_KEY`).
    #[serde(default)]
    pub api_key: Option<String>,
    /// BCP-47 language hints passed to the detector.
    #[serde(default = "default_language_hints")]
    pub language_hints: Vec<String>,
}

fn default_base_url() -> String {
    "https://vision.googleapis.com".into()
}
fn default_language_hints() -> Vec<String> {
    vec!["en".into(), "la".into()]
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            language_hints: default_language_hints(),
        }
    }
}

// ── Wire types ───────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateRequest<'a> {
    requests: [ImageRequest<'a>; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageRequest<'a> {
    image: ImageContent,
    features: [Feature; 1],
    image_context: ImageContext<'a>,
}

#[derive(Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Serialize)]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageContext<'a> {
    language_hints: &'a [String],
}

#[derive(Deserialize)]
struct AnnotateResponse {
    responses: Vec<ImageResponse>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    #[serde(default)]
    text_annotations: Vec<TextAnnotation>,
    full_text_annotation: Option<FullText>,
    error: Option<ApiStatus>,
}

#[derive(Deserialize)]
struct TextAnnotation {
    #[serde(default)]
    description: String,
}

#[derive(Deserialize)]
struct FullText {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ApiStatus {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

impl AnnotateResponse {
    /// Validate the envelope and pull out the detected text.
    fn into_text(self) -> StrategyResult<String> {
        let first = self
            .responses
            .into_iter()
            .next()
            .ok_or_else(|| StrategyError::Malformed("annotate response has no entries".into()))?;

        if let Some(status) = first.error {
            return Err(StrategyError::Provider(format!(
                "vision error {}: {}",
                status.code, status.message
            )));
        }

        if let Some(full) = first.full_text_annotation {
            return Ok(full.text);
        }
        Ok(first
            .text_annotations
            .into_iter()
            .next()
            .map(|a| a.description)
            .unwrap_or_default())
    }
}

/// Cloud Vision text detector.
pub struct CloudVisionOcr {
    http: HttpClient,
    config: OcrConfig,
}

impl CloudVisionOcr {
    pub fn new(http: HttpClient, config: OcrConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl TextExtractor for CloudVisionOcr {
    async fn extract_text(&self, image: &[u8]) -> StrategyResult<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| StrategyError::Config("missing Vision API key".into()))?;

        let body = AnnotateRequest {
            requests: [ImageRequest {
                image: ImageContent {
                    content: STANDARD.encode(image),
                },
                features: [Feature {
                    kind: "TEXT_DETECTION",
                }],
                image_context: ImageContext {
                    language_hints: &self.config.language_hints,
                },
            }],
        };

        let url = format!(
            "{}/v1/images:annotate",
            self.config.base_url.trim_end_matches('/')
        );
        let response: AnnotateResponse = self
            .http
            .send_json(self.http.post(&url).query(&[("key", api_key)]).json(&body))
            .await?;

        response.into_text()
    }

    fn provider_name(&self) -> &str {
        "cloud-vision"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::decode_json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ocr_for(server: &MockServer) -> CloudVisionOcr {
        CloudVisionOcr::new(
            HttpClient::new(2).unwrap(),
            OcrConfig {
                base_url: server.uri(),
                api_key: Some("vision-key".into()),
                ..OcrConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn extracts_full_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/images:annotate"))
            .and(query_param("key", "vision-key"))
            .and(body_partial_json(serde_json::json!({
                "requests": [{ "features": [{ "type": "TEXT_DETECTION" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "responses": [{
                    "textAnnotations": [{ "description": "Calathea\norbifolia" }],
                    "fullTextAnnotation": { "text": "Calathea\norbifolia\n" }
                }]
            })))
            .mount(&server)
            .await;

        let text = ocr_for(&server).extract_text(&[9, 9, 9]).await.unwrap();
        assert_eq!(text, "Calathea\norbifolia\n");
    }

    #[tokio::test]
    async fn error_inside_200_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "responses": [{ "error": { "code": 3, "message": "Bad image data." } }]
            })))
            .mount(&server)
            .await;

        let err = ocr_for(&server).extract_text(&[0]).await.unwrap_err();
        assert_eq!(
            err,
            StrategyError::Provider("vision error 3: Bad image data.".into())
        );
    }

    #[test]
    fn no_text_detected_is_empty() {
        let resp: AnnotateResponse = decode_json(r#"{"responses": [{}]}"#).unwrap();
        assert_eq!(resp.into_text().unwrap(), "");
    }

    #[test]
    fn falls_back_to_first_annotation() {
        let resp: AnnotateResponse =
            decode_json(r#"{"responses": [{"textAnnotations": [{"description": "Aloe vera"}]}]}"#)
                .unwrap();
        assert_eq!(resp.into_text().unwrap(), "Aloe vera");
    }

    #[test]
    fn missing_responses_is_malformed() {
        assert!(decode_json::<AnnotateResponse>(r#"{"status": "ok"}"#).is_err());
        let resp: AnnotateResponse = decode_json(r#"{"responses": []}"#).unwrap();
        assert!(matches!(resp.into_text(), Err(StrategyError::Malformed(_))));
    }

    #[tokio::test]
    async fn missing_key_is_config_error() {
        let ocr = CloudVisionOcr::new(HttpClient::new(2).unwrap(), OcrConfig::default());
        let err = ocr.extract_text(&[0]).await.unwrap_err();
        assert!(matches!(err, StrategyError::Config(_)));
    }

    #[tokio::test]
    async fn connection_failure_hides_api_key() {
        let ocr = CloudVisionOcr::new(
            HttpClient::new(2).unwrap(),
            OcrConfig {
                base_url: "http://127.0.0.1:1".into(),
                api_key: Some("vision-secret-key".into()),
                ..OcrConfig::default()
            },
        );

        let err = ocr.extract_text(&[0xFF, 0xD8]).await.unwrap_err();
        assert!(matches!(err, StrategyError::Transport(_)));
        assert!(!err.to_string().contains("vision-secret-key"));
    }
}
