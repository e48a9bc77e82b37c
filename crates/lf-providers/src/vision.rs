//! Last-resort naming: a multimodal Ollama model looks at the photo.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

use crate::error::StrategyResult;
use crate::http::HttpClient;
use crate::ollama::{self, ChatMessage, ChatOptions, ChatRequest};
use crate::VisionNamer;

const PROMPT: &str = "Identify the plant in this photo. Reply with ONLY its scientific name (genus and species). If you cannot tell, reply with exactly: Unknown";

/// Configuration for the vision model endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct VisionConfig {
    #[serde(default = "default_host")]
    pub host: String,
    /// A vision-capable model (e.g. llava).
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_host() -> String {
    "http://localhost:11434".into()
}
fn default_model() -> String {
    "llava:7b".into()
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            model: default_model(),
        }
    }
}

pub struct OllamaVisionNamer {
    http: HttpClient,
    config: VisionConfig,
}

impl OllamaVisionNamer {
    pub fn new(http: HttpClient, config: VisionConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl VisionNamer for OllamaVisionNamer {
    async fn name_plant(&self, image: &[u8]) -> StrategyResult<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: PROMPT,
                images: vec![STANDARD.encode(image)],
            }],
            stream: false,
            options: Some(ChatOptions { temperature: 0.0 }),
        };

        let answer = ollama::chat(&self.http, &self.config.host, &request).await?;
        tracing::debug!(answer = %answer, "vision model answered");
        Ok(answer)
    }

    fn provider_name(&self) -> &str {
        "ollama-vision"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StrategyError;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn namer_for(server: &MockServer) -> OllamaVisionNamer {
        OllamaVisionNamer::new(
            HttpClient::new(2).unwrap(),
            VisionConfig {
                host: server.uri(),
                model: "llava:7b".into(),
            },
        )
    }

    #[tokio::test]
    async fn sends_image_base64() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(serde_json::json!({
                "messages": [{ "role": "user", "images": ["AQID"] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": { "role": "assistant", "content": "Ficus lyrata" },
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let answer = namer_for(&server).name_plant(&[1, 2, 3]).await.unwrap();
        assert_eq!(answer, "Ficus lyrata");
    }

    #[tokio::test]
    async fn error_in_success_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"error": "model does not support images"})),
            )
            .mount(&server)
            .await;

        let err = namer_for(&server).name_plant(&[1, 2, 3]).await.unwrap_err();
        assert_eq!(
            err,
            StrategyError::Provider("model does not support images".into())
        );
    }

    #[test]
    fn config_defaults() {
        let config = VisionConfig::default();
        assert_eq!(config.model, "llava:7b");
        assert_eq!(config.host, "http://localhost:11434");
    }
}
