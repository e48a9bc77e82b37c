//! Ollama `/api/chat` wire types shared by the corrector and the vision namer.

use serde::{Deserialize, Serialize};

use crate::error::{StrategyError, StrategyResult};
use crate::http::HttpClient;

/// Chat API request body.
#[derive(Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ChatOptions>,
}

/// A single message in the chat request.
#[derive(Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
    /// Base64-encoded images for multimodal models.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

impl<'a> ChatMessage<'a> {
    pub fn text(role: &'a str, content: &'a str) -> Self {
        Self {
            role,
            content,
            images: Vec::new(),
        }
    }
}

#[derive(Serialize)]
pub(crate) struct ChatOptions {
    pub temperature: f32,
}

/// Chat API response (only fields we need). Ollama reports some failures
/// as `{"error": "..."}` inside a 200 envelope.
#[derive(Deserialize)]
pub(crate) struct ChatResponse {
    message: Option<ResponseMessage>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

impl ChatResponse {
    /// Validate the envelope and return the assistant text.
    pub fn into_content(self) -> StrategyResult<String> {
        if let Some(error) = self.error {
            return Err(StrategyError::Provider(error));
        }
        self.message
            .map(|m| m.content)
            .ok_or_else(|| StrategyError::Malformed("chat response has no message".into()))
    }
}

/// POST a non-streaming chat request and return the assistant text.
pub(crate) async fn chat(
    http: &HttpClient,
    host: &str,
    request: &ChatRequest<'_>,
) -> StrategyResult<String> {
    let url = format!("{}/api/chat", host.trim_end_matches('/'));
    let response: ChatResponse = http.send_json(http.post(&url).json(request)).await?;
    response.into_content()
}
