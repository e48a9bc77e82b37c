//! Hint correction through a local Ollama model.
//!
//! The model receives a noisy hint (a file name or OCR output) and must
//! answer with a canonical scientific name or the bare word `Unknown`.

use async_trait::async_trait;
use lf_protocol::{Hint, HintOrigin};
use serde::Deserialize;

use crate::error::StrategyResult;
use crate::http::HttpClient;
use crate::ollama::{self, ChatMessage, ChatOptions, ChatRequest};
use crate::HintCorrector;

const SYSTEM_PROMPT: &str = r#"You are a botanical name normalizer. You receive a short, noisy text hint taken from a plant photo: either its file name or text read from the picture by OCR. It may contain typos, underscores, common names, or unrelated words.

If the hint clearly refers to a plant, reply with ONLY its accepted scientific name (genus and species, e.g. "Monstera deliciosa"). No punctuation, no explanation, no quotes.

If the hint does not identify a plant with confidence, reply with exactly: Unknown"#;

/// Configuration for the correction endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CorrectorConfig {
    /// Ollama HTTP API base URL.
    #[serde(default = "default_host")]
    pub host: String,
    /// Text model used for correction.
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_host() -> String {
    "http://localhost:11434".into()
}
fn default_model() -> String {
    "llama3.2:3b".into()
}

impl Default for CorrectorConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            model: default_model(),
        }
    }
}

/// Client for the Ollama-backed hint corrector.
pub struct OllamaCorrector {
    http: HttpClient,
    config: CorrectorConfig,
}

impl OllamaCorrector {
    pub fn new(http: HttpClient, config: CorrectorConfig) -> Self {
        Self { http, config }
    }
}

fn user_prompt(hint: &Hint) -> String {
    let origin = match hint.origin() {
        HintOrigin::Filename => "file name",
        HintOrigin::Ocr => "OCR text",
    };
    format!("Hint ({origin}): {}", hint.text())
}

#[async_trait]
impl HintCorrector for OllamaCorrector {
    async fn correct(&self, hint: &Hint) -> StrategyResult<String> {
        let prompt = user_prompt(hint);
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage::text("system", SYSTEM_PROMPT),
                ChatMessage::text("user", &prompt),
            ],
            stream: false,
            options: Some(ChatOptions { temperature: 0.0 }),
        };

        let answer = ollama::chat(&self.http, &self.config.host, &request).await?;
        tracing::debug!(hint = %hint.text(), answer = %answer, "corrector answered");
        Ok(answer)
    }

    fn provider_name(&self) -> &str {
        "ollama-corrector"
    }
}
