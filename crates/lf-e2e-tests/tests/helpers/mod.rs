//! Shared harness: one mock server per external provider, wired into a
//! real `AppConfig` and `TieredResolver`.

#![allow(dead_code)]

use lf_protocol::Resolution;
use lf_providers::HttpClient;
use lf_resolver::config::{AppConfig, RunInputs};
use lf_resolver::pipeline;
use lf_resolver::sink::{ArtifactSinkConfig, build_sink};
use lf_resolver::{SinkConfig, TieredResolver};
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const IMAGE_ID: &str = "drive-file-42";
pub const IMAGE_BYTES: &[u8] = b"\xff\xd8\xff\xe0fake-jpeg";
pub const CORRECTOR_MODEL: &str = "corrector-test";
pub const VISION_MODEL: &str = "vision-test";

/// Mock providers plus a scratch directory for sink output.
pub struct Harness {
    pub drive: MockServer,
    pub ocr: MockServer,
    pub ollama: MockServer,
    pub plantnet: MockServer,
    pub table: MockServer,
    pub dir: TempDir,
}

impl Harness {
    pub async fn start() -> Self {
        Self {
            drive: MockServer::start().await,
            ocr: MockServer::start().await,
            ollama: MockServer::start().await,
            plantnet: MockServer::start().await,
            table: MockServer::start().await,
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    /// Config pointing every provider at its mock server, artifact sink in
    /// the scratch directory.
    pub fn config(&self) -> AppConfig {
        let mut config = AppConfig::default();
        config.timeout_secs = 2;
        config.drive.base_url = self.drive.uri();
        config.drive.api_key = Some("drive-key".into());
        config.ocr.base_url = self.ocr.uri();
        config.ocr.api_key = Some("vision-key".into());
        config.corrector.host = self.ollama.uri();
        config.corrector.model = CORRECTOR_MODEL.into();
        config.vision.host = self.ollama.uri();
        config.vision.model = VISION_MODEL.into();
        config.species.base_url = self.plantnet.uri();
        config.species.api_key = Some("pn-key".into());
        config.sink = SinkConfig::Artifact(ArtifactSinkConfig {
            json_path: self.dir.path().join("result.json"),
            log_path: self.dir.path().join("result.log"),
        });
        config
    }

    /// Same settings as `config`, written out as TOML for `pipeline::execute`.
    pub fn config_toml(&self, sink: &str) -> String {
        format!(
            r#"timeout_secs = 2

[drive]
base_url = "{drive}"
api_key = "drive-key"

[ocr]
base_url = "{ocr}"
api_key = "vision-key"

[corrector]
host = "{ollama}"
model = "{CORRECTOR_MODEL}"

[vision]
host = "{ollama}"
model = "{VISION_MODEL}"

[species]
base_url = "{plantnet}"
api_key = "pn-key"

{sink}
"#,
            drive = self.drive.uri(),
            ocr = self.ocr.uri(),
            ollama = self.ollama.uri(),
            plantnet = self.plantnet.uri(),
        )
    }

    /// Write a config file into the scratch directory and return its path.
    pub fn write_config(&self, sink: &str) -> String {
        let path = self.dir.path().join("leaf-finder.toml");
        std::fs::write(&path, self.config_toml(sink)).expect("write config");
        path.display().to_string()
    }

    /// Resolve one image through the full pipeline with the artifact sink.
    pub async fn run(&self, image_name: Option<&str>) -> Resolution {
        self.run_with(self.config(), image_name).await
    }

    /// Like `run`, with a caller-adjusted configuration.
    pub async fn run_with(&self, config: AppConfig, image_name: Option<&str>) -> Resolution {
        let inputs = RunInputs {
            image_id: IMAGE_ID.into(),
            row_id: Some("i-row1".into()),
            image_name: image_name.map(String::from),
            prefetched_lookup: None,
        };
        let http = HttpClient::new(config.timeout_secs).expect("http client");
        let providers = pipeline::build_providers(&config, &http, &inputs);
        let resolver = TieredResolver::new(providers, config.hint_mode);
        let sink = build_sink(&config.sink, &http);
        pipeline::run(&resolver, sink.as_ref(), &inputs).await
    }

    /// Parsed `result.json` written by the artifact sink.
    pub fn artifact(&self) -> Value {
        let json = std::fs::read_to_string(self.dir.path().join("result.json"))
            .expect("result.json written");
        serde_json::from_str(&json).expect("result.json is JSON")
    }

    // ── Provider behaviors ───────────────────────────────────

    pub async fn drive_serves_image(&self, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/drive/v3/files/{IMAGE_ID}")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(IMAGE_BYTES))
            .expect(expected_calls)
            .mount(&self.drive)
            .await;
    }

    pub async fn drive_fails(&self, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path_regex("^/drive/v3/files/.*"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.drive)
            .await;
    }

    pub async fn ocr_reads(&self, text: &str, expected_calls: u64) {
        let body = if text.is_empty() {
            json!({ "responses": [{}] })
        } else {
            json!({ "responses": [{ "fullTextAnnotation": { "text": text } }] })
        };
        Mock::given(method("POST"))
            .and(path("/v1/images:annotate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(expected_calls)
            .mount(&self.ocr)
            .await;
    }

    pub async fn ocr_fails(&self) {
        Mock::given(method("POST"))
            .and(path("/v1/images:annotate"))
            .respond_with(ResponseTemplate::new(503).set_body_string("backend unavailable"))
            .mount(&self.ocr)
            .await;
    }

    pub async fn corrector_answers(&self, answer: &str, expected_calls: u64) {
        self.ollama_answers(CORRECTOR_MODEL, answer, expected_calls).await;
    }

    pub async fn vision_answers(&self, answer: &str, expected_calls: u64) {
        self.ollama_answers(VISION_MODEL, answer, expected_calls).await;
    }

    async fn ollama_answers(&self, model: &str, answer: &str, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({ "model": model })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": model,
                "message": { "role": "assistant", "content": answer },
                "done": true
            })))
            .expect(expected_calls)
            .mount(&self.ollama)
            .await;
    }

    pub async fn ollama_fails(&self) {
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
            .mount(&self.ollama)
            .await;
    }

    pub async fn plantnet_returns(&self, results: Value, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/v2/identify/all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": { "project": "all" },
                "results": results
            })))
            .expect(expected_calls)
            .mount(&self.plantnet)
            .await;
    }

    pub async fn plantnet_fails(&self) {
        Mock::given(method("POST"))
            .and(path("/v2/identify/all"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&self.plantnet)
            .await;
    }
}

/// One Pl@ntNet result entry.
pub fn species(name: &str, score: f64) -> Value {
    json!({
        "score": score,
        "species": {
            "scientificNameWithoutAuthor": name,
            "commonNames": []
        }
    })
}
