//! Run configuration, loadable from TOML with environment overrides.
//!
//! Built once at process start and passed by reference; nothing below the
//! binary reads the process environment.

use serde::Deserialize;

use lf_providers::{CorrectorConfig, DriveConfig, OcrConfig, PlantNetConfig, VisionConfig};

use crate::error::{ConfigError, ConfigResult};
use crate::sink::{ArtifactSinkConfig, CiOutputSinkConfig, TableSinkConfig};

/// How filename and OCR hints become candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintMode {
    /// Hints go through the correction service.
    #[default]
    Corrected,
    /// Hints are accepted as-is when they pass the direct-text policy.
    Direct,
}

/// Where the resolution is published. One per deployment.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SinkConfig {
    /// JSON artifact plus mirrored log file.
    Artifact(ArtifactSinkConfig),
    /// `key=value` line for an orchestrating CI job.
    CiOutput(CiOutputSinkConfig),
    /// Cell update in a live table.
    Table(TableSinkConfig),
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self::Artifact(ArtifactSinkConfig::default())
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Per-request timeout applied to every external call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub hint_mode: HintMode,
    #[serde(default)]
    pub drive: DriveConfig,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub corrector: CorrectorConfig,
    #[serde(default)]
    pub species: PlantNetConfig,
    #[serde(default)]
    pub vision: VisionConfig,
    #[serde(default)]
    pub sink: SinkConfig,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            hint_mode: HintMode::default(),
            drive: DriveConfig::default(),
            ocr: OcrConfig::default(),
            corrector: CorrectorConfig::default(),
            species: PlantNetConfig::default(),
            vision: VisionConfig::default(),
            sink: SinkConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: &str) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()
    }

    /// A zero timeout would fail every provider call.
    fn validate(self) -> ConfigResult<Self> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::Parse(
                "timeout_secs must be at least 1".into(),
            ));
        }
        Ok(self)
    }

    /// Load from `path` when given, otherwise use defaults.
    pub fn load(path: Option<&str>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Fill secrets and deployment ids from environment-style keys.
    ///
    /// Keys: `GOOGLE_DRIVE_API_KEY`, `GOOGLE_VISION_API_KEY`,
    /// `PLANTNET_API_KEY`, `OLLAMA_HOST`, `GITHUB_OUTPUT`,
    /// `CODA_API_TOKEN`, `CODA_DOC_ID`, `CODA_TABLE_ID`. Values present in
    /// the environment win over the file.
    pub fn apply_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| non_blank(lookup(key));

        if let Some(key) = get("GOOGLE_DRIVE_API_KEY") {
            self.drive.api_key = Some(key);
        }
        if let Some(key) = get("GOOGLE_VISION_API_KEY") {
            self.ocr.api_key = Some(key);
        }
        if let Some(key) = get("PLANTNET_API_KEY") {
            self.species.api_key = Some(key);
        }
        if let Some(host) = get("OLLAMA_HOST") {
            self.corrector.host = host.clone();
            self.vision.host = host;
        }

        match &mut self.sink {
            SinkConfig::Artifact(_) => {}
            SinkConfig::CiOutput(ci) => {
                if let Some(path) = get("GITHUB_OUTPUT") {
                    ci.output_path = Some(path.into());
                }
            }
            SinkConfig::Table(table) => {
                if let Some(token) = get("CODA_API_TOKEN") {
                    table.token = Some(token);
                }
                if let Some(doc) = get("CODA_DOC_ID") {
                    table.doc_id = Some(doc);
                }
                if let Some(t) = get("CODA_TABLE_ID") {
                    table.table_id = Some(t);
                }
            }
        }
        self
    }
}

/// Per-run inputs supplied by the triggering job.
#[derive(Debug, Clone, PartialEq)]
pub struct RunInputs {
    /// Which image to fetch.
    pub image_id: String,
    /// Record the resolution is published to.
    pub row_id: Option<String>,
    /// Original file name; drives the filename tier.
    pub image_name: Option<String>,
    /// Identify response obtained upstream, used instead of a live lookup.
    pub prefetched_lookup: Option<String>,
}

impl RunInputs {
    /// Read `IMAGE_ID` (required), `ROW_ID`, `IMAGE_NAME` and `PLANTNET_RESULT`.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let image_id =
            non_blank(lookup("IMAGE_ID")).ok_or(ConfigError::MissingInput("IMAGE_ID"))?;
        Ok(Self {
            image_id,
            row_id: non_blank(lookup("ROW_ID")),
            image_name: non_blank(lookup("IMAGE_NAME")),
            prefetched_lookup: non_blank(lookup("PLANTNET_RESULT")),
        })
    }
}

/// Blank values count as unset.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
