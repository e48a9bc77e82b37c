//! CI output sink: appends `key=value` to the job's output file.

use std::path::PathBuf;

use async_trait::async_trait;
use lf_protocol::ResultRecord;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;

use super::{ResultSink, SinkOutcome};
use crate::error::SinkResult;

#[derive(Debug, Clone, Deserialize)]
pub struct CiOutputSinkConfig {
    /// Output file (usually `$GITHUB_OUTPUT`). None disables the sink.
    #[serde(default)]
    pub output_path: Option<PathBuf>,
    #[serde(default = "default_key")]
    pub key: String,
}

fn default_key() -> String {
    "plant_name".into()
}

impl Default for CiOutputSinkConfig {
    fn default() -> Self {
        Self {
            output_path: None,
            key: default_key(),
        }
    }
}

pub struct CiOutputSink {
    config: CiOutputSinkConfig,
}

impl CiOutputSink {
    pub fn new(config: CiOutputSinkConfig) -> Self {
        Self { config }
    }
}

/// One `key=value` line; embedded newlines would split the value.
fn output_line(key: &str, value: &str) -> String {
    let value = value.replace(['\r', '\n'], " ");
    format!("{key}={value}\n")
}

#[async_trait]
impl ResultSink for CiOutputSink {
    async fn publish(&self, _row_id: Option<&str>, record: &ResultRecord) -> SinkResult<SinkOutcome> {
        let Some(path) = &self.config.output_path else {
            return Ok(SinkOutcome::Skipped("no CI output file configured".into()));
        };

        let line = output_line(&self.config.key, record.resolution_text());
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        tracing::info!(path = %path.display(), key = %self.config.key, "CI output appended");
        Ok(SinkOutcome::Written)
    }

    fn sink_name(&self) -> &str {
        "ci_output"
    }
}
