//! JSON artifact sink: `result.json` plus a `result.log` mirror.

use std::path::PathBuf;

use async_trait::async_trait;
use lf_protocol::ResultRecord;
use serde::Deserialize;

use super::{ResultSink, SinkOutcome};
use crate::error::SinkResult;

#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactSinkConfig {
    #[serde(default = "default_json_path")]
    pub json_path: PathBuf,
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
}

fn default_json_path() -> PathBuf {
    "result.json".into()
}
fn default_log_path() -> PathBuf {
    "result.log".into()
}

impl Default for ArtifactSinkConfig {
    fn default() -> Self {
        Self {
            json_path: default_json_path(),
            log_path: default_log_path(),
        }
    }
}

pub struct ArtifactSink {
    config: ArtifactSinkConfig,
}

impl ArtifactSink {
    pub fn new(config: ArtifactSinkConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ResultSink for ArtifactSink {
    async fn publish(&self, _row_id: Option<&str>, record: &ResultRecord) -> SinkResult<SinkOutcome> {
        let json = serde_json::to_string_pretty(record)?;
        tokio::fs::write(&self.config.json_path, &json).await?;
        tokio::fs::write(&self.config.log_path, &json).await?;
        tracing::info!(
            json_path = %self.config.json_path.display(),
            log_path = %self.config.log_path.display(),
            "result artifact written"
        );
        Ok(SinkOutcome::Written)
    }

    fn sink_name(&self) -> &str {
        "artifact"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lf_protocol::Resolution;

    #[tokio::test]
    async fn writes_identical_json_and_log() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ArtifactSink::new(ArtifactSinkConfig {
            json_path: dir.path().join("result.json"),
            log_path: dir.path().join("result.log"),
        });
        let record = Resolution::Exhausted.to_record("img-1");

        let outcome = sink.publish(None, &record).await.unwrap();
        assert_eq!(outcome, SinkOutcome::Written);

        let json = std::fs::read_to_string(dir.path().join("result.json")).unwrap();
        let log = std::fs::read_to_string(dir.path().join("result.log")).unwrap();
        assert_eq!(json, log);

        let parsed: ResultRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[tokio::test]
    async fn unwritable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ArtifactSink::new(ArtifactSinkConfig {
            json_path: dir.path().join("missing").join("result.json"),
            log_path: dir.path().join("result.log"),
        });
        let record = Resolution::Exhausted.to_record("img-1");
        assert!(sink.publish(None, &record).await.is_err());
    }
}
