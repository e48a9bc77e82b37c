//! Result sinks: where a computed resolution is published.
//!
//! Exactly one sink is active per deployment:
//! - `ArtifactSink`: JSON file plus identical log file
//! - `CiOutputSink`: `key=value` line for the orchestrating job
//! - `TableSink`: cell update in a live table
//!
//! A sink with missing destination settings skips and reports why; it never
//! turns an identification into a failure.

pub mod artifact;
pub mod ci_output;
pub mod table;

use async_trait::async_trait;
use lf_protocol::ResultRecord;
use lf_providers::HttpClient;

use crate::config::SinkConfig;
use crate::error::SinkResult;

pub use artifact::{ArtifactSink, ArtifactSinkConfig};
pub use ci_output::{CiOutputSink, CiOutputSinkConfig};
pub use table::{TableSink, TableSinkConfig};

/// What a sink did with the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkOutcome {
    Written,
    /// Destination not configured; nothing was written.
    Skipped(String),
}

/// Persists or publishes a resolution record.
#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn publish(&self, row_id: Option<&str>, record: &ResultRecord) -> SinkResult<SinkOutcome>;

    /// Name of this sink (for logging).
    fn sink_name(&self) -> &str;
}

/// Build the sink named in the configuration.
pub fn build_sink(config: &SinkConfig, http: &HttpClient) -> Box<dyn ResultSink> {
    match config {
        SinkConfig::Artifact(c) => Box::new(ArtifactSink::new(c.clone())),
        SinkConfig::CiOutput(c) => Box::new(CiOutputSink::new(c.clone())),
        SinkConfig::Table(c) => Box::new(TableSink::new(http.clone(), c.clone())),
    }
}
