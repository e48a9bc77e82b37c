//! Table sink: writes the resolution into one column of a table row
//! (Coda-style `PUT /docs/{doc}/tables/{table}/rows/{row}`).

use async_trait::async_trait;
use lf_protocol::ResultRecord;
use lf_providers::HttpClient;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::{ResultSink, SinkOutcome};
use crate::error::{SinkError, SinkResult};

#[derive(Debug, Clone, Deserialize)]
pub struct TableSinkConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub doc_id: Option<String>,
    #[serde(default)]
    pub table_id: Option<String>,
    /// Column (id or name) receiving the resolution text.
    #[serde(default = "default_column")]
    pub column: String,
    /// Bearer token (usually injected from `CODA_API_TOKEN`).
    #[serde(default)]
    pub token: Option<String>,
}

fn default_base_url() -> String {
    "https://coda.io/apis/v1".into()
}
fn default_column() -> String {
    "Plant Name".into()
}

impl Default for TableSinkConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            doc_id: None,
            table_id: None,
            column: default_column(),
            token: None,
        }
    }
}

#[derive(Serialize)]
struct RowUpdate<'a> {
    row: Row<'a>,
}

#[derive(Serialize)]
struct Row<'a> {
    cells: [Cell<'a>; 1],
}

#[derive(Serialize)]
struct Cell<'a> {
    column: &'a str,
    value: &'a str,
}

pub struct TableSink {
    http: HttpClient,
    config: TableSinkConfig,
}

impl TableSink {
    pub fn new(http: HttpClient, config: TableSinkConfig) -> Self {
        Self { http, config }
    }
}

/// `{base}/docs/{doc}/tables/{table}/rows/{row}`, each id percent-encoded
/// as a single path segment.
fn row_url(base_url: &str, doc_id: &str, table_id: &str, row_id: &str) -> SinkResult<Url> {
    let mut url = Url::parse(base_url).map_err(|e| SinkError::Url(format!("{base_url}: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| SinkError::Url(format!("{base_url}: cannot carry a path")))?
        .pop_if_empty()
        .extend(["docs", doc_id, "tables", table_id, "rows", row_id]);
    Ok(url)
}

#[async_trait]
impl ResultSink for TableSink {
    async fn publish(&self, row_id: Option<&str>, record: &ResultRecord) -> SinkResult<SinkOutcome> {
        let Some(row_id) = row_id else {
            return Ok(SinkOutcome::Skipped("no row id for this run".into()));
        };
        let (Some(doc_id), Some(table_id), Some(token)) = (
            self.config.doc_id.as_deref(),
            self.config.table_id.as_deref(),
            self.config.token.as_deref(),
        ) else {
            return Ok(SinkOutcome::Skipped(
                "table document, table id or token not configured".into(),
            ));
        };

        let url = row_url(&self.config.base_url, doc_id, table_id, row_id)?;
        let body = RowUpdate {
            row: Row {
                cells: [Cell {
                    column: &self.config.column,
                    value: record.resolution_text(),
                }],
            },
        };

        let response = self
            .http
            .put(url.as_str())
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(row_id, column = %self.config.column, "table row updated");
        Ok(SinkOutcome::Written)
    }

    fn sink_name(&self) -> &str {
        "table"
    }
}
