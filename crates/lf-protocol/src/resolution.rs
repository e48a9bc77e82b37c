use std::fmt;

use serde::{Deserialize, Serialize};

use crate::candidate::{Candidate, CandidateSource, Tier};

/// Rendered when every tier came back unresolved.
pub const EXHAUSTED_MESSAGE: &str = "Complete failure: all identification methods failed.";

/// Prefix of the rendered text when the run aborted outside the tier loop.
pub const CRITICAL_ERROR_PREFIX: &str = "Critical Workflow Error: ";

/// The winning candidate of a run, with its name guaranteed present.
#[derive(Debug, Clone, PartialEq)]
pub struct Identification {
    pub plant_name: String,
    pub source: CandidateSource,
    pub tier: Tier,
    pub confidence: Option<f64>,
    pub common_names: Option<Vec<String>>,
}

impl Identification {
    /// Returns `None` for an unresolved candidate.
    pub fn from_candidate(candidate: Candidate, tier: Tier) -> Option<Self> {
        let plant_name = candidate.plant_name()?.to_string();
        Some(Self {
            plant_name,
            source: candidate.source(),
            tier,
            confidence: candidate.confidence(),
            common_names: candidate.common_names().map(<[String]>::to_vec),
        })
    }
}

/// The single final answer of one run.
///
/// Created once by the resolver, consumed once by a sink, and rendered to
/// text only at the output boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Identified(Identification),
    /// All tiers ran and none resolved.
    Exhausted,
    /// A fault outside the tier loop (image fetch, missing input) aborted the run.
    Critical(String),
}

impl Resolution {
    pub fn critical(message: impl fmt::Display) -> Self {
        Self::Critical(message.to_string())
    }

    pub fn is_identified(&self) -> bool {
        matches!(self, Self::Identified(_))
    }

    pub fn plant_name(&self) -> Option<&str> {
        match self {
            Self::Identified(id) => Some(&id.plant_name),
            _ => None,
        }
    }

    pub fn source(&self) -> Option<CandidateSource> {
        match self {
            Self::Identified(id) => Some(id.source),
            _ => None,
        }
    }

    /// The sentinel-compatible text handed to every sink.
    pub fn render(&self) -> String {
        match self {
            Self::Identified(id) => id.plant_name.clone(),
            Self::Exhausted => EXHAUSTED_MESSAGE.to_string(),
            Self::Critical(message) => format!("{CRITICAL_ERROR_PREFIX}{message}"),
        }
    }

    /// JSON artifact shape: `{source, plant_name | error, confidence?, common_names?, image_id}`.
    pub fn to_record(&self, image_id: &str) -> ResultRecord {
        match self {
            Self::Identified(id) => ResultRecord {
                source: id.source.as_str().to_string(),
                plant_name: Some(id.plant_name.clone()),
                error: None,
                confidence: id.confidence,
                common_names: id.common_names.clone(),
                image_id: image_id.to_string(),
            },
            Self::Exhausted => ResultRecord {
                source: "exhausted".to_string(),
                plant_name: None,
                error: Some(self.render()),
                confidence: None,
                common_names: None,
                image_id: image_id.to_string(),
            },
            Self::Critical(_) => ResultRecord {
                source: "error".to_string(),
                plant_name: None,
                error: Some(self.render()),
                confidence: None,
                common_names: None,
                image_id: image_id.to_string(),
            },
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Persisted form of a resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plant_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_names: Option<Vec<String>>,
    pub image_id: String,
}

impl ResultRecord {
    /// The rendered resolution text this record was built from.
    pub fn resolution_text(&self) -> &str {
        self.plant_name
            .as_deref()
            .or(self.error.as_deref())
            .unwrap_or_default()
    }
}
