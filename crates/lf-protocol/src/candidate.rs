use std::fmt;

use serde::{Deserialize, Serialize};

/// Which identification method produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    /// File name accepted directly as the plant name.
    Filename,
    /// OCR text accepted directly as the plant name.
    OcrText,
    /// A hint canonicalized by the text-correction service.
    TextCorrection,
    /// Image-based species identification service.
    SpeciesLookup,
    /// Image-understanding model asked to name the plant.
    VisionNamer,
}

impl CandidateSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Filename => "filename",
            Self::OcrText => "ocr_text",
            Self::TextCorrection => "text_correction",
            Self::SpeciesLookup => "species_lookup",
            Self::VisionNamer => "vision_namer",
        }
    }
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position in the fallback chain. Ordering follows evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    FilenameHint,
    OcrHint,
    SpeciesLookup,
    VisionNamer,
}

impl Tier {
    /// All tiers in priority order.
    pub const ALL: [Tier; 4] = [
        Tier::FilenameHint,
        Tier::OcrHint,
        Tier::SpeciesLookup,
        Tier::VisionNamer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FilenameHint => "filename_hint",
            Self::OcrHint => "ocr_hint",
            Self::SpeciesLookup => "species_lookup",
            Self::VisionNamer => "vision_namer",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of one strategy: resolved when `plant_name` is present.
///
/// An empty or whitespace-only name is never stored; it is normalized to
/// "unresolved" at construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    #[serde(skip_serializing_if = "Option::is_none")]
    plant_name: Option<String>,
    source: CandidateSource,
    /// Provider score in `0..=1`, only set by species lookup.
    #[serde(skip_serializing_if = "Option::is_none")]
    confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    common_names: Option<Vec<String>>,
}

impl Candidate {
    pub fn new(source: CandidateSource, plant_name: Option<String>) -> Self {
        let plant_name = plant_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        Self {
            plant_name,
            source,
            confidence: None,
            common_names: None,
        }
    }

    pub fn resolved(source: CandidateSource, plant_name: impl Into<String>) -> Self {
        Self::new(source, Some(plant_name.into()))
    }

    pub fn unresolved(source: CandidateSource) -> Self {
        Self::new(source, None)
    }

    /// Attach a provider score, clamped into `0..=1`.
    pub fn with_confidence(mut self, score: f64) -> Self {
        self.confidence = Some(score.clamp(0.0, 1.0));
        self
    }

    pub fn with_common_names(mut self, names: Vec<String>) -> Self {
        self.common_names = Some(names);
        self
    }

    pub fn is_resolved(&self) -> bool {
        self.plant_name.is_some()
    }

    pub fn plant_name(&self) -> Option<&str> {
        self.plant_name.as_deref()
    }

    pub fn source(&self) -> CandidateSource {
        self.source
    }

    pub fn confidence(&self) -> Option<f64> {
        self.confidence
    }

    pub fn common_names(&self) -> Option<&[String]> {
        self.common_names.as_deref()
    }
}

/// Top-ranked entry returned by a species-identification provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesMatch {
    pub scientific_name: String,
    pub score: f64,
    #[serde(default)]
    pub common_names: Vec<String>,
}

impl SpeciesMatch {
    pub fn into_candidate(self) -> Candidate {
        Candidate::resolved(CandidateSource::SpeciesLookup, self.scientific_name)
            .with_confidence(self.score)
            .with_common_names(self.common_names)
    }
}

/// Result of evaluating a single tier.
#[derive(Debug, Clone, PartialEq)]
pub enum TierOutcome {
    /// The tier produced a usable name; the chain stops here.
    Resolved(Candidate),
    /// The tier produced nothing usable, with a short reason for the logs.
    Unresolved(String),
}

impl TierOutcome {
    /// Classify a candidate, so a `Resolved` outcome always carries a name.
    pub fn from_candidate(candidate: Candidate, reason_if_empty: &str) -> Self {
        if candidate.is_resolved() {
            Self::Resolved(candidate)
        } else {
            Self::Unresolved(reason_if_empty.to_string())
        }
    }

    pub fn unresolved(reason: impl Into<String>) -> Self {
        Self::Unresolved(reason.into())
    }
}
