//! External collaborators of the identification chain.
//!
//! Each provider sits behind a narrow trait so the resolver can treat them
//! uniformly and tests can swap in scripted mocks:
//! - `ImageSource`: binary image retrieval (fatal on failure)
//! - `TextExtractor`: OCR over image bytes
//! - `HintCorrector`: free-text hint to canonical species name
//! - `SpeciesLookup`: image-based species identification
//! - `VisionNamer`: last-resort naming straight from pixels
//!
//! None of the adapters retry; a failed call is final for its tier.

pub mod corrector;
pub mod drive;
pub mod error;
pub mod http;
pub mod mock;
pub mod ocr;
mod ollama;
pub mod plantnet;
pub mod vision;

use async_trait::async_trait;
use lf_protocol::{Hint, SpeciesMatch};

pub use corrector::{CorrectorConfig, OllamaCorrector};
pub use drive::{DriveConfig, DriveImageSource};
pub use error::{FetchError, FetchResult, StrategyError, StrategyResult};
pub use http::HttpClient;
pub use mock::{MockHintCorrector, MockImageSource, MockSpeciesLookup, MockTextExtractor, MockVisionNamer};
pub use ocr::{CloudVisionOcr, OcrConfig};
pub use plantnet::{PlantNetConfig, PlantNetLookup, PrefetchedLookup};
pub use vision::{OllamaVisionNamer, VisionConfig};

/// Retrieves the raw bytes of the image under identification.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self, image_id: &str) -> FetchResult<Vec<u8>>;
}

/// Extracts printed text from an image.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Raw extracted text; empty when the image carries none.
    async fn extract_text(&self, image: &[u8]) -> StrategyResult<String>;

    /// Provider name (for logging).
    fn provider_name(&self) -> &str;
}

/// Turns a free-text hint into a canonical species name.
#[async_trait]
pub trait HintCorrector: Send + Sync {
    /// The service's raw answer. Interpreting the `Unknown` sentinel is the
    /// caller's job.
    async fn correct(&self, hint: &Hint) -> StrategyResult<String>;

    fn provider_name(&self) -> &str;
}

/// Identifies a species from image pixels.
#[async_trait]
pub trait SpeciesLookup: Send + Sync {
    /// Highest-ranked match, or `None` when the provider found nothing.
    async fn identify(&self, image: &[u8]) -> StrategyResult<Option<SpeciesMatch>>;

    fn provider_name(&self) -> &str;
}

/// Asks an image-understanding model to name the plant directly.
#[async_trait]
pub trait VisionNamer: Send + Sync {
    /// The model's raw answer.
    async fn name_plant(&self, image: &[u8]) -> StrategyResult<String>;

    fn provider_name(&self) -> &str;
}
