//! Tiered resolver. Cheapest strategy first; the first resolved answer wins.
//!
//! Tiers run strictly in this order:
//! 1. filename hint → corrector (skipped for generic names, needs no pixels)
//! 2. OCR hint → corrector
//! 3. species lookup
//! 4. vision namer
//!
//! Any `StrategyError` is logged and downgraded to "unresolved". The only
//! fault that escapes the tier loop is a failed image fetch, which becomes
//! a critical resolution. Later tiers are never consulted once a tier
//! resolves, whatever their confidence.

use std::sync::Arc;

use lf_protocol::{
    Candidate, CandidateSource, Hint, HintOrigin, Identification, Resolution, Tier, TierOutcome,
};
use lf_providers::{
    FetchResult, HintCorrector, ImageSource, SpeciesLookup, StrategyError, TextExtractor,
    VisionNamer,
};

use crate::config::HintMode;
use crate::policy;

/// The external collaborators a resolver calls.
#[derive(Clone)]
pub struct Providers {
    pub images: Arc<dyn ImageSource>,
    pub ocr: Arc<dyn TextExtractor>,
    pub corrector: Arc<dyn HintCorrector>,
    pub species: Arc<dyn SpeciesLookup>,
    pub vision: Arc<dyn VisionNamer>,
}

/// What to identify.
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest<'a> {
    pub image_id: &'a str,
    pub image_name: Option<&'a str>,
}

pub struct TieredResolver {
    providers: Providers,
    hint_mode: HintMode,
}

impl TieredResolver {
    pub fn new(providers: Providers, hint_mode: HintMode) -> Self {
        Self {
            providers,
            hint_mode,
        }
    }

    /// Produce exactly one resolution for the request.
    pub async fn resolve(&self, request: &ResolveRequest<'_>) -> Resolution {
        match self.run_tiers(request).await {
            Ok(Some((tier, candidate))) => match Identification::from_candidate(candidate, tier) {
                Some(identification) => {
                    tracing::info!(
                        tier = %tier,
                        source = %identification.source,
                        plant_name = %identification.plant_name,
                        "plant identified"
                    );
                    Resolution::Identified(identification)
                }
                None => Resolution::Exhausted,
            },
            Ok(None) => {
                tracing::warn!("all identification tiers unresolved");
                Resolution::Exhausted
            }
            Err(fault) => {
                tracing::error!(error = %fault, "image fetch failed, aborting run");
                Resolution::critical(fault)
            }
        }
    }

    async fn run_tiers(
        &self,
        request: &ResolveRequest<'_>,
    ) -> FetchResult<Option<(Tier, Candidate)>> {
        let mut image = None;
        for tier in Tier::ALL {
            let outcome = match tier {
                Tier::FilenameHint => self.filename_tier(request.image_name).await,
                Tier::OcrHint => self.ocr_tier(self.pixels(&mut image, request).await?).await,
                Tier::SpeciesLookup => {
                    self.species_tier(self.pixels(&mut image, request).await?).await
                }
                Tier::VisionNamer => {
                    self.vision_tier(self.pixels(&mut image, request).await?).await
                }
            };
            if let TierOutcome::Resolved(c) = settle(tier, outcome) {
                return Ok(Some((tier, c)));
            }
        }
        Ok(None)
    }

    /// Image bytes, downloaded on first use and shared by every later tier.
    /// The filename tier never calls this, so a name-only answer skips the
    /// download entirely.
    async fn pixels<'i>(
        &self,
        slot: &'i mut Option<Vec<u8>>,
        request: &ResolveRequest<'_>,
    ) -> FetchResult<&'i [u8]> {
        if slot.is_none() {
            *slot = Some(self.providers.images.fetch(request.image_id).await?);
        }
        Ok(slot.as_deref().unwrap_or_default())
    }

    // ── Tiers ────────────────────────────────────────────────────

    async fn filename_tier(&self, image_name: Option<&str>) -> TierOutcome {
        match policy::filename_hint(image_name) {
            Some(hint) => self.evaluate_hint(Tier::FilenameHint, hint).await,
            None => TierOutcome::unresolved("file name is generic"),
        }
    }

    async fn ocr_tier(&self, image: &[u8]) -> TierOutcome {
        let ocr = &self.providers.ocr;
        let text = match ocr.extract_text(image).await {
            Ok(text) => text,
            Err(e) => return downgrade(Tier::OcrHint, ocr.provider_name(), e),
        };
        tracing::debug!(text = %text, "OCR text extracted");

        match policy::ocr_hint(&text) {
            Some(hint) => self.evaluate_hint(Tier::OcrHint, hint).await,
            None => TierOutcome::unresolved("OCR found no text"),
        }
    }

    async fn species_tier(&self, image: &[u8]) -> TierOutcome {
        let species = &self.providers.species;
        match species.identify(image).await {
            Ok(Some(best)) => {
                tracing::debug!(
                    scientific_name = %best.scientific_name,
                    score = best.score,
                    "species lookup matched"
                );
                TierOutcome::from_candidate(best.into_candidate(), "species name was empty")
            }
            Ok(None) => TierOutcome::unresolved("species lookup returned no results"),
            Err(e) => downgrade(Tier::SpeciesLookup, species.provider_name(), e),
        }
    }

    async fn vision_tier(&self, image: &[u8]) -> TierOutcome {
        let vision = &self.providers.vision;
        match vision.name_plant(image).await {
            Ok(answer) => match policy::interpret_correction(&answer) {
                Some(name) => {
                    TierOutcome::Resolved(Candidate::resolved(CandidateSource::VisionNamer, name))
                }
                None => TierOutcome::unresolved("vision model could not name the plant"),
            },
            Err(e) => downgrade(Tier::VisionNamer, vision.provider_name(), e),
        }
    }

    /// Turn a hint into an outcome according to the hint mode.
    async fn evaluate_hint(&self, tier: Tier, hint: Hint) -> TierOutcome {
        match self.hint_mode {
            HintMode::Direct => {
                if !policy::is_valid_plant_name(hint.text()) {
                    return TierOutcome::unresolved("hint rejected by direct-text policy");
                }
                let source = match hint.origin() {
                    HintOrigin::Filename => CandidateSource::Filename,
                    HintOrigin::Ocr => CandidateSource::OcrText,
                };
                TierOutcome::Resolved(Candidate::resolved(source, hint.text()))
            }
            HintMode::Corrected => {
                let corrector = &self.providers.corrector;
                match corrector.correct(&hint).await {
                    Ok(answer) => match policy::interpret_correction(&answer) {
                        Some(name) => TierOutcome::Resolved(Candidate::resolved(
                            CandidateSource::TextCorrection,
                            name,
                        )),
                        None => TierOutcome::unresolved("corrector has no confident name"),
                    },
                    Err(e) => downgrade(tier, corrector.provider_name(), e),
                }
            }
        }
    }
}

/// Log the outcome of a tier.
fn settle(tier: Tier, outcome: TierOutcome) -> TierOutcome {
    match &outcome {
        TierOutcome::Resolved(c) => {
            tracing::debug!(tier = %tier, source = %c.source(), "tier resolved");
        }
        TierOutcome::Unresolved(reason) => {
            tracing::info!(tier = %tier, reason = %reason, "tier unresolved, falling through");
        }
    }
    outcome
}

fn downgrade(tier: Tier, provider: &str, err: StrategyError) -> TierOutcome {
    tracing::warn!(tier = %tier, provider, error = %err, "strategy failed");
    TierOutcome::unresolved(err.to_string())
}
