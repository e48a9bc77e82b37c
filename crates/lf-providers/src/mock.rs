//! Scripted providers for testing.
//!
//! Every mock replays canned responses and counts its calls, so tests can
//! assert both what a tier returned and whether it ran at all. Nothing here
//! touches the network.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use lf_protocol::{Hint, SpeciesMatch};

use crate::error::{FetchError, FetchResult, StrategyError, StrategyResult};
use crate::{HintCorrector, ImageSource, SpeciesLookup, TextExtractor, VisionNamer};

/// Queue of responses with a fallback once the queue runs dry.
struct Script<T> {
    queue: Mutex<VecDeque<T>>,
    fallback: T,
    calls: AtomicUsize,
}

impl<T: Clone> Script<T> {
    fn always(response: T) -> Self {
        Self::sequence(Vec::new(), response)
    }

    fn sequence(responses: Vec<T>, fallback: T) -> Self {
        Self {
            queue: Mutex::new(responses.into()),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }

    fn next(&self) -> T {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn unreachable_provider() -> StrategyError {
    StrategyError::Transport("mock provider unreachable".into())
}

// ── Image source ─────────────────────────────────────────────

pub struct MockImageSource {
    script: Script<FetchResult<Vec<u8>>>,
}

impl MockImageSource {
    /// Serve the same bytes for every id.
    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        Self {
            script: Script::always(Ok(bytes)),
        }
    }

    pub fn failing(error: FetchError) -> Self {
        Self {
            script: Script::always(Err(error)),
        }
    }

    pub fn calls(&self) -> usize {
        self.script.calls()
    }
}

#[async_trait]
impl ImageSource for MockImageSource {
    async fn fetch(&self, _image_id: &str) -> FetchResult<Vec<u8>> {
        self.script.next()
    }
}

// ── OCR ──────────────────────────────────────────────────────

pub struct MockTextExtractor {
    script: Script<StrategyResult<String>>,
}

impl MockTextExtractor {
    pub fn with_text(text: &str) -> Self {
        Self {
            script: Script::always(Ok(text.to_string())),
        }
    }

    pub fn failing(error: StrategyError) -> Self {
        Self {
            script: Script::always(Err(error)),
        }
    }

    pub fn unreachable() -> Self {
        Self::failing(unreachable_provider())
    }

    pub fn calls(&self) -> usize {
        self.script.calls()
    }
}

#[async_trait]
impl TextExtractor for MockTextExtractor {
    async fn extract_text(&self, _image: &[u8]) -> StrategyResult<String> {
        self.script.next()
    }

    fn provider_name(&self) -> &str {
        "mock-ocr"
    }
}

// ── Hint corrector ───────────────────────────────────────────

pub struct MockHintCorrector {
    script: Script<StrategyResult<String>>,
    hints: Mutex<Vec<Hint>>,
}

impl MockHintCorrector {
    /// Give the same answer to every hint.
    pub fn answering(answer: &str) -> Self {
        Self::with_script(Script::always(Ok(answer.to_string())))
    }

    /// Answer hints in order; once exhausted, behave as unreachable.
    pub fn answering_in_order(answers: Vec<StrategyResult<String>>) -> Self {
        Self::with_script(Script::sequence(answers, Err(unreachable_provider())))
    }

    pub fn failing(error: StrategyError) -> Self {
        Self::with_script(Script::always(Err(error)))
    }

    pub fn unreachable() -> Self {
        Self::failing(unreachable_provider())
    }

    fn with_script(script: Script<StrategyResult<String>>) -> Self {
        Self {
            script,
            hints: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.script.calls()
    }

    /// Every hint received, in call order.
    pub fn hints(&self) -> Vec<Hint> {
        self.hints.lock().unwrap().clone()
    }
}

#[async_trait]
impl HintCorrector for MockHintCorrector {
    async fn correct(&self, hint: &Hint) -> StrategyResult<String> {
        self.hints.lock().unwrap().push(hint.clone());
        self.script.next()
    }

    fn provider_name(&self) -> &str {
        "mock-corrector"
    }
}

// ── Species lookup ───────────────────────────────────────────

pub struct MockSpeciesLookup {
    script: Script<StrategyResult<Option<SpeciesMatch>>>,
}

impl MockSpeciesLookup {
    pub fn matching(scientific_name: &str, score: f64) -> Self {
        Self {
            script: Script::always(Ok(Some(SpeciesMatch {
                scientific_name: scientific_name.to_string(),
                score,
                common_names: Vec::new(),
            }))),
        }
    }

    /// Provider answered with an empty result list.
    pub fn no_match() -> Self {
        Self {
            script: Script::always(Ok(None)),
        }
    }

    pub fn failing(error: StrategyError) -> Self {
        Self {
            script: Script::always(Err(error)),
        }
    }

    pub fn unreachable() -> Self {
        Self::failing(unreachable_provider())
    }

    pub fn calls(&self) -> usize {
        self.script.calls()
    }
}

#[async_trait]
impl SpeciesLookup for MockSpeciesLookup {
    async fn identify(&self, _image: &[u8]) -> StrategyResult<Option<SpeciesMatch>> {
        self.script.next()
    }

    fn provider_name(&self) -> &str {
        "mock-species"
    }
}

// ── Vision namer ─────────────────────────────────────────────

pub struct MockVisionNamer {
    script: Script<StrategyResult<String>>,
}

impl MockVisionNamer {
    pub fn answering(answer: &str) -> Self {
        Self {
            script: Script::always(Ok(answer.to_string())),
        }
    }

    pub fn failing(error: StrategyError) -> Self {
        Self {
            script: Script::always(Err(error)),
        }
    }

    pub fn unreachable() -> Self {
        Self::failing(unreachable_provider())
    }

    pub fn calls(&self) -> usize {
        self.script.calls()
    }
}

#[async_trait]
impl VisionNamer for MockVisionNamer {
    async fn name_plant(&self, _image: &[u8]) -> StrategyResult<String> {
        self.script.next()
    }

    fn provider_name(&self) -> &str {
        "mock-vision"
    }
}
