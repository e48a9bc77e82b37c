use serde::{Deserialize, Serialize};

/// Where a text hint came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintOrigin {
    /// Derived from the image's original file name.
    Filename,
    /// Extracted from the image pixels by OCR.
    Ocr,
}

/// A short free-text string believed to relate to the plant's name.
///
/// Never empty: construction goes through [`Hint::new`], which normalizes
/// whitespace and refuses blank text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hint {
    text: String,
    origin: HintOrigin,
}

impl Hint {
    /// Build a hint, collapsing runs of whitespace (newlines included) into
    /// single spaces. Returns `None` when nothing is left.
    pub fn new(text: &str, origin: HintOrigin) -> Option<Self> {
        let text = collapse_whitespace(text);
        if text.is_empty() {
            return None;
        }
        Some(Self { text, origin })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn origin(&self) -> HintOrigin {
        self.origin
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
