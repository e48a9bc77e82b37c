//! Candidate policies: which file names carry signal, which raw text may
//! pass as a plant name, and how correction answers are read.

use std::path::Path;

use lf_protocol::{Hint, HintOrigin};

/// The correction service's "no confident name" answer.
pub const UNKNOWN_SENTINEL: &str = "Unknown";

/// Raw text must be strictly shorter than this to count as a plant name.
pub const MAX_PLANT_NAME_CHARS: usize = 100;

/// Stems at or below this length are camera noise, not names.
const MIN_MEANINGFUL_STEM_CHARS: usize = 3;

/// Camera-default and screenshot prefixes (matched lowercase).
const GENERIC_PREFIXES: &[&str] = &["img_", "dsc_", "image", "screenshot"];

/// UI chrome that OCR tends to pick up (matched lowercase).
const JUNK_SUBSTRINGS: &[&str] = &["screenshot", "camera", "photo"];

/// File name without its extension.
pub fn file_stem(name: &str) -> &str {
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
}

/// Whether a file name carries no semantic signal.
///
/// Generic when absent, when the stem has at most 3 characters, contains a
/// digit, or starts with a camera/screenshot prefix (case-insensitive).
pub fn is_generic_filename(name: Option<&str>) -> bool {
    let Some(name) = name else {
        return true;
    };
    let stem = file_stem(name.trim());
    if stem.chars().count() <= MIN_MEANINGFUL_STEM_CHARS {
        return true;
    }
    if stem.chars().any(char::is_numeric) {
        return true;
    }
    let lower = stem.to_lowercase();
    GENERIC_PREFIXES.iter().any(|p| lower.starts_with(p))
}

/// Hint derived from a non-generic file name: `Monstera_deliciosa.jpg`
/// becomes `Monstera deliciosa`.
pub fn filename_hint(name: Option<&str>) -> Option<Hint> {
    if is_generic_filename(name) {
        return None;
    }
    let stem = file_stem(name?.trim());
    Hint::new(&stem.replace(['_', '-'], " "), HintOrigin::Filename)
}

/// Hint from OCR output; blank output yields none.
pub fn ocr_hint(text: &str) -> Option<Hint> {
    Hint::new(text, HintOrigin::Ocr)
}

/// Direct-text policy: non-empty, under 100 characters, and free of junk
/// words such as "screenshot".
pub fn is_valid_plant_name(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() || text.chars().count() >= MAX_PLANT_NAME_CHARS {
        return false;
    }
    let lower = text.to_lowercase();
    !JUNK_SUBSTRINGS.iter().any(|junk| lower.contains(junk))
}

/// Read a correction (or vision) answer. Anything containing the sentinel
/// is "no confident name"; any other non-empty answer is taken verbatim.
pub fn interpret_correction(answer: &str) -> Option<&str> {
    let answer = answer.trim();
    if answer.is_empty() || answer.contains(UNKNOWN_SENTINEL) {
        return None;
    }
    Some(answer)
}
