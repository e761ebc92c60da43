//! Whitespace and Unicode normalization for comparing file names.
//!
//! Names in the items files were typed on different machines: some use
//! non-breaking spaces where the file on disk has plain spaces (or the
//! other way around), and macOS hands out decomposed (NFD) names. The
//! normalized form is only ever compared, never written back.

use unicode_normalization::UnicodeNormalization;

/// U+00A0 NO-BREAK SPACE
pub const NBSP: char = '\u{a0}';

/// NBSP -> plain space, then canonical composition (NFC)
pub fn normalize_for_matching(text: &str) -> String {
    text.replace(NBSP, " ").nfc().collect()
}

/// True when two names are equal verbatim or after normalization
pub fn names_match(a: &str, b: &str) -> bool {
    a == b || normalize_for_matching(a) == normalize_for_matching(b)
}
