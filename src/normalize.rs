//! Title normalization for duplicate matching.
//! Used by both scorers and the grouping engine.
//!
//! Tokens are removed as literal substrings, not whole words, in blacklist
//! insertion order. Removing one token can change whether a later one still
//! matches ("live" inside "alive", for instance), so the order matters.

use any_ascii::any_ascii;
use unicode_normalization::UnicodeNormalization;

use crate::blacklist::Blacklist;

// ============================================================================
// OPTIONS
// ============================================================================

/// Extra normalization steps on top of blacklist removal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Fold accents and non-Latin scripts to ASCII after token removal
    pub fold_diacritics: bool,
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Check if a character is a Unicode combining mark (diacritical mark).
pub fn is_combining_mark(c: char) -> bool {
    matches!(c as u32, 0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0x20D0..=0x20FF | 0xFE20..=0xFE2F)
}

/// Fold Unicode text to ASCII by applying NFKD decomposition and removing combining marks.
/// e.g., "Beyoncé" → "beyonce", "naïve" → "naive"
pub fn fold_to_ascii(s: &str) -> String {
    let stripped: String = s.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    any_ascii(&stripped).to_lowercase()
}

/// Remove every literal occurrence of each active token, in order.
fn strip_tokens(mut lowered: String, blacklist: &Blacklist) -> String {
    for token in blacklist.active_tokens() {
        if lowered.contains(token) {
            lowered = lowered.replace(token, "");
        }
    }
    lowered
}

// ============================================================================
// NORMALIZATION FUNCTIONS
// ============================================================================

/// Normalize a title for matching: lowercase, strip active blacklist tokens,
/// trim. A title made only of noise normalizes to an empty string.
pub fn normalize_title(title: &str, blacklist: &Blacklist) -> String {
    strip_tokens(title.to_lowercase(), blacklist).trim().to_string()
}

/// Normalize a title with the optional extra steps.
pub fn normalize_title_with(title: &str, blacklist: &Blacklist, options: NormalizeOptions) -> String {
    let normalized = normalize_title(title, blacklist);
    if options.fold_diacritics {
        fold_to_ascii(&normalized).trim().to_string()
    } else {
        normalized
    }
}

// ============================================================================
// TESTS
// ============================================================================
