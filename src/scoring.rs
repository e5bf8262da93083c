//! Similarity scoring between track titles.
//!
//! This module contains:
//! - The longest-matching-block sequence ratio (ratio mode)
//! - Word-overlap counting (word mode)
//!
//! Thresholds are tuned against the sequence ratio's output range, so it must
//! stay a block-matching ratio rather than an edit distance.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::blacklist::Blacklist;
use crate::normalize::normalize_title;

// ============================================================================
// Sequence Ratio
// ============================================================================

/// Longest block `a[i..i+k] == b[j..j+k]` inside the given window.
/// Ties go to the smallest `i`, then the smallest `j`.
fn longest_match(
    a: &[char],
    b2j: &FxHashMap<char, Vec<usize>>,
    (alo, ahi): (usize, usize),
    (blo, bhi): (usize, usize),
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_len) = (alo, blo, 0);
    // j2len[j] = length of the block ending at a[i - 1], b[j]
    let mut j2len: FxHashMap<usize, usize> = FxHashMap::default();

    for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next: FxHashMap<usize, usize> = FxHashMap::default();
        if let Some(positions) = b2j.get(c) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j.checked_sub(1).and_then(|p| j2len.get(&p)).copied().unwrap_or(0) + 1;
                next.insert(j, k);
                if k > best_len {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_len = k;
                }
            }
        }
        j2len = next;
    }

    (best_i, best_j, best_len)
}

/// Total size of the matching blocks found by recursively taking the longest
/// block and descending into the unmatched left and right remainders.
pub fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut b2j: FxHashMap<char, Vec<usize>> = FxHashMap::default();
    for (j, &c) in b.iter().enumerate() {
        b2j.entry(c).or_default().push(j);
    }

    let mut matched = 0;
    let mut pending = vec![((0, a.len()), (0, b.len()))];
    while let Some(((alo, ahi), (blo, bhi))) = pending.pop() {
        let (i, j, k) = longest_match(a, &b2j, (alo, ahi), (blo, bhi));
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            pending.push(((alo, i), (blo, j)));
        }
        if i + k < ahi && j + k < bhi {
            pending.push(((i + k, ahi), (j + k, bhi)));
        }
    }
    matched
}

/// Sequence ratio `2*M / T` of two already-normalized strings, measured in
/// chars. Two empty strings are identical (1.0).
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_characters(&a, &b) as f64 / total as f64
}

/// Similarity of two raw titles after normalization (0.0 to 1.0).
pub fn ratio(a: &str, b: &str, blacklist: &Blacklist) -> f64 {
    sequence_ratio(&normalize_title(a, blacklist), &normalize_title(b, blacklist))
}

// ============================================================================
// Word Overlap
// ============================================================================

/// Whitespace-split token set of an already-normalized title
pub fn word_set(normalized: &str) -> FxHashSet<&str> {
    normalized.split_whitespace().collect()
}

/// Number of distinct words shared by two already-normalized titles.
pub fn word_overlap(a: &str, b: &str) -> usize {
    let words_a = word_set(a);
    let words_b = word_set(b);
    words_a.intersection(&words_b).count()
}

/// Shared-word count of two raw titles after normalization.
pub fn overlap_count(a: &str, b: &str, blacklist: &Blacklist) -> usize {
    word_overlap(&normalize_title(a, blacklist), &normalize_title(b, blacklist))
}
