//! Grouping engine: partitions track records into probable duplicates.
//!
//! The fuzzy modes are a greedy single pass anchored on each group's first
//! member. A candidate joins when it matches the anchor; it is never compared
//! against the other members. So two members of one group are only known to
//! be similar to the anchor, and a record similar to a non-anchor member but
//! not to the anchor stays out. This is not connected-components clustering.

use indicatif::ProgressBar;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::blacklist::Blacklist;
use crate::error::{Error, Result};
use crate::models::{Group, MatchMode, TrackRecord};
use crate::normalize::{normalize_title_with, NormalizeOptions};
use crate::progress::Reporter;
use crate::scoring::{sequence_ratio, word_set};

// ============================================================================
// Scan Control
// ============================================================================

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Cancellation and progress reporting for one scan.
/// Cancellation is checked before each anchor.
#[derive(Clone, Debug, Default)]
pub struct ScanControl {
    pub cancel: CancelToken,
    pub reporter: Reporter,
    /// Bar to drive instead of one built by `reporter`
    pub bar: Option<ProgressBar>,
}

impl ScanControl {
    pub fn new(cancel: CancelToken) -> Self {
        Self {
            cancel,
            ..Self::default()
        }
    }

    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_bar(mut self, bar: ProgressBar) -> Self {
        self.bar = Some(bar);
        self
    }

    fn check(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    fn grouping_bar(&self, anchors: u64) -> ProgressBar {
        match &self.bar {
            Some(pb) => {
                pb.set_length(anchors);
                pb.set_position(0);
                pb.clone()
            }
            None => self.reporter.grouping_bar(anchors),
        }
    }
}

// ============================================================================
// Anchored Partition
// ============================================================================

/// Greedy anchored partition over record indices. `accept(anchor, candidate)`
/// decides membership. Groups smaller than two are dropped.
fn partition<F>(records: &[TrackRecord], mut accept: F, control: &ScanControl) -> Result<Vec<Vec<usize>>>
where
    F: FnMut(usize, usize) -> bool,
{
    let total = records.len() as u64;
    let bar = control.grouping_bar(total);
    let mut visited: FxHashSet<&str> = FxHashSet::default();
    let mut groups = Vec::new();

    for (i, anchor) in records.iter().enumerate() {
        if let Err(e) = control.check() {
            bar.finish_and_clear();
            return Err(e);
        }
        bar.set_position(i as u64);
        control.reporter.anchors_done(i as u64, total);

        if !visited.insert(anchor.path.as_str()) {
            continue;
        }

        let mut members = vec![i];
        for (j, candidate) in records.iter().enumerate().skip(i + 1) {
            if visited.contains(candidate.path.as_str()) {
                continue;
            }
            if accept(i, j) {
                members.push(j);
                visited.insert(candidate.path.as_str());
            }
        }

        if members.len() > 1 {
            groups.push(members);
        }
    }

    control.reporter.anchors_done(total, total);
    bar.finish_and_clear();
    Ok(groups)
}

fn collect_groups(records: &[TrackRecord], indices: Vec<Vec<usize>>) -> Vec<Group> {
    indices
        .into_iter()
        .map(|members| Group::new(members.into_iter().map(|i| records[i].clone()).collect()))
        .collect()
}

fn normalized_titles(records: &[TrackRecord], blacklist: &Blacklist, options: NormalizeOptions) -> Vec<String> {
    records
        .iter()
        .map(|r| normalize_title_with(&r.title, blacklist, options))
        .collect()
}

// ============================================================================
// Fuzzy Modes
// ============================================================================

/// Ratio mode with cancellation and normalization options.
pub fn group_by_ratio_with(
    records: &[TrackRecord],
    threshold: f64,
    blacklist: &Blacklist,
    options: NormalizeOptions,
    control: &ScanControl,
) -> Result<Vec<Group>> {
    let titles = normalized_titles(records, blacklist, options);
    let indices = partition(records, |i, j| sequence_ratio(&titles[i], &titles[j]) >= threshold, control)?;
    debug!(records = records.len(), groups = indices.len(), threshold, "Grouped by ratio");
    Ok(collect_groups(records, indices))
}

/// Word mode with cancellation and normalization options.
pub fn group_by_word_overlap_with(
    records: &[TrackRecord],
    min_overlap: usize,
    blacklist: &Blacklist,
    options: NormalizeOptions,
    control: &ScanControl,
) -> Result<Vec<Group>> {
    let titles = normalized_titles(records, blacklist, options);
    let words: Vec<FxHashSet<&str>> = titles.iter().map(|t| word_set(t)).collect();
    let indices = partition(
        records,
        |i, j| words[i].intersection(&words[j]).count() >= min_overlap,
        control,
    )?;
    debug!(records = records.len(), groups = indices.len(), min_overlap, "Grouped by word overlap");
    Ok(collect_groups(records, indices))
}

/// Group records whose normalized titles reach `threshold` against the anchor.
pub fn group_by_ratio(records: &[TrackRecord], threshold: f64, blacklist: &Blacklist) -> Vec<Group> {
    // A fresh control is never cancelled
    group_by_ratio_with(records, threshold, blacklist, NormalizeOptions::default(), &ScanControl::default())
        .unwrap_or_default()
}

/// Group records sharing at least `min_overlap` distinct words with the anchor.
pub fn group_by_word_overlap(records: &[TrackRecord], min_overlap: usize, blacklist: &Blacklist) -> Vec<Group> {
    group_by_word_overlap_with(records, min_overlap, blacklist, NormalizeOptions::default(), &ScanControl::default())
        .unwrap_or_default()
}

// ============================================================================
// Exact-Title Mode
// ============================================================================

/// Drop records whose artist contains `artist` (trimmed, case-insensitive).
/// An empty exclusion keeps everything. This deliberately differs from a
/// plain substring filter, where the empty name would match and drop every
/// record.
pub fn exclude_artist(records: &[TrackRecord], artist: &str) -> Vec<TrackRecord> {
    let excluded = artist.trim().to_lowercase();
    if excluded.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|r| !r.artist.to_lowercase().contains(&excluded))
        .cloned()
        .collect()
}

/// Bucket records by identical raw title, in first-seen order.
/// Every bucket is emitted, singletons included.
pub fn group_by_exact_title(records: &[TrackRecord]) -> Vec<Group> {
    let mut index: FxHashMap<&str, usize> = FxHashMap::default();
    let mut groups: Vec<Group> = Vec::new();

    for record in records {
        match index.get(record.title.as_str()) {
            Some(&slot) => groups[slot].push(record.clone()),
            None => {
                index.insert(record.title.as_str(), groups.len());
                groups.push(Group::new(vec![record.clone()]));
            }
        }
    }

    groups
}

// ============================================================================
// Dispatch
// ============================================================================

/// Run one matching mode over `records`.
pub fn group_records(
    records: &[TrackRecord],
    mode: &MatchMode,
    blacklist: &Blacklist,
    options: NormalizeOptions,
    control: &ScanControl,
) -> Result<Vec<Group>> {
    match mode {
        MatchMode::Ratio { threshold } => group_by_ratio_with(records, *threshold, blacklist, options, control),
        MatchMode::Words { min_overlap } => {
            group_by_word_overlap_with(records, *min_overlap, blacklist, options, control)
        }
        MatchMode::ExcludeArtist { artist } => {
            control.check()?;
            let kept = exclude_artist(records, artist);
            debug!(records = records.len(), kept = kept.len(), artist = %artist, "Excluded artist");
            Ok(group_by_exact_title(&kept))
        }
    }
}
