//! Core data models for duplicate detection.
//!
//! Track records come from the track source, groups and scan results come
//! out of the grouping engine.

use serde::Serialize;
use std::fmt;

// ============================================================================
// Defaults
// ============================================================================

/// Default similarity threshold for ratio mode
pub const DEFAULT_THRESHOLD: f64 = 0.8;

/// Default minimum number of shared words for word mode
pub const DEFAULT_MIN_OVERLAP: usize = 2;

// ============================================================================
// Track Records
// ============================================================================

/// One audio file's extracted metadata. `path` is unique per physical file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TrackRecord {
    pub title: String,
    pub path: String,
    pub artist: String,
}

impl TrackRecord {
    pub fn new(title: impl Into<String>, path: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            path: path.into(),
            artist: artist.into(),
        }
    }
}

// ============================================================================
// Groups
// ============================================================================

/// Ordered group of records in discovery order. The first record of a fuzzy
/// group is its anchor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Group {
    tracks: Vec<TrackRecord>,
}

impl Group {
    pub fn new(tracks: Vec<TrackRecord>) -> Self {
        Self { tracks }
    }

    pub fn tracks(&self) -> &[TrackRecord] {
        &self.tracks
    }

    /// First member, the record every other member was compared against
    pub fn anchor(&self) -> Option<&TrackRecord> {
        self.tracks.first()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.tracks.iter().map(|t| t.title.as_str())
    }

    pub(crate) fn push(&mut self, track: TrackRecord) {
        self.tracks.push(track);
    }
}

impl From<Vec<TrackRecord>> for Group {
    fn from(tracks: Vec<TrackRecord>) -> Self {
        Self::new(tracks)
    }
}

// ============================================================================
// Match Modes
// ============================================================================

/// Matching strategy for one scan.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MatchMode {
    /// Sequence ratio against the anchor must reach `threshold`
    Ratio { threshold: f64 },
    /// At least `min_overlap` shared words with the anchor
    Words { min_overlap: usize },
    /// Drop records by artist, then bucket by identical raw title
    ExcludeArtist { artist: String },
}

impl Default for MatchMode {
    fn default() -> Self {
        MatchMode::Ratio {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMode::Ratio { threshold } => write!(f, "ratio >= {}", threshold),
            MatchMode::Words { min_overlap } => write!(f, "shared words >= {}", min_overlap),
            MatchMode::ExcludeArtist { artist } => write!(f, "exact title, excluding artist '{}'", artist),
        }
    }
}

// ============================================================================
// Scan Results
// ============================================================================

/// Groups produced by one invocation of one matching mode.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScanResult {
    pub mode: MatchMode,
    pub groups: Vec<Group>,
}

impl ScanResult {
    pub fn new(mode: MatchMode, groups: Vec<Group>) -> Self {
        Self { mode, groups }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of records across all groups
    pub fn track_count(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }
}
