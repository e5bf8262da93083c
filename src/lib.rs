//! RepetiScan library - duplicate-track detection over title metadata.

pub mod blacklist;
pub mod error;
pub mod export;
pub mod grouping;
pub mod library;
pub mod models;
pub mod normalize;
pub mod progress;
pub mod safety;
pub mod scoring;
pub mod session;

pub use blacklist::{Blacklist, BlacklistStore};
pub use error::{Error, Result};
pub use grouping::{
    exclude_artist, group_by_exact_title, group_by_ratio, group_by_word_overlap, CancelToken, ScanControl,
};
pub use models::{Group, MatchMode, ScanResult, TrackRecord};
pub use normalize::{normalize_title, NormalizeOptions};
pub use progress::Reporter;
pub use scoring::{overlap_count, ratio};
pub use session::Session;
