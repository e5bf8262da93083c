//! Scan session: the caller's settings plus the last scan result.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::blacklist::Blacklist;
use crate::error::{Error, Result};
use crate::grouping::{group_records, ScanControl};
use crate::library::scan_folder;
use crate::models::{MatchMode, ScanResult, TrackRecord, DEFAULT_MIN_OVERLAP, DEFAULT_THRESHOLD};
use crate::normalize::NormalizeOptions;

/// Settings and state for one user's scans.
#[derive(Clone, Debug)]
pub struct Session {
    pub folder: Option<PathBuf>,
    pub blacklist: Blacklist,
    pub threshold: f64,
    pub min_overlap: usize,
    pub excluded_artist: String,
    pub options: NormalizeOptions,
    mode: MatchMode,
    result: Option<ScanResult>,
}

impl Session {
    pub fn new(blacklist: Blacklist) -> Self {
        Self {
            folder: None,
            blacklist,
            threshold: DEFAULT_THRESHOLD,
            min_overlap: DEFAULT_MIN_OVERLAP,
            excluded_artist: String::new(),
            options: NormalizeOptions::default(),
            mode: MatchMode::default(),
            result: None,
        }
    }

    pub fn with_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    pub fn mode(&self) -> &MatchMode {
        &self.mode
    }

    pub fn result(&self) -> Option<&ScanResult> {
        self.result.as_ref()
    }

    /// Drop the last result, e.g. after files were removed from the folder.
    pub fn clear_result(&mut self) {
        self.result = None;
    }

    pub fn ratio_mode(&self) -> MatchMode {
        MatchMode::Ratio {
            threshold: self.threshold,
        }
    }

    pub fn words_mode(&self) -> MatchMode {
        MatchMode::Words {
            min_overlap: self.min_overlap,
        }
    }

    pub fn exclude_artist_mode(&self) -> MatchMode {
        MatchMode::ExcludeArtist {
            artist: self.excluded_artist.clone(),
        }
    }

    fn source(&self) -> Result<&Path> {
        self.folder.as_deref().ok_or(Error::NoSource)
    }

    /// Group already-read records with `mode`, replacing the last result.
    pub fn run_records(&mut self, records: &[TrackRecord], mode: MatchMode, control: &ScanControl) -> Result<&ScanResult> {
        let groups = group_records(records, &mode, &self.blacklist, self.options, control)?;
        info!(mode = %mode, groups = groups.len(), "Scan finished");
        self.mode = mode.clone();
        Ok(self.result.insert(ScanResult::new(mode, groups)))
    }

    /// Read the folder and group it with `mode`. Fails before reading
    /// anything when no folder is selected. On failure the previous result
    /// is kept.
    pub fn run(&mut self, mode: MatchMode, control: &ScanControl) -> Result<&ScanResult> {
        let folder = self.source()?;
        info!(folder = %folder.display(), mode = %mode, "Scanning");
        let records = scan_folder(folder, &control.reporter)?;
        self.run_records(&records, mode, control)
    }

    /// Re-run the current mode against the folder.
    pub fn rescan(&mut self, control: &ScanControl) -> Result<&ScanResult> {
        let mode = self.mode.clone();
        self.run(mode, control)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Blacklist::with_defaults())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::CancelToken;
    use crate::progress::Reporter;
    use tempfile::tempdir;

    fn records() -> Vec<TrackRecord> {
        vec![
            TrackRecord::new("Yesterday", "/1", "Beatles"),
            TrackRecord::new("Yesterday (Remastered)", "/2", "Beatles"),
            TrackRecord::new("Help", "/3", "Beatles"),
        ]
    }

    #[test]
    fn test_defaults() {
        let session = Session::default();
        assert_eq!(session.threshold, 0.8);
        assert_eq!(session.min_overlap, 2);
        assert_eq!(session.mode(), &MatchMode::Ratio { threshold: 0.8 });
        assert!(session.result().is_none());
    }

    #[test]
    fn test_run_without_folder_fails() {
        let mut session = Session::default();
        let mode = session.ratio_mode();
        assert!(matches!(session.run(mode, &ScanControl::default()), Err(Error::NoSource)));
    }

    #[test]
    fn test_run_missing_folder_fails() {
        let dir = tempdir().unwrap();
        let mut session = Session::default().with_folder(dir.path().join("gone"));
        let mode = session.words_mode();
        assert!(matches!(
            session.run(mode, &ScanControl::default()),
            Err(Error::SourceUnavailable(_))
        ));
    }

    #[test]
    fn test_run_records_replaces_result() {
        let mut session = Session::default();
        let control = ScanControl::default();

        let mode = session.ratio_mode();
        let first = session.run_records(&records(), mode, &control).unwrap();
        assert_eq!(first.groups.len(), 1);

        session.excluded_artist = "beatles".to_string();
        let mode = session.exclude_artist_mode();
        let second = session.run_records(&records(), mode.clone(), &control).unwrap();
        assert!(second.is_empty());
        assert_eq!(session.mode(), &mode);
    }

    #[test]
    fn test_failed_run_keeps_previous_result() {
        let mut session = Session::default();
        let mode = session.ratio_mode();
        session.run_records(&records(), mode, &ScanControl::default()).unwrap();

        let token = CancelToken::new();
        token.cancel();
        let mode = session.words_mode();
        assert!(session.run_records(&records(), mode, &ScanControl::new(token)).is_err());
        assert_eq!(session.result().map(|r| r.groups.len()), Some(1));

        session.clear_result();
        assert!(session.result().is_none());
    }

    #[test]
    fn test_rescan_empty_folder() {
        let dir = tempdir().unwrap();
        let mut session = Session::default().with_folder(dir.path());
        let result = session.rescan(&ScanControl::default()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_run_log_only_skips_unreadable_files() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("broken.mp3"), "not audio").unwrap();
        let control = ScanControl::default().with_reporter(Reporter::new(true));

        let mut session = Session::default().with_folder(dir.path());
        let mode = session.words_mode();
        assert!(session.run(mode, &control).unwrap().is_empty());
    }
}
