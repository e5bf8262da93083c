//! Track source: reads title and artist tags from the audio files of a folder.

use lofty::prelude::*;
use lofty::error::LoftyError;
use lofty::probe::Probe;
use lofty::tag::ItemKey;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::models::TrackRecord;
use crate::progress::Reporter;

/// Extensions picked up by a scan (compared case-insensitively)
pub const AUDIO_EXTENSIONS: [&str; 1] = ["mp3"];

pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| AUDIO_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Title used when a file carries no usable title tag
pub fn fallback_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[derive(Debug, Default)]
struct Metadata {
    title: Option<String>,
    artist: Option<String>,
}

fn read_metadata(path: &Path) -> std::result::Result<Metadata, LoftyError> {
    let tagged_file = Probe::open(path)?.read()?;
    let mut meta = Metadata::default();
    if let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) {
        meta.title = tag
            .get_string(&ItemKey::TrackTitle)
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.to_string());
        meta.artist = tag.get_string(&ItemKey::TrackArtist).map(|s| s.to_string());
    }
    Ok(meta)
}

/// Read one record per audio file directly inside `dir`, in file-name order.
///
/// Files whose tags cannot be parsed are logged and left out; the scan
/// itself only fails when `dir` is not a readable directory.
pub fn scan_folder(dir: &Path, reporter: &Reporter) -> Result<Vec<TrackRecord>> {
    if !dir.is_dir() {
        return Err(Error::SourceUnavailable(dir.to_path_buf()));
    }

    let spinner = reporter.reading_spinner();
    let mut records = Vec::new();

    let walker = WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                spinner.finish_and_clear();
                let path = e.path().unwrap_or(dir).to_path_buf();
                return Err(Error::io(path, e.into()));
            }
        };
        let path = entry.path();
        if !entry.file_type().is_file() || !is_audio_file(path) {
            continue;
        }

        match read_metadata(path) {
            Ok(meta) => {
                records.push(TrackRecord::new(
                    meta.title.unwrap_or_else(|| fallback_title(path)),
                    path.to_string_lossy(),
                    meta.artist.unwrap_or_default(),
                ));
            }
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable file"),
        }
        spinner.inc(1);
    }

    spinner.finish_and_clear();
    debug!(dir = %dir.display(), tracks = records.len(), "Scanned folder");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_is_audio_file() {
        assert!(is_audio_file(Path::new("/music/song.mp3")));
        assert!(is_audio_file(Path::new("/music/SONG.MP3")));
        assert!(!is_audio_file(Path::new("/music/song.flac")));
        assert!(!is_audio_file(Path::new("/music/mp3")));
    }

    #[test]
    fn test_fallback_title() {
        assert_eq!(fallback_title(Path::new("/music/01 - Intro.mp3")), "01 - Intro");
    }

    #[test]
    fn test_missing_folder_is_unavailable() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(scan_folder(&missing, &Reporter::default()), Err(Error::SourceUnavailable(_))));

        let file = dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();
        assert!(matches!(scan_folder(&file, &Reporter::default()), Err(Error::SourceUnavailable(_))));
    }

    #[test]
    fn test_ignores_other_files_and_subfolders() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("nested.mp3"), "").unwrap();

        assert!(scan_folder(dir.path(), &Reporter::default()).unwrap().is_empty());
    }

    #[test]
    fn test_unreadable_audio_files_are_skipped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("empty.mp3"), "").unwrap();
        fs::write(dir.path().join("garbage.mp3"), "this is not an mp3 frame, just text").unwrap();

        let records = scan_folder(dir.path(), &Reporter::new(true)).unwrap();
        assert!(records.is_empty());
    }
}
