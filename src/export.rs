//! Scan result rendering: CSV export and one-line group display.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::error::{Error, Result};
use crate::models::Group;
use crate::safety::validate_export_path;

pub const CSV_HEADER: [&str; 2] = ["Group", "Songs"];

/// Titles joined the way the result table shows them
pub fn format_titles(group: &Group) -> String {
    group.titles().collect::<Vec<_>>().join(",  ")
}

/// `title (artist)` per member, used by the exclude-artist mode
pub fn format_titles_with_artists(group: &Group) -> String {
    group
        .tracks()
        .iter()
        .map(|t| format!("{} ({})", t.title, t.artist))
        .collect::<Vec<_>>()
        .join(",  ")
}

/// Write `Group,Songs` followed by one row per group.
pub fn write_csv<W: Write>(groups: &[Group], writer: W) -> Result<()> {
    let mut out = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(writer);

    out.write_record(CSV_HEADER)?;
    for (idx, group) in groups.iter().enumerate() {
        let songs = group.titles().collect::<Vec<_>>().join(", ");
        out.write_record([format!("Group {}", idx + 1), songs])?;
    }
    out.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Export `groups` to a CSV file at `path`. An empty result is refused.
pub fn export_csv(groups: &[Group], path: &Path) -> Result<()> {
    if groups.is_empty() {
        return Err(Error::EmptyResult);
    }

    let sources: Vec<&Path> = groups
        .iter()
        .flat_map(|g| g.tracks().iter().map(|t| Path::new(t.path.as_str())))
        .collect();
    validate_export_path(path, &sources)?;

    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    write_csv(groups, file)?;
    info!(path = %path.display(), groups = groups.len(), "Exported scan result");
    Ok(())
}
