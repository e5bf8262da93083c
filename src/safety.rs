//! Safety checks to prevent an export from overwriting music or settings.

use std::path::Path;

use crate::error::{Error, Result};

/// Validates that an export path is safe to overwrite.
///
/// Checks:
/// - Output must have a `.csv` extension, so music and the JSON blacklist are never targets
/// - Output cannot be the same as any of the provided source paths
pub fn validate_export_path(output: &Path, source_paths: &[&Path]) -> Result<()> {
    let is_csv = output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(Error::UnsafeOutput(format!(
            "output file '{}' must have a .csv extension",
            output.display()
        )));
    }

    if let Some(source) = source_paths.iter().find(|s| **s == output) {
        return Err(Error::UnsafeOutput(format!(
            "output '{}' cannot be the same as source '{}'",
            output.display(),
            source.display()
        )));
    }

    Ok(())
}
