//! Error types for scanning, grouping and persistence.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced to the caller. The grouping core itself never fails;
/// everything here originates at the I/O boundary or from cancellation.
#[derive(Error, Debug)]
pub enum Error {
    #[error("no track source selected")]
    NoSource,

    #[error("track source unavailable: {}", .0.display())]
    SourceUnavailable(PathBuf),

    #[error("scan cancelled")]
    Cancelled,

    #[error("nothing to export: the scan result is empty")]
    EmptyResult,

    #[error("invalid blacklist entry '{token}' in {}: expected true or false", .path.display())]
    InvalidBlacklist { path: PathBuf, token: String },

    #[error("unsafe output path: {0}")]
    UnsafeOutput(String),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for library operations
pub type Result<T> = std::result::Result<T, Error>;
