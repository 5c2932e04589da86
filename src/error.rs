use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures that exclude a single pair, item or metric from a run.
///
/// None of these abort a batch on their own; the runner records them and the
/// report surfaces them as counts per [`EvalError::kind`].
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("no counterpart found for {}", path.display())]
    UnmatchedFile { path: PathBuf },

    #[error("{} matches {} candidates", groundtruth.display(), candidates.len())]
    AmbiguousMatch {
        groundtruth: PathBuf,
        candidates: Vec<PathBuf>,
    },

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("geometry filter requested but {} carries no geometry", path.display())]
    MissingGeometry { path: PathBuf },

    #[error("no stopwords available for language '{0}'")]
    UnsupportedLanguage(String),

    #[error("failed to extract {}: {reason}", path.display())]
    Extraction { path: PathBuf, reason: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl EvalError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnmatchedFile { .. } => "unmatched_file",
            Self::AmbiguousMatch { .. } => "ambiguous_match",
            Self::InvalidGeometry(_) => "invalid_geometry",
            Self::MissingGeometry { .. } => "missing_geometry",
            Self::UnsupportedLanguage(_) => "unsupported_language",
            Self::Extraction { .. } => "extraction",
            Self::Io { .. } => "io",
        }
    }
}

pub type EvalResult<T> = std::result::Result<T, EvalError>;
