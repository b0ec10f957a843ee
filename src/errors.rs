use thiserror::Error;
use std::io;
use std::path::PathBuf;

/// Fatal errors for a batch run
#[derive(Error, Debug)]
pub enum TriangleError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration from {path}: {source}")]
    ConfigLoad {
        source: toml::de::Error,
        path: PathBuf,
    },

    #[error("CSV output error: {0}")]
    CsvOutput(#[from] csv::Error),

    #[error("Report serialization error: {0}")]
    Report(#[from] serde_json::Error),

    #[error("Malformed feature table at line {line}: {reason}")]
    MalformedFeatureTable {
        line: u64,
        reason: String,
    },

    #[error("Unknown triangle category: {0}")]
    UnknownCategory(String),

    #[error("Feature extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Invalid input path: {0}")]
    InvalidPath(PathBuf),
}

/// Per-image failures; the batch skips the image and carries on
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("image has no contour pixels")]
    EmptyContour,

    #[error("expected at least 3 boundary candidates, found {found}")]
    InsufficientCandidates { found: usize },

    #[error("{remaining} candidates left after {escalations} tolerance escalations")]
    MergeDidNotConverge { remaining: usize, escalations: u32 },
}

impl ExtractionError {
    /// Number of candidate points the extraction ended with
    pub fn candidate_count(&self) -> usize {
        match self {
            ExtractionError::EmptyContour => 0,
            ExtractionError::InsufficientCandidates { found } => *found,
            ExtractionError::MergeDidNotConverge { remaining, .. } => *remaining,
        }
    }
}

/// Type alias for Result with our custom error type
pub type Result<T> = std::result::Result<T, TriangleError>;
