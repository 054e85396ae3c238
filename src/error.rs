use std::path::PathBuf;

/// Errors raised by the detection core.
#[derive(thiserror::Error, Debug)]
pub enum DetectorError {
    /// A file or directory could not be read or created.
    #[error("Cannot access {path}: {reason}")]
    FileAccess { path: PathBuf, reason: String },

    /// Every extension pattern was tried and none matched.
    #[error("No files matching {patterns:?} in {dir}")]
    NoMatchingFiles { dir: PathBuf, patterns: Vec<String> },

    /// An annotation line whose corner list is not four ordered integers.
    #[error("Malformed annotation line {line_number}: {line:?}")]
    MalformedAnnotationLine { line_number: usize, line: String },

    #[error("Failed to decode image {path}: {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to write patch {path}: {source}")]
    PatchWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Model error ({path}): {reason}")]
    Model { path: PathBuf, reason: String },

    #[error("Unusable font {path}: {reason}")]
    Font { path: PathBuf, reason: String },

    /// Vocabulary clustering or classifier fitting could not complete.
    #[error("Training failed: {0}")]
    Training(String),
}

impl DetectorError {
    pub(crate) fn file_access(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::FileAccess {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn training(err: impl std::fmt::Display) -> Self {
        Self::Training(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DetectorError>;
