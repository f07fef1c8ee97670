use std::path::PathBuf;
use thiserror::Error;

/// Result type for sampling operations
pub type SamplerResult<T> = Result<T, SamplerError>;

/// Errors surfaced by the sampling pipeline.
///
/// The configuration variants are raised before anything on disk is touched.
/// `PurgeFailed` and `CopyFailed` can leave the output partially purged or
/// partially populated; both record how far they got.
#[derive(Error, Debug)]
pub enum SamplerError {
    #[error("Please select an input folder")]
    MissingInputPath,

    #[error("Please select an output folder")]
    MissingOutputPath,

    #[error("Input folder does not exist: {0:?}")]
    InputRootNotFound(PathBuf),

    #[error("No video folders selected")]
    NoFoldersSelected,

    #[error("Sample size must be at least 1")]
    InvalidSampleSize,

    #[error("No subfolders found in {0:?}")]
    NoVideoFolders(PathBuf),

    #[error("No valid image/label pairs found")]
    EmptyDiscovery,

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to delete existing file {path:?} after deleting {deleted}/{total}: {source}")]
    PurgeFailed {
        path: PathBuf,
        deleted: usize,
        total: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Copy of {path:?} failed after {completed}/{total} pairs: {source}")]
    CopyFailed {
        completed: usize,
        total: usize,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration file {path:?}: {message}")]
    Config { path: PathBuf, message: String },
}

impl SamplerError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SamplerError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error was raised by input validation, before any work started
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SamplerError::MissingInputPath
                | SamplerError::MissingOutputPath
                | SamplerError::InputRootNotFound(_)
                | SamplerError::NoFoldersSelected
                | SamplerError::InvalidSampleSize
        )
    }
}
