//! Batch error types
//!
//! Every fatal condition of a batch run is a `BatchError`. Nothing in the
//! pipeline catches and continues past one: it bubbles up to `main`, which
//! logs it and exits non-zero.

use std::path::PathBuf;
use thiserror::Error;

use crate::inference::EngineError;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, BatchError>;

/// Broad category of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Assets missing, unpaired or absent altogether
    Discovery,
    /// A document is unreadable, malformed or incomplete
    Validation,
    /// The inference engine failed
    Engine,
    /// Writing results failed
    Io,
}

/// Errors raised while loading, generating or writing a batch
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Companion file {} is missing for {}", missing.display(), present.display())]
    UnpairedArtifact { present: PathBuf, missing: PathBuf },

    #[error("No matching pairs of .bin and .json files found in {}", dir.display())]
    NoModelPairs { dir: PathBuf },

    #[error("No presets found in {}", dir.display())]
    NoPresets { dir: PathBuf },

    #[error("No presets given, nothing to generate")]
    EmptyPresets,

    #[error("Cannot read directory {}: {source}", dir.display())]
    UnreadableDirectory {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File doesn't exist: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Cannot read {}: {source}", path.display())]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Required item '{field}' not found in JSON file at {}", path.display())]
    MissingField { field: String, path: PathBuf },

    #[error("Value of '{field}' in {} is out of range", path.display())]
    OutOfRange { field: String, path: PathBuf },

    #[error("Invalid JSON document at {}: {source}", path.display())]
    InvalidDocument {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode results: {0}")]
    Encode(#[from] serde_json::Error),
}

impl BatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnpairedArtifact { .. }
            | Self::NoModelPairs { .. }
            | Self::NoPresets { .. }
            | Self::EmptyPresets
            | Self::UnreadableDirectory { .. } => ErrorKind::Discovery,
            Self::FileNotFound { .. }
            | Self::UnreadableFile { .. }
            | Self::MissingField { .. }
            | Self::OutOfRange { .. }
            | Self::InvalidDocument { .. } => ErrorKind::Validation,
            Self::Engine(_) => ErrorKind::Engine,
            Self::Write { .. } | Self::Encode(_) => ErrorKind::Io,
        }
    }
}
