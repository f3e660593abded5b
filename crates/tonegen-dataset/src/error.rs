//! Error types for dataset generation and read-back.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for dataset operations.
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Common interface for reporting errors with stable codes.
///
/// Implemented by every error type in the workspace so the CLI can print
/// `error[CODE]` regardless of which stage failed.
pub trait BackendError: std::error::Error {
    /// Get the error code for reporting.
    ///
    /// Returns a static string like "DATASET_001" or "SYNTH_003". These codes
    /// are stable and can be used for programmatic error handling.
    fn code(&self) -> &'static str;

    /// Get a human-readable message describing the error.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Get the error category ("dataset", "synth").
    fn category(&self) -> &'static str;
}

/// Errors that can occur while sampling, laying out, slicing or reading a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// A pitch or volume range resolved to an empty interval.
    #[error("invalid range: {message}")]
    InvalidRange {
        /// Error message.
        message: String,
    },

    /// Slot geometry is non-positive or the margin does not fit inside a slot.
    #[error("invalid layout: {message}")]
    InvalidLayout {
        /// Error message.
        message: String,
    },

    /// A slice request exceeds the waveform bounds.
    #[error("slice {row} [{start}, {end}) is out of range for waveform of {len} samples")]
    OutOfRange {
        /// Index row.
        row: usize,
        /// Start offset in samples.
        start: u64,
        /// End offset in samples.
        end: u64,
        /// Waveform length in samples.
        len: usize,
    },

    /// An expected dataset file is absent.
    #[error("missing artifact: {}", path.display())]
    MissingArtifact {
        /// The path that was expected.
        path: PathBuf,
    },

    /// A persisted table does not have the expected shape.
    #[error("schema error in {}: {message}", path.display())]
    Schema {
        /// File the error was found in.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Error message.
        message: String,
    },

    /// Audio could not be encoded or decoded.
    #[error("audio codec error for {}: {message}", path.display())]
    Audio {
        /// File being read or written.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Manifest could not be serialized or parsed.
    #[error("manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DatasetError {
    /// Creates an invalid range error.
    pub fn invalid_range(message: impl Into<String>) -> Self {
        Self::InvalidRange {
            message: message.into(),
        }
    }

    /// Creates an invalid layout error.
    pub fn invalid_layout(message: impl Into<String>) -> Self {
        Self::InvalidLayout {
            message: message.into(),
        }
    }

    /// Creates an invalid parameter error.
    pub fn invalid_param(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a schema error for the given file.
    pub fn schema(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Schema {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates an audio codec error for the given file.
    pub fn audio(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Audio {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns true for errors caused by invalid user input rather than a
    /// failure while producing or reading artifacts.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            DatasetError::InvalidRange { .. }
                | DatasetError::InvalidLayout { .. }
                | DatasetError::InvalidParameter { .. }
        )
    }
}

impl BackendError for DatasetError {
    fn code(&self) -> &'static str {
        match self {
            DatasetError::InvalidRange { .. } => "DATASET_001",
            DatasetError::InvalidLayout { .. } => "DATASET_002",
            DatasetError::OutOfRange { .. } => "DATASET_003",
            DatasetError::MissingArtifact { .. } => "DATASET_004",
            DatasetError::Schema { .. } => "DATASET_005",
            DatasetError::InvalidParameter { .. } => "DATASET_006",
            DatasetError::Audio { .. } => "DATASET_007",
            DatasetError::Manifest(_) => "DATASET_008",
            DatasetError::Io(_) => "DATASET_009",
        }
    }

    fn category(&self) -> &'static str {
        "dataset"
    }
}
