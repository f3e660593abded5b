//! Error types for the FluidSynth backend.

use std::path::PathBuf;
use thiserror::Error;
use tonegen_dataset::{BackendError, DatasetError};

/// Result type for synthesis backend operations.
pub type SynthResult<T> = Result<T, SynthError>;

/// Errors that can occur while composing, synthesizing or writing a dataset.
#[derive(Debug, Error)]
pub enum SynthError {
    /// FluidSynth executable not found.
    #[error("FluidSynth executable not found. Ensure FluidSynth is installed and in PATH, or set FLUIDSYNTH_PATH environment variable")]
    FluidSynthNotFound,

    /// No SoundFont could be located.
    #[error("SoundFont not found. Pass --soundfont or set TONEGEN_SOUNDFONT (searched: {})", searched.join(", "))]
    SoundFontNotFound { searched: Vec<String> },

    /// Failed to spawn the synthesizer process.
    #[error("Failed to spawn FluidSynth process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    /// Synthesizer process timed out.
    #[error("FluidSynth process timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Synthesizer process exited with non-zero status.
    #[error("FluidSynth process exited with status {exit_code}: {stderr}")]
    ProcessFailed { exit_code: i32, stderr: String },

    /// Output file not found after synthesis.
    #[error("Expected synthesizer output not found: {path}")]
    OutputNotFound { path: PathBuf },

    /// MIDI sequence could not be serialized.
    #[error("Failed to write MIDI file {path}: {message}")]
    MidiWrite { path: PathBuf, message: String },

    /// Output directory already holds generated artifacts.
    #[error("Output directory already contains {} (use --force to overwrite)", path.display())]
    OutputExists { path: PathBuf },

    /// Sampling, layout, slicing or codec error.
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SynthError {
    /// Creates a new process failed error.
    pub fn process_failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self::ProcessFailed {
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Creates a new MIDI write error.
    pub fn midi_write(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::MidiWrite {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns true for errors caused by invalid user input.
    pub fn is_input_error(&self) -> bool {
        match self {
            SynthError::Dataset(e) => e.is_input_error(),
            SynthError::OutputExists { .. } => true,
            _ => false,
        }
    }
}

impl BackendError for SynthError {
    fn code(&self) -> &'static str {
        match self {
            SynthError::FluidSynthNotFound => "SYNTH_001",
            SynthError::SoundFontNotFound { .. } => "SYNTH_002",
            SynthError::SpawnFailed(_) => "SYNTH_003",
            SynthError::Timeout { .. } => "SYNTH_004",
            SynthError::ProcessFailed { .. } => "SYNTH_005",
            SynthError::OutputNotFound { .. } => "SYNTH_006",
            SynthError::MidiWrite { .. } => "SYNTH_007",
            SynthError::OutputExists { .. } => "SYNTH_008",
            SynthError::Dataset(e) => e.code(),
            SynthError::Io(_) => "SYNTH_009",
        }
    }

    fn category(&self) -> &'static str {
        match self {
            SynthError::Dataset(e) => e.category(),
            _ => "synth",
        }
    }
}
