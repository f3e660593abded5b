//! Run manifest.
//!
//! A small JSON record written next to the artifacts so a dataset can be
//! reproduced and checked: which seed, which layout, which format, and a hash
//! of the concatenated PCM data.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::audio::AudioFormat;
use crate::error::DatasetResult;
use crate::layout::LayoutConfig;
use crate::sampler::SamplerConfig;

/// Current manifest schema version.
pub const MANIFEST_VERSION: u32 = 1;

/// How notes are handed to the synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// All notes in one sequence, one synthesizer call, sliced by the index.
    #[default]
    Batch,
    /// One sequence and one synthesizer call per note.
    Separate,
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::Batch => f.write_str("batch"),
            RenderMode::Separate => f.write_str("separate"),
        }
    }
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "batch" => Ok(RenderMode::Batch),
            "separate" => Ok(RenderMode::Separate),
            other => Err(format!(
                "unknown render mode '{}' (expected batch or separate)",
                other
            )),
        }
    }
}

/// Sampling settings as recorded in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingRecord {
    /// Seed actually used, including one drawn from entropy.
    pub seed: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_range: Option<(u8, u8)>,
    pub volume_range: (f64, f64),
    pub duration: f64,
    pub tempo: f64,
}

impl SamplingRecord {
    /// Records `config` with the seed that was used.
    pub fn from_config(config: &SamplerConfig, seed: u32) -> Self {
        Self {
            seed,
            note_range: config.note_range.map(|r| (r.min, r.max)),
            volume_range: config.volume_range,
            duration: config.duration,
            tempo: config.tempo,
        }
    }
}

/// Rendering settings and results as recorded in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderRecord {
    pub mode: RenderMode,
    pub audio_format: AudioFormat,
    pub layout: LayoutConfig,
    pub write_slices: bool,
    /// BLAKE3 hash of the concatenated 16-bit PCM data (batch mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pcm_hash: Option<String>,
    /// Length of the concatenated waveform in samples (batch mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_samples: Option<u64>,
}

/// Record of one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationManifest {
    pub manifest_version: u32,
    /// Version of the tool that wrote the dataset.
    pub tool_version: String,
    /// Number of rows in the parameter table.
    pub count: usize,
    /// Absent when rendering a parameter table produced elsewhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampling: Option<SamplingRecord>,
    /// Absent when only parameters were sampled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render: Option<RenderRecord>,
    /// Artifact file names relative to the dataset directory.
    pub artifacts: Vec<String>,
}

impl GenerationManifest {
    /// Creates a manifest for `count` rows with no sampling or render record.
    pub fn new(count: usize) -> Self {
        Self {
            manifest_version: MANIFEST_VERSION,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            count,
            sampling: None,
            render: None,
            artifacts: Vec::new(),
        }
    }

    /// Seed used for sampling, if known.
    pub fn seed(&self) -> Option<u32> {
        self.sampling.as_ref().map(|s| s.seed)
    }

    /// Adds an artifact by file name, ignoring duplicates.
    pub fn add_artifact(&mut self, path: &Path) {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if !self.artifacts.iter().any(|a| a == name) {
                self.artifacts.push(name.to_string());
            }
        }
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> DatasetResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the manifest as JSON.
    pub fn write(&self, path: &Path) -> DatasetResult<()> {
        let mut json = self.to_json_pretty()?;
        json.push('\n');
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reads a manifest written by [`GenerationManifest::write`].
    pub fn read(path: &Path) -> DatasetResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
