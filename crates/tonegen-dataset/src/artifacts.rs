//! File names of a dataset directory.

use std::path::{Path, PathBuf};

use crate::audio::AudioFormat;
use crate::error::DatasetResult;

/// Parameter table file name.
pub const PARAMETERS_FILE: &str = "parameters.csv";

/// Audio index table file name.
pub const INDEX_FILE: &str = "all_samples_index.csv";

/// Stem of the concatenated audio and MIDI files.
pub const ALL_SAMPLES_STEM: &str = "all_samples";

/// Run manifest file name.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Paths of every artifact inside one dataset directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    root: PathBuf,
}

impl DatasetPaths {
    /// Creates the path set for a dataset directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The dataset directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn parameters(&self) -> PathBuf {
        self.root.join(PARAMETERS_FILE)
    }

    pub fn index(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    pub fn manifest(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    /// Concatenated MIDI sequence of a batch render.
    pub fn batch_midi(&self) -> PathBuf {
        self.root.join(format!("{}.midi", ALL_SAMPLES_STEM))
    }

    /// Concatenated mono waveform of a batch render.
    pub fn batch_audio(&self, format: AudioFormat) -> PathBuf {
        self.root
            .join(format!("{}.{}", ALL_SAMPLES_STEM, format.extension()))
    }

    /// One cut clip of a batch render.
    pub fn slice(&self, row: usize, format: AudioFormat) -> PathBuf {
        self.root
            .join(format!("sample_{:06}.{}", row, format.extension()))
    }

    /// MIDI file of one note in separate mode.
    pub fn note_midi(&self, row: usize) -> PathBuf {
        self.root.join(format!("{:06}.midi", row))
    }

    /// Audio file of one note in separate mode.
    pub fn note_audio(&self, row: usize, format: AudioFormat) -> PathBuf {
        self.root.join(format!("{:06}.{}", row, format.extension()))
    }

    /// Locates the concatenated waveform, preferring FLAC over WAV.
    pub fn find_batch_audio(&self) -> Option<(PathBuf, AudioFormat)> {
        AudioFormat::ALL
            .iter()
            .map(|&format| (self.batch_audio(format), format))
            .find(|(path, _)| path.is_file())
    }

    /// Render outputs already present in the directory, sorted by name.
    ///
    /// Covers both audio formats and slice or note files at any row. The
    /// parameter table is not included: rendering reads it. A missing
    /// directory has no outputs.
    pub fn existing_render_outputs(&self) -> DatasetResult<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if entry.file_name().to_str().is_some_and(is_render_output) {
                paths.push(entry.path());
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Deletes every render output, returning what was removed.
    pub fn remove_render_outputs(&self) -> DatasetResult<Vec<PathBuf>> {
        let paths = self.existing_render_outputs()?;
        for path in &paths {
            std::fs::remove_file(path)?;
        }
        Ok(paths)
    }
}

/// Whether `name` is a file a render writes.
fn is_render_output(name: &str) -> bool {
    if name == INDEX_FILE || name == MANIFEST_FILE {
        return true;
    }
    let Some((stem, ext)) = name.rsplit_once('.') else {
        return false;
    };
    let is_audio = AudioFormat::ALL.iter().any(|f| f.extension() == ext);
    let is_row = |s: &str| s.len() == 6 && s.bytes().all(|b| b.is_ascii_digit());

    match ext {
        "midi" => stem == ALL_SAMPLES_STEM || is_row(stem),
        _ if is_audio => {
            stem == ALL_SAMPLES_STEM
                || is_row(stem)
                || stem.strip_prefix("sample_").is_some_and(is_row)
        }
        _ => false,
    }
}
