//! Read-back view of a generated dataset.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::artifacts::DatasetPaths;
use crate::audio::{read_mono, AudioFormat, Waveform};
use crate::error::{DatasetError, DatasetResult};
use crate::index::{AudioIndex, AudioIndexEntry};
use crate::manifest::GenerationManifest;
use crate::note::NoteSpec;
use crate::slicer::slice_to_vec;
use crate::table::{read_index, read_parameters};

/// A dataset loaded from disk with its clips cut out.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    path: PathBuf,
    params: Vec<NoteSpec>,
    index: AudioIndex,
    audio: Waveform,
    audio_format: AudioFormat,
    samples: Vec<Vec<f64>>,
    manifest: Option<GenerationManifest>,
}

/// One labeled clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample<'a> {
    /// Note parameters of the row.
    pub params: &'a NoteSpec,
    /// Clip bounds within the concatenated waveform.
    pub entry: &'a AudioIndexEntry,
    /// The clip itself.
    pub audio: &'a [f64],
}

impl Dataset {
    /// Loads the dataset stored in `path`.
    ///
    /// Reads the parameter table, the audio index and the concatenated
    /// waveform (FLAC if present, otherwise WAV), checks that they agree
    /// and cuts one clip per row. A `manifest.json`, if present, must agree
    /// on the row count.
    pub fn open(path: impl AsRef<Path>) -> DatasetResult<Self> {
        let paths = DatasetPaths::new(path.as_ref());

        let params = read_parameters(&paths.parameters())?;
        let index = read_index(&paths.index())?;
        let (audio_path, audio_format) =
            paths
                .find_batch_audio()
                .ok_or_else(|| DatasetError::MissingArtifact {
                    path: paths.batch_audio(AudioFormat::default()),
                })?;

        if index.len() != params.len() {
            return Err(DatasetError::schema(
                paths.index(),
                format!(
                    "index has {} rows but the parameter table has {}",
                    index.len(),
                    params.len()
                ),
            ));
        }

        let manifest_path = paths.manifest();
        let manifest = if manifest_path.is_file() {
            let manifest = GenerationManifest::read(&manifest_path)?;
            if manifest.count != params.len() {
                return Err(DatasetError::schema(
                    &manifest_path,
                    format!(
                        "manifest records {} rows but the parameter table has {}",
                        manifest.count,
                        params.len()
                    ),
                ));
            }
            Some(manifest)
        } else {
            None
        };

        let audio = read_mono(&audio_path)?;
        if let Some(render) = manifest.as_ref().and_then(|m| m.render.as_ref()) {
            if render.layout.sample_rate != audio.sample_rate {
                return Err(DatasetError::schema(
                    &audio_path,
                    format!(
                        "audio is {} Hz but the manifest layout is {} Hz",
                        audio.sample_rate, render.layout.sample_rate
                    ),
                ));
            }
        }

        let samples = slice_to_vec(&audio.samples, &index)?;

        Ok(Self {
            path: paths.root().to_path_buf(),
            params,
            index,
            audio,
            audio_format,
            samples,
            manifest,
        })
    }

    /// Directory the dataset was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parameter table rows.
    pub fn params(&self) -> &[NoteSpec] {
        &self.params
    }

    /// Clip bounds, one entry per row.
    pub fn index(&self) -> &AudioIndex {
        &self.index
    }

    /// The concatenated mono waveform.
    pub fn audio(&self) -> &Waveform {
        &self.audio
    }

    /// Format the concatenated waveform was stored in.
    pub fn audio_format(&self) -> AudioFormat {
        self.audio_format
    }

    /// One clip per row, in row order.
    pub fn samples(&self) -> &[Vec<f64>] {
        &self.samples
    }

    /// The run manifest, if the directory has one.
    pub fn manifest(&self) -> Option<&GenerationManifest> {
        self.manifest.as_ref()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns true if the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// `(rows, clip_len)`; clip length is zero for an empty dataset.
    pub fn shape(&self) -> (usize, usize) {
        (
            self.samples.len(),
            self.samples.first().map_or(0, Vec::len),
        )
    }

    /// Row `i` with its parameters, bounds and audio.
    pub fn get(&self, i: usize) -> Option<Sample<'_>> {
        Some(Sample {
            params: self.params.get(i)?,
            entry: self.index.entries().get(i)?,
            audio: self.samples.get(i)?,
        })
    }

    /// Iterates over all rows.
    pub fn iter(&self) -> impl Iterator<Item = Sample<'_>> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (rows, clip_len) = self.shape();
        write!(
            f,
            "<Dataset at {} of shape ({}, {})>",
            self.path.display(),
            rows,
            clip_len
        )
    }
}
