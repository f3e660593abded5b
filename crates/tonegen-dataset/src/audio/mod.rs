//! Audio codec: reading and writing the waveforms of a dataset.
//!
//! Waveforms are held as mono `f64` samples in [-1.0, 1.0]. Files are written
//! as 16-bit PCM, either WAV or FLAC; reading accepts any channel count and
//! collapses it to mono.

mod flac;
mod pcm;
mod wav;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{DatasetError, DatasetResult};

pub use flac::{read_flac, write_mono_flac};
pub use pcm::{int_to_sample, pcm_hash, samples_to_i16, samples_to_pcm16};
pub use wav::{read_wav, write_mono_wav, write_wav, WavFormat};

/// Container format for written audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// Lossless compressed FLAC.
    #[default]
    Flac,
    /// Uncompressed RIFF WAVE.
    Wav,
}

impl AudioFormat {
    /// All supported formats, in lookup preference order.
    pub const ALL: [AudioFormat; 2] = [AudioFormat::Flac, AudioFormat::Wav];

    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Flac => "flac",
            AudioFormat::Wav => "wav",
        }
    }

    /// Infers the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        ext.parse().ok()
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for AudioFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "flac" => Ok(AudioFormat::Flac),
            "wav" | "wave" => Ok(AudioFormat::Wav),
            other => Err(format!("unknown audio format '{}' (expected flac or wav)", other)),
        }
    }
}

/// Decoded audio with interleaved channels.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Samples, frame by frame.
    pub interleaved: Vec<f64>,
    /// Channel count.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.interleaved.len() / self.channels as usize
        }
    }

    /// Collapses all channels to mono by averaging each frame.
    pub fn downmix(&self) -> Waveform {
        let channels = self.channels.max(1) as usize;
        let samples = if channels == 1 {
            self.interleaved.clone()
        } else {
            self.interleaved
                .chunks_exact(channels)
                .map(|frame| frame.iter().sum::<f64>() / channels as f64)
                .collect()
        };
        Waveform {
            samples,
            sample_rate: self.sample_rate,
        }
    }
}

/// Mono waveform.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    /// Samples in [-1.0, 1.0].
    pub samples: Vec<f64>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl Waveform {
    /// Creates a waveform.
    pub fn new(samples: Vec<f64>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if the waveform has no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// BLAKE3 hash of the 16-bit PCM encoding.
    pub fn pcm_hash(&self) -> String {
        pcm_hash(&self.samples)
    }
}

/// Reads an audio file, choosing the decoder from the extension.
pub fn read_audio(path: &Path) -> DatasetResult<AudioBuffer> {
    match AudioFormat::from_path(path) {
        Some(AudioFormat::Wav) => read_wav(path),
        Some(AudioFormat::Flac) => read_flac(path),
        None => Err(DatasetError::audio(
            path,
            "unrecognized audio file extension (expected .flac or .wav)",
        )),
    }
}

/// Reads an audio file and collapses it to mono.
pub fn read_mono(path: &Path) -> DatasetResult<Waveform> {
    Ok(read_audio(path)?.downmix())
}

/// Writes a mono waveform in the given format.
pub fn write_mono(
    path: &Path,
    waveform: &[f64],
    sample_rate: u32,
    format: AudioFormat,
) -> DatasetResult<()> {
    match format {
        AudioFormat::Wav => write_mono_wav(path, waveform, sample_rate),
        AudioFormat::Flac => write_mono_flac(path, waveform, sample_rate),
    }
}
