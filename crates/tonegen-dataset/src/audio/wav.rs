//! WAV reading and deterministic writing.
//!
//! Files are written as 16-bit PCM with no timestamps or variable metadata,
//! so identical waveforms produce identical files.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use super::pcm::{int_to_sample, samples_to_pcm16};
use super::AudioBuffer;
use crate::error::{DatasetError, DatasetResult};

/// WAV file format parameters.
#[derive(Debug, Clone, Copy)]
pub struct WavFormat {
    /// Number of channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bits per sample (always 16 for this implementation).
    pub bits_per_sample: u16,
}

impl WavFormat {
    /// Creates a mono WAV format.
    pub fn mono(sample_rate: u32) -> Self {
        Self {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
        }
    }

    pub(crate) fn block_align(&self) -> u16 {
        self.channels * (self.bits_per_sample / 8)
    }

    pub(crate) fn byte_rate(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }
}

/// Writes a complete WAV file to a writer.
pub fn write_wav<W: Write>(writer: &mut W, format: &WavFormat, pcm_data: &[u8]) -> io::Result<()> {
    let data_size = pcm_data.len() as u32;
    let file_size = 36 + data_size; // Total file size minus 8 bytes for RIFF header

    // RIFF header
    writer.write_all(b"RIFF")?;
    writer.write_all(&file_size.to_le_bytes())?;
    writer.write_all(b"WAVE")?;

    // fmt chunk
    writer.write_all(b"fmt ")?;
    writer.write_all(&16u32.to_le_bytes())?; // Chunk size (16 for PCM)
    writer.write_all(&1u16.to_le_bytes())?; // Audio format (1 = PCM)
    writer.write_all(&format.channels.to_le_bytes())?;
    writer.write_all(&format.sample_rate.to_le_bytes())?;
    writer.write_all(&format.byte_rate().to_le_bytes())?;
    writer.write_all(&format.block_align().to_le_bytes())?;
    writer.write_all(&format.bits_per_sample.to_le_bytes())?;

    // data chunk
    writer.write_all(b"data")?;
    writer.write_all(&data_size.to_le_bytes())?;
    writer.write_all(pcm_data)?;

    Ok(())
}

/// Writes mono samples as a 16-bit PCM WAV file.
pub fn write_mono_wav(path: &Path, samples: &[f64], sample_rate: u32) -> DatasetResult<()> {
    let pcm = samples_to_pcm16(samples);
    let mut writer = BufWriter::new(File::create(path)?);
    write_wav(&mut writer, &WavFormat::mono(sample_rate), &pcm)?;
    writer.flush()?;
    Ok(())
}

/// Reads a WAV file of any channel count into interleaved samples.
///
/// Integer formats of 8 to 32 bits and 32-bit float are supported.
pub fn read_wav(path: &Path) -> DatasetResult<AudioBuffer> {
    let mut reader =
        hound::WavReader::open(path).map_err(|e| DatasetError::audio(path, e.to_string()))?;
    let spec = reader.spec();

    let interleaved: Vec<f64> = match spec.sample_format {
        hound::SampleFormat::Int => reader
            .samples::<i32>()
            .map(|s| s.map(|v| int_to_sample(v, spec.bits_per_sample as u32)))
            .collect::<Result<_, _>>()
            .map_err(|e| DatasetError::audio(path, e.to_string()))?,
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<Result<_, _>>()
            .map_err(|e| DatasetError::audio(path, e.to_string()))?,
    };

    Ok(AudioBuffer {
        interleaved,
        channels: spec.channels,
        sample_rate: spec.sample_rate,
    })
}
