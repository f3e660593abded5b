//! FLAC reading and writing.

use std::path::Path;

use flacenc::component::{BitRepr, Stream};
use flacenc::constant::MIN_BLOCK_SIZE;
use flacenc::error::Verify;
use flacenc::source::{Fill, FrameBuf};

use super::pcm::{int_to_sample, samples_to_i16};
use super::AudioBuffer;
use crate::error::{DatasetError, DatasetResult};

/// Writes mono samples as a 16-bit FLAC file.
///
/// Frames are `block_size` samples long except the last, which holds the
/// remainder, so the stream decodes to exactly `samples.len()` samples.
/// Fails for waveforms shorter than the smallest FLAC block (64 samples).
pub fn write_mono_flac(path: &Path, samples: &[f64], sample_rate: u32) -> DatasetResult<()> {
    if samples.len() < MIN_BLOCK_SIZE {
        return Err(DatasetError::audio(
            path,
            format!(
                "FLAC needs at least {} samples, got {}",
                MIN_BLOCK_SIZE,
                samples.len()
            ),
        ));
    }
    let pcm: Vec<i32> = samples_to_i16(samples).into_iter().map(i32::from).collect();

    let config = flacenc::config::Encoder::default()
        .into_verified()
        .map_err(|(_, e)| DatasetError::audio(path, format!("encoder config: {}", e)))?;
    let mut stream = Stream::new(sample_rate as usize, 1, 16)
        .map_err(|e| DatasetError::audio(path, e.to_string()))?;

    let mut offset = 0;
    for (number, len) in block_lengths(pcm.len(), config.block_size)
        .into_iter()
        .enumerate()
    {
        let block = &pcm[offset..offset + len];
        offset += len;

        let mut framebuf =
            FrameBuf::with_size(1, len).map_err(|e| DatasetError::audio(path, e.to_string()))?;
        framebuf
            .fill_interleaved(block)
            .map_err(|e| DatasetError::audio(path, e.to_string()))?;
        let frame = flacenc::encode_fixed_size_frame(&config, &framebuf, number, stream.stream_info())
            .map_err(|e| DatasetError::audio(path, format!("{:?}", e)))?;
        stream.add_frame(frame);
    }

    let mut sink = flacenc::bitsink::ByteSink::new();
    stream
        .write(&mut sink)
        .map_err(|e| DatasetError::audio(path, e.to_string()))?;
    std::fs::write(path, sink.as_slice())?;
    Ok(())
}

/// Splits `total` samples into frame lengths.
///
/// A remainder too short to be a frame of its own is folded into the
/// previous frame. `total` must be at least `MIN_BLOCK_SIZE`.
fn block_lengths(total: usize, block_size: usize) -> Vec<usize> {
    let mut lengths = vec![block_size; total / block_size];
    let tail = total % block_size;
    if tail == 0 {
        return lengths;
    }
    if tail < MIN_BLOCK_SIZE && !lengths.is_empty() {
        let last = lengths.len() - 1;
        lengths[last] += tail;
    } else {
        lengths.push(tail);
    }
    lengths
}

/// Reads a FLAC file into interleaved samples.
///
/// Samples beyond the STREAMINFO total, if one is recorded, are dropped.
pub fn read_flac(path: &Path) -> DatasetResult<AudioBuffer> {
    let mut reader =
        claxon::FlacReader::open(path).map_err(|e| DatasetError::audio(path, e.to_string()))?;
    let info = reader.streaminfo();

    let mut interleaved: Vec<f64> = reader
        .samples()
        .map(|s| s.map(|v| int_to_sample(v, info.bits_per_sample)))
        .collect::<Result<_, _>>()
        .map_err(|e| DatasetError::audio(path, e.to_string()))?;

    if let Some(total) = info.samples {
        interleaved.truncate(total as usize * info.channels as usize);
    }

    Ok(AudioBuffer {
        interleaved,
        channels: info.channels as u16,
        sample_rate: info.sample_rate,
    })
}
