//! PCM conversion and hashing.

/// Converts f64 samples to 16-bit integers.
///
/// Samples are expected to be in range [-1.0, 1.0]. Values outside this range
/// are clipped.
pub fn samples_to_i16(samples: &[f64]) -> Vec<i16> {
    samples
        .iter()
        .map(|&sample| (sample.clamp(-1.0, 1.0) * 32767.0).round() as i16)
        .collect()
}

/// Converts f64 samples to little-endian 16-bit PCM bytes.
pub fn samples_to_pcm16(samples: &[f64]) -> Vec<u8> {
    let mut pcm = Vec::with_capacity(samples.len() * 2);
    for value in samples_to_i16(samples) {
        pcm.extend_from_slice(&value.to_le_bytes());
    }
    pcm
}

/// Scales a signed integer sample of the given bit depth to [-1.0, 1.0).
pub fn int_to_sample(value: i32, bits_per_sample: u32) -> f64 {
    let full_scale = (1u64 << (bits_per_sample.clamp(1, 32) - 1)) as f64;
    value as f64 / full_scale
}

/// BLAKE3 hash of the 16-bit PCM encoding of `samples`.
///
/// Identical for WAV and FLAC output of the same waveform, so runs can be
/// compared regardless of container.
pub fn pcm_hash(samples: &[f64]) -> String {
    blake3::hash(&samples_to_pcm16(samples)).to_hex().to_string()
}
