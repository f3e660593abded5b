//! Tests for the audio codec module.

use std::path::Path;

use super::*;

fn sine(len: usize, sample_rate: u32) -> Vec<f64> {
    (0..len)
        .map(|i| 0.5 * (2.0 * std::f64::consts::PI * 440.0 * i as f64 / sample_rate as f64).sin())
        .collect()
}

// =========================================================================
// Format tests
// =========================================================================

#[test]
fn test_audio_format_parse() {
    assert_eq!("flac".parse::<AudioFormat>().unwrap(), AudioFormat::Flac);
    assert_eq!("WAV".parse::<AudioFormat>().unwrap(), AudioFormat::Wav);
    assert!("mp3".parse::<AudioFormat>().is_err());
    assert_eq!(AudioFormat::default(), AudioFormat::Flac);
    assert_eq!(AudioFormat::Wav.to_string(), "wav");
}

#[test]
fn test_audio_format_from_path() {
    assert_eq!(
        AudioFormat::from_path(Path::new("out/all_samples.flac")),
        Some(AudioFormat::Flac)
    );
    assert_eq!(
        AudioFormat::from_path(Path::new("sample_000001.wav")),
        Some(AudioFormat::Wav)
    );
    assert_eq!(AudioFormat::from_path(Path::new("parameters.csv")), None);
}

#[test]
fn test_wav_format_mono() {
    let format = WavFormat::mono(44100);
    assert_eq!(format.channels, 1);
    assert_eq!(format.block_align(), 2);
    assert_eq!(format.byte_rate(), 88200);
}

// =========================================================================
// PCM conversion tests
// =========================================================================

#[test]
fn test_samples_to_pcm16_clipping() {
    let pcm = samples_to_i16(&[0.0, 0.5, -0.5, 2.0, -2.0]);
    assert_eq!(pcm, vec![0, 16384, -16384, 32767, -32767]);
}

#[test]
fn test_int_to_sample() {
    assert_eq!(int_to_sample(16384, 16), 0.5);
    assert_eq!(int_to_sample(-32768, 16), -1.0);
    assert_eq!(int_to_sample(64, 8), 0.5);
}

#[test]
fn test_pcm_hash_format() {
    let hash = pcm_hash(&[0.0, 0.1, 0.2]);
    assert_eq!(hash.len(), 64);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(hash, pcm_hash(&[0.0, 0.1, 0.2]));
}

// =========================================================================
// Downmix tests
// =========================================================================

#[test]
fn test_downmix_averages_channels() {
    let buffer = AudioBuffer {
        interleaved: vec![1.0, 0.0, 0.5, 0.5, -1.0, 1.0],
        channels: 2,
        sample_rate: 8000,
    };
    assert_eq!(buffer.frames(), 3);
    let mono = buffer.downmix();
    assert_eq!(mono.samples, vec![0.5, 0.5, 0.0]);
    assert_eq!(mono.sample_rate, 8000);
}

#[test]
fn test_downmix_mono_is_identity() {
    let buffer = AudioBuffer {
        interleaved: vec![0.25, -0.25],
        channels: 1,
        sample_rate: 8000,
    };
    assert_eq!(buffer.downmix().samples, vec![0.25, -0.25]);
}

// =========================================================================
// File round trips
// =========================================================================

#[test]
fn test_wav_file_header() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("tone.wav");
    write_mono(&path, &[0.0; 10], 44100, AudioFormat::Wav).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 44 + 20);
    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(&bytes[8..12], b"WAVE");
    assert_eq!(&bytes[36..40], b"data");
}

#[test]
fn test_wav_write_is_deterministic() {
    let tmp = tempfile::tempdir().unwrap();
    let a = tmp.path().join("a.wav");
    let b = tmp.path().join("b.wav");
    let samples = sine(1000, 22050);
    write_mono(&a, &samples, 22050, AudioFormat::Wav).unwrap();
    write_mono(&b, &samples, 22050, AudioFormat::Wav).unwrap();
    assert_eq!(std::fs::read(&a).unwrap(), std::fs::read(&b).unwrap());
}

#[test]
fn test_wav_and_flac_decode_to_same_samples() {
    let tmp = tempfile::tempdir().unwrap();
    let samples = sine(4096, 22050);

    let wav_path = tmp.path().join("tone.wav");
    let flac_path = tmp.path().join("tone.flac");
    write_mono(&wav_path, &samples, 22050, AudioFormat::Wav).unwrap();
    write_mono(&flac_path, &samples, 22050, AudioFormat::Flac).unwrap();

    let from_wav = read_mono(&wav_path).unwrap();
    let from_flac = read_mono(&flac_path).unwrap();

    assert_eq!(from_wav.sample_rate, 22050);
    assert_eq!(from_flac.sample_rate, 22050);
    assert_eq!(from_wav.len(), samples.len());
    assert_eq!(from_wav.samples, from_flac.samples);
    for (read, written) in from_wav.samples.iter().zip(&samples) {
        assert!((read - written).abs() < 1e-3);
    }
}

#[test]
fn test_flac_keeps_exact_length() {
    let tmp = tempfile::tempdir().unwrap();
    // Full blocks, a short last block, a folded tail and a single block
    for len in [8192usize, 24000, 4100, 100] {
        let samples = sine(len, 8000);
        let path = tmp.path().join(format!("tone_{}.flac", len));
        write_mono(&path, &samples, 8000, AudioFormat::Flac).unwrap();

        let read = read_mono(&path).unwrap();
        assert_eq!(read.len(), len, "length {} changed on read", len);
        assert_eq!(read.sample_rate, 8000);
        for (r, w) in read.samples.iter().zip(&samples) {
            assert!((r - w).abs() < 1e-3);
        }
    }
}

#[test]
fn test_flac_rejects_waveform_below_one_block() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("tiny.flac");
    let err = write_mono(&path, &[0.0; 10], 8000, AudioFormat::Flac).unwrap_err();
    assert!(matches!(err, crate::error::DatasetError::Audio { .. }));
    assert!(!path.exists());
}

#[test]
fn test_read_stereo_wav_written_by_hound() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("stereo.wav");
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for _ in 0..4 {
        writer.write_sample(16384i16).unwrap();
        writer.write_sample(0i16).unwrap();
    }
    writer.finalize().unwrap();

    let buffer = read_audio(&path).unwrap();
    assert_eq!(buffer.channels, 2);
    assert_eq!(buffer.frames(), 4);
    let mono = buffer.downmix();
    assert_eq!(mono.samples, vec![0.25; 4]);
}

#[test]
fn test_read_unknown_extension_fails() {
    let err = read_audio(Path::new("clip.ogg")).unwrap_err();
    assert!(matches!(err, crate::error::DatasetError::Audio { .. }));
}
