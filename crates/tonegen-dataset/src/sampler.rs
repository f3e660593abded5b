//! Random note parameter sampling.
//!
//! Draws `n` note specifications from the allowed instrument set, each with a
//! pitch inside its instrument's playable range. Sampling is reproducible:
//! the same seed, count and ranges produce the same table bit for bit.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, DatasetResult};
use crate::instruments::{allowed_instruments, pitch_range};
use crate::note::{NoteSpec, PitchRange};
use crate::rng::create_rng;

/// Default velocity scale range.
pub const DEFAULT_VOLUME_RANGE: (f64, f64) = (0.5, 1.0);

/// Default note length in quarter notes.
pub const DEFAULT_DURATION: f64 = 1.0;

/// Default tempo in quarter notes per minute.
pub const DEFAULT_TEMPO: f64 = 60.0;

/// Configuration for [`sample`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Optional global restriction applied to every instrument's range.
    pub note_range: Option<PitchRange>,
    /// Half-open range `[low, high)` the volume is drawn from.
    pub volume_range: (f64, f64),
    /// Fixed note length in quarter notes, copied to every row.
    pub duration: f64,
    /// Fixed tempo in quarter notes per minute, copied to every row.
    pub tempo: f64,
    /// Seed for the scoped generator. `None` draws from entropy.
    pub seed: Option<u32>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            note_range: None,
            volume_range: DEFAULT_VOLUME_RANGE,
            duration: DEFAULT_DURATION,
            tempo: DEFAULT_TEMPO,
            seed: None,
        }
    }
}

impl SamplerConfig {
    /// Sets the seed.
    pub fn seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Restricts all pitches to `range`.
    pub fn note_range(mut self, range: PitchRange) -> Self {
        self.note_range = Some(range);
        self
    }

    /// Sets the volume range.
    pub fn volume_range(mut self, low: f64, high: f64) -> Self {
        self.volume_range = (low, high);
        self
    }

    /// Sets the fixed note length in quarter notes.
    pub fn duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    /// Sets the fixed tempo.
    pub fn tempo(mut self, tempo: f64) -> Self {
        self.tempo = tempo;
        self
    }

    /// Resolves the pitch range of `program` after applying `note_range`.
    ///
    /// Fails with `InvalidRange` if the program is unknown or the resolved
    /// range is empty.
    pub fn resolve_pitch_range(&self, program: u8) -> DatasetResult<PitchRange> {
        let range = pitch_range(program).ok_or_else(|| {
            DatasetError::invalid_range(format!("program {} is not a MIDI program", program))
        })?;
        let resolved = match self.note_range {
            Some(note_range) => range.clip(&note_range),
            None => range,
        };
        if resolved.is_empty() {
            return Err(DatasetError::invalid_range(format!(
                "pitch range of program {} {} is empty after clipping to {}",
                program,
                range,
                self.note_range.unwrap_or(range)
            )));
        }
        Ok(resolved)
    }

    /// Checks every parameter and every allowed instrument's resolved range.
    ///
    /// Validation does not depend on which instruments a particular seed
    /// would draw.
    pub fn validate(&self) -> DatasetResult<()> {
        if let Some(range) = self.note_range {
            if range.is_empty() {
                return Err(DatasetError::invalid_range(format!(
                    "note range {} has min > max",
                    range
                )));
            }
            if range.max > 127 {
                return Err(DatasetError::invalid_range(format!(
                    "note range {} exceeds MIDI note 127",
                    range
                )));
            }
        }

        let (low, high) = self.volume_range;
        if !(low.is_finite() && high.is_finite()) || low < 0.0 || high > 1.0 || low > high {
            return Err(DatasetError::invalid_range(format!(
                "volume range ({}, {}) must satisfy 0 <= low <= high <= 1",
                low, high
            )));
        }

        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(DatasetError::invalid_param(
                "duration",
                format!("must be positive, got {}", self.duration),
            ));
        }
        if !(self.tempo.is_finite() && self.tempo > 0.0) {
            return Err(DatasetError::invalid_param(
                "tempo",
                format!("must be positive, got {}", self.tempo),
            ));
        }

        for program in allowed_instruments() {
            self.resolve_pitch_range(program)?;
        }
        Ok(())
    }
}

/// Samples `n` notes using a generator seeded from `config.seed`.
///
/// When `config.seed` is `None` a fresh seed is drawn from entropy.
pub fn sample(n: usize, config: &SamplerConfig) -> DatasetResult<Vec<NoteSpec>> {
    let seed = config.seed.unwrap_or_else(crate::rng::entropy_seed);
    let mut rng = create_rng(seed);
    sample_with_rng(n, config, &mut rng)
}

/// Samples `n` notes from a caller-owned generator. `config.seed` is ignored.
///
/// Draw order: every row's instrument, then every row's pitch, then every
/// row's volume.
pub fn sample_with_rng<R: Rng + ?Sized>(
    n: usize,
    config: &SamplerConfig,
    rng: &mut R,
) -> DatasetResult<Vec<NoteSpec>> {
    config.validate()?;

    let allowed = allowed_instruments();
    let instruments = (0..n)
        .map(|_| {
            allowed
                .choose(rng)
                .copied()
                .ok_or_else(|| DatasetError::invalid_range("the allowed instrument set is empty"))
        })
        .collect::<DatasetResult<Vec<u8>>>()?;

    let mut pitches = Vec::with_capacity(n);
    for &program in &instruments {
        let range = config.resolve_pitch_range(program)?;
        pitches.push(rng.gen_range(range.min..=range.max));
    }

    let (low, high) = config.volume_range;
    let volumes: Vec<f64> = (0..n)
        .map(|_| {
            if low < high {
                rng.gen_range(low..high)
            } else {
                low
            }
        })
        .collect();

    Ok(instruments
        .into_iter()
        .zip(pitches)
        .zip(volumes)
        .map(|((midi_instrument, midi_number), volume)| NoteSpec {
            midi_instrument,
            midi_number,
            volume,
            duration: config.duration,
            tempo: config.tempo,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruments::is_allowed;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sample_is_deterministic() {
        let config = SamplerConfig::default().seed(42);
        let a = sample(50, &config).unwrap();
        let b = sample(50, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = sample(50, &SamplerConfig::default().seed(1)).unwrap();
        let b = sample(50, &SamplerConfig::default().seed(2)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_rows_respect_ranges() {
        let config = SamplerConfig::default().seed(7);
        let notes = sample(500, &config).unwrap();
        assert_eq!(notes.len(), 500);
        for note in &notes {
            assert!(is_allowed(note.midi_instrument));
            let range = pitch_range(note.midi_instrument).unwrap();
            assert!(range.contains(note.midi_number));
            assert!(note.volume >= 0.5 && note.volume < 1.0);
            assert_eq!(note.duration, 1.0);
            assert_eq!(note.tempo, 60.0);
        }
    }

    #[test]
    fn test_note_range_clips_pitches() {
        let config = SamplerConfig::default()
            .seed(3)
            .note_range(PitchRange::new(55, 60));
        for note in sample(300, &config).unwrap() {
            assert!((55..=60).contains(&note.midi_number));
        }
    }

    #[test]
    fn test_disjoint_note_range_collapses_to_nearest_pitch() {
        // Tuba tops out at 58, so [100, 110] pins it to 100.
        let config = SamplerConfig::default().note_range(PitchRange::new(100, 110));
        assert_eq!(config.resolve_pitch_range(58).unwrap(), PitchRange::new(100, 100));
        assert_eq!(config.resolve_pitch_range(0).unwrap(), PitchRange::new(100, 108));
    }

    #[test]
    fn test_unknown_program_is_rejected() {
        let config = SamplerConfig::default();
        assert!(matches!(
            config.resolve_pitch_range(200),
            Err(DatasetError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_inverted_note_range_is_rejected() {
        let config = SamplerConfig::default().note_range(PitchRange::new(70, 60));
        assert!(matches!(
            config.validate(),
            Err(DatasetError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_invalid_volume_range_is_rejected() {
        let config = SamplerConfig::default().volume_range(0.9, 0.1);
        assert!(matches!(
            config.validate(),
            Err(DatasetError::InvalidRange { .. })
        ));
        let config = SamplerConfig::default().volume_range(0.5, 1.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_degenerate_volume_range() {
        let config = SamplerConfig::default().seed(9).volume_range(0.8, 0.8);
        for note in sample(20, &config).unwrap() {
            assert_eq!(note.volume, 0.8);
        }
    }

    #[test]
    fn test_non_positive_tempo_is_rejected() {
        let config = SamplerConfig::default().tempo(0.0);
        assert!(matches!(
            config.validate(),
            Err(DatasetError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_fixed_duration_and_tempo_are_copied() {
        let config = SamplerConfig::default().seed(5).duration(0.5).tempo(120.0);
        for note in sample(10, &config).unwrap() {
            assert_eq!(note.duration, 0.5);
            assert_eq!(note.tempo, 120.0);
        }
    }

    #[test]
    fn test_zero_rows() {
        let notes = sample(0, &SamplerConfig::default().seed(1)).unwrap();
        assert!(notes.is_empty());
    }
}
