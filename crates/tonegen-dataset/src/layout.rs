//! Timeline layout shared by the MIDI composer and the audio index.
//!
//! Every note occupies one fixed-length slot in the concatenated render. The
//! composer places note `i` at the start of slot `i`; the index builder cuts
//! slot `i` minus a margin on both sides. Both read their geometry from the
//! same [`LayoutConfig`] so the two cannot drift apart.

use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, DatasetResult};
use crate::note::NoteSpec;

/// Default slot length in seconds (one quarter note plus a two quarter note
/// rest at 60 quarter notes per minute).
pub const DEFAULT_PART_DURATION: f64 = 3.0;

/// Default margin trimmed from each side of a slot, in seconds.
pub const DEFAULT_MARGIN_DURATION: f64 = 0.5;

/// Default synthesis sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Slot geometry of the concatenated render.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Slot length in seconds.
    pub part_duration: f64,
    /// Margin trimmed from both ends of each slot, in seconds.
    pub margin_duration: f64,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            part_duration: DEFAULT_PART_DURATION,
            margin_duration: DEFAULT_MARGIN_DURATION,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

impl LayoutConfig {
    /// Creates a layout from explicit geometry.
    pub fn new(part_duration: f64, margin_duration: f64, sample_rate: u32) -> Self {
        Self {
            part_duration,
            margin_duration,
            sample_rate,
        }
    }

    /// Derives a layout whose slot length matches notes of the given timing.
    ///
    /// A slot holds the note followed by a rest of twice its length.
    pub fn for_note_timing(
        duration: f64,
        tempo: f64,
        margin_duration: f64,
        sample_rate: u32,
    ) -> Self {
        Self {
            part_duration: 3.0 * duration * 60.0 / tempo,
            margin_duration,
            sample_rate,
        }
    }

    /// Sets the sample rate.
    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Slot length in samples.
    pub fn part_samples(&self) -> u64 {
        (self.part_duration * self.sample_rate as f64).floor() as u64
    }

    /// Margin length in samples.
    pub fn margin_samples(&self) -> u64 {
        (self.margin_duration * self.sample_rate as f64).floor() as u64
    }

    /// Length of each cut clip in samples.
    pub fn clip_samples(&self) -> u64 {
        self.part_samples().saturating_sub(2 * self.margin_samples())
    }

    /// Total samples covered by `n` slots.
    pub fn total_samples(&self, n: usize) -> u64 {
        self.part_samples() * n as u64
    }

    /// Checks `part_duration > 2 * margin_duration > 0` and `sample_rate > 0`.
    pub fn validate(&self) -> DatasetResult<()> {
        if self.sample_rate == 0 {
            return Err(DatasetError::invalid_layout("sample rate must be positive"));
        }
        if !(self.part_duration.is_finite() && self.margin_duration.is_finite()) {
            return Err(DatasetError::invalid_layout(format!(
                "durations must be finite (part {}, margin {})",
                self.part_duration, self.margin_duration
            )));
        }
        if self.margin_duration <= 0.0 {
            return Err(DatasetError::invalid_layout(format!(
                "margin duration must be positive, got {}",
                self.margin_duration
            )));
        }
        if self.part_duration <= 2.0 * self.margin_duration {
            return Err(DatasetError::invalid_layout(format!(
                "part duration {} must exceed twice the margin duration {}",
                self.part_duration, self.margin_duration
            )));
        }
        if self.clip_samples() == 0 {
            return Err(DatasetError::invalid_layout(format!(
                "slots of {} samples leave no audio after {} margin samples per side",
                self.part_samples(),
                self.margin_samples()
            )));
        }
        Ok(())
    }

    /// Checks that every note's slot length equals `part_duration`.
    ///
    /// Variable-length slots are not supported: a row whose duration or
    /// tempo yields a different slot length would shift every later note
    /// relative to the index.
    pub fn check_notes(&self, notes: &[NoteSpec]) -> DatasetResult<()> {
        const TOLERANCE: f64 = 1e-9;
        for (row, note) in notes.iter().enumerate() {
            let slot = note.slot_seconds();
            if (slot - self.part_duration).abs() > TOLERANCE {
                return Err(DatasetError::invalid_layout(format!(
                    "row {} spans {}s (duration {} at tempo {}), layout expects {}s slots",
                    row, slot, note.duration, note.tempo, self.part_duration
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry() {
        let layout = LayoutConfig::default();
        assert_eq!(layout.part_samples(), 132300);
        assert_eq!(layout.margin_samples(), 22050);
        assert_eq!(layout.clip_samples(), 88200);
        assert_eq!(layout.total_samples(3), 396900);
        layout.validate().unwrap();
    }

    #[test]
    fn test_for_note_timing() {
        let layout = LayoutConfig::for_note_timing(1.0, 60.0, 0.5, 44100);
        assert_eq!(layout, LayoutConfig::default());

        let fast = LayoutConfig::for_note_timing(1.0, 120.0, 0.25, 22050);
        assert_eq!(fast.part_duration, 1.5);
        assert_eq!(fast.part_samples(), 33075);
    }

    #[test]
    fn test_margin_too_large() {
        let layout = LayoutConfig::new(3.0, 1.5, 44100);
        assert!(matches!(
            layout.validate(),
            Err(DatasetError::InvalidLayout { .. })
        ));
        let layout = LayoutConfig::new(3.0, 2.0, 44100);
        assert!(layout.validate().is_err());
    }

    #[test]
    fn test_non_positive_geometry() {
        assert!(LayoutConfig::new(3.0, 0.0, 44100).validate().is_err());
        assert!(LayoutConfig::new(-1.0, 0.5, 44100).validate().is_err());
        assert!(LayoutConfig::new(3.0, 0.5, 0).validate().is_err());
        assert!(LayoutConfig::new(f64::NAN, 0.5, 44100).validate().is_err());
    }

    #[test]
    fn test_check_notes() {
        let layout = LayoutConfig::default();
        let mut note = NoteSpec {
            midi_instrument: 0,
            midi_number: 60,
            volume: 0.7,
            duration: 1.0,
            tempo: 60.0,
        };
        layout.check_notes(&[note, note]).unwrap();

        note.tempo = 120.0;
        let err = layout.check_notes(&[note]).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidLayout { .. }));
        assert!(err.to_string().contains("row 0"));
    }
}
