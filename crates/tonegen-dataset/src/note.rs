//! Note parameter types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of the parameter table: a single note to render.
///
/// The row's position in the table is its sample ordinal, which is also the
/// join key with the audio index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteSpec {
    /// MIDI program number (0-127).
    pub midi_instrument: u8,
    /// MIDI note number (0-127).
    pub midi_number: u8,
    /// Velocity scale in [0, 1].
    pub volume: f64,
    /// Note length in quarter notes.
    pub duration: f64,
    /// Quarter notes per minute.
    pub tempo: f64,
}

impl NoteSpec {
    /// Length of the note plus its trailing rest, in quarter notes.
    ///
    /// Every note is followed by a rest twice its length.
    pub fn slot_quarter_notes(&self) -> f64 {
        3.0 * self.duration
    }

    /// Length of the note plus its trailing rest, in seconds.
    pub fn slot_seconds(&self) -> f64 {
        self.slot_quarter_notes() * 60.0 / self.tempo
    }

    /// MIDI velocity derived from `volume`.
    pub fn velocity(&self) -> u8 {
        (self.volume.clamp(0.0, 1.0) * 127.0).round() as u8
    }
}

/// Inclusive range of MIDI note numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PitchRange {
    /// Lowest allowed note number.
    pub min: u8,
    /// Highest allowed note number.
    pub max: u8,
}

impl PitchRange {
    /// Creates a new pitch range. No ordering is enforced here; use
    /// [`PitchRange::is_empty`] to check.
    pub const fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    /// Returns true if no pitch satisfies `min <= p <= max`.
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Returns true if `pitch` lies inside the range.
    pub fn contains(&self, pitch: u8) -> bool {
        self.min <= pitch && pitch <= self.max
    }

    /// Clamps both endpoints into `bounds`.
    ///
    /// A range lying entirely outside `bounds` collapses onto the nearest
    /// endpoint of `bounds`. `bounds` must not be empty.
    pub fn clip(&self, bounds: &PitchRange) -> PitchRange {
        PitchRange {
            min: self.min.max(bounds.min).min(bounds.max),
            max: self.max.max(bounds.min).min(bounds.max),
        }
    }
}

impl fmt::Display for PitchRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}
