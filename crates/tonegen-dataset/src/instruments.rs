//! General MIDI instrument table.
//!
//! Static reference data: the playable pitch range of every General MIDI
//! program, and the subset of programs the sampler may draw from.

use std::ops::Range;

use crate::note::PitchRange;

/// Static description of one General MIDI program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstrumentInfo {
    /// MIDI program number (0-127).
    pub program: u8,
    /// General MIDI instrument name.
    pub name: &'static str,
    /// Lowest playable MIDI note.
    pub min_pitch: u8,
    /// Highest playable MIDI note.
    pub max_pitch: u8,
}

impl InstrumentInfo {
    const fn new(program: u8, name: &'static str, min_pitch: u8, max_pitch: u8) -> Self {
        Self {
            program,
            name,
            min_pitch,
            max_pitch,
        }
    }

    /// Playable range of this instrument.
    pub fn pitch_range(&self) -> PitchRange {
        PitchRange::new(self.min_pitch, self.max_pitch)
    }

    /// General MIDI family this program belongs to.
    pub fn family(&self) -> &'static str {
        family_name(self.program)
    }
}

/// Program ranges the sampler draws from: piano, organ and guitar, strings,
/// brass, reed and pipe.
pub const ALLOWED_PROGRAMS: [Range<u8>; 4] = [0..8, 16..32, 40..48, 56..80];

/// General MIDI families, eight programs each.
const FAMILIES: [&str; 16] = [
    "piano",
    "chromatic percussion",
    "organ",
    "guitar",
    "bass",
    "strings",
    "ensemble",
    "brass",
    "reed",
    "pipe",
    "synth lead",
    "synth pad",
    "synth effects",
    "ethnic",
    "percussive",
    "sound effects",
];

#[rustfmt::skip]
static INSTRUMENTS: [InstrumentInfo; 128] = [
    InstrumentInfo::new(0, "Acoustic Grand Piano", 21, 108),
    InstrumentInfo::new(1, "Bright Acoustic Piano", 21, 108),
    InstrumentInfo::new(2, "Electric Grand Piano", 21, 108),
    InstrumentInfo::new(3, "Honky-tonk Piano", 21, 108),
    InstrumentInfo::new(4, "Electric Piano 1", 28, 103),
    InstrumentInfo::new(5, "Electric Piano 2", 28, 103),
    InstrumentInfo::new(6, "Harpsichord", 29, 89),
    InstrumentInfo::new(7, "Clavinet", 29, 88),
    InstrumentInfo::new(8, "Celesta", 60, 108),
    InstrumentInfo::new(9, "Glockenspiel", 79, 108),
    InstrumentInfo::new(10, "Music Box", 60, 96),
    InstrumentInfo::new(11, "Vibraphone", 53, 89),
    InstrumentInfo::new(12, "Marimba", 45, 96),
    InstrumentInfo::new(13, "Xylophone", 65, 108),
    InstrumentInfo::new(14, "Tubular Bells", 60, 77),
    InstrumentInfo::new(15, "Dulcimer", 48, 84),
    InstrumentInfo::new(16, "Drawbar Organ", 36, 96),
    InstrumentInfo::new(17, "Percussive Organ", 36, 96),
    InstrumentInfo::new(18, "Rock Organ", 36, 96),
    InstrumentInfo::new(19, "Church Organ", 21, 108),
    InstrumentInfo::new(20, "Reed Organ", 36, 96),
    InstrumentInfo::new(21, "Accordion", 41, 89),
    InstrumentInfo::new(22, "Harmonica", 60, 84),
    InstrumentInfo::new(23, "Tango Accordion", 41, 89),
    InstrumentInfo::new(24, "Acoustic Guitar (nylon)", 40, 84),
    InstrumentInfo::new(25, "Acoustic Guitar (steel)", 40, 84),
    InstrumentInfo::new(26, "Electric Guitar (jazz)", 40, 86),
    InstrumentInfo::new(27, "Electric Guitar (clean)", 40, 86),
    InstrumentInfo::new(28, "Electric Guitar (muted)", 40, 86),
    InstrumentInfo::new(29, "Overdriven Guitar", 40, 86),
    InstrumentInfo::new(30, "Distortion Guitar", 40, 86),
    InstrumentInfo::new(31, "Guitar Harmonics", 40, 86),
    InstrumentInfo::new(32, "Acoustic Bass", 28, 55),
    InstrumentInfo::new(33, "Electric Bass (finger)", 28, 55),
    InstrumentInfo::new(34, "Electric Bass (pick)", 28, 55),
    InstrumentInfo::new(35, "Fretless Bass", 28, 55),
    InstrumentInfo::new(36, "Slap Bass 1", 28, 55),
    InstrumentInfo::new(37, "Slap Bass 2", 28, 55),
    InstrumentInfo::new(38, "Synth Bass 1", 28, 55),
    InstrumentInfo::new(39, "Synth Bass 2", 28, 55),
    InstrumentInfo::new(40, "Violin", 55, 103),
    InstrumentInfo::new(41, "Viola", 48, 91),
    InstrumentInfo::new(42, "Cello", 36, 76),
    InstrumentInfo::new(43, "Contrabass", 28, 67),
    InstrumentInfo::new(44, "Tremolo Strings", 28, 96),
    InstrumentInfo::new(45, "Pizzicato Strings", 28, 96),
    InstrumentInfo::new(46, "Orchestral Harp", 23, 103),
    InstrumentInfo::new(47, "Timpani", 36, 57),
    InstrumentInfo::new(48, "String Ensemble 1", 28, 96),
    InstrumentInfo::new(49, "String Ensemble 2", 28, 96),
    InstrumentInfo::new(50, "Synth Strings 1", 36, 96),
    InstrumentInfo::new(51, "Synth Strings 2", 36, 96),
    InstrumentInfo::new(52, "Choir Aahs", 48, 79),
    InstrumentInfo::new(53, "Voice Oohs", 48, 79),
    InstrumentInfo::new(54, "Synth Voice", 48, 84),
    InstrumentInfo::new(55, "Orchestra Hit", 48, 72),
    InstrumentInfo::new(56, "Trumpet", 52, 84),
    InstrumentInfo::new(57, "Trombone", 40, 72),
    InstrumentInfo::new(58, "Tuba", 28, 58),
    InstrumentInfo::new(59, "Muted Trumpet", 52, 82),
    InstrumentInfo::new(60, "French Horn", 34, 77),
    InstrumentInfo::new(61, "Brass Section", 36, 84),
    InstrumentInfo::new(62, "Synth Brass 1", 36, 84),
    InstrumentInfo::new(63, "Synth Brass 2", 36, 84),
    InstrumentInfo::new(64, "Soprano Sax", 56, 87),
    InstrumentInfo::new(65, "Alto Sax", 49, 80),
    InstrumentInfo::new(66, "Tenor Sax", 44, 75),
    InstrumentInfo::new(67, "Baritone Sax", 36, 68),
    InstrumentInfo::new(68, "Oboe", 58, 91),
    InstrumentInfo::new(69, "English Horn", 52, 81),
    InstrumentInfo::new(70, "Bassoon", 34, 72),
    InstrumentInfo::new(71, "Clarinet", 50, 91),
    InstrumentInfo::new(72, "Piccolo", 74, 108),
    InstrumentInfo::new(73, "Flute", 60, 96),
    InstrumentInfo::new(74, "Recorder", 72, 98),
    InstrumentInfo::new(75, "Pan Flute", 60, 96),
    InstrumentInfo::new(76, "Blown Bottle", 60, 96),
    InstrumentInfo::new(77, "Shakuhachi", 55, 84),
    InstrumentInfo::new(78, "Whistle", 72, 96),
    InstrumentInfo::new(79, "Ocarina", 60, 84),
    InstrumentInfo::new(80, "Lead 1 (square)", 36, 96),
    InstrumentInfo::new(81, "Lead 2 (sawtooth)", 36, 96),
    InstrumentInfo::new(82, "Lead 3 (calliope)", 36, 96),
    InstrumentInfo::new(83, "Lead 4 (chiff)", 36, 96),
    InstrumentInfo::new(84, "Lead 5 (charang)", 36, 96),
    InstrumentInfo::new(85, "Lead 6 (voice)", 36, 96),
    InstrumentInfo::new(86, "Lead 7 (fifths)", 36, 96),
    InstrumentInfo::new(87, "Lead 8 (bass + lead)", 36, 96),
    InstrumentInfo::new(88, "Pad 1 (new age)", 36, 96),
    InstrumentInfo::new(89, "Pad 2 (warm)", 36, 96),
    InstrumentInfo::new(90, "Pad 3 (polysynth)", 36, 96),
    InstrumentInfo::new(91, "Pad 4 (choir)", 36, 96),
    InstrumentInfo::new(92, "Pad 5 (bowed)", 36, 96),
    InstrumentInfo::new(93, "Pad 6 (metallic)", 36, 96),
    InstrumentInfo::new(94, "Pad 7 (halo)", 36, 96),
    InstrumentInfo::new(95, "Pad 8 (sweep)", 36, 96),
    InstrumentInfo::new(96, "FX 1 (rain)", 36, 96),
    InstrumentInfo::new(97, "FX 2 (soundtrack)", 36, 96),
    InstrumentInfo::new(98, "FX 3 (crystal)", 36, 96),
    InstrumentInfo::new(99, "FX 4 (atmosphere)", 36, 96),
    InstrumentInfo::new(100, "FX 5 (brightness)", 36, 96),
    InstrumentInfo::new(101, "FX 6 (goblins)", 36, 96),
    InstrumentInfo::new(102, "FX 7 (echoes)", 36, 96),
    InstrumentInfo::new(103, "FX 8 (sci-fi)", 36, 96),
    InstrumentInfo::new(104, "Sitar", 48, 77),
    InstrumentInfo::new(105, "Banjo", 48, 84),
    InstrumentInfo::new(106, "Shamisen", 50, 79),
    InstrumentInfo::new(107, "Koto", 55, 84),
    InstrumentInfo::new(108, "Kalimba", 60, 84),
    InstrumentInfo::new(109, "Bag pipe", 55, 77),
    InstrumentInfo::new(110, "Fiddle", 55, 96),
    InstrumentInfo::new(111, "Shanai", 60, 84),
    InstrumentInfo::new(112, "Tinkle Bell", 72, 96),
    InstrumentInfo::new(113, "Agogo", 60, 72),
    InstrumentInfo::new(114, "Steel Drums", 52, 76),
    InstrumentInfo::new(115, "Woodblock", 60, 72),
    InstrumentInfo::new(116, "Taiko Drum", 36, 60),
    InstrumentInfo::new(117, "Melodic Tom", 36, 72),
    InstrumentInfo::new(118, "Synth Drum", 36, 72),
    InstrumentInfo::new(119, "Reverse Cymbal", 36, 72),
    InstrumentInfo::new(120, "Guitar Fret Noise", 40, 72),
    InstrumentInfo::new(121, "Breath Noise", 60, 72),
    InstrumentInfo::new(122, "Seashore", 60, 72),
    InstrumentInfo::new(123, "Bird Tweet", 72, 96),
    InstrumentInfo::new(124, "Telephone Ring", 60, 72),
    InstrumentInfo::new(125, "Helicopter", 60, 72),
    InstrumentInfo::new(126, "Applause", 60, 72),
    InstrumentInfo::new(127, "Gunshot", 60, 72),
];

/// Looks up a program in the instrument table.
pub fn instrument(program: u8) -> Option<&'static InstrumentInfo> {
    INSTRUMENTS.get(program as usize)
}

/// Playable pitch range of a program, or `None` for programs above 127.
pub fn pitch_range(program: u8) -> Option<PitchRange> {
    instrument(program).map(InstrumentInfo::pitch_range)
}

/// All 128 table entries in program order.
pub fn all_instruments() -> &'static [InstrumentInfo] {
    &INSTRUMENTS
}

/// General MIDI family name for a program.
pub fn family_name(program: u8) -> &'static str {
    FAMILIES[(program as usize / 8) % FAMILIES.len()]
}

/// Programs the sampler may draw from, in ascending order.
pub fn allowed_instruments() -> Vec<u8> {
    ALLOWED_PROGRAMS
        .iter()
        .flat_map(|range| range.clone())
        .collect()
}

/// Returns true if `program` is in the allowed set.
pub fn is_allowed(program: u8) -> bool {
    ALLOWED_PROGRAMS.iter().any(|range| range.contains(&program))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_indexed_by_program() {
        for (i, info) in all_instruments().iter().enumerate() {
            assert_eq!(info.program as usize, i);
            assert!(info.min_pitch <= info.max_pitch, "{}", info.name);
            assert!(info.max_pitch <= 127);
        }
    }

    #[test]
    fn test_allowed_instruments() {
        let allowed = allowed_instruments();
        assert_eq!(allowed.len(), 8 + 16 + 8 + 24);
        assert_eq!(allowed.first(), Some(&0));
        assert_eq!(allowed.last(), Some(&79));
        assert!(!allowed.contains(&8));
        assert!(!allowed.contains(&32));
        assert!(allowed.contains(&40));
        assert!(is_allowed(56));
        assert!(!is_allowed(80));
    }

    #[test]
    fn test_lookup() {
        let piano = instrument(0).unwrap();
        assert_eq!(piano.name, "Acoustic Grand Piano");
        assert_eq!(piano.family(), "piano");
        assert_eq!(pitch_range(42), Some(PitchRange::new(36, 76)));
        assert_eq!(family_name(73), "pipe");
        assert!(instrument(128).is_none());
    }
}
