//! MIDI composition of note batches using the midly crate.
//!
//! A batch is a single-track Standard MIDI File. Note `i` starts at the
//! beginning of slot `i` and is followed by a rest of twice its length, so
//! each slot spans `3 * duration` quarter notes. Every note carries its own
//! tempo and program change, which keeps the file valid even if a player
//! starts in the middle.

use std::path::Path;

use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
};
use tonegen_dataset::{DatasetError, LayoutConfig, NoteSpec};

use crate::error::{SynthError, SynthResult};

/// Pulses per quarter note.
pub const TICKS_PER_QUARTER: u16 = 480;

/// Channel every note is played on.
const CHANNEL: u8 = 0;

const TRACK_NAME: &[u8] = b"tonegen";

/// Composes all notes into one sequence laid out on `layout`'s slots.
///
/// Fails with `InvalidLayout` if any row's slot length differs from
/// `layout.part_duration`, since the audio index would no longer line up
/// with the rendered notes.
pub fn compose_batch(notes: &[NoteSpec], layout: &LayoutConfig) -> SynthResult<Smf<'static>> {
    layout.validate()?;
    layout.check_notes(notes)?;
    compose(notes, layout.part_duration)
}

/// Composes one note followed by its rest.
pub fn compose_single_note(note: &NoteSpec) -> SynthResult<Smf<'static>> {
    compose(std::slice::from_ref(note), note.slot_seconds())
}

/// Serializes a sequence to a `.midi` file.
pub fn write_midi(smf: &Smf, path: &Path) -> SynthResult<()> {
    let mut bytes = Vec::new();
    smf.write(&mut bytes)
        .map_err(|e| SynthError::midi_write(path, e.to_string()))?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Microseconds per quarter note for a tempo in quarter notes per minute.
pub fn tempo_to_micros(tempo: f64) -> u32 {
    (60_000_000.0 / tempo).round() as u32
}

/// A track under construction whose events are placed by absolute time.
///
/// Each delta is rounded against the time the previous event actually
/// landed on, so tick rounding stays within half a tick of the target and
/// never builds up across slots.
struct Timeline {
    track: Track<'static>,
    /// Time of the last event under the tempo map written so far.
    seconds: f64,
    micros_per_quarter: u32,
}

impl Timeline {
    fn new() -> Self {
        Self {
            track: Track::new(),
            seconds: 0.0,
            // MIDI default until the first tempo event
            micros_per_quarter: 500_000,
        }
    }

    fn ticks_per_second(&self) -> f64 {
        TICKS_PER_QUARTER as f64 * 1e6 / self.micros_per_quarter as f64
    }

    fn push_at(&mut self, at: f64, kind: TrackEventKind<'static>) {
        let ticks_per_second = self.ticks_per_second();
        let delta = ((at - self.seconds) * ticks_per_second).round().max(0.0) as u32;
        self.seconds += delta as f64 / ticks_per_second;
        push(&mut self.track, delta, kind);
    }

    fn set_tempo_at(&mut self, at: f64, micros_per_quarter: u32) {
        self.push_at(
            at,
            TrackEventKind::Meta(MetaMessage::Tempo(micros_per_quarter.into())),
        );
        self.micros_per_quarter = micros_per_quarter;
    }
}

fn compose(notes: &[NoteSpec], slot_seconds: f64) -> SynthResult<Smf<'static>> {
    let mut timeline = Timeline::new();
    timeline.push_at(0.0, TrackEventKind::Meta(MetaMessage::TrackName(TRACK_NAME)));

    for (row, note) in notes.iter().enumerate() {
        check_note(row, note)?;

        let micros = tempo_to_micros(note.tempo);
        if micros == 0 || micros > 0x00FF_FFFF {
            return Err(DatasetError::invalid_param(
                "tempo",
                format!("row {}: tempo {} cannot be encoded in a MIDI file", row, note.tempo),
            )
            .into());
        }

        let start = row as f64 * slot_seconds;
        let end = start + note.duration * 60.0 / note.tempo;

        timeline.set_tempo_at(start, micros);
        timeline.push_at(
            start,
            midi(MidiMessage::ProgramChange {
                program: note.midi_instrument.into(),
            }),
        );
        timeline.push_at(
            start,
            midi(MidiMessage::NoteOn {
                key: note.midi_number.into(),
                vel: note.velocity().into(),
            }),
        );
        timeline.push_at(
            end,
            midi(MidiMessage::NoteOff {
                key: note.midi_number.into(),
                vel: 0.into(),
            }),
        );
    }

    timeline.push_at(
        notes.len() as f64 * slot_seconds,
        TrackEventKind::Meta(MetaMessage::EndOfTrack),
    );

    Ok(Smf {
        header: Header::new(
            Format::SingleTrack,
            Timing::Metrical(TICKS_PER_QUARTER.into()),
        ),
        tracks: vec![timeline.track],
    })
}

fn check_note(row: usize, note: &NoteSpec) -> SynthResult<()> {
    if note.midi_instrument > 127 {
        return Err(DatasetError::invalid_param(
            "midi_instrument",
            format!("row {}: program {} is above 127", row, note.midi_instrument),
        )
        .into());
    }
    if note.midi_number > 127 {
        return Err(DatasetError::invalid_param(
            "midi_number",
            format!("row {}: note {} is above 127", row, note.midi_number),
        )
        .into());
    }
    if !(note.duration.is_finite() && note.duration > 0.0) {
        return Err(DatasetError::invalid_param(
            "duration",
            format!("row {}: must be positive, got {}", row, note.duration),
        )
        .into());
    }
    if !(note.tempo.is_finite() && note.tempo > 0.0) {
        return Err(DatasetError::invalid_param(
            "tempo",
            format!("row {}: must be positive, got {}", row, note.tempo),
        )
        .into());
    }
    Ok(())
}

fn midi(message: MidiMessage) -> TrackEventKind<'static> {
    TrackEventKind::Midi {
        channel: CHANNEL.into(),
        message,
    }
}

fn push<'a>(track: &mut Track<'a>, delta: u32, kind: TrackEventKind<'a>) {
    track.push(TrackEvent {
        delta: delta.into(),
        kind,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn note(program: u8, pitch: u8, volume: f64) -> NoteSpec {
        NoteSpec {
            midi_instrument: program,
            midi_number: pitch,
            volume,
            duration: 1.0,
            tempo: 60.0,
        }
    }

    /// Absolute tick of every event in the first track.
    fn absolute<'a>(smf: &Smf<'a>) -> Vec<(u32, TrackEventKind<'a>)> {
        let mut tick = 0u32;
        smf.tracks[0]
            .iter()
            .map(|e| {
                tick += e.delta.as_int();
                (tick, e.kind)
            })
            .collect()
    }

    fn note_ons(smf: &Smf) -> Vec<(u32, u8, u8)> {
        absolute(smf)
            .into_iter()
            .filter_map(|(tick, kind)| match kind {
                TrackEventKind::Midi {
                    message: MidiMessage::NoteOn { key, vel },
                    ..
                } => Some((tick, key.as_int(), vel.as_int())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_batch_places_notes_at_slot_starts() {
        let notes = vec![note(0, 60, 1.0), note(42, 48, 0.5), note(58, 40, 0.75)];
        let smf = compose_batch(&notes, &LayoutConfig::default()).unwrap();

        assert_eq!(smf.header.format, Format::SingleTrack);
        assert_eq!(smf.header.timing, Timing::Metrical(480.into()));
        assert_eq!(
            note_ons(&smf),
            vec![(0, 60, 127), (1440, 48, 64), (2880, 40, 95)]
        );

        let (end, kind) = absolute(&smf).pop().unwrap();
        assert_eq!(end, 4320);
        assert_eq!(kind, TrackEventKind::Meta(MetaMessage::EndOfTrack));
    }

    #[test]
    fn test_each_note_sets_tempo_and_program() {
        let smf = compose_batch(&[note(41, 62, 0.8)], &LayoutConfig::default()).unwrap();
        let kinds: Vec<TrackEventKind> = absolute(&smf).into_iter().map(|(_, k)| k).collect();

        assert!(kinds.contains(&TrackEventKind::Meta(MetaMessage::Tempo(1_000_000.into()))));
        assert!(kinds.contains(&midi(MidiMessage::ProgramChange {
            program: 41.into()
        })));
    }

    #[test]
    fn test_note_off_after_duration() {
        let smf = compose_single_note(&note(0, 60, 1.0)).unwrap();
        let off = absolute(&smf)
            .into_iter()
            .find_map(|(tick, kind)| match kind {
                TrackEventKind::Midi {
                    message: MidiMessage::NoteOff { .. },
                    ..
                } => Some(tick),
                _ => None,
            })
            .unwrap();
        assert_eq!(off, 480);
    }

    #[test]
    fn test_fractional_ticks_do_not_drift() {
        // 0.3337 quarter notes is 160.176 ticks; per-slot rounding would
        // shift note 999 by more than half a second
        let duration = 0.3337;
        let notes: Vec<NoteSpec> = (0..1000)
            .map(|_| NoteSpec {
                duration,
                ..note(0, 60, 1.0)
            })
            .collect();
        let layout = LayoutConfig::for_note_timing(duration, 60.0, 0.2, 44100);
        let smf = compose_batch(&notes, &layout).unwrap();

        // One tempo throughout: 480 ticks per second
        let half_tick = 0.5 / 480.0;
        let events = absolute(&smf);
        let ons: Vec<f64> = note_ons(&smf)
            .into_iter()
            .map(|(tick, _, _)| tick as f64 / 480.0)
            .collect();
        let offs: Vec<f64> = events
            .iter()
            .filter_map(|(tick, kind)| match kind {
                TrackEventKind::Midi {
                    message: MidiMessage::NoteOff { .. },
                    ..
                } => Some(*tick as f64 / 480.0),
                _ => None,
            })
            .collect();
        assert_eq!(ons.len(), 1000);
        assert_eq!(offs.len(), 1000);

        for (i, (on, off)) in ons.iter().zip(&offs).enumerate() {
            let start = i as f64 * layout.part_duration;
            assert!((on - start).abs() <= half_tick + 1e-9, "note {} starts at {}", i, on);
            assert!(
                (off - (start + duration)).abs() <= half_tick + 1e-9,
                "note {} ends at {}",
                i,
                off
            );
        }

        let (end, _) = events.last().copied().unwrap();
        let expected_end = 1000.0 * layout.part_duration;
        assert!((end as f64 / 480.0 - expected_end).abs() <= half_tick + 1e-9);
    }

    #[test]
    fn test_mismatched_layout_is_rejected() {
        let mut fast = note(0, 60, 1.0);
        fast.tempo = 120.0;
        let notes = vec![note(0, 60, 1.0), fast];

        let err = compose_batch(&notes, &LayoutConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            SynthError::Dataset(DatasetError::InvalidLayout { .. })
        ));
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn test_out_of_range_pitch_is_rejected() {
        let err = compose_single_note(&note(0, 200, 1.0)).unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_write_midi_parses_back() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("all_samples.midi");
        let smf = compose_batch(&[note(0, 60, 1.0), note(1, 61, 1.0)], &LayoutConfig::default())
            .unwrap();
        write_midi(&smf, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[0..4], b"MThd");
        let parsed = Smf::parse(&bytes).unwrap();
        assert_eq!(parsed.tracks.len(), 1);
        assert_eq!(note_ons(&parsed), note_ons(&smf));
    }

    #[test]
    fn test_tempo_conversion() {
        assert_eq!(tempo_to_micros(60.0), 1_000_000);
        assert_eq!(tempo_to_micros(120.0), 500_000);
    }
}
