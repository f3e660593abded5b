//! Deterministic in-process synthesizer.
//!
//! Renders every note of a MIDI file as a sine tone at its fundamental,
//! scaled by velocity, on both channels of a 16-bit WAV file. Timing follows
//! the file's tempo events, so the rendered waveform lines up with the audio
//! index exactly as a real synthesizer's would.

use std::path::Path;

use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use tonegen_backend_fluidsynth::{SynthError, SynthResult, Synthesizer};
use tonegen_dataset::DatasetError;

/// Peak amplitude of a full-velocity note.
const PEAK: f64 = 0.5;

/// Frequency of a MIDI note in equal temperament (A4 = 440 Hz).
pub fn midi_to_hz(note: u8) -> f64 {
    440.0 * 2f64.powf((note as f64 - 69.0) / 12.0)
}

/// A note recovered from the MIDI file, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedNote {
    pub key: u8,
    pub velocity: u8,
    pub start: f64,
    pub end: f64,
}

/// Sine-tone test double for [`Synthesizer`].
#[derive(Debug, Clone, Default)]
pub struct ToneSynthesizer {
    /// Seconds added to (or, if negative, cut from) the end of the render.
    pub extra_seconds: f64,
}

impl ToneSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lengthens or truncates the rendered audio.
    pub fn extra_seconds(mut self, seconds: f64) -> Self {
        self.extra_seconds = seconds;
        self
    }
}

impl Synthesizer for ToneSynthesizer {
    fn name(&self) -> &str {
        "tone"
    }

    fn render(&self, midi: &Path, audio_out: &Path, sample_rate: u32) -> SynthResult<()> {
        let bytes = std::fs::read(midi)?;
        let (notes, length) = read_notes(&bytes).map_err(|message| {
            SynthError::process_failed(1, format!("{}: {}", midi.display(), message))
        })?;

        let seconds = (length + self.extra_seconds).max(0.0);
        let frames = (seconds * sample_rate as f64).round() as usize;
        let mut mix = vec![0.0f64; frames];
        for note in &notes {
            let freq = midi_to_hz(note.key);
            let gain = PEAK * note.velocity as f64 / 127.0;
            let first = (note.start * sample_rate as f64).round() as usize;
            let last = ((note.end * sample_rate as f64).round() as usize).min(frames);
            for (i, frame) in mix.iter_mut().enumerate().take(last).skip(first) {
                let t = (i - first) as f64 / sample_rate as f64;
                *frame += gain * (2.0 * std::f64::consts::PI * freq * t).sin();
            }
        }

        write_stereo(audio_out, &mix, sample_rate)
            .map_err(|e| DatasetError::audio(audio_out, e.to_string()).into())
    }
}

/// Parses notes and the end-of-track time from a Standard MIDI File.
pub fn read_notes(bytes: &[u8]) -> Result<(Vec<RenderedNote>, f64), String> {
    let smf = Smf::parse(bytes).map_err(|e| e.to_string())?;
    let ticks_per_quarter = match smf.header.timing {
        Timing::Metrical(tpq) => tpq.as_int() as f64,
        Timing::Timecode(..) => return Err("timecode timing is not supported".to_string()),
    };

    let mut notes = Vec::new();
    let mut end = 0.0f64;
    for track in &smf.tracks {
        // 120 BPM until the first tempo event
        let mut micros_per_quarter = 500_000.0;
        let mut now = 0.0f64;
        let mut sounding: Vec<(u8, u8, f64)> = Vec::new();

        for event in track {
            now += event.delta.as_int() as f64 * micros_per_quarter / 1e6 / ticks_per_quarter;
            match event.kind {
                TrackEventKind::Meta(MetaMessage::Tempo(micros)) => {
                    micros_per_quarter = micros.as_int() as f64;
                }
                TrackEventKind::Midi { message, .. } => match message {
                    MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                        sounding.push((key.as_int(), vel.as_int(), now));
                    }
                    MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                        let key = key.as_int();
                        if let Some(pos) = sounding.iter().position(|(k, _, _)| *k == key) {
                            let (key, velocity, start) = sounding.remove(pos);
                            notes.push(RenderedNote {
                                key,
                                velocity,
                                start,
                                end: now,
                            });
                        }
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        for (key, velocity, start) in sounding {
            notes.push(RenderedNote {
                key,
                velocity,
                start,
                end: now,
            });
        }
        end = end.max(now);
    }

    notes.sort_by(|a, b| a.start.total_cmp(&b.start));
    Ok((notes, end))
}

fn write_stereo(path: &Path, mix: &[f64], sample_rate: u32) -> Result<(), hound::Error> {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in mix {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f64).round() as i16;
        writer.write_sample(value)?;
        writer.write_sample(value)?;
    }
    writer.finalize()
}
