//! tonegen FluidSynth backend
//!
//! Turns a table of note parameters into audio:
//!
//! 1. **Compose** - lay the notes out on fixed-length slots in a single-track
//!    MIDI file (`compose`)
//! 2. **Synthesize** - render the MIDI file through a SoundFont with the
//!    `fluidsynth` command-line program (`synth`)
//! 3. **Cut** - downmix to mono, write the concatenated waveform and cut one
//!    clip per note using the audio index (`render`)
//!
//! The synthesizer sits behind the [`Synthesizer`] trait so the pipeline can
//! run against any renderer that writes WAV files.
//!
//! # Example
//!
//! ```no_run
//! use tonegen_backend_fluidsynth::{generate_dataset, FluidSynth, GenerateRequest};
//! use tonegen_dataset::SamplerConfig;
//!
//! let request = GenerateRequest::new(100, "out/dataset")
//!     .sampler(SamplerConfig::default().seed(42));
//! let manifest = generate_dataset(&request, &FluidSynth::new())?;
//! println!("seed {:?}, {} rows", manifest.seed(), manifest.count);
//! # Ok::<(), tonegen_backend_fluidsynth::SynthError>(())
//! ```
//!
//! # FluidSynth Requirements
//!
//! The adapter searches for the executable in:
//!
//! 1. `FLUIDSYNTH_PATH` environment variable
//! 2. System PATH
//! 3. Common installation locations
//!
//! and for a SoundFont in `TONEGEN_SOUNDFONT`,
//! `~/.fluidsynth/default_sound_font.sf2` and common distribution paths.

pub mod compose;
pub mod error;
pub mod render;
pub mod synth;

pub use compose::{compose_batch, compose_single_note, write_midi, TICKS_PER_QUARTER};
pub use error::{SynthError, SynthResult};
pub use render::{
    generate_dataset, render_parameters, sample_parameters, GenerateRequest, RenderOptions,
    SampleOutcome,
};
pub use synth::{FluidSynth, FluidSynthConfig, Synthesizer};
pub use tonegen_dataset::RenderMode;
