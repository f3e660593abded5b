//! Flag groups shared by several subcommands.

use std::path::PathBuf;

use clap::Args;
use tonegen_backend_fluidsynth::synth::{DEFAULT_GAIN, DEFAULT_TIMEOUT_SECS};
use tonegen_backend_fluidsynth::{FluidSynth, FluidSynthConfig, RenderMode, RenderOptions};
use tonegen_dataset::layout::{DEFAULT_MARGIN_DURATION, DEFAULT_SAMPLE_RATE};
use tonegen_dataset::sampler::{DEFAULT_DURATION, DEFAULT_TEMPO, DEFAULT_VOLUME_RANGE};
use tonegen_dataset::{AudioFormat, LayoutConfig, PitchRange, SamplerConfig};

/// Parameter sampling flags.
#[derive(Debug, Clone, Args)]
pub struct SamplerArgs {
    /// Seed for the parameter sampler (drawn from entropy when omitted)
    #[arg(short, long)]
    pub seed: Option<u32>,

    /// Note length in quarter notes
    #[arg(long, default_value_t = DEFAULT_DURATION)]
    pub duration: f64,

    /// Tempo in quarter notes per minute
    #[arg(long, default_value_t = DEFAULT_TEMPO)]
    pub tempo: f64,

    /// Lowest MIDI pitch allowed for any instrument
    #[arg(long, requires = "max_pitch", value_parser = clap::value_parser!(u8).range(0..=127))]
    pub min_pitch: Option<u8>,

    /// Highest MIDI pitch allowed for any instrument
    #[arg(long, requires = "min_pitch", value_parser = clap::value_parser!(u8).range(0..=127))]
    pub max_pitch: Option<u8>,

    /// Lower bound of the volume range
    #[arg(long, default_value_t = DEFAULT_VOLUME_RANGE.0)]
    pub min_volume: f64,

    /// Upper bound of the volume range (exclusive)
    #[arg(long, default_value_t = DEFAULT_VOLUME_RANGE.1)]
    pub max_volume: f64,
}

impl SamplerArgs {
    /// Builds the sampler configuration. Validation happens when sampling.
    pub fn config(&self) -> SamplerConfig {
        let mut config = SamplerConfig::default()
            .duration(self.duration)
            .tempo(self.tempo)
            .volume_range(self.min_volume, self.max_volume);
        if let Some(seed) = self.seed {
            config = config.seed(seed);
        }
        if let (Some(min), Some(max)) = (self.min_pitch, self.max_pitch) {
            config = config.note_range(PitchRange::new(min, max));
        }
        config
    }
}

/// Synthesizer discovery flags.
#[derive(Debug, Clone, Args)]
pub struct SynthArgs {
    /// SoundFont (.sf2) to render with
    #[arg(long)]
    pub soundfont: Option<PathBuf>,

    /// FluidSynth executable
    #[arg(long)]
    pub fluidsynth: Option<PathBuf>,

    /// Output gain passed to FluidSynth
    #[arg(long, default_value_t = DEFAULT_GAIN)]
    pub gain: f32,

    /// Timeout for one FluidSynth run, in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,
}

impl SynthArgs {
    /// Builds the FluidSynth adapter; unset paths fall back to discovery.
    pub fn synthesizer(&self) -> FluidSynth {
        let mut config = FluidSynthConfig::default()
            .gain(self.gain)
            .timeout_secs(self.timeout);
        if let Some(ref path) = self.fluidsynth {
            config = config.fluidsynth_path(path);
        }
        if let Some(ref path) = self.soundfont {
            config = config.soundfont(path);
        }
        FluidSynth::with_config(config)
    }
}

/// Rendering flags.
#[derive(Debug, Clone, Args)]
pub struct RenderArgs {
    /// Format of every written audio file
    #[arg(short = 'f', long, default_value_t = AudioFormat::Flac)]
    pub audio_format: AudioFormat,

    /// Render all notes in one pass (batch) or each note on its own (separate)
    #[arg(long, default_value_t = RenderMode::Batch)]
    pub mode: RenderMode,

    /// Do not write one audio file per clip
    #[arg(long)]
    pub no_slices: bool,

    /// Sample rate of the rendered audio in Hz
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
    pub sample_rate: u32,

    /// Seconds trimmed from both ends of every slot
    #[arg(long, default_value_t = DEFAULT_MARGIN_DURATION)]
    pub margin: f64,

    #[command(flatten)]
    pub synth: SynthArgs,
}

impl RenderArgs {
    /// Builds render options for notes of the given timing.
    pub fn options(&self, duration: f64, tempo: f64, overwrite: bool) -> RenderOptions {
        let layout = LayoutConfig::for_note_timing(duration, tempo, self.margin, self.sample_rate);
        RenderOptions::default()
            .layout(layout)
            .audio_format(self.audio_format)
            .mode(self.mode)
            .write_slices(!self.no_slices)
            .overwrite(overwrite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        sampler: SamplerArgs,
        #[command(flatten)]
        render: RenderArgs,
    }

    fn parse(args: &[&str]) -> Harness {
        let mut argv = vec!["tonegen"];
        argv.extend_from_slice(args);
        Harness::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults_match_library_defaults() {
        let h = parse(&[]);
        assert_eq!(h.sampler.config(), SamplerConfig::default());

        let options = h.render.options(h.sampler.duration, h.sampler.tempo, false);
        assert_eq!(options, RenderOptions::default());
    }

    #[test]
    fn test_pitch_flags_build_note_range() {
        let h = parse(&["--seed", "7", "--min-pitch", "48", "--max-pitch", "72"]);
        let config = h.sampler.config();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.note_range, Some(PitchRange::new(48, 72)));
    }

    #[test]
    fn test_pitch_flags_are_required_together() {
        assert!(Harness::try_parse_from(["tonegen", "--min-pitch", "48"]).is_err());
        assert!(Harness::try_parse_from(["tonegen", "--max-pitch", "200", "--min-pitch", "0"]).is_err());
    }

    #[test]
    fn test_layout_follows_note_timing() {
        let h = parse(&["--tempo", "120", "--margin", "0.25", "--sample-rate", "22050"]);
        let options = h.render.options(h.sampler.duration, h.sampler.tempo, true);
        assert_eq!(options.layout, LayoutConfig::new(1.5, 0.25, 22050));
        assert!(options.overwrite);
    }

    #[test]
    fn test_render_flags() {
        let h = parse(&["--audio-format", "wav", "--mode", "separate", "--no-slices"]);
        let options = h.render.options(1.0, 60.0, false);
        assert_eq!(options.audio_format, AudioFormat::Wav);
        assert_eq!(options.mode, RenderMode::Separate);
        assert!(!options.write_slices);
    }

    #[test]
    fn test_synth_flags() {
        let h = parse(&["--soundfont", "/sf/piano.sf2", "--timeout", "30"]);
        let synth = h.render.synth.synthesizer();
        assert_eq!(synth.config().soundfont, Some(PathBuf::from("/sf/piano.sf2")));
        assert_eq!(synth.config().timeout.as_secs(), 30);
        assert!(synth.config().fluidsynth_path.is_none());
    }
}
