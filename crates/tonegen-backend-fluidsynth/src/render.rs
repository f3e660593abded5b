//! Render pipeline: parameters in, dataset directory out.
//!
//! Batch mode composes every note into one MIDI file, synthesizes it once,
//! downmixes to mono and cuts clips with the audio index. Separate mode
//! synthesizes each note on its own. Any failure aborts the run; files
//! written before the failure are left in place.

use std::path::{Path, PathBuf};

use tonegen_dataset::audio::{read_mono, write_mono};
use tonegen_dataset::rng::entropy_seed;
use tonegen_dataset::table::{read_parameters, write_index, write_parameters};
use tonegen_dataset::{
    build_index, sample, slice, AudioFormat, DatasetError, DatasetPaths, GenerationManifest,
    LayoutConfig, NoteSpec, RenderMode, RenderRecord, SamplerConfig, SamplingRecord, Waveform,
};

use crate::compose::{compose_batch, compose_single_note, write_midi};
use crate::error::{SynthError, SynthResult};
use crate::synth::Synthesizer;

/// How a parameter table is turned into audio.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Slot geometry shared by the composer and the index.
    pub layout: LayoutConfig,
    /// Format of every written audio file.
    pub audio_format: AudioFormat,
    pub mode: RenderMode,
    /// Write one file per clip in batch mode.
    pub write_slices: bool,
    /// Replace artifacts left by an earlier run.
    pub overwrite: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            audio_format: AudioFormat::default(),
            mode: RenderMode::default(),
            write_slices: true,
            overwrite: false,
        }
    }
}

impl RenderOptions {
    /// Sets the slot layout.
    pub fn layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    /// Sets the audio format.
    pub fn audio_format(mut self, format: AudioFormat) -> Self {
        self.audio_format = format;
        self
    }

    /// Sets the render mode.
    pub fn mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    /// Enables or disables per-clip files.
    pub fn write_slices(mut self, write_slices: bool) -> Self {
        self.write_slices = write_slices;
        self
    }

    /// Allows replacing existing artifacts.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// A full generation run.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Number of notes.
    pub count: usize,
    pub sampler: SamplerConfig,
    /// Dataset directory, created if missing.
    pub output_dir: PathBuf,
    pub options: RenderOptions,
}

impl GenerateRequest {
    /// Creates a request with default sampler and render settings.
    pub fn new(count: usize, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            count,
            sampler: SamplerConfig::default(),
            output_dir: output_dir.into(),
            options: RenderOptions::default(),
        }
    }

    /// Sets the sampler configuration.
    pub fn sampler(mut self, sampler: SamplerConfig) -> Self {
        self.sampler = sampler;
        self
    }

    /// Sets the render options.
    pub fn options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }
}

/// Result of sampling a parameter table without rendering it.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleOutcome {
    pub notes: Vec<NoteSpec>,
    /// Seed actually used, including one drawn from entropy.
    pub seed: u32,
    /// Where the parameter table was written.
    pub path: PathBuf,
}

/// Samples, writes `parameters.csv`, renders it and writes `manifest.json`.
///
/// The layout is checked before anything is sampled or written.
pub fn generate_dataset(
    request: &GenerateRequest,
    synth: &dyn Synthesizer,
) -> SynthResult<GenerationManifest> {
    let options = &request.options;
    options.layout.validate()?;

    let paths = DatasetPaths::new(&request.output_dir);
    let outcome = sample_parameters(
        request.count,
        &request.sampler,
        paths.root(),
        options.overwrite,
    )?;

    let mut manifest = GenerationManifest::new(outcome.notes.len());
    manifest.sampling = Some(SamplingRecord::from_config(&request.sampler, outcome.seed));
    manifest.add_artifact(&outcome.path);

    render_notes(&paths, &outcome.notes, options, synth, &mut manifest)?;
    finish_manifest(&paths, &mut manifest)?;
    Ok(manifest)
}

/// Samples `count` notes and writes only the parameter table.
pub fn sample_parameters(
    count: usize,
    sampler: &SamplerConfig,
    output_dir: &Path,
    overwrite: bool,
) -> SynthResult<SampleOutcome> {
    let seed = sampler.seed.unwrap_or_else(entropy_seed);
    let notes = sample(count, &sampler.clone().seed(seed))?;

    let paths = DatasetPaths::new(output_dir);
    std::fs::create_dir_all(paths.root())?;
    if !overwrite {
        refuse_existing(&paths, true)?;
    }

    let path = paths.parameters();
    write_parameters(&path, &notes)?;
    Ok(SampleOutcome { notes, seed, path })
}

/// Renders the `parameters.csv` already present in `dataset_dir`.
pub fn render_parameters(
    dataset_dir: &Path,
    options: &RenderOptions,
    synth: &dyn Synthesizer,
) -> SynthResult<GenerationManifest> {
    options.layout.validate()?;

    let paths = DatasetPaths::new(dataset_dir);
    let notes = read_parameters(&paths.parameters())?;
    if !options.overwrite {
        refuse_existing(&paths, false)?;
    }

    let mut manifest = GenerationManifest::new(notes.len());
    manifest.add_artifact(&paths.parameters());

    render_notes(&paths, &notes, options, synth, &mut manifest)?;
    finish_manifest(&paths, &mut manifest)?;
    Ok(manifest)
}

fn finish_manifest(paths: &DatasetPaths, manifest: &mut GenerationManifest) -> SynthResult<()> {
    let path = paths.manifest();
    manifest.add_artifact(&path);
    manifest.write(&path)?;
    Ok(())
}

/// Fails with `OutputExists` naming the first artifact already present.
fn refuse_existing(paths: &DatasetPaths, include_parameters: bool) -> SynthResult<()> {
    let parameters = paths.parameters();
    if include_parameters && parameters.exists() {
        return Err(SynthError::OutputExists { path: parameters });
    }
    match paths.existing_render_outputs()?.into_iter().next() {
        Some(path) => Err(SynthError::OutputExists { path }),
        None => Ok(()),
    }
}

fn render_notes(
    paths: &DatasetPaths,
    notes: &[NoteSpec],
    options: &RenderOptions,
    synth: &dyn Synthesizer,
    manifest: &mut GenerationManifest,
) -> SynthResult<()> {
    // Outputs of an earlier run, in either format and at any row
    if options.overwrite {
        paths.remove_render_outputs()?;
    }

    let record = match options.mode {
        RenderMode::Batch => render_batch(paths, notes, options, synth, manifest)?,
        RenderMode::Separate => render_separate(paths, notes, options, synth)?,
    };
    manifest.render = Some(record);
    Ok(())
}

fn render_batch(
    paths: &DatasetPaths,
    notes: &[NoteSpec],
    options: &RenderOptions,
    synth: &dyn Synthesizer,
    manifest: &mut GenerationManifest,
) -> SynthResult<RenderRecord> {
    let layout = &options.layout;
    let format = options.audio_format;

    // Compose first so a layout mismatch fails before anything is written
    let smf = compose_batch(notes, layout)?;
    let index = build_index(notes.len(), layout)?;

    let index_path = paths.index();
    write_index(&index_path, &index)?;
    manifest.add_artifact(&index_path);

    let midi_path = paths.batch_midi();
    write_midi(&smf, &midi_path)?;
    manifest.add_artifact(&midi_path);

    let waveform = synthesize(synth, &midi_path, paths.root(), layout.sample_rate)?;

    let clips = slice(&waveform.samples, &index)?;

    let audio_path = paths.batch_audio(format);
    write_mono(&audio_path, &waveform.samples, waveform.sample_rate, format)?;
    manifest.add_artifact(&audio_path);

    if options.write_slices {
        for (row, clip) in clips.enumerate() {
            write_mono(&paths.slice(row, format), clip, waveform.sample_rate, format)?;
        }
    }

    Ok(RenderRecord {
        mode: RenderMode::Batch,
        audio_format: format,
        layout: *layout,
        write_slices: options.write_slices,
        pcm_hash: Some(waveform.pcm_hash()),
        total_samples: Some(waveform.len() as u64),
    })
}

fn render_separate(
    paths: &DatasetPaths,
    notes: &[NoteSpec],
    options: &RenderOptions,
    synth: &dyn Synthesizer,
) -> SynthResult<RenderRecord> {
    let format = options.audio_format;
    let sample_rate = options.layout.sample_rate;

    for (row, note) in notes.iter().enumerate() {
        let midi_path = paths.note_midi(row);
        write_midi(&compose_single_note(note)?, &midi_path)?;

        let waveform = synthesize(synth, &midi_path, paths.root(), sample_rate)?;
        write_mono(
            &paths.note_audio(row, format),
            &waveform.samples,
            waveform.sample_rate,
            format,
        )?;
    }

    Ok(RenderRecord {
        mode: RenderMode::Separate,
        audio_format: format,
        layout: options.layout,
        write_slices: false,
        pcm_hash: None,
        total_samples: None,
    })
}

/// Renders `midi` to a temporary file next to it and returns the mono mix.
fn synthesize(
    synth: &dyn Synthesizer,
    midi: &Path,
    dir: &Path,
    sample_rate: u32,
) -> SynthResult<Waveform> {
    let raw = tempfile::Builder::new()
        .prefix(".tonegen_render_")
        .suffix(".wav")
        .tempfile_in(dir)?;

    synth.render(midi, raw.path(), sample_rate)?;
    let waveform = read_mono(raw.path())?;

    if waveform.sample_rate != sample_rate {
        return Err(DatasetError::audio(
            raw.path(),
            format!(
                "{} wrote {} Hz audio, expected {} Hz",
                synth.name(),
                waveform.sample_rate,
                sample_rate
            ),
        )
        .into());
    }
    Ok(waveform)
}
