//! Generate command implementation
//!
//! Samples note parameters, renders them through FluidSynth and writes the
//! complete dataset directory.

use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use tonegen_backend_fluidsynth::{generate_dataset, GenerateRequest, Synthesizer};
use tonegen_dataset::GenerationManifest;

use super::args::{RenderArgs, SamplerArgs};
use super::reporting::{self, CommandOutput};

/// Result of a successful `generate --json` run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResult {
    /// Dataset directory
    pub output_dir: String,
    /// Wall-clock duration of the run
    pub duration_ms: u64,
    /// Manifest written to the dataset directory
    pub manifest: GenerationManifest,
}

/// Run the generate command
///
/// # Arguments
/// * `count` - Number of notes to sample
/// * `output_dir` - Dataset directory, created if missing
/// * `sampler` - Sampling flags
/// * `render` - Rendering and synthesizer flags
/// * `force` - Replace artifacts of an earlier run
/// * `json` - Print a JSON envelope instead of colored output
///
/// # Returns
/// Exit code: 0 success, 1 invalid input, 2 generation error
pub fn run(
    count: usize,
    output_dir: &Path,
    sampler: &SamplerArgs,
    render: &RenderArgs,
    force: bool,
    json: bool,
) -> Result<ExitCode> {
    let config = sampler.config();
    let options = render.options(config.duration, config.tempo, force);
    let request = GenerateRequest::new(count, output_dir)
        .sampler(config)
        .options(options);
    let synth = render.synth.synthesizer();

    run_with(&request, &synth, json)
}

/// Runs a prepared request against any synthesizer.
pub fn run_with(
    request: &GenerateRequest,
    synth: &dyn Synthesizer,
    json: bool,
) -> Result<ExitCode> {
    if !json {
        println!(
            "{} {}",
            "Generating dataset:".cyan().bold(),
            request.output_dir.display()
        );
        println!(
            "{} {} note(s), {} mode, {} via {}",
            "Settings:".dimmed(),
            request.count,
            request.options.mode,
            request.options.audio_format,
            synth.name()
        );
    }

    let start = Instant::now();
    let manifest = match generate_dataset(request, synth) {
        Ok(manifest) => manifest,
        Err(e) => return reporting::report_failure(&e, json),
    };
    let elapsed = start.elapsed();

    if json {
        reporting::print_json(&CommandOutput::success(GenerateResult {
            output_dir: request.output_dir.display().to_string(),
            duration_ms: elapsed.as_millis() as u64,
            manifest,
        }))?;
    } else {
        println!();
        reporting::print_manifest(&manifest, elapsed.as_millis());
    }
    Ok(ExitCode::SUCCESS)
}
