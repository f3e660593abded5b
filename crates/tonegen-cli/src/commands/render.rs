//! Render command implementation
//!
//! Synthesizes a `parameters.csv` that is already in the dataset directory,
//! typically one written by `tonegen sample`.

use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Result;
use colored::Colorize;
use tonegen_backend_fluidsynth::{render_parameters, RenderOptions, SynthError, Synthesizer};
use tonegen_dataset::sampler::{DEFAULT_DURATION, DEFAULT_TEMPO};
use tonegen_dataset::table::read_parameters;
use tonegen_dataset::DatasetPaths;

use super::args::RenderArgs;
use super::generate::GenerateResult;
use super::reporting::{self, CommandOutput};

/// Run the render command
///
/// The slot layout follows the timing of the first parameter row; rows with
/// different timing are rejected by the composer.
///
/// # Returns
/// Exit code: 0 success, 1 invalid input, 2 generation error
pub fn run(output_dir: &Path, render: &RenderArgs, force: bool, json: bool) -> Result<ExitCode> {
    let paths = DatasetPaths::new(output_dir);
    let notes = match read_parameters(&paths.parameters()) {
        Ok(notes) => notes,
        Err(e) => return reporting::report_failure(&SynthError::from(e), json),
    };

    let (duration, tempo) = notes
        .first()
        .map(|n| (n.duration, n.tempo))
        .unwrap_or((DEFAULT_DURATION, DEFAULT_TEMPO));
    let options = render.options(duration, tempo, force);
    let synth = render.synth.synthesizer();

    run_with(output_dir, &options, &synth, json)
}

/// Renders with prepared options against any synthesizer.
pub fn run_with(
    output_dir: &Path,
    options: &RenderOptions,
    synth: &dyn Synthesizer,
    json: bool,
) -> Result<ExitCode> {
    if !json {
        println!(
            "{} {}",
            "Rendering parameters in:".cyan().bold(),
            output_dir.display()
        );
        println!(
            "{} {} mode, {} via {}",
            "Settings:".dimmed(),
            options.mode,
            options.audio_format,
            synth.name()
        );
    }

    let start = Instant::now();
    let manifest = match render_parameters(output_dir, options, synth) {
        Ok(manifest) => manifest,
        Err(e) => return reporting::report_failure(&e, json),
    };
    let elapsed = start.elapsed();

    if json {
        reporting::print_json(&CommandOutput::success(GenerateResult {
            output_dir: output_dir.display().to_string(),
            duration_ms: elapsed.as_millis() as u64,
            manifest,
        }))?;
    } else {
        println!();
        reporting::print_manifest(&manifest, elapsed.as_millis());
    }
    Ok(ExitCode::SUCCESS)
}
