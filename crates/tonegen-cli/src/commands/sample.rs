//! Sample command implementation
//!
//! Writes `parameters.csv` only, so the table can be inspected or edited
//! before `tonegen render` synthesizes it.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use tonegen_backend_fluidsynth::{sample_parameters, SampleOutcome};
use tonegen_dataset::instruments::family_name;
use tonegen_dataset::NoteSpec;

use super::args::SamplerArgs;
use super::reporting::{self, CommandOutput};

/// Result of a successful `sample --json` run.
#[derive(Debug, Clone, Serialize)]
pub struct SampleResult {
    /// Written parameter table
    pub path: String,
    /// Seed actually used
    pub seed: u32,
    /// Number of rows
    pub count: usize,
    /// Rows per instrument family
    pub families: BTreeMap<String, usize>,
}

impl SampleResult {
    pub fn from_outcome(outcome: &SampleOutcome) -> Self {
        Self {
            path: outcome.path.display().to_string(),
            seed: outcome.seed,
            count: outcome.notes.len(),
            families: count_families(&outcome.notes),
        }
    }
}

/// Number of rows per General MIDI family.
pub fn count_families(notes: &[NoteSpec]) -> BTreeMap<String, usize> {
    let mut families = BTreeMap::new();
    for note in notes {
        *families
            .entry(family_name(note.midi_instrument).to_string())
            .or_insert(0) += 1;
    }
    families
}

/// Run the sample command
///
/// # Returns
/// Exit code: 0 success, 1 invalid input, 2 I/O error
pub fn run(
    count: usize,
    output_dir: &Path,
    sampler: &SamplerArgs,
    force: bool,
    json: bool,
) -> Result<ExitCode> {
    let config = sampler.config();
    let outcome = match sample_parameters(count, &config, output_dir, force) {
        Ok(outcome) => outcome,
        Err(e) => return reporting::report_failure(&e, json),
    };
    let result = SampleResult::from_outcome(&outcome);

    if json {
        reporting::print_json(&CommandOutput::success(result))?;
        return Ok(ExitCode::SUCCESS);
    }

    println!("{} {}", "Sampled parameters:".cyan().bold(), result.path);
    println!("{} {}", "Seed:".dimmed(), result.seed);
    println!("\n{}", "Families:".bold());
    for (family, rows) in &result.families {
        println!("  {} {:>6}  {}", "->".green(), rows, family);
    }
    println!("\n{} Wrote {} row(s)", "SUCCESS".green().bold(), result.count);
    Ok(ExitCode::SUCCESS)
}
