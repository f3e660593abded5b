//! Error reporting and machine-readable output shared by the commands.
//!
//! Failures are printed as `error[CODE]: stage: message` on stderr, or as a
//! [`CommandOutput`] envelope on stdout when `--json` is set. The exit code
//! separates bad input (1) from failures while producing artifacts (2).

use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use tonegen_backend_fluidsynth::SynthError;
use tonegen_dataset::{BackendError, DatasetError, GenerationManifest};

/// Exit code for invalid input: sampling, layout and argument errors.
pub const EXIT_INPUT_ERROR: u8 = 1;

/// Exit code for failures while synthesizing, slicing or doing I/O.
pub const EXIT_GENERATION_ERROR: u8 = 2;

/// A failed stage in JSON output.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JsonError {
    /// Stable error code (e.g., "DATASET_002", "SYNTH_004")
    pub code: String,
    /// Error category ("dataset", "synth")
    pub category: String,
    /// Pipeline stage that failed
    pub stage: String,
    /// Human-readable error message
    pub message: String,
}

impl JsonError {
    /// Creates an error entry for a failed stage.
    pub fn new<E: BackendError + ?Sized>(stage: &str, err: &E) -> Self {
        Self {
            code: err.code().to_string(),
            category: err.category().to_string(),
            stage: stage.to_string(),
            message: err.message(),
        }
    }
}

/// Envelope printed by every `--json` command.
#[derive(Debug, Clone, Serialize)]
pub struct CommandOutput<T> {
    /// Whether the command succeeded
    pub success: bool,
    /// Errors encountered (empty on success)
    pub errors: Vec<JsonError>,
    /// Command result (on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
}

impl<T: Serialize> CommandOutput<T> {
    pub fn success(result: T) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            result: Some(result),
        }
    }

    pub fn failure(error: JsonError) -> Self {
        Self {
            success: false,
            errors: vec![error],
            result: None,
        }
    }
}

/// Errors that can end a command.
pub trait CommandError: BackendError {
    /// Whether the error was caused by invalid input.
    fn is_input_error(&self) -> bool;

    /// Pipeline stage the error was raised in.
    fn stage(&self) -> &'static str;
}

impl CommandError for DatasetError {
    fn is_input_error(&self) -> bool {
        DatasetError::is_input_error(self)
    }

    fn stage(&self) -> &'static str {
        match self {
            DatasetError::InvalidRange { .. } | DatasetError::InvalidParameter { .. } => "sample",
            DatasetError::InvalidLayout { .. } => "layout",
            DatasetError::OutOfRange { .. } => "slice",
            DatasetError::MissingArtifact { .. }
            | DatasetError::Schema { .. }
            | DatasetError::Manifest(_) => "read",
            DatasetError::Audio { .. } => "audio",
            DatasetError::Io(_) => "io",
        }
    }
}

impl CommandError for SynthError {
    fn is_input_error(&self) -> bool {
        SynthError::is_input_error(self)
    }

    fn stage(&self) -> &'static str {
        match self {
            SynthError::Dataset(e) => e.stage(),
            SynthError::MidiWrite { .. } => "compose",
            SynthError::OutputExists { .. } => "output",
            SynthError::Io(_) => "io",
            SynthError::FluidSynthNotFound
            | SynthError::SoundFontNotFound { .. }
            | SynthError::SpawnFailed(_)
            | SynthError::Timeout { .. }
            | SynthError::ProcessFailed { .. }
            | SynthError::OutputNotFound { .. } => "synthesize",
        }
    }
}

/// Exit status for a failed command.
pub fn exit_status(err: &dyn CommandError) -> u8 {
    if err.is_input_error() {
        EXIT_INPUT_ERROR
    } else {
        EXIT_GENERATION_ERROR
    }
}

/// Reports a failed command and returns its exit code.
pub fn report_failure(err: &dyn CommandError, json: bool) -> Result<ExitCode> {
    if json {
        let output = CommandOutput::<()>::failure(JsonError::new(err.stage(), err));
        print_json(&output)?;
    } else {
        eprintln!(
            "{}: {}: {}",
            format!("error[{}]", err.code()).red().bold(),
            err.stage(),
            err.message()
        );
    }
    Ok(ExitCode::from(exit_status(err)))
}

/// Prints a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize JSON output")?;
    println!("{}", json);
    Ok(())
}

/// Prints the outcome of a render run.
pub fn print_manifest(manifest: &GenerationManifest, duration_ms: u128) {
    if let Some(ref sampling) = manifest.sampling {
        println!("{} {}", "Seed:".dimmed(), sampling.seed);
    }
    if let Some(ref render) = manifest.render {
        println!(
            "{} {} mode, {} Hz, {} slots of {}s",
            "Render:".dimmed(),
            render.mode,
            render.layout.sample_rate,
            manifest.count,
            render.layout.part_duration
        );
        if let Some(ref hash) = render.pcm_hash {
            println!("{} {}", "PCM hash:".dimmed(), hash);
        }
    }

    println!("\n{}", "Artifacts:".bold());
    for artifact in &manifest.artifacts {
        println!("  {} {}", "ok".green(), artifact);
    }

    println!(
        "\n{} Rendered {} sample(s) in {}ms",
        "SUCCESS".green().bold(),
        manifest.count,
        duration_ms
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_exit_status() {
        assert_eq!(
            exit_status(&DatasetError::invalid_layout("margin too large")),
            EXIT_INPUT_ERROR
        );
        assert_eq!(
            exit_status(&SynthError::Timeout { timeout_secs: 5 }),
            EXIT_GENERATION_ERROR
        );
        assert_eq!(
            exit_status(&SynthError::OutputExists {
                path: "out/parameters.csv".into()
            }),
            EXIT_INPUT_ERROR
        );
        assert_eq!(
            exit_status(&SynthError::from(DatasetError::OutOfRange {
                row: 1,
                start: 0,
                end: 10,
                len: 5
            })),
            EXIT_GENERATION_ERROR
        );
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(SynthError::FluidSynthNotFound.stage(), "synthesize");
        assert_eq!(
            SynthError::from(DatasetError::invalid_range("empty")).stage(),
            "sample"
        );
        assert_eq!(
            DatasetError::schema("index.csv", "5 rows vs 4").stage(),
            "read"
        );
    }

    #[test]
    fn test_json_error_fields() {
        let err = SynthError::from(DatasetError::invalid_layout("margin too large"));
        let json = JsonError::new(err.stage(), &err);
        assert_eq!(json.code, "DATASET_002");
        assert_eq!(json.category, "dataset");
        assert_eq!(json.stage, "layout");
        assert!(json.message.contains("margin too large"));
    }

    #[test]
    fn test_failure_envelope_omits_result() {
        let err = SynthError::FluidSynthNotFound;
        let output = CommandOutput::<()>::failure(JsonError::new("synthesize", &err));
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["errors"][0]["code"], "SYNTH_001");
        assert!(value.get("result").is_none());
    }
}
