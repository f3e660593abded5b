//! CLI Command Tests for tonegen
//!
//! Drives the command implementations as library calls with the tone
//! synthesizer and checks their exit codes and side effects.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p tonegen-tests --test cli_commands
//! ```

use tonegen_backend_fluidsynth::sample_parameters;
use tonegen_cli::commands::reporting::{EXIT_GENERATION_ERROR, EXIT_INPUT_ERROR};
use tonegen_cli::commands::{generate, inspect, render};
use tonegen_dataset::{Dataset, DatasetPaths, LayoutConfig, SamplerConfig};
use tonegen_tests::{assert_exit, TestHarness, ToneSynthesizer};

#[test]
fn test_generate_then_inspect() {
    let harness = TestHarness::new();
    let request = harness.request("run", 3, 42);

    let code = generate::run_with(&request, &ToneSynthesizer::new(), true).unwrap();
    assert_exit(code, 0);

    let code = inspect::run(&request.output_dir, true).unwrap();
    assert_exit(code, 0);

    let dataset = Dataset::open(&request.output_dir).unwrap();
    let summary = inspect::InspectSummary::from_dataset(&dataset);
    assert_eq!(summary.rows, 3);
    assert_eq!(summary.seed, Some(42));
}

#[test]
fn test_generate_refuses_existing_output() {
    let harness = TestHarness::new();
    let request = harness.request("run", 2, 1);
    let synth = ToneSynthesizer::new();

    assert_exit(generate::run_with(&request, &synth, false).unwrap(), 0);
    assert_exit(
        generate::run_with(&request, &synth, false).unwrap(),
        EXIT_INPUT_ERROR,
    );

    let mut forced = request.clone();
    forced.options.overwrite = true;
    assert_exit(generate::run_with(&forced, &synth, false).unwrap(), 0);
}

#[test]
fn test_invalid_layout_exits_with_input_error() {
    let harness = TestHarness::new();
    let mut request = harness.request("run", 2, 1);
    request.options.layout = LayoutConfig::new(3.0, 2.0, 8000);

    let code = generate::run_with(&request, &ToneSynthesizer::new(), true).unwrap();
    assert_exit(code, EXIT_INPUT_ERROR);
}

#[test]
fn test_truncated_render_exits_with_generation_error() {
    let harness = TestHarness::new();
    let request = harness.request("run", 2, 1);
    let synth = ToneSynthesizer::new().extra_seconds(-2.0);

    let code = generate::run_with(&request, &synth, false).unwrap();
    assert_exit(code, EXIT_GENERATION_ERROR);
}

#[test]
fn test_sample_then_render() {
    let harness = TestHarness::new();
    let dir = harness.dataset_dir("run");
    sample_parameters(4, &SamplerConfig::default().seed(8), &dir, false).unwrap();

    let synth = ToneSynthesizer::new();
    let code = render::run_with(&dir, &harness.options(), &synth, true).unwrap();
    assert_exit(code, 0);

    let dataset = Dataset::open(&dir).unwrap();
    assert_eq!(dataset.len(), 4);
    let manifest = dataset.manifest().unwrap();
    assert!(manifest.sampling.is_none());
    assert!(manifest.render.is_some());
}

#[test]
fn test_render_without_parameters_exits_with_generation_error() {
    let harness = TestHarness::new();
    let dir = harness.dataset_dir("empty");
    std::fs::create_dir_all(&dir).unwrap();

    let synth = ToneSynthesizer::new();
    let code = render::run_with(&dir, &harness.options(), &synth, false).unwrap();
    assert_exit(code, EXIT_GENERATION_ERROR);
    assert!(!DatasetPaths::new(&dir).index().exists());
}

#[test]
fn test_inspect_partial_dataset_fails() {
    let harness = TestHarness::new();
    let request = harness.request("run", 2, 3);
    generate::run_with(&request, &ToneSynthesizer::new(), true).unwrap();
    std::fs::remove_file(DatasetPaths::new(&request.output_dir).index()).unwrap();

    let code = inspect::run(&request.output_dir, false).unwrap();
    assert_exit(code, EXIT_GENERATION_ERROR);
}
