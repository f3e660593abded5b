//! Test harness utilities for running the pipeline into temporary directories.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tempfile::TempDir;
use tonegen_backend_fluidsynth::{generate_dataset, GenerateRequest, RenderOptions};
use tonegen_dataset::{GenerationManifest, LayoutConfig, SamplerConfig};

use crate::synth::ToneSynthesizer;

/// Sample rate used by harness runs unless a test picks its own.
pub const HARNESS_SAMPLE_RATE: u32 = 8000;

/// Working directory holding any number of dataset directories.
pub struct TestHarness {
    /// Working directory for test outputs.
    pub work_dir: TempDir,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHarness {
    /// Create a new test harness.
    pub fn new() -> Self {
        Self {
            work_dir: TempDir::new().expect("Failed to create work dir"),
        }
    }

    /// Get the working directory path.
    pub fn path(&self) -> &Path {
        self.work_dir.path()
    }

    /// Path of a named dataset directory (not created).
    pub fn dataset_dir(&self, name: &str) -> PathBuf {
        self.path().join(name)
    }

    /// Default render options for harness runs: default slots at a low rate.
    pub fn options(&self) -> RenderOptions {
        RenderOptions::default().layout(LayoutConfig::default().sample_rate(HARNESS_SAMPLE_RATE))
    }

    /// A request for `count` notes with `seed` into the named directory.
    pub fn request(&self, name: &str, count: usize, seed: u32) -> GenerateRequest {
        GenerateRequest::new(count, self.dataset_dir(name))
            .sampler(SamplerConfig::default().seed(seed))
            .options(self.options())
    }

    /// Generates a dataset with the tone synthesizer, panicking on failure.
    pub fn generate(&self, name: &str, count: usize, seed: u32) -> (PathBuf, GenerationManifest) {
        let request = self.request(name, count, seed);
        let manifest = generate_dataset(&request, &ToneSynthesizer::new())
            .unwrap_or_else(|e| panic!("generation of '{}' failed: {}", name, e));
        (request.output_dir, manifest)
    }
}

/// Asserts a command's exit code.
pub fn assert_exit(code: ExitCode, expected: u8) {
    assert_eq!(
        format!("{:?}", code),
        format!("{:?}", ExitCode::from(expected)),
        "unexpected exit code"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_exit_accepts_matching_code() {
        assert_exit(ExitCode::SUCCESS, 0);
        assert_exit(ExitCode::from(2), 2);
    }

    #[test]
    #[should_panic(expected = "unexpected exit code")]
    fn test_assert_exit_rejects_other_code() {
        assert_exit(ExitCode::from(1), 2);
    }
}
