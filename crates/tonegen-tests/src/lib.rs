//! tonegen End-to-End Test Infrastructure
//!
//! This crate runs the whole pipeline (sample, compose, synthesize, slice,
//! read back) without FluidSynth:
//!
//! - **Synthesis**: [`ToneSynthesizer`] parses the composed MIDI file with
//!   `midly` and renders one sine tone per note at the exact note timings
//! - **Harness**: temporary dataset directories and CLI exit-code helpers
//! - **Determinism**: byte-level comparison of whole dataset directories
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p tonegen-tests
//!
//! # FluidSynth-backed tests live in the backend crate
//! TONEGEN_RUN_FLUIDSYNTH_TESTS=1 cargo test -p tonegen-backend-fluidsynth -- --ignored
//! ```

pub mod determinism;
pub mod harness;
pub mod synth;

pub use determinism::{dataset_fingerprint, verify_determinism, DeterminismResult, DiffInfo};
pub use harness::{assert_exit, TestHarness};
pub use synth::{midi_to_hz, ToneSynthesizer};
