//! tonegen dataset model
//!
//! This crate holds everything about a single-tone instrument dataset that
//! does not involve a synthesizer:
//!
//! - The General MIDI instrument table and the allowed instrument set
//! - Seeded sampling of note parameters
//! - The slot layout shared by the MIDI composer and the audio index
//! - Cutting the concatenated waveform into clips
//! - CSV tables, audio files and the run manifest
//! - Reading a generated dataset back
//!
//! # Example
//!
//! ```
//! use tonegen_dataset::{build_index, sample, LayoutConfig, SamplerConfig};
//!
//! let notes = sample(3, &SamplerConfig::default().seed(42)).unwrap();
//! let index = build_index(notes.len(), &LayoutConfig::default()).unwrap();
//!
//! let starts: Vec<u64> = index.iter().map(|e| e.start_samples).collect();
//! assert_eq!(starts, vec![22050, 154350, 286650]);
//! ```

pub mod artifacts;
pub mod audio;
pub mod dataset;
pub mod error;
pub mod index;
pub mod instruments;
pub mod layout;
pub mod manifest;
pub mod note;
pub mod rng;
pub mod sampler;
pub mod slicer;
pub mod table;

pub use artifacts::DatasetPaths;
pub use audio::{AudioBuffer, AudioFormat, Waveform};
pub use dataset::{Dataset, Sample};
pub use error::{BackendError, DatasetError, DatasetResult};
pub use index::{build_index, AudioIndex, AudioIndexEntry};
pub use layout::LayoutConfig;
pub use manifest::{GenerationManifest, RenderMode, RenderRecord, SamplingRecord};
pub use note::{NoteSpec, PitchRange};
pub use sampler::{sample, sample_with_rng, SamplerConfig};
pub use slicer::{slice, slice_to_vec, Slices};
