//! Inspect command implementation
//!
//! Opens a dataset the way a training job would and prints a summary.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use tonegen_dataset::{AudioFormat, Dataset};

use super::reporting::{self, CommandOutput};
use super::sample::count_families;

/// Summary of an opened dataset.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InspectSummary {
    /// Dataset directory
    pub path: String,
    /// Number of clips
    pub rows: usize,
    /// Length of every clip in samples
    pub clip_samples: usize,
    /// Sample rate of the concatenated waveform
    pub sample_rate: u32,
    /// Format of the concatenated waveform
    pub audio_format: AudioFormat,
    /// Length of the concatenated waveform in seconds
    pub total_seconds: f64,
    /// Sampler seed from the manifest, if one was written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
    /// Lowest and highest pitch in the table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch_span: Option<(u8, u8)>,
    /// Rows per instrument family
    pub families: BTreeMap<String, usize>,
}

impl InspectSummary {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let (rows, clip_samples) = dataset.shape();
        let params = dataset.params();
        let pitch_span = params
            .iter()
            .map(|n| n.midi_number)
            .min()
            .zip(params.iter().map(|n| n.midi_number).max());

        Self {
            path: dataset.path().display().to_string(),
            rows,
            clip_samples,
            sample_rate: dataset.audio().sample_rate,
            audio_format: dataset.audio_format(),
            total_seconds: dataset.audio().duration_seconds(),
            seed: dataset.manifest().and_then(|m| m.seed()),
            pitch_span,
            families: count_families(params),
        }
    }
}

/// Run the inspect command
///
/// # Returns
/// Exit code: 0 success, 2 if the dataset is missing or inconsistent
pub fn run(path: &Path, json: bool) -> Result<ExitCode> {
    let dataset = match Dataset::open(path) {
        Ok(dataset) => dataset,
        Err(e) => return reporting::report_failure(&e, json),
    };
    let summary = InspectSummary::from_dataset(&dataset);

    if json {
        reporting::print_json(&CommandOutput::success(summary))?;
        return Ok(ExitCode::SUCCESS);
    }

    println!("{} {}", "Dataset:".cyan().bold(), dataset);
    println!(
        "{} {} clip(s) of {} samples at {} Hz",
        "Clips:".dimmed(),
        summary.rows,
        summary.clip_samples,
        summary.sample_rate
    );
    println!(
        "{} {:.1}s {}",
        "Audio:".dimmed(),
        summary.total_seconds,
        summary.audio_format
    );
    if let Some(seed) = summary.seed {
        println!("{} {}", "Seed:".dimmed(), seed);
    }
    if let Some((low, high)) = summary.pitch_span {
        println!("{} {}..={}", "Pitches:".dimmed(), low, high);
    }

    println!("\n{}", "Families:".bold());
    for (family, rows) in &summary.families {
        println!("  {} {:>6}  {}", "->".green(), rows, family);
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tonegen_dataset::audio::write_mono;
    use tonegen_dataset::table::{write_index, write_parameters};
    use tonegen_dataset::{build_index, sample, DatasetPaths, LayoutConfig, SamplerConfig};

    #[test]
    fn test_summary_of_small_dataset() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = DatasetPaths::new(tmp.path());
        let layout = LayoutConfig::new(1.0, 0.25, 8);

        let notes = sample(3, &SamplerConfig::default().seed(11)).unwrap();
        write_parameters(&paths.parameters(), &notes).unwrap();
        write_index(&paths.index(), &build_index(3, &layout).unwrap()).unwrap();
        write_mono(
            &paths.batch_audio(AudioFormat::Wav),
            &[0.0; 24],
            8,
            AudioFormat::Wav,
        )
        .unwrap();

        let dataset = Dataset::open(tmp.path()).unwrap();
        let summary = InspectSummary::from_dataset(&dataset);
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.clip_samples, 4);
        assert_eq!(summary.sample_rate, 8);
        assert_eq!(summary.audio_format, AudioFormat::Wav);
        assert_eq!(summary.total_seconds, 3.0);
        assert_eq!(summary.seed, None);
        assert_eq!(summary.families.values().sum::<usize>(), 3);

        let (low, high) = summary.pitch_span.unwrap();
        assert!(notes.iter().all(|n| (low..=high).contains(&n.midi_number)));
    }

    #[test]
    fn test_missing_dataset_fails_with_generation_code() {
        let tmp = tempfile::tempdir().unwrap();
        let code = run(tmp.path(), true).unwrap();
        assert_eq!(
            format!("{:?}", code),
            format!("{:?}", ExitCode::from(reporting::EXIT_GENERATION_ERROR))
        );
    }
}
