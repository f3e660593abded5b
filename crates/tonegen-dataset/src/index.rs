//! Audio index: where each note's clip lives in the concatenated render.

use serde::{Deserialize, Serialize};

use crate::error::DatasetResult;
use crate::layout::LayoutConfig;

/// Sample and time bounds of one clip, row-aligned with the parameter table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioIndexEntry {
    /// First sample of the clip (inclusive).
    pub start_samples: u64,
    /// `start_samples` in seconds.
    pub start_time: f64,
    /// One past the last sample of the clip (exclusive).
    pub end_samples: u64,
    /// `end_samples` in seconds.
    pub end_time: f64,
}

impl AudioIndexEntry {
    /// Builds an entry from sample offsets, deriving the times.
    pub fn from_samples(start_samples: u64, end_samples: u64, sample_rate: u32) -> Self {
        Self {
            start_samples,
            start_time: start_samples as f64 / sample_rate as f64,
            end_samples,
            end_time: end_samples as f64 / sample_rate as f64,
        }
    }

    /// Clip length in samples (zero if inverted).
    pub fn len_samples(&self) -> u64 {
        self.end_samples.saturating_sub(self.start_samples)
    }
}

/// Ordered table of clip bounds, one row per note.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioIndex {
    entries: Vec<AudioIndexEntry>,
}

impl AudioIndex {
    /// Wraps entries read from storage. Use [`AudioIndex::first_violation`]
    /// to check them.
    pub fn from_entries(entries: Vec<AudioIndexEntry>) -> Self {
        Self { entries }
    }

    /// Rows in ordinal order.
    pub fn entries(&self) -> &[AudioIndexEntry] {
        &self.entries
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the index has no rows.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over rows in ordinal order.
    pub fn iter(&self) -> std::slice::Iter<'_, AudioIndexEntry> {
        self.entries.iter()
    }

    /// Largest `end_samples` of any row.
    pub fn max_end_samples(&self) -> u64 {
        self.entries
            .iter()
            .map(|e| e.end_samples)
            .max()
            .unwrap_or(0)
    }

    /// Describes the first row that is inverted or overlaps its predecessor.
    pub fn first_violation(&self) -> Option<String> {
        let mut previous_end = 0u64;
        for (row, entry) in self.entries.iter().enumerate() {
            if entry.start_samples >= entry.end_samples {
                return Some(format!(
                    "row {} is empty or inverted ({} >= {})",
                    row, entry.start_samples, entry.end_samples
                ));
            }
            if row > 0 && entry.start_samples < previous_end {
                return Some(format!(
                    "row {} starts at {} before row {} ends at {}",
                    row,
                    entry.start_samples,
                    row - 1,
                    previous_end
                ));
            }
            previous_end = entry.end_samples;
        }
        None
    }
}

impl<'a> IntoIterator for &'a AudioIndex {
    type Item = &'a AudioIndexEntry;
    type IntoIter = std::slice::Iter<'a, AudioIndexEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Computes the clip bounds of `n` consecutive slots.
///
/// Slot `i` covers `[i * part, (i + 1) * part)`; its clip drops `margin`
/// samples from each end. Fails with `InvalidLayout` if the geometry leaves
/// no room for a clip.
pub fn build_index(n: usize, layout: &LayoutConfig) -> DatasetResult<AudioIndex> {
    layout.validate()?;

    let part = layout.part_samples();
    let margin = layout.margin_samples();

    let entries = (0..n as u64)
        .map(|i| {
            AudioIndexEntry::from_samples(
                i * part + margin,
                (i + 1) * part - margin,
                layout.sample_rate,
            )
        })
        .collect();

    Ok(AudioIndex { entries })
}
