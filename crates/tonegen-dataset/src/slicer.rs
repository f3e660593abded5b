//! Cuts the concatenated waveform into per-note clips.
//!
//! The same slicer serves the render pipeline (writing per-slot files) and
//! the dataset reader (materializing clips in memory).

use std::iter::FusedIterator;

use crate::error::{DatasetError, DatasetResult};
use crate::index::{AudioIndex, AudioIndexEntry};

/// Lazy iterator over the clips of an index.
///
/// Cloning restarts iteration from the current position; bounds were checked
/// when the iterator was created, so iteration itself cannot fail.
#[derive(Debug, Clone)]
pub struct Slices<'a> {
    waveform: &'a [f64],
    entries: std::slice::Iter<'a, AudioIndexEntry>,
}

impl<'a> Iterator for Slices<'a> {
    type Item = &'a [f64];

    fn next(&mut self) -> Option<Self::Item> {
        let waveform = self.waveform;
        self.entries
            .next()
            .map(|e| &waveform[e.start_samples as usize..e.end_samples as usize])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl ExactSizeIterator for Slices<'_> {}

impl FusedIterator for Slices<'_> {}

/// Returns one clip per index row, in index order.
///
/// Fails with `OutOfRange` if any row ends past the waveform or is inverted,
/// which means the render and the layout disagree.
pub fn slice<'a>(waveform: &'a [f64], index: &'a AudioIndex) -> DatasetResult<Slices<'a>> {
    for (row, entry) in index.iter().enumerate() {
        if entry.start_samples > entry.end_samples || entry.end_samples > waveform.len() as u64 {
            return Err(DatasetError::OutOfRange {
                row,
                start: entry.start_samples,
                end: entry.end_samples,
                len: waveform.len(),
            });
        }
    }

    Ok(Slices {
        waveform,
        entries: index.entries().iter(),
    })
}

/// Copies every clip into an owned buffer.
pub fn slice_to_vec(waveform: &[f64], index: &AudioIndex) -> DatasetResult<Vec<Vec<f64>>> {
    Ok(slice(waveform, index)?.map(<[f64]>::to_vec).collect())
}
