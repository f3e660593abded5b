//! Determinism checks for generated datasets.
//!
//! A generation run is deterministic when the same seed and settings
//! produce byte-identical artifacts. [`verify_determinism`] compares raw
//! outputs of repeated runs; [`dataset_fingerprint`] hashes a whole dataset
//! directory so two runs can be compared file by file.

use std::fmt;
use std::path::Path;

/// Result of a determinism verification.
#[derive(Debug, Clone)]
pub struct DeterminismResult {
    /// Whether all runs produced identical output.
    pub is_deterministic: bool,
    /// Number of runs performed.
    pub runs: usize,
    /// BLAKE3 hash of the first run's output.
    pub hash: String,
    /// The first difference found, if any.
    pub diff_info: Option<DiffInfo>,
}

/// First byte difference between two runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffInfo {
    /// Byte offset of the difference (or the shorter length).
    pub offset: usize,
    /// Which run (0-indexed) differed from run 0.
    pub run_index: usize,
    /// Output length of run 0.
    pub expected_len: usize,
    /// Output length of the differing run.
    pub actual_len: usize,
}

impl fmt::Display for DiffInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run {} differs at byte {} ({} vs {} bytes)",
            self.run_index, self.offset, self.expected_len, self.actual_len
        )
    }
}

impl DeterminismResult {
    /// Panic with a detailed message if not deterministic.
    pub fn assert_deterministic(&self) {
        if let Some(ref diff) = self.diff_info {
            panic!(
                "Non-deterministic output detected!\nRuns: {}\nHash: {}\n{}",
                self.runs, self.hash, diff
            );
        }
    }
}

/// Runs `generate_fn` `runs` times and compares every output with the first.
pub fn verify_determinism<F, O>(generate_fn: F, runs: usize) -> DeterminismResult
where
    F: Fn(usize) -> O,
    O: AsRef<[u8]>,
{
    assert!(runs >= 2, "Must run at least 2 times to verify determinism");

    let reference = generate_fn(0);
    let reference = reference.as_ref();
    let hash = blake3::hash(reference).to_hex().to_string();

    for run_index in 1..runs {
        let output = generate_fn(run_index);
        let output = output.as_ref();
        let offset = reference
            .iter()
            .zip(output)
            .position(|(a, b)| a != b)
            .or_else(|| {
                (reference.len() != output.len()).then(|| reference.len().min(output.len()))
            });

        if let Some(offset) = offset {
            return DeterminismResult {
                is_deterministic: false,
                runs,
                hash,
                diff_info: Some(DiffInfo {
                    offset,
                    run_index,
                    expected_len: reference.len(),
                    actual_len: output.len(),
                }),
            };
        }
    }

    DeterminismResult {
        is_deterministic: true,
        runs,
        hash,
        diff_info: None,
    }
}

/// BLAKE3 hash of every regular file in `dir`, sorted by file name.
pub fn dataset_fingerprint(dir: &Path) -> std::io::Result<Vec<(String, String)>> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let bytes = std::fs::read(entry.path())?;
        entries.push((name, blake3::hash(&bytes).to_hex().to_string()));
    }
    entries.sort();
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_outputs() {
        let result = verify_determinism(|_| vec![1u8, 2, 3], 3);
        assert!(result.is_deterministic);
        assert!(result.diff_info.is_none());
        result.assert_deterministic();
    }

    #[test]
    fn test_byte_difference() {
        let result = verify_determinism(
            |run| if run == 2 { vec![1u8, 9, 3] } else { vec![1, 2, 3] },
            3,
        );
        assert!(!result.is_deterministic);
        let diff = result.diff_info.unwrap();
        assert_eq!(diff.offset, 1);
        assert_eq!(diff.run_index, 2);
    }

    #[test]
    fn test_length_difference() {
        let result = verify_determinism(|run| vec![0u8; 4 + run], 2);
        assert_eq!(result.diff_info.unwrap().offset, 4);
    }

    #[test]
    fn test_fingerprint_lists_files_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("b.csv"), b"b").unwrap();
        std::fs::write(tmp.path().join("a.csv"), b"a").unwrap();
        std::fs::create_dir(tmp.path().join("nested")).unwrap();

        let fingerprint = dataset_fingerprint(tmp.path()).unwrap();
        let names: Vec<&str> = fingerprint.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
        assert_eq!(fingerprint[0].1, blake3::hash(b"a").to_hex().to_string());
    }
}
