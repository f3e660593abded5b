//! Row-indexed CSV tables.
//!
//! Both persisted tables use the same layout: an unnamed leading column
//! holding the row ordinal, followed by named value columns.
//!
//! ```text
//! ,midi_instrument,midi_number,volume,duration,tempo
//! 0,41,62,0.8121,1.0,60.0
//! ```

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{DatasetError, DatasetResult};
use crate::index::{AudioIndex, AudioIndexEntry};
use crate::note::NoteSpec;

/// Columns of the parameter table, in order.
pub const PARAMETER_COLUMNS: [&str; 5] = [
    "midi_instrument",
    "midi_number",
    "volume",
    "duration",
    "tempo",
];

/// Columns of the audio index table, in order.
pub const INDEX_COLUMNS: [&str; 4] = ["start_samples", "start_time", "end_samples", "end_time"];

/// Writes the parameter table.
pub fn write_parameters(path: &Path, notes: &[NoteSpec]) -> DatasetResult<()> {
    let rows = notes.iter().map(|n| {
        vec![
            n.midi_instrument.to_string(),
            n.midi_number.to_string(),
            format_float(n.volume),
            format_float(n.duration),
            format_float(n.tempo),
        ]
    });
    write_table(path, &PARAMETER_COLUMNS, rows)
}

/// Reads the parameter table.
pub fn read_parameters(path: &Path) -> DatasetResult<Vec<NoteSpec>> {
    let table = CsvTable::read(path)?;
    let cols = table.columns(&PARAMETER_COLUMNS)?;

    let mut notes = Vec::with_capacity(table.rows.len());
    for row in 0..table.rows.len() {
        let note = NoteSpec {
            midi_instrument: table.field(row, cols[0])?,
            midi_number: table.field(row, cols[1])?,
            volume: table.field(row, cols[2])?,
            duration: table.field(row, cols[3])?,
            tempo: table.field(row, cols[4])?,
        };
        if note.midi_number > 127 || note.midi_instrument > 127 {
            return Err(DatasetError::schema(
                path,
                format!("row {} has a MIDI value above 127", row),
            ));
        }
        notes.push(note);
    }
    Ok(notes)
}

/// Writes the audio index table.
pub fn write_index(path: &Path, index: &AudioIndex) -> DatasetResult<()> {
    let rows = index.iter().map(|e| {
        vec![
            e.start_samples.to_string(),
            format_float(e.start_time),
            e.end_samples.to_string(),
            format_float(e.end_time),
        ]
    });
    write_table(path, &INDEX_COLUMNS, rows)
}

/// Reads the audio index table and checks rows are ordered and disjoint.
pub fn read_index(path: &Path) -> DatasetResult<AudioIndex> {
    let table = CsvTable::read(path)?;
    let cols = table.columns(&INDEX_COLUMNS)?;

    let mut entries = Vec::with_capacity(table.rows.len());
    for row in 0..table.rows.len() {
        entries.push(AudioIndexEntry {
            start_samples: table.field(row, cols[0])?,
            start_time: table.field(row, cols[1])?,
            end_samples: table.field(row, cols[2])?,
            end_time: table.field(row, cols[3])?,
        });
    }

    let index = AudioIndex::from_entries(entries);
    if let Some(message) = index.first_violation() {
        return Err(DatasetError::schema(path, message));
    }
    Ok(index)
}

/// Formats a float so it parses back to the same value.
fn format_float(value: f64) -> String {
    format!("{:?}", value)
}

/// Escape a string for CSV output.
fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn write_table<I>(path: &Path, columns: &[&str], rows: I) -> DatasetResult<()>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut output = String::new();

    // Header: unnamed ordinal column, then value columns
    let header: Vec<String> = columns.iter().map(|c| csv_escape(c)).collect();
    let _ = writeln!(output, ",{}", header.join(","));

    for (ordinal, row) in rows.into_iter().enumerate() {
        let fields: Vec<String> = row.iter().map(|f| csv_escape(f)).collect();
        let _ = writeln!(output, "{},{}", ordinal, fields.join(","));
    }

    std::fs::write(path, output)?;
    Ok(())
}

/// Splits one CSV line, honoring double-quoted fields.
fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// A parsed row-indexed table. The ordinal column is checked and dropped.
struct CsvTable {
    path: PathBuf,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CsvTable {
    fn read(path: &Path) -> DatasetResult<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DatasetError::MissingArtifact {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let mut lines = content.lines().filter(|l| !l.trim().is_empty());
        let header_line = lines
            .next()
            .ok_or_else(|| DatasetError::schema(path, "file is empty"))?;
        let mut header = split_line(header_line.trim_end_matches('\r'));
        if header.is_empty() || !header[0].is_empty() {
            return Err(DatasetError::schema(
                path,
                "first column must be the unnamed row ordinal",
            ));
        }
        header.remove(0);

        let mut rows = Vec::new();
        for (expected, line) in lines.enumerate() {
            let mut fields = split_line(line.trim_end_matches('\r'));
            if fields.len() != header.len() + 1 {
                return Err(DatasetError::schema(
                    path,
                    format!(
                        "row {} has {} fields, expected {}",
                        expected,
                        fields.len(),
                        header.len() + 1
                    ),
                ));
            }
            let ordinal = fields.remove(0);
            if ordinal.trim().parse::<usize>().ok() != Some(expected) {
                return Err(DatasetError::schema(
                    path,
                    format!("row ordinal '{}' where {} was expected", ordinal, expected),
                ));
            }
            rows.push(fields);
        }

        Ok(Self {
            path: path.to_path_buf(),
            header,
            rows,
        })
    }

    /// Positions of the named columns.
    fn columns<const N: usize>(&self, names: &[&str; N]) -> DatasetResult<[usize; N]> {
        let mut positions = [0usize; N];
        for (slot, name) in positions.iter_mut().zip(names) {
            *slot = self
                .header
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| DatasetError::schema(&self.path, format!("missing column '{}'", name)))?;
        }
        Ok(positions)
    }

    fn field<T: FromStr>(&self, row: usize, col: usize) -> DatasetResult<T> {
        let raw = self.rows[row][col].trim();
        raw.parse().map_err(|_| {
            DatasetError::schema(
                &self.path,
                format!(
                    "row {} column '{}': cannot parse '{}'",
                    row, self.header[col], raw
                ),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::build_index;
    use crate::layout::LayoutConfig;
    use crate::sampler::{sample, SamplerConfig};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parameter_table_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("parameters.csv");
        let notes = vec![NoteSpec {
            midi_instrument: 41,
            midi_number: 62,
            volume: 0.75,
            duration: 1.0,
            tempo: 60.0,
        }];
        write_parameters(&path, &notes).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            ",midi_instrument,midi_number,volume,duration,tempo\n0,41,62,0.75,1.0,60.0\n"
        );
    }

    #[test]
    fn test_sampled_parameters_read_back_exactly() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("parameters.csv");
        let notes = sample(25, &SamplerConfig::default().seed(11)).unwrap();
        write_parameters(&path, &notes).unwrap();
        assert_eq!(read_parameters(&path).unwrap(), notes);
    }

    #[test]
    fn test_index_read_back_exactly() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("all_samples_index.csv");
        let index = build_index(4, &LayoutConfig::default()).unwrap();
        write_index(&path, &index).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(",start_samples,start_time,end_samples,end_time\n0,22050,0.5,110250,2.5\n"));
        assert_eq!(read_index(&path).unwrap(), index);
    }

    #[test]
    fn test_columns_are_matched_by_name() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("parameters.csv");
        std::fs::write(
            &path,
            ",tempo,duration,volume,midi_number,midi_instrument\n0,60.0,1.0,0.5,70,24\n",
        )
        .unwrap();
        let notes = read_parameters(&path).unwrap();
        assert_eq!(notes[0].midi_instrument, 24);
        assert_eq!(notes[0].midi_number, 70);
    }

    #[test]
    fn test_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let err = read_parameters(&tmp.path().join("parameters.csv")).unwrap_err();
        assert!(matches!(err, DatasetError::MissingArtifact { .. }));
    }

    #[test]
    fn test_missing_column() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("parameters.csv");
        std::fs::write(&path, ",midi_instrument,midi_number\n0,1,60\n").unwrap();
        let err = read_parameters(&path).unwrap_err();
        assert!(matches!(err, DatasetError::Schema { .. }));
        assert!(err.to_string().contains("volume"));
    }

    #[test]
    fn test_out_of_order_ordinal() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("all_samples_index.csv");
        std::fs::write(
            &path,
            ",start_samples,start_time,end_samples,end_time\n1,10,0.1,20,0.2\n",
        )
        .unwrap();
        assert!(matches!(
            read_index(&path),
            Err(DatasetError::Schema { .. })
        ));
    }

    #[test]
    fn test_overlapping_index_rows() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("all_samples_index.csv");
        std::fs::write(
            &path,
            ",start_samples,start_time,end_samples,end_time\n0,10,0.1,30,0.3\n1,20,0.2,40,0.4\n",
        )
        .unwrap();
        let err = read_index(&path).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn test_split_line_quotes() {
        assert_eq!(split_line("a,\"b,c\",d"), vec!["a", "b,c", "d"]);
        assert_eq!(split_line("\"x\"\"y\""), vec!["x\"y"]);
        assert_eq!(split_line(",a"), vec!["", "a"]);
    }
}
