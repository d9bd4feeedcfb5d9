//! Loading measurement files into a [`Dataset`].
//!
//! Accepts the delimited text format `(<id>;)?<label>;<latency>`: one
//! measurement per row, rows already in acquisition order. The separator is
//! `;` with a per-line fallback to `,`; fields may be wrapped in double
//! quotes. Two-field rows are `label;latency`, three-field rows carry a
//! leading id column that is ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::Dataset;

/// Errors that can occur while loading measurement data.
#[derive(Debug)]
pub enum ReadError {
    /// IO error reading the input.
    Io(std::io::Error),

    /// A row that does not have two or three fields.
    Parse {
        /// Line number where the error occurred (1-indexed).
        line: usize,
        /// Description of the parse error.
        message: String,
    },

    /// A latency field that does not parse as an integer.
    InvalidLatency {
        /// Line number where the invalid value was found (1-indexed).
        line: usize,
        /// The invalid field text.
        value: String,
    },

    /// The input contained no measurements.
    Empty,
}

impl std::fmt::Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadError::Io(e) => write!(f, "IO error: {}", e),
            ReadError::Parse { line, message } => {
                write!(f, "parse error at line {}: {}", line, message)
            }
            ReadError::InvalidLatency { line, value } => {
                write!(f, "invalid latency at line {}: '{}'", line, value)
            }
            ReadError::Empty => write!(f, "input contained no measurements"),
        }
    }
}

impl std::error::Error for ReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReadError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ReadError {
    fn from(e: std::io::Error) -> Self {
        ReadError::Io(e)
    }
}

/// Strip surrounding whitespace, then one pair of surrounding quotes.
fn clean(field: &str) -> &str {
    let trimmed = field.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed)
}

/// Read measurements from any buffered source into a new dataset.
///
/// Blank lines are skipped. Fails with [`ReadError::Empty`] when no
/// measurement rows are present.
pub fn read_delimited<R: BufRead>(
    input: R,
    name: &str,
    source: &str,
) -> Result<Dataset, ReadError> {
    let mut dataset = Dataset::new(name, source);

    for (idx, line) in input.lines().enumerate() {
        let line = line?;
        let row = line.trim();
        if row.is_empty() {
            continue;
        }
        let lineno = idx + 1;

        let mut fields: Vec<&str> = row.split(';').map(clean).collect();
        if fields.len() < 2 {
            fields = row.split(',').map(clean).collect();
        }

        let (label, latency) = match fields.len() {
            2 => (fields[0], fields[1]),
            3 => (fields[1], fields[2]),
            n => {
                return Err(ReadError::Parse {
                    line: lineno,
                    message: format!("expected 2 or 3 fields, found {}", n),
                })
            }
        };

        let value: i64 = latency.parse().map_err(|_| ReadError::InvalidLatency {
            line: lineno,
            value: latency.to_string(),
        })?;

        dataset.record(label, value);
    }

    if dataset.measurement_count() == 0 {
        return Err(ReadError::Empty);
    }
    Ok(dataset)
}

/// Read a measurement file into a new dataset.
///
/// The dataset name is the file stem; the source is the full path.
pub fn read_file(path: &Path) -> Result<Dataset, ReadError> {
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "measurements".to_string());
    let file = File::open(path)?;
    read_delimited(BufReader::new(file), &name, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn load(text: &str) -> Result<Dataset, ReadError> {
        read_delimited(Cursor::new(text), "test", "memory")
    }

    #[test]
    fn parses_two_field_rows() {
        let ds = load("a;100\nb;200\na;101\n").unwrap();
        assert_eq!(ds.secrets().len(), 2);
        assert_eq!(ds.secret("a").unwrap().len(), 2);
        assert_eq!(ds.secret("b").unwrap().len(), 1);
        assert_eq!(ds.secret("a").unwrap().measurements()[1].value, 101);
    }

    #[test]
    fn parses_three_field_rows_ignoring_the_id() {
        let ds = load("0;key1;500\n1;key2;700\n2;key1;510\n").unwrap();
        assert_eq!(ds.secrets().len(), 2);
        let key1 = ds.secret("key1").unwrap();
        assert_eq!(
            key1.measurements().iter().map(|m| m.value).collect::<Vec<_>>(),
            vec![500, 510]
        );
        // global arrival order follows the rows, not the id column
        assert_eq!(key1.measurements()[1].row, 2);
    }

    #[test]
    fn falls_back_to_comma_separator() {
        let ds = load("a,100\nb,200\n").unwrap();
        assert_eq!(ds.secret("a").unwrap().measurements()[0].value, 100);
        assert_eq!(ds.secret("b").unwrap().measurements()[0].value, 200);
    }

    #[test]
    fn strips_surrounding_quotes() {
        let ds = load("\"a\";\"100\"\n\"a\";\"101\"\n").unwrap();
        assert_eq!(
            ds.secret("a")
                .unwrap()
                .measurements()
                .iter()
                .map(|m| m.value)
                .collect::<Vec<_>>(),
            vec![100, 101]
        );
    }

    #[test]
    fn skips_blank_lines() {
        let ds = load("a;100\n\n   \nb;200\n").unwrap();
        assert_eq!(ds.measurement_count(), 2);
    }

    #[test]
    fn negative_latencies_parse() {
        let ds = load("a;-5\na;7\n").unwrap();
        assert_eq!(ds.secret("a").unwrap().min(), Some(-5));
    }

    #[test]
    fn reports_invalid_latency_with_line_number() {
        let err = load("a;100\nb;fast\n").unwrap_err();
        match err {
            ReadError::InvalidLatency { line, value } => {
                assert_eq!(line, 2);
                assert_eq!(value, "fast");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn reports_malformed_rows() {
        let err = load("justonefield\n").unwrap_err();
        match err {
            ReadError::Parse { line, .. } => assert_eq!(line, 1),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(load(""), Err(ReadError::Empty)));
        assert!(matches!(load("\n  \n"), Err(ReadError::Empty)));
    }

    #[test]
    fn read_file_names_the_dataset_after_the_stem() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "a;100").unwrap();
        writeln!(file, "b;200").unwrap();
        file.flush().unwrap();

        let ds = read_file(file.path()).unwrap();
        assert_eq!(ds.measurement_count(), 2);
        assert_eq!(ds.source(), file.path().display().to_string());
    }
}
