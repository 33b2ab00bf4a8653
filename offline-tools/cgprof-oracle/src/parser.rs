//! Record file parsing.
//!
//! A record file holds one `caller,sourceFile,line,callee,count` row per
//! line. Rows that do not have exactly five fields are not records: blank
//! trailing lines and headers with another column count are skipped, and
//! this never fails the parse. A five-field row with a non-numeric `line`
//! or `count` is a defect in the profiler or the fixture and is an error.

use std::path::{Path, PathBuf};

use cgprof_fs::{Filesystem, FsError};
use cgprof_schema::{parse_record_line, CallRecord, RecordError, RowShape};

/// Errors from parsing a record file.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("input file not found: {0}")]
    MissingInputFile(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: FsError,
    },

    #[error("malformed record on line {line_number}: {source}")]
    MalformedNumericField {
        line_number: usize,
        #[source]
        source: RecordError,
    },
}

/// Records read from one file, sorted into canonical order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordCollection {
    records: Vec<CallRecord>,
}

impl RecordCollection {
    /// Build a collection, sorting the records into canonical order.
    pub fn new(mut records: Vec<CallRecord>) -> Self {
        records.sort();
        Self { records }
    }

    pub fn records(&self) -> &[CallRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CallRecord> {
        self.records.iter()
    }
}

impl FromIterator<CallRecord> for RecordCollection {
    fn from_iter<I: IntoIterator<Item = CallRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Parse record file content.
pub fn parse_records(content: &str) -> Result<RecordCollection, ParseError> {
    parse_records_with::<fn(usize, RowShape)>(content, None)
}

/// Parse record file content, reporting each skipped line.
///
/// If `on_skip` is provided it is called with the 1-based line number and the
/// shape of every line that was not a record.
pub fn parse_records_with<F>(
    content: &str,
    mut on_skip: Option<F>,
) -> Result<RecordCollection, ParseError>
where
    F: FnMut(usize, RowShape),
{
    let mut records = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;
        match parse_record_line(line) {
            Ok(Ok(record)) => records.push(record),
            Ok(Err(shape)) => {
                if let Some(ref mut skip) = on_skip {
                    skip(line_number, shape);
                }
            }
            Err(source) => {
                return Err(ParseError::MalformedNumericField {
                    line_number,
                    source,
                })
            }
        }
    }

    Ok(RecordCollection::new(records))
}

/// Read and parse a record file.
pub fn parse_file<F: Filesystem>(fs: &F, path: &Path) -> Result<RecordCollection, ParseError> {
    parse_file_with::<F, fn(usize, RowShape)>(fs, path, None)
}

/// Read and parse a record file, reporting each skipped line.
pub fn parse_file_with<F, S>(
    fs: &F,
    path: &Path,
    on_skip: Option<S>,
) -> Result<RecordCollection, ParseError>
where
    F: Filesystem,
    S: FnMut(usize, RowShape),
{
    let content = read_input(fs, path)?;
    parse_records_with(&content, on_skip)
}

fn read_input<F: Filesystem>(fs: &F, path: &Path) -> Result<String, ParseError> {
    if !fs.exists(path) {
        return Err(ParseError::MissingInputFile(path.to_path_buf()));
    }
    fs.read_file(path).map_err(|source| {
        if source.is_not_found() {
            ParseError::MissingInputFile(path.to_path_buf())
        } else {
            ParseError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgprof_fs::{MockFilesystem, RealFilesystem};
    use cgprof_schema::RecordField;
    use std::fs;
    use tempfile::TempDir;

    // ===========================================
    // Category P1: Row parsing
    // ===========================================

    #[test]
    fn test_parse_single_record() {
        let records = parse_records("main,foo.c,10,bar,1\n").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records.records()[0], CallRecord::new("main", "foo.c", 10, "bar", 1));
    }

    #[test]
    fn test_parse_empty_content() {
        let records = parse_records("").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_parse_drops_four_field_row() {
        let records = parse_records("main,foo.c,10,bar,1\nmain,foo.c,11,baz\n").unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_parse_drops_blank_lines_and_short_header() {
        let content = "caller,callee\n\nmain,foo.c,10,bar,1\n\n\n";
        let records = parse_records(content).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_parse_runtime_output() {
        let content = "main, /home/u/tests/05-internal-multiple-files.c, 12, helper, 1\n\
                       helper, /home/u/tests/05-internal-multiple-files.c, 4, printf, 3\n";
        let records = parse_records(content).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records.records()[0].caller, "helper");
        assert_eq!(records.records()[0].count, 3);
        assert_eq!(records.records()[1].callee, "helper");
    }

    #[test]
    fn test_parse_crlf_lines() {
        let records = parse_records("main,foo.c,10,bar,1\r\nmain,foo.c,11,baz,2\r\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records.records()[1].count, 2);
    }

    #[test]
    fn test_parse_non_numeric_line_is_error() {
        let err = parse_records("main,foo.c,10,bar,1\nmain,foo.c,x,bar,1\n").unwrap_err();
        match err {
            ParseError::MalformedNumericField { line_number, source } => {
                assert_eq!(line_number, 2);
                assert_eq!(
                    source,
                    RecordError::MalformedNumericField {
                        field: RecordField::Line,
                        value: "x".to_string(),
                    }
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_non_numeric_count_is_error() {
        let err = parse_records("main,foo.c,10,bar,\n").unwrap_err();
        assert!(matches!(err, ParseError::MalformedNumericField { line_number: 1, .. }));
    }

    #[test]
    fn test_parse_reports_skipped_lines() {
        let mut skipped = Vec::new();
        let content = "header\nmain,foo.c,10,bar,1\n\na,b,c,d,e,f\n";
        let records = parse_records_with(
            content,
            Some(|line: usize, shape: RowShape| skipped.push((line, shape))),
        )
        .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(
            skipped,
            vec![
                (1, RowShape::WrongFieldCount(1)),
                (3, RowShape::Blank),
                (4, RowShape::WrongFieldCount(6)),
            ]
        );
    }

    // ===========================================
    // Category P2: Canonical order
    // ===========================================

    #[test]
    fn test_parse_sorts_canonically() {
        let content = "main,foo.c,11,baz,2\nmain,foo.c,10,bar,1\nabc,foo.c,99,zzz,1\n";
        let records = parse_records(content).unwrap();
        let lines: Vec<u32> = records.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![99, 10, 11]);
    }

    #[test]
    fn test_parse_order_independent() {
        let a = parse_records("main,foo.c,10,bar,1\nmain,foo.c,11,baz,2\n").unwrap();
        let b = parse_records("main,foo.c,11,baz,2\nmain,foo.c,10,bar,1\n").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_keeps_duplicates() {
        let records = parse_records("main,foo.c,10,bar,1\nmain,foo.c,10,bar,1\n").unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_collection_from_iter_sorts() {
        let collection: RecordCollection = vec![
            CallRecord::new("b", "x.c", 1, "c", 1),
            CallRecord::new("a", "x.c", 1, "c", 1),
        ]
        .into_iter()
        .collect();
        assert_eq!(collection.records()[0].caller, "a");
    }

    // ===========================================
    // Category P3: File input
    // ===========================================

    #[test]
    fn test_parse_file_mock() {
        let fs = MockFilesystem::new();
        fs.add_file("/work/profile-results.csv", "main, foo.c, 10, bar, 1\n");

        let records = parse_file(&fs, Path::new("/work/profile-results.csv")).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_parse_file_missing() {
        let fs = MockFilesystem::new();
        let err = parse_file(&fs, Path::new("/work/profile-results.csv")).unwrap_err();
        assert!(matches!(err, ParseError::MissingInputFile(p) if p == Path::new("/work/profile-results.csv")));
    }

    #[test]
    fn test_parse_file_unreadable() {
        let fs = MockFilesystem::new();
        fs.add_file("/work/bad.csv", vec![0xffu8, 0x00]);
        let err = parse_file(&fs, Path::new("/work/bad.csv")).unwrap_err();
        assert!(matches!(err, ParseError::Read { .. }));
    }

    #[test]
    fn test_parse_file_real() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("expect01.csv");
        fs::write(&path, "main,01-internal-call-once.c,6,foo,1\n").unwrap();

        let records = parse_file(&RealFilesystem, &path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records.records()[0].callee, "foo");
    }

    #[test]
    fn test_parse_file_does_not_modify_source() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("expect01.csv");
        let content = "main,foo.c,11,baz,2\nmain,foo.c,10,bar,1\n";
        fs::write(&path, content).unwrap();

        parse_file(&RealFilesystem, &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), content);
    }
}
