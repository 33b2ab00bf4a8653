//! CallRecord type and line parsing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Delimiter between fields of a record line.
pub const FIELD_DELIMITER: char = ',';

/// Number of fields in a well-formed record line.
pub const FIELD_COUNT: usize = 5;

/// One call edge: `caller` calls `callee` from `source_file:line`, `count` times.
///
/// Field order is significant: the derived `Ord` is the canonical order used
/// to sort record collections, and compares `source_file` as its full string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CallRecord {
    pub caller: String,
    pub source_file: String,
    pub line: u32,
    pub callee: String,
    pub count: u64,
}

impl CallRecord {
    pub fn new(
        caller: impl Into<String>,
        source_file: impl Into<String>,
        line: u32,
        callee: impl Into<String>,
        count: u64,
    ) -> Self {
        Self {
            caller: caller.into(),
            source_file: source_file.into(),
            line,
            callee: callee.into(),
            count,
        }
    }

    /// Final path component of `source_file`.
    pub fn source_basename(&self) -> &str {
        basename(&self.source_file)
    }

    /// Sort key with `source_file` reduced to its basename.
    pub fn normalized_key(&self) -> (&str, &str, u32, &str, u64) {
        (
            &self.caller,
            self.source_basename(),
            self.line,
            &self.callee,
            self.count,
        )
    }

    /// Fields that differ from `other`, with `source_file` compared by basename.
    pub fn differing_fields(&self, other: &CallRecord) -> Vec<RecordField> {
        let mut fields = Vec::new();
        if self.caller != other.caller {
            fields.push(RecordField::Caller);
        }
        if self.source_basename() != other.source_basename() {
            fields.push(RecordField::SourceFile);
        }
        if self.line != other.line {
            fields.push(RecordField::Line);
        }
        if self.callee != other.callee {
            fields.push(RecordField::Callee);
        }
        if self.count != other.count {
            fields.push(RecordField::Count);
        }
        fields
    }

    /// Semantic equality: all fields equal, `source_file` by basename.
    pub fn matches(&self, other: &CallRecord) -> bool {
        self.differing_fields(other).is_empty()
    }
}

impl fmt::Display for CallRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{}",
            self.caller, self.source_file, self.line, self.callee, self.count
        )
    }
}

/// Named record field, used in error and mismatch reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    Caller,
    SourceFile,
    Line,
    Callee,
    Count,
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordField::Caller => "caller",
            RecordField::SourceFile => "source_file",
            RecordField::Line => "line",
            RecordField::Callee => "callee",
            RecordField::Count => "count",
        };
        f.write_str(name)
    }
}

/// Shape of a line that is not a record.
///
/// Lines with the wrong number of fields (blank lines, headers with another
/// column count, truncated writes) are not records and are skipped by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowShape {
    Blank,
    WrongFieldCount(usize),
}

impl fmt::Display for RowShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowShape::Blank => f.write_str("blank line"),
            RowShape::WrongFieldCount(n) => {
                write!(f, "expected {} fields, found {}", FIELD_COUNT, n)
            }
        }
    }
}

/// Errors from parsing a five-field record line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("field `{field}` is not a non-negative integer: {value:?}")]
    MalformedNumericField { field: RecordField, value: String },
}

/// Parse one line of a record file.
///
/// Returns `Ok(Err(shape))` for lines that are not records, `Ok(Ok(record))`
/// for records, and `Err` when a five-field line has a non-numeric `line` or
/// `count` field.
pub fn parse_record_line(line: &str) -> Result<Result<CallRecord, RowShape>, RecordError> {
    let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    if fields.len() != FIELD_COUNT {
        if line.trim().is_empty() {
            return Ok(Err(RowShape::Blank));
        }
        return Ok(Err(RowShape::WrongFieldCount(fields.len())));
    }

    let line_no = parse_numeric::<u32>(fields[2], RecordField::Line)?;
    let count = parse_numeric::<u64>(fields[4], RecordField::Count)?;

    Ok(Ok(CallRecord {
        caller: fields[0].trim().to_string(),
        source_file: fields[1].trim().to_string(),
        line: line_no,
        callee: fields[3].trim().to_string(),
        count,
    }))
}

// The runtime writes ", " between fields, so numeric fields carry a leading space.
fn parse_numeric<T: std::str::FromStr>(raw: &str, field: RecordField) -> Result<T, RecordError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| RecordError::MalformedNumericField {
            field,
            value: raw.to_string(),
        })
}

/// Final component of a path, accepting both `/` and `\` separators.
pub fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
