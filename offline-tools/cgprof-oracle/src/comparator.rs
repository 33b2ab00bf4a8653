//! Record comparison.
//!
//! Both collections are in canonical order. Records are paired by position
//! and a pair is correct when caller, source basename, line, callee and count
//! are all equal. Directory prefixes on the source file are ignored.
//!
//! Under `LengthPolicy::Exact` both sides are re-sorted with the source file
//! reduced to its basename before pairing, so the verdict is multiset
//! equality.

use std::fmt;
use std::path::Path;

use cgprof_fs::Filesystem;
use cgprof_schema::{CallRecord, RecordField, RowShape};
use serde::Serialize;

use crate::logger::Logger;
use crate::parser::{parse_file_with, ParseError, RecordCollection};

/// Errors from comparing two record files.
#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    #[error("actual output: {0}")]
    Actual(#[source] ParseError),

    #[error("expected fixture: {0}")]
    Expected(#[source] ParseError),
}

impl CompareError {
    /// The underlying parse error.
    pub fn parse_error(&self) -> &ParseError {
        match self {
            CompareError::Actual(e) | CompareError::Expected(e) => e,
        }
    }
}

/// How collections of different lengths are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LengthPolicy {
    /// Compare only as many pairs as the shorter collection has.
    /// Extra records in the longer collection are not checked.
    #[default]
    Truncate,
    /// Collections of different lengths never match, and records are paired
    /// in basename order.
    Exact,
}

/// A positional pair that did not match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordMismatch {
    pub index: usize,
    pub actual: CallRecord,
    pub expected: CallRecord,
    pub fields: Vec<RecordField>,
}

impl fmt::Display for RecordMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self.fields.iter().map(|field| field.to_string()).collect();
        write!(
            f,
            "record {}: actual `{}` expected `{}` (differs in {})",
            self.index,
            self.actual,
            self.expected,
            fields.join(", ")
        )
    }
}

/// Outcome of comparing two collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub actual_len: usize,
    pub expected_len: usize,
    pub pairs_compared: usize,
    pub policy: LengthPolicy,
    pub mismatches: Vec<RecordMismatch>,
}

impl Comparison {
    pub fn length_mismatch(&self) -> bool {
        self.actual_len != self.expected_len
    }

    /// Verdict: every compared pair matched, and under `Exact` the lengths agree.
    pub fn is_match(&self) -> bool {
        if self.policy == LengthPolicy::Exact && self.length_mismatch() {
            return false;
        }
        self.mismatches.is_empty()
    }
}

/// Compare two canonical collections.
pub fn compare_collections(
    actual: &RecordCollection,
    expected: &RecordCollection,
    policy: LengthPolicy,
) -> Comparison {
    let (actual_order, expected_order) = match policy {
        LengthPolicy::Truncate => (
            actual.iter().collect::<Vec<_>>(),
            expected.iter().collect::<Vec<_>>(),
        ),
        LengthPolicy::Exact => (normalized_order(actual), normalized_order(expected)),
    };

    let mismatches: Vec<RecordMismatch> = actual_order
        .into_iter()
        .zip(expected_order)
        .enumerate()
        .filter_map(|(index, (a, e))| {
            let fields = a.differing_fields(e);
            if fields.is_empty() {
                None
            } else {
                Some(RecordMismatch {
                    index,
                    actual: a.clone(),
                    expected: e.clone(),
                    fields,
                })
            }
        })
        .collect();

    Comparison {
        actual_len: actual.len(),
        expected_len: expected.len(),
        pairs_compared: actual.len().min(expected.len()),
        policy,
        mismatches,
    }
}

/// Records sorted with directory prefixes removed, so equal multisets pair up.
fn normalized_order(collection: &RecordCollection) -> Vec<&CallRecord> {
    let mut records: Vec<&CallRecord> = collection.iter().collect();
    records.sort_by(|a, b| a.normalized_key().cmp(&b.normalized_key()));
    records
}

/// Compare an actual record file against an expected fixture.
///
/// Returns `Ok(false)` on a semantic mismatch, after dumping both canonical
/// collections to `logger`. Parse failures propagate.
pub fn compare<F, L>(
    fs: &F,
    actual_path: &Path,
    expected_path: &Path,
    logger: &L,
) -> Result<bool, CompareError>
where
    F: Filesystem,
    L: Logger + ?Sized,
{
    compare_with(fs, actual_path, expected_path, LengthPolicy::default(), logger)
}

/// Compare with an explicit length policy.
pub fn compare_with<F, L>(
    fs: &F,
    actual_path: &Path,
    expected_path: &Path,
    policy: LengthPolicy,
    logger: &L,
) -> Result<bool, CompareError>
where
    F: Filesystem,
    L: Logger + ?Sized,
{
    compare_files(fs, actual_path, expected_path, policy, logger).map(|c| c.is_match())
}

/// Compare two record files and return the full comparison.
pub fn compare_files<F, L>(
    fs: &F,
    actual_path: &Path,
    expected_path: &Path,
    policy: LengthPolicy,
    logger: &L,
) -> Result<Comparison, CompareError>
where
    F: Filesystem,
    L: Logger + ?Sized,
{
    let actual = load(fs, actual_path, logger).map_err(CompareError::Actual)?;
    let expected = load(fs, expected_path, logger).map_err(CompareError::Expected)?;

    let comparison = compare_collections(&actual, &expected, policy);
    logger.verbose(&format!(
        "compared {} pair(s): {} actual, {} expected",
        comparison.pairs_compared, comparison.actual_len, comparison.expected_len
    ));

    if comparison.is_match() {
        if comparison.length_mismatch() {
            logger.verbose(&format!(
                "ignored {} unpaired record(s)",
                comparison.actual_len.abs_diff(comparison.expected_len)
            ));
        }
    } else {
        dump(logger, &comparison, &actual, &expected);
    }

    Ok(comparison)
}

fn load<F, L>(fs: &F, path: &Path, logger: &L) -> Result<RecordCollection, ParseError>
where
    F: Filesystem,
    L: Logger + ?Sized,
{
    parse_file_with(
        fs,
        path,
        Some(|line: usize, shape: RowShape| {
            logger.debug(&format!("{}:{}: skipped ({})", path.display(), line, shape));
        }),
    )
}

fn dump<L: Logger + ?Sized>(
    logger: &L,
    comparison: &Comparison,
    actual: &RecordCollection,
    expected: &RecordCollection,
) {
    logger.info("actual:");
    for record in actual.iter() {
        logger.info(&format!("  {}", record));
    }
    logger.info("expected:");
    for record in expected.iter() {
        logger.info(&format!("  {}", record));
    }

    for mismatch in &comparison.mismatches {
        logger.verbose(&mismatch.to_string());
    }
    if comparison.length_mismatch() {
        logger.verbose(&format!(
            "length differs: {} actual, {} expected",
            comparison.actual_len, comparison.expected_len
        ));
    }
}
