//! Suite table: which runs exercise each test program.
//!
//! A test case is identified by the file name of its C source
//! (`09-internal-recursion.c`). Each case has an ordered list of runs, and
//! each run passes its arguments to the subject binary and names the fixture
//! its output must match.
//!
//! Each entry of `args` is a separate argv element, so `["2", "3"]` runs the
//! subject with argc 3. The older shell harness passed the whole list as a
//! single argument; fixtures are named after the split argc instead.

use std::collections::BTreeMap;
use std::path::Path;

use cgprof_fs::{Filesystem, FsError};
use cgprof_schema::basename;
use serde::{Deserialize, Serialize};

/// Table shipped with the crate, covering the profiler's C test programs.
const BUILTIN_SUITE: &str = include_str!("../suite.json");

/// Errors from loading a suite table.
#[derive(Debug, thiserror::Error)]
pub enum SuiteError {
    #[error("failed to read suite table {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: FsError,
    },

    #[error("failed to parse suite table {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid run for test case {case}: {reason}")]
    InvalidRun { case: String, reason: String },
}

/// One execution of the subject binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRun {
    /// Arguments passed after the program name.
    #[serde(default)]
    pub args: Vec<String>,
    /// Fixture name, without directory or extension.
    pub expected: String,
}

impl CaseRun {
    pub fn new(args: &[&str], expected: &str) -> Self {
        Self {
            args: args.iter().map(|a| a.to_string()).collect(),
            expected: expected.to_string(),
        }
    }
}

/// Mapping from test-case identifier to its runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Require actual and expected collections to have the same length.
    #[serde(default)]
    pub exact_length: bool,
    pub cases: BTreeMap<String, Vec<CaseRun>>,
}

impl SuiteConfig {
    /// The built-in table.
    pub fn builtin() -> Result<Self, SuiteError> {
        Self::from_json("<builtin>", BUILTIN_SUITE)
    }

    /// Load a table from a JSON file.
    pub fn load<F: Filesystem>(fs: &F, path: &Path) -> Result<Self, SuiteError> {
        let content = fs.read_file(path).map_err(|source| SuiteError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&path.display().to_string(), &content)
    }

    /// Parse and validate a table.
    pub fn from_json(origin: &str, json: &str) -> Result<Self, SuiteError> {
        let suite: SuiteConfig = serde_json::from_str(json).map_err(|source| SuiteError::Json {
            path: origin.to_string(),
            source,
        })?;
        suite.validate()?;
        Ok(suite)
    }

    fn validate(&self) -> Result<(), SuiteError> {
        for (case, runs) in &self.cases {
            for run in runs {
                if run.expected.trim().is_empty() {
                    return Err(SuiteError::InvalidRun {
                        case: case.clone(),
                        reason: "empty fixture name".to_string(),
                    });
                }
                if run.expected.contains(['/', '\\']) {
                    return Err(SuiteError::InvalidRun {
                        case: case.clone(),
                        reason: format!("fixture name {:?} contains a path separator", run.expected),
                    });
                }
            }
        }
        Ok(())
    }

    /// Runs for a test file, looked up by its basename.
    pub fn runs_for(&self, test_file: &str) -> Option<&[CaseRun]> {
        self.cases.get(case_id(test_file)).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

/// Test-case identifier of a test file path.
pub fn case_id(test_file: &str) -> &str {
    basename(test_file)
}
