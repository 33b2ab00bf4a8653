//! Conformance result types.

use cgprof_oracle::RecordMismatch;
use serde::Serialize;

/// Outcome of one run of the subject binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Output matched the fixture.
    Matched,
    /// Output did not match the fixture.
    Mismatched {
        actual_len: usize,
        expected_len: usize,
        /// Compared pairs that differ; empty when only the lengths differ.
        mismatches: Vec<RecordMismatch>,
    },
    /// The subject did not write its output file.
    MissingOutput,
}

/// Result of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunResult {
    pub expected: String,
    pub args: Vec<String>,
    /// Exit code of the subject, `None` if it was killed by a signal.
    pub exit_code: Option<i32>,
    pub outcome: RunOutcome,
}

impl RunResult {
    pub fn passed(&self) -> bool {
        self.outcome == RunOutcome::Matched
    }
}

/// Whether the test case could be exercised at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Completed,
    /// The subject binary does not exist; the test program did not build.
    CompilationFailed,
}

/// Result of exercising one test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseReport {
    pub test_file: String,
    pub case_id: String,
    pub status: CaseStatus,
    pub runs: Vec<RunResult>,
}

impl CaseReport {
    pub fn completed(test_file: &str, case_id: &str, runs: Vec<RunResult>) -> Self {
        Self {
            test_file: test_file.to_string(),
            case_id: case_id.to_string(),
            status: CaseStatus::Completed,
            runs,
        }
    }

    pub fn compilation_failed(test_file: &str, case_id: &str) -> Self {
        Self {
            test_file: test_file.to_string(),
            case_id: case_id.to_string(),
            status: CaseStatus::CompilationFailed,
            runs: vec![],
        }
    }

    /// True iff the case built and every run matched.
    pub fn passed(&self) -> bool {
        self.status == CaseStatus::Completed && self.runs.iter().all(RunResult::passed)
    }

    /// Fixture names of the runs that failed.
    pub fn failures(&self) -> Vec<&str> {
        self.runs
            .iter()
            .filter(|r| !r.passed())
            .map(|r| r.expected.as_str())
            .collect()
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
