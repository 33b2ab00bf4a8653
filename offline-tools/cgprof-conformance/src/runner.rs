//! Conformance runner for exercising a test program against its fixtures.

use std::path::PathBuf;

use cgprof_fs::{Filesystem, FsError};
use cgprof_oracle::{compare_files, CompareError, LengthPolicy, Logger};

use crate::executor::{ExecuteError, Executor};
use crate::suite::{case_id, CaseRun, SuiteConfig};
use crate::types::{CaseReport, RunOutcome, RunResult};

/// File the profiler runtime writes in its working directory.
pub const DEFAULT_OUTPUT_FILE: &str = "profile-results.csv";

/// Extension of fixture files.
pub const DEFAULT_FIXTURE_EXTENSION: &str = "csv";

/// Errors that can occur during conformance runs.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("no runs configured for test case {0}")]
    UnknownTestCase(String),

    #[error("run {expected}: {source}")]
    Execute {
        expected: String,
        #[source]
        source: ExecuteError,
    },

    #[error("run {expected}: {source}")]
    Compare {
        expected: String,
        #[source]
        source: CompareError,
    },

    #[error("run {expected}: failed to prepare output file: {source}")]
    Output {
        expected: String,
        #[source]
        source: FsError,
    },
}

/// Where the subject lives and where its output and fixtures are found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    pub binary: PathBuf,
    pub test_file: String,
    pub fixture_dir: PathBuf,
    pub workdir: PathBuf,
    pub output_file: String,
    pub fixture_extension: String,
    pub policy: LengthPolicy,
    /// Move each run's output aside as `<expected>.actual.<ext>` instead of
    /// leaving it to be overwritten by the next run.
    pub keep_outputs: bool,
}

impl RunnerConfig {
    pub fn new(binary: impl Into<PathBuf>, test_file: &str, fixture_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            test_file: test_file.to_string(),
            fixture_dir: fixture_dir.into(),
            workdir: PathBuf::from("."),
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
            fixture_extension: DEFAULT_FIXTURE_EXTENSION.to_string(),
            policy: LengthPolicy::default(),
            keep_outputs: false,
        }
    }

    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = workdir.into();
        self
    }

    pub fn with_output_file(mut self, output_file: &str) -> Self {
        self.output_file = output_file.to_string();
        self
    }

    pub fn with_fixture_extension(mut self, extension: &str) -> Self {
        self.fixture_extension = extension.to_string();
        self
    }

    pub fn with_policy(mut self, policy: LengthPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_keep_outputs(mut self, keep: bool) -> Self {
        self.keep_outputs = keep;
        self
    }

    /// Path of the file the subject writes.
    pub fn output_path(&self) -> PathBuf {
        self.workdir.join(&self.output_file)
    }

    /// Path of the fixture for a run.
    pub fn fixture_path(&self, expected: &str) -> PathBuf {
        self.fixture_dir
            .join(format!("{}.{}", expected, self.fixture_extension))
    }

    /// Where a run's output is kept when `keep_outputs` is set.
    pub fn kept_output_path(&self, expected: &str) -> PathBuf {
        self.workdir
            .join(format!("{}.actual.{}", expected, self.fixture_extension))
    }
}

/// Exercise one test case: run the subject once per configured run and
/// compare each output with its fixture.
///
/// A mismatch is reported as `<expected> failure` and the remaining runs
/// still execute. A missing subject binary is reported as a compilation
/// failure without running anything.
pub fn run_case<F, E, L>(
    fs: &F,
    executor: &E,
    config: &RunnerConfig,
    suite: &SuiteConfig,
    logger: &L,
) -> Result<CaseReport, RunError>
where
    F: Filesystem,
    E: Executor,
    L: Logger + ?Sized,
{
    let id = case_id(&config.test_file);

    if !fs.is_file(&config.binary) {
        logger.info(&format!("error: {} compilation failed", config.test_file));
        return Ok(CaseReport::compilation_failed(&config.test_file, id));
    }

    let runs = suite
        .runs_for(&config.test_file)
        .ok_or_else(|| RunError::UnknownTestCase(id.to_string()))?;

    let policy = if suite.exact_length {
        LengthPolicy::Exact
    } else {
        config.policy
    };

    let mut results = Vec::with_capacity(runs.len());
    for run in runs {
        let result = run_once(fs, executor, config, run, policy, logger)?;
        if !result.passed() {
            logger.info(&format!("{} failure", run.expected));
        }
        results.push(result);
    }

    Ok(CaseReport::completed(&config.test_file, id, results))
}

fn run_once<F, E, L>(
    fs: &F,
    executor: &E,
    config: &RunnerConfig,
    run: &CaseRun,
    policy: LengthPolicy,
    logger: &L,
) -> Result<RunResult, RunError>
where
    F: Filesystem,
    E: Executor,
    L: Logger + ?Sized,
{
    let output_path = config.output_path();
    let output_error = |source: FsError| RunError::Output {
        expected: run.expected.clone(),
        source,
    };

    // Output left over from a previous run must not be mistaken for this one.
    if fs.exists(&output_path) {
        fs.remove(&output_path).map_err(output_error)?;
    }

    logger.verbose(&format!(
        "running {} {}",
        config.binary.display(),
        run.args.join(" ")
    ));
    let execution = executor
        .execute(&config.binary, &run.args, &config.workdir)
        .map_err(|source| RunError::Execute {
            expected: run.expected.clone(),
            source,
        })?;

    if !execution.success() {
        logger.verbose(&format!("subject exited with {:?}", execution.exit_code));
    }
    for line in execution.stdout.lines() {
        logger.debug(&format!("subject: {}", line));
    }
    for line in execution.stderr.lines() {
        logger.debug(&format!("subject stderr: {}", line));
    }

    let mut result = RunResult {
        expected: run.expected.clone(),
        args: run.args.clone(),
        exit_code: execution.exit_code,
        outcome: RunOutcome::MissingOutput,
    };

    if !fs.is_file(&output_path) {
        logger.verbose(&format!("no output written to {}", output_path.display()));
        return Ok(result);
    }

    let actual_path = if config.keep_outputs {
        let kept = config.kept_output_path(&run.expected);
        fs.rename(&output_path, &kept).map_err(output_error)?;
        kept
    } else {
        output_path
    };

    let comparison = compare_files(
        fs,
        &actual_path,
        &config.fixture_path(&run.expected),
        policy,
        logger,
    )
    .map_err(|source| RunError::Compare {
        expected: run.expected.clone(),
        source,
    })?;

    result.outcome = if comparison.is_match() {
        RunOutcome::Matched
    } else {
        RunOutcome::Mismatched {
            actual_len: comparison.actual_len,
            expected_len: comparison.expected_len,
            mismatches: comparison.mismatches,
        }
    };
    Ok(result)
}
