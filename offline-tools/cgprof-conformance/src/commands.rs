//! Command orchestration for CLI subcommands.
//!
//! Provides execute functions for:
//! - `compare` - Compare one record file against one fixture
//! - `run` - Exercise a test program against its fixtures
//! - `list` - Load the suite table

use std::path::{Path, PathBuf};

use cgprof_fs::{Filesystem, FsError};
use cgprof_oracle::{compare_with, CompareError, Logger};
use thiserror::Error;

use crate::cli::{CliError, CompareArgs, ListArgs, RunArgs};
use crate::executor::Executor;
use crate::runner::{run_case, RunError, RunnerConfig};
use crate::suite::{SuiteConfig, SuiteError};
use crate::types::CaseReport;

/// Errors from command execution.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] CliError),

    #[error("{0}")]
    Compare(#[from] CompareError),

    #[error("{0}")]
    Run(#[from] RunError),

    #[error("suite error: {0}")]
    Suite(#[from] SuiteError),

    #[error("failed to write report: {0}")]
    Report(#[from] FsError),

    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to resolve working directory: {0}")]
    CurrentDir(#[source] std::io::Error),
}

/// Result of command execution.
pub type CommandResult<T> = Result<T, CommandError>;

/// Compare two record files. Returns the verdict.
pub fn execute_compare<F, L>(args: &CompareArgs, fs: &F, logger: &L) -> CommandResult<bool>
where
    F: Filesystem,
    L: Logger + ?Sized,
{
    let matched = compare_with(fs, &args.actual, &args.expected, args.policy(), logger)?;
    Ok(matched)
}

/// Exercise one test program and optionally write its JSON report.
pub fn execute_run<F, E, L>(
    args: &RunArgs,
    fs: &F,
    executor: &E,
    logger: &L,
) -> CommandResult<CaseReport>
where
    F: Filesystem,
    E: Executor,
    L: Logger + ?Sized,
{
    args.validate()?;
    if !fs.exists(&args.fixtures) {
        return Err(CliError::FixtureDirNotFound(args.fixtures.clone()).into());
    }
    if !fs.exists(&args.workdir) {
        return Err(CliError::WorkdirNotFound(args.workdir.clone()).into());
    }

    let suite = load_suite(fs, args.suite.as_deref())?;

    // The subject runs in `workdir`, so a relative binary path would be
    // resolved against the wrong directory.
    let binary = absolute(&args.binary)?;

    let config = RunnerConfig::new(binary, &args.test_file, args.fixtures.clone())
        .with_workdir(args.workdir.clone())
        .with_output_file(&args.output_file)
        .with_fixture_extension(&args.fixture_extension)
        .with_policy(args.policy())
        .with_keep_outputs(args.keep_outputs);

    let report = run_case(fs, executor, &config, &suite, logger)?;

    if let Some(path) = &args.report {
        fs.write_atomic(path, report.to_json()?.as_bytes())?;
        logger.verbose(&format!("report written to {}", path.display()));
    }

    Ok(report)
}

/// Load the suite table named by `list`.
pub fn execute_list<F: Filesystem>(args: &ListArgs, fs: &F) -> CommandResult<SuiteConfig> {
    load_suite(fs, args.suite.as_deref())
}

fn load_suite<F: Filesystem>(fs: &F, path: Option<&Path>) -> CommandResult<SuiteConfig> {
    let suite = match path {
        Some(path) => SuiteConfig::load(fs, path)?,
        None => SuiteConfig::builtin()?,
    };
    Ok(suite)
}

fn absolute(path: &Path) -> CommandResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(CommandError::CurrentDir)?;
    Ok(cwd.join(path))
}
