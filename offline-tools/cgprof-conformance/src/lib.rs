//! Call-profile conformance driver.
//!
//! Exercises the profiler's instrumented test programs and checks each
//! run's record file against a hand-authored fixture.
//!
//! # Overview
//!
//! 1. `suite` maps each test program to its runs (arguments + fixture name)
//! 2. `runner` executes the subject once per run and compares its output
//!    with `cgprof_oracle`
//! 3. `commands` and `cli` expose this as the `cgprof-check` binary
//!
//! # Fixtures
//!
//! Fixtures live in one directory, named `<expected>.<ext>` (`expect07arg.csv`).
//! Each holds one record per line, `caller,sourceFile,line,callee,count`.

pub mod cli;
pub mod commands;
pub mod executor;
pub mod exit;
pub mod runner;
pub mod suite;
pub mod types;

pub use cli::{Cli, CliError, Command, CompareArgs, ListArgs, OutputFormat, RunArgs};
pub use commands::{execute_compare, execute_list, execute_run, CommandError, CommandResult};
pub use executor::{ExecuteError, Execution, Executor, MockExecutor, ProcessExecutor};
pub use runner::{run_case, RunError, RunnerConfig, DEFAULT_FIXTURE_EXTENSION, DEFAULT_OUTPUT_FILE};
pub use suite::{case_id, CaseRun, SuiteConfig, SuiteError};
pub use types::{CaseReport, CaseStatus, RunOutcome, RunResult};
