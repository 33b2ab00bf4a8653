//! CLI argument parsing for cgprof-check.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use cgprof_oracle::LengthPolicy;
use thiserror::Error;

use crate::runner::{DEFAULT_FIXTURE_EXTENSION, DEFAULT_OUTPUT_FILE};

/// Errors from CLI argument validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error("output-file must be a file name, got {0:?}")]
    InvalidOutputFile(String),

    #[error("fixture-ext must not be empty")]
    EmptyFixtureExtension,

    #[error("fixture directory does not exist: {0}")]
    FixtureDirNotFound(PathBuf),

    #[error("working directory does not exist: {0}")]
    WorkdirNotFound(PathBuf),
}

/// Check call-graph profiler output against expected fixtures.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "cgprof-check")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Compare one record file against one fixture.
    Compare(CompareArgs),
    /// Run a test program for each configured run and compare its output.
    Run(RunArgs),
    /// Print the suite table.
    List(ListArgs),
}

/// Output format for run results.
#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON case report
    Json,
}

/// Arguments for the compare command.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct CompareArgs {
    /// Record file produced by the profiled program.
    #[arg(long)]
    pub actual: PathBuf,

    /// Expected fixture.
    #[arg(long)]
    pub expected: PathBuf,

    /// Fail when the files hold different numbers of records.
    #[arg(long, default_value_t = false)]
    pub exact_length: bool,

    /// Increase verbosity (-v for mismatch details, -vv for skipped rows)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

impl CompareArgs {
    pub fn policy(&self) -> LengthPolicy {
        policy(self.exact_length)
    }
}

/// Arguments for the run command.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct RunArgs {
    /// Instrumented test binary.
    #[arg(long)]
    pub binary: PathBuf,

    /// Test program source file; its file name selects the runs.
    #[arg(long = "test")]
    pub test_file: String,

    /// Directory holding the expected fixtures.
    #[arg(long)]
    pub fixtures: PathBuf,

    /// Directory the binary runs in and writes its output to.
    #[arg(long, default_value = ".")]
    pub workdir: PathBuf,

    /// Suite table (JSON); the built-in table is used if omitted.
    #[arg(long)]
    pub suite: Option<PathBuf>,

    /// Name of the file the profiler runtime writes.
    #[arg(long, default_value = DEFAULT_OUTPUT_FILE)]
    pub output_file: String,

    /// Extension of fixture files.
    #[arg(long = "fixture-ext", default_value = DEFAULT_FIXTURE_EXTENSION)]
    pub fixture_extension: String,

    /// Fail when output and fixture hold different numbers of records.
    #[arg(long, default_value_t = false)]
    pub exact_length: bool,

    /// Keep each run's output as <expected>.actual.<ext> in the working directory.
    #[arg(long, default_value_t = false)]
    pub keep_outputs: bool,

    /// Write the case report as JSON to this path.
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Increase verbosity (-v for progress, -vv for subject output)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

impl RunArgs {
    /// Validate the arguments.
    pub fn validate(&self) -> Result<(), CliError> {
        if self.output_file.is_empty() || self.output_file.contains(['/', '\\']) {
            return Err(CliError::InvalidOutputFile(self.output_file.clone()));
        }
        if self.fixture_extension.is_empty() {
            return Err(CliError::EmptyFixtureExtension);
        }
        Ok(())
    }

    pub fn policy(&self) -> LengthPolicy {
        policy(self.exact_length)
    }
}

/// Arguments for the list command.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ListArgs {
    /// Suite table (JSON); the built-in table is used if omitted.
    #[arg(long)]
    pub suite: Option<PathBuf>,
}

fn policy(exact_length: bool) -> LengthPolicy {
    if exact_length {
        LengthPolicy::Exact
    } else {
        LengthPolicy::Truncate
    }
}

/// Parse arguments from an iterator (for testing).
pub fn parse_from<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(extra: &[&str]) -> RunArgs {
        let mut argv = vec![
            "cgprof-check",
            "run",
            "--binary",
            "./build/01-internal-call-once",
            "--test",
            "test/c/01-internal-call-once.c",
            "--fixtures",
            "test/expected",
        ];
        argv.extend_from_slice(extra);
        match parse_from(argv).unwrap().command {
            Command::Run(args) => args,
            other => panic!("expected run, got {:?}", other),
        }
    }

    // ===========================================
    // Category L1: compare
    // ===========================================

    #[test]
    fn test_parse_compare() {
        let cli = parse_from([
            "cgprof-check",
            "compare",
            "--actual",
            "profile-results.csv",
            "--expected",
            "expect01.csv",
            "-vv",
        ])
        .unwrap();

        match cli.command {
            Command::Compare(args) => {
                assert_eq!(args.actual, PathBuf::from("profile-results.csv"));
                assert_eq!(args.expected, PathBuf::from("expect01.csv"));
                assert_eq!(args.verbose, 2);
                assert_eq!(args.policy(), LengthPolicy::Truncate);
            }
            other => panic!("expected compare, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_compare_exact_length() {
        let cli = parse_from([
            "cgprof-check",
            "compare",
            "--actual",
            "a.csv",
            "--expected",
            "b.csv",
            "--exact-length",
        ])
        .unwrap();
        match cli.command {
            Command::Compare(args) => assert_eq!(args.policy(), LengthPolicy::Exact),
            other => panic!("expected compare, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_compare_requires_both_paths() {
        assert!(parse_from(["cgprof-check", "compare", "--actual", "a.csv"]).is_err());
    }

    // ===========================================
    // Category L2: run
    // ===========================================

    #[test]
    fn test_parse_run_defaults() {
        let args = run_args(&[]);
        assert_eq!(args.workdir, PathBuf::from("."));
        assert_eq!(args.output_file, "profile-results.csv");
        assert_eq!(args.fixture_extension, "csv");
        assert_eq!(args.suite, None);
        assert_eq!(args.format, OutputFormat::Text);
        assert!(!args.keep_outputs);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_parse_run_all_options() {
        let args = run_args(&[
            "--workdir",
            "/tmp/run",
            "--suite",
            "suite.json",
            "--output-file",
            "out.csv",
            "--fixture-ext",
            "txt",
            "--exact-length",
            "--keep-outputs",
            "--report",
            "report.json",
            "--format",
            "json",
            "-v",
        ]);
        assert_eq!(args.workdir, PathBuf::from("/tmp/run"));
        assert_eq!(args.suite, Some(PathBuf::from("suite.json")));
        assert_eq!(args.output_file, "out.csv");
        assert_eq!(args.fixture_extension, "txt");
        assert_eq!(args.policy(), LengthPolicy::Exact);
        assert!(args.keep_outputs);
        assert_eq!(args.report, Some(PathBuf::from("report.json")));
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.verbose, 1);
    }

    #[test]
    fn test_validate_output_file_with_separator() {
        let args = run_args(&["--output-file", "out/profile.csv"]);
        assert_eq!(
            args.validate(),
            Err(CliError::InvalidOutputFile("out/profile.csv".to_string()))
        );
    }

    #[test]
    fn test_validate_empty_fixture_extension() {
        let args = run_args(&["--fixture-ext", ""]);
        assert_eq!(args.validate(), Err(CliError::EmptyFixtureExtension));
    }

    #[test]
    fn test_parse_run_requires_binary() {
        assert!(parse_from(["cgprof-check", "run", "--test", "a.c", "--fixtures", "f"]).is_err());
    }

    // ===========================================
    // Category L3: list
    // ===========================================

    #[test]
    fn test_parse_list() {
        let cli = parse_from(["cgprof-check", "list"]).unwrap();
        assert_eq!(cli.command, Command::List(ListArgs { suite: None }));
    }
}
