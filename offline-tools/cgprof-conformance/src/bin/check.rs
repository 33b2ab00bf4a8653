//! cgprof-check binary.
//!
//! Entry point for the `cgprof-check` command-line tool.

use std::process::ExitCode;

use cgprof_conformance::exit::{codes, exit_code};
use cgprof_conformance::{
    execute_compare, execute_list, execute_run, CaseReport, CaseStatus, Cli, Command,
    CommandError, CompareArgs, ListArgs, OutputFormat, ProcessExecutor, RunArgs, RunOutcome,
    SuiteConfig,
};
use cgprof_fs::RealFilesystem;
use cgprof_oracle::{ConsoleLogger, Verbosity};
use clap::Parser;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Compare(args) => run_compare(args),
        Command::Run(args) => run_run(args),
        Command::List(args) => run_list(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Run the compare command.
fn run_compare(args: CompareArgs) -> Result<u8, CommandError> {
    let logger = ConsoleLogger::stdout(Verbosity::from_count(args.verbose));
    if execute_compare(&args, &RealFilesystem, &logger)? {
        println!("match");
        Ok(codes::SUCCESS)
    } else {
        println!("mismatch");
        Ok(codes::MISMATCH)
    }
}

/// Run the run command.
fn run_run(args: RunArgs) -> Result<u8, CommandError> {
    let level = Verbosity::from_count(args.verbose);
    // Stdout carries only the report in JSON mode.
    let logger = match args.format {
        OutputFormat::Text => ConsoleLogger::stdout(level),
        OutputFormat::Json => ConsoleLogger::stderr(level),
    };
    let report = execute_run(&args, &RealFilesystem, &ProcessExecutor, &logger)?;

    match args.format {
        OutputFormat::Text => print_report(&report),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    if report.passed() {
        Ok(codes::SUCCESS)
    } else {
        Ok(codes::MISMATCH)
    }
}

/// Run the list command.
fn run_list(args: ListArgs) -> Result<u8, CommandError> {
    let suite = execute_list(&args, &RealFilesystem)?;
    print_suite(&suite);
    Ok(codes::SUCCESS)
}

fn print_report(report: &CaseReport) {
    if report.status == CaseStatus::CompilationFailed {
        println!("{}: compilation failed", report.case_id);
        return;
    }
    for run in &report.runs {
        let outcome = match &run.outcome {
            RunOutcome::Matched => "ok".to_string(),
            RunOutcome::MissingOutput => "no output".to_string(),
            RunOutcome::Mismatched {
                actual_len,
                expected_len,
                mismatches,
            } => format!(
                "mismatch ({} pair(s), {} actual, {} expected)",
                mismatches.len(),
                actual_len,
                expected_len
            ),
        };
        println!("{} [{}]: {}", run.expected, run.args.join(" "), outcome);
    }
    let verdict = if report.passed() { "pass" } else { "fail" };
    println!("{}: {}", report.case_id, verdict);
}

fn print_suite(suite: &SuiteConfig) {
    for (case, runs) in &suite.cases {
        for run in runs {
            if run.args.is_empty() {
                println!("{}\t{}", case, run.expected);
            } else {
                println!("{}\t{}\t{}", case, run.expected, run.args.join(" "));
            }
        }
    }
}
