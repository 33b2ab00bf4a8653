//! Exit codes for cgprof-check.

use cgprof_oracle::{CompareError, ParseError};

use crate::commands::CommandError;
use crate::runner::RunError;

/// Exit code constants.
pub mod codes {
    /// Every compared pair matched.
    pub const SUCCESS: u8 = 0;
    /// At least one record pair, run, or case failed.
    pub const MISMATCH: u8 = 1;
    /// Invalid arguments or a missing input file.
    pub const INPUT_NOT_FOUND: u8 = 2;
    /// A well-formed row had a non-integer line or count.
    pub const MALFORMED_RECORD: u8 = 3;
    /// The suite table could not be loaded or has no entry for the case.
    pub const CONFIG_ERROR: u8 = 4;
    /// The subject binary could not be executed.
    pub const EXECUTION_ERROR: u8 = 5;
    /// IO error.
    pub const IO_ERROR: u8 = 6;
}

/// Map a CommandError to an exit code.
pub fn exit_code(error: &CommandError) -> u8 {
    match error {
        CommandError::InvalidArgument(_) => codes::INPUT_NOT_FOUND,
        CommandError::Compare(e) => compare_exit_code(e),
        CommandError::Run(RunError::UnknownTestCase(_)) => codes::CONFIG_ERROR,
        CommandError::Run(RunError::Execute { .. }) => codes::EXECUTION_ERROR,
        CommandError::Run(RunError::Compare { source, .. }) => compare_exit_code(source),
        CommandError::Run(RunError::Output { .. }) => codes::IO_ERROR,
        CommandError::Suite(_) => codes::CONFIG_ERROR,
        CommandError::Report(_) | CommandError::Json(_) | CommandError::CurrentDir(_) => {
            codes::IO_ERROR
        }
    }
}

fn compare_exit_code(error: &CompareError) -> u8 {
    match error.parse_error() {
        ParseError::MissingInputFile(_) => codes::INPUT_NOT_FOUND,
        ParseError::MalformedNumericField { .. } => codes::MALFORMED_RECORD,
        ParseError::Read { .. } => codes::IO_ERROR,
    }
}
