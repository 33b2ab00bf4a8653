//! Call-profile oracle.
//!
//! Decides whether the call-profile records emitted by an instrumented
//! program match a hand-authored fixture:
//!
//! 1. `parser` reads a record file into a canonical, sorted collection
//! 2. `comparator` pairs both collections and compares each pair, ignoring
//!    directory prefixes on the call-site file
//! 3. On a mismatch, both collections are dumped through a `Logger`

pub mod comparator;
pub mod logger;
pub mod parser;

pub use comparator::{
    compare, compare_collections, compare_files, compare_with, CompareError, Comparison,
    LengthPolicy, RecordMismatch,
};
pub use logger::{ConsoleLogger, LogEntry, Logger, MockLogger, NullLogger, Stream, Verbosity};
pub use parser::{
    parse_file, parse_file_with, parse_records, parse_records_with, ParseError, RecordCollection,
};
