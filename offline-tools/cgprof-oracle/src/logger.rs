//! Logging abstraction for diagnostics.
//!
//! The comparator writes its mismatch dump through a `Logger` rather than
//! straight to stdout, so the dump can be captured in tests and routed by
//! the binary according to `-v` flags.

use std::io::Write;
use std::sync::{Arc, RwLock};

/// Verbosity level for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Normal output (always shown)
    Normal,
    /// Verbose output (-v flag)
    Verbose,
    /// Debug output (-vv flag)
    Debug,
}

impl Verbosity {
    /// Create verbosity from CLI flag count.
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    }
}

/// Trait for logging output.
pub trait Logger: Send + Sync {
    /// Log a message at the given verbosity level.
    fn log(&self, level: Verbosity, message: &str);

    /// Log at normal level (always visible).
    fn info(&self, message: &str) {
        self.log(Verbosity::Normal, message);
    }

    /// Log at verbose level (requires -v).
    fn verbose(&self, message: &str) {
        self.log(Verbosity::Verbose, message);
    }

    /// Log at debug level (requires -vv).
    fn debug(&self, message: &str) {
        self.log(Verbosity::Debug, message);
    }
}

impl<L: Logger + ?Sized> Logger for &L {
    fn log(&self, level: Verbosity, message: &str) {
        (**self).log(level, message);
    }
}

/// Output stream of a `ConsoleLogger`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Logger that writes to stdout or stderr.
#[derive(Debug)]
pub struct ConsoleLogger {
    level: Verbosity,
    stream: Stream,
}

impl ConsoleLogger {
    pub fn new(level: Verbosity, stream: Stream) -> Self {
        Self { level, stream }
    }

    /// Logger on stdout, where mismatch dumps are expected by drivers.
    pub fn stdout(level: Verbosity) -> Self {
        Self::new(level, Stream::Stdout)
    }

    pub fn stderr(level: Verbosity) -> Self {
        Self::new(level, Stream::Stderr)
    }

    pub fn level(&self) -> Verbosity {
        self.level
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, level: Verbosity, message: &str) {
        if level > self.level {
            return;
        }
        let _ = match self.stream {
            Stream::Stdout => writeln!(std::io::stdout(), "{}", message),
            Stream::Stderr => writeln!(std::io::stderr(), "{}", message),
        };
    }
}

/// A captured log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: Verbosity,
    pub message: String,
}

/// Mock logger for testing that captures all messages.
#[derive(Debug, Clone, Default)]
pub struct MockLogger {
    messages: Arc<RwLock<Vec<LogEntry>>>,
}

impl MockLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all captured log entries.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.messages.read().unwrap().clone()
    }

    /// Get all captured messages (just the text).
    pub fn messages(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.message).collect()
    }

    /// Get messages at a specific level.
    pub fn messages_at_level(&self, level: Verbosity) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.level == level)
            .map(|e| e.message)
            .collect()
    }

    /// Check if any message contains the given substring.
    pub fn contains(&self, substring: &str) -> bool {
        self.messages().iter().any(|m| m.contains(substring))
    }

    pub fn count(&self) -> usize {
        self.messages.read().unwrap().len()
    }
}

impl Logger for MockLogger {
    fn log(&self, level: Verbosity, message: &str) {
        // Captured regardless of level so tests can see debug output
        self.messages.write().unwrap().push(LogEntry {
            level,
            message: message.to_string(),
        });
    }
}

/// A no-op logger that discards all messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: Verbosity, _message: &str) {}
}
