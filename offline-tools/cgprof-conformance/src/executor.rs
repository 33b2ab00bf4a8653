//! Subject binary execution.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::{Arc, RwLock};

use cgprof_fs::{Filesystem, MockFilesystem};

/// Errors from launching the subject binary.
#[derive(Debug, thiserror::Error)]
pub enum ExecuteError {
    #[error("failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to stage output for {program}: {reason}")]
    Stage { program: String, reason: String },
}

/// What the subject did when it ran.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Execution {
    /// Exit code, `None` if terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl Execution {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Trait for running the subject binary.
/// Abstracted for testing without spawning processes.
pub trait Executor: Send + Sync {
    /// Run `program` with `args` in `workdir` and wait for it to exit.
    fn execute(&self, program: &Path, args: &[String], workdir: &Path)
        -> Result<Execution, ExecuteError>;
}

/// Runs the subject as a child process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExecutor;

impl Executor for ProcessExecutor {
    fn execute(
        &self,
        program: &Path,
        args: &[String],
        workdir: &Path,
    ) -> Result<Execution, ExecuteError> {
        let output = Command::new(program)
            .args(args)
            .current_dir(workdir)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ExecuteError::Spawn {
                program: program.display().to_string(),
                source,
            })?;

        Ok(Execution {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// A recorded call to `MockExecutor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub workdir: PathBuf,
}

/// Executor for tests: writes canned output into a `MockFilesystem`.
///
/// Each entry maps an argument list to the record file content the subject
/// would produce. Argument lists without an entry produce no output file.
#[derive(Debug, Clone)]
pub struct MockExecutor {
    fs: MockFilesystem,
    output_file: String,
    outputs: Arc<RwLock<Vec<(Vec<String>, String)>>>,
    calls: Arc<RwLock<Vec<RecordedCall>>>,
    exit_code: Option<i32>,
    stdout: String,
    stderr: String,
}

impl MockExecutor {
    pub fn new(fs: MockFilesystem, output_file: &str) -> Self {
        Self {
            fs,
            output_file: output_file.to_string(),
            outputs: Arc::new(RwLock::new(Vec::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
            exit_code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    /// Produce `content` when invoked with `args`.
    pub fn with_output(self, args: &[&str], content: &str) -> Self {
        self.outputs.write().unwrap().push((
            args.iter().map(|a| a.to_string()).collect(),
            content.to_string(),
        ));
        self
    }

    pub fn with_exit_code(mut self, code: Option<i32>) -> Self {
        self.exit_code = code;
        self
    }

    /// Streams reported for every call.
    pub fn with_stdout(mut self, stdout: &str) -> Self {
        self.stdout = stdout.to_string();
        self
    }

    pub fn with_stderr(mut self, stderr: &str) -> Self {
        self.stderr = stderr.to_string();
        self
    }

    /// Calls received so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().unwrap().clone()
    }
}

impl Executor for MockExecutor {
    fn execute(
        &self,
        program: &Path,
        args: &[String],
        workdir: &Path,
    ) -> Result<Execution, ExecuteError> {
        self.calls.write().unwrap().push(RecordedCall {
            program: program.to_path_buf(),
            args: args.to_vec(),
            workdir: workdir.to_path_buf(),
        });

        let outputs = self.outputs.read().unwrap();
        if let Some((_, content)) = outputs.iter().find(|(a, _)| a.as_slice() == args) {
            self.fs
                .write_atomic(&workdir.join(&self.output_file), content.as_bytes())
                .map_err(|e| ExecuteError::Stage {
                    program: program.display().to_string(),
                    reason: e.to_string(),
                })?;
        }

        Ok(Execution {
            exit_code: self.exit_code,
            stdout: self.stdout.clone(),
            stderr: self.stderr.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_executor_writes_output() {
        let fs = MockFilesystem::new();
        let executor = MockExecutor::new(fs.clone(), "profile-results.csv")
            .with_output(&["a"], "main,foo.c,10,bar,1\n");

        let execution = executor
            .execute(Path::new("/bin/subject"), &["a".to_string()], Path::new("/work"))
            .unwrap();

        assert!(execution.success());
        assert_eq!(
            fs.get_file(Path::new("/work/profile-results.csv")),
            Some(b"main,foo.c,10,bar,1\n".to_vec())
        );
        assert_eq!(executor.calls()[0].args, vec!["a".to_string()]);
    }

    #[test]
    fn test_mock_executor_unknown_args_writes_nothing() {
        let fs = MockFilesystem::new();
        let executor = MockExecutor::new(fs.clone(), "profile-results.csv").with_exit_code(Some(139));

        let execution = executor
            .execute(Path::new("/bin/subject"), &[], Path::new("/work"))
            .unwrap();

        assert!(!execution.success());
        assert!(fs.files().is_empty());
    }

    #[test]
    fn test_process_executor_missing_program() {
        let temp = tempfile::TempDir::new().unwrap();
        let err = ProcessExecutor
            .execute(&temp.path().join("no-such-binary"), &[], temp.path())
            .unwrap_err();
        assert!(matches!(err, ExecuteError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_process_executor_runs_in_workdir() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::TempDir::new().unwrap();
        let script = temp.path().join("subject.sh");
        std::fs::write(&script, "#!/bin/sh\necho \"$#\"\necho oops >&2\nprintf 'x' > out.txt\nexit 3\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let args = vec!["2".to_string(), "3".to_string()];
        let execution = ProcessExecutor.execute(&script, &args, temp.path()).unwrap();

        assert_eq!(execution.exit_code, Some(3));
        assert_eq!(execution.stdout.trim(), "2");
        assert_eq!(execution.stderr.trim(), "oops");
        assert!(temp.path().join("out.txt").exists());
    }
}
