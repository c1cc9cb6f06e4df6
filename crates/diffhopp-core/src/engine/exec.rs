//! Invocation of external tools with captured output, wall-clock timeouts,
//! and `PATH` lookups.
//!
//! Every external program the pipeline touches goes through [`ToolCommand`]:
//! the sampler, the trainer, the docking engines, and the preparation
//! utilities. Commands are built as plain argument vectors first, so the
//! exact invocation can be logged and asserted on without spawning anything.

use std::env;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// Synthetic exit code reported for timed-out tools, matching the convention
/// of coreutils `timeout`.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{program}' exited with status {code}: {stderr_excerpt}")]
    Failed {
        program: String,
        code: i32,
        stderr_excerpt: String,
    },
    #[error("'{program}' timed out after {limit_secs} s")]
    TimedOut { program: String, limit_secs: u64 },
    #[error("I/O error while running '{program}': {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// How an external tool finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolStatus {
    /// The tool exited on its own; signal terminations are reported as -1.
    Exited(i32),
    /// The tool was killed after exceeding its wall-clock limit.
    TimedOut { limit_secs: u64 },
}

impl ToolStatus {
    /// Returns `true` for a clean zero exit.
    pub fn success(&self) -> bool {
        matches!(self, ToolStatus::Exited(0))
    }

    /// The exit code, with timeouts mapped to [`TIMEOUT_EXIT_CODE`].
    pub fn code(&self) -> i32 {
        match self {
            ToolStatus::Exited(code) => *code,
            ToolStatus::TimedOut { .. } => TIMEOUT_EXIT_CODE,
        }
    }
}

/// Captured result of a completed (or killed) tool invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub status: ToolStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Returns `true` for a clean zero exit.
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Converts a failed or timed-out invocation into an [`ExecError`].
    pub fn require_success(&self, program: &str) -> Result<(), ExecError> {
        match self.status {
            ToolStatus::Exited(0) => Ok(()),
            ToolStatus::Exited(code) => Err(ExecError::Failed {
                program: program.to_string(),
                code,
                stderr_excerpt: excerpt(&self.stderr),
            }),
            ToolStatus::TimedOut { limit_secs } => Err(ExecError::TimedOut {
                program: program.to_string(),
                limit_secs,
            }),
        }
    }
}

/// An external command assembled as a plain argument vector.
///
/// The vector form keeps invocations inspectable: workflows log
/// [`ToolCommand::rendered`] before spawning, and the command builders are
/// unit-tested against the exact argument strings they forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn arg_path(mut self, path: impl AsRef<Path>) -> Self {
        self.args
            .push(path.as_ref().to_string_lossy().into_owned());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Renders the invocation as a single shell-style line for logs and
    /// golden tests. Arguments containing whitespace are single-quoted.
    pub fn rendered(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(quote(&self.program));
        parts.extend(self.args.iter().map(|a| quote(a)));
        parts.join(" ")
    }

    fn command(&self) -> std::process::Command {
        let mut command = std::process::Command::new(&self.program);
        command.args(&self.args);
        if let Some(cwd) = &self.cwd {
            command.current_dir(cwd);
        }
        command
    }

    /// Runs the tool to completion, capturing stdout and stderr.
    pub fn run(&self) -> Result<ToolOutput, ExecError> {
        debug!(command = %self.rendered(), "running external tool");
        let output = self
            .command()
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ExecError::Launch {
                program: self.program.clone(),
                source,
            })?;
        Ok(ToolOutput {
            status: ToolStatus::Exited(exit_code(output.status)),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Runs the tool with a wall-clock limit, killing it once the limit
    /// passes.
    ///
    /// A timeout is part of the regular [`ToolOutput`] rather than an error;
    /// some callers (the environment doctor, in particular) treat it as an
    /// expected outcome.
    pub fn run_with_timeout(&self, limit: Duration) -> Result<ToolOutput, ExecError> {
        debug!(command = %self.rendered(), limit_secs = limit.as_secs(), "running external tool");
        let mut child = self
            .command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ExecError::Launch {
                program: self.program.clone(),
                source,
            })?;

        // Drain the pipes on background threads so a chatty child cannot
        // deadlock against a full pipe buffer while we poll for exit.
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let stdout_reader = std::thread::spawn(move || drain(stdout));
        let stderr_reader = std::thread::spawn(move || drain(stderr));

        let started = Instant::now();
        let status = loop {
            let polled = child.try_wait().map_err(|source| ExecError::Io {
                program: self.program.clone(),
                source,
            })?;
            match polled {
                Some(status) => break ToolStatus::Exited(exit_code(status)),
                None if started.elapsed() >= limit => {
                    let _ = child.kill();
                    let _ = child.wait();
                    break ToolStatus::TimedOut {
                        limit_secs: limit.as_secs(),
                    };
                }
                None => std::thread::sleep(POLL_INTERVAL),
            }
        };

        Ok(ToolOutput {
            status,
            stdout: stdout_reader.join().unwrap_or_default(),
            stderr: stderr_reader.join().unwrap_or_default(),
        })
    }

    /// Runs the tool with stdio inherited from the current process, so its
    /// own progress output reaches the terminal; used for the long-running
    /// training and sampling passthroughs.
    pub fn stream(&self) -> Result<i32, ExecError> {
        debug!(command = %self.rendered(), "streaming external tool");
        let status = self
            .command()
            .status()
            .map_err(|source| ExecError::Launch {
                program: self.program.clone(),
                source,
            })?;
        Ok(exit_code(status))
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

fn drain<R: Read>(stream: Option<R>) -> String {
    let mut buf = Vec::new();
    if let Some(mut stream) = stream {
        let _ = stream.read_to_end(&mut buf);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn quote(value: &str) -> String {
    if value.is_empty() || value.contains(char::is_whitespace) {
        format!("'{value}'")
    } else {
        value.to_string()
    }
}

fn excerpt(stderr: &str) -> String {
    let mut lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return "(no stderr output)".to_string();
    }
    let keep = lines.split_off(lines.len().saturating_sub(3));
    let mut text = keep.join(" | ");
    if text.len() > 500 {
        let cut = text
            .char_indices()
            .take_while(|(i, _)| *i < 500)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        text.truncate(cut);
        text.push_str("...");
    }
    text
}

/// Locates `program` the way a shell would: names containing a path
/// separator are checked directly, bare names are searched on `PATH`.
///
/// Only existence is checked, not the executable bit; a hit that later fails
/// to spawn surfaces as [`ExecError::Launch`].
pub fn find_in_path(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|path| path.is_file())
}

/// Returns `true` if [`find_in_path`] can locate `program`.
pub fn tool_available(program: &str) -> bool {
    find_in_path(program).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn builder_collects_program_and_arguments() {
        let command = ToolCommand::new("gnina")
            .arg("-r")
            .arg_path("/tmp/protein.pdbqt")
            .args(["--exhaustiveness", "8"]);
        assert_eq!(command.program, "gnina");
        assert_eq!(
            command.args,
            vec!["-r", "/tmp/protein.pdbqt", "--exhaustiveness", "8"]
        );
        assert_eq!(
            command.rendered(),
            "gnina -r /tmp/protein.pdbqt --exhaustiveness 8"
        );
    }

    #[test]
    fn rendering_quotes_whitespace_and_empty_arguments() {
        let command = ToolCommand::new("obabel")
            .arg("input file.pdb")
            .arg("");
        assert_eq!(command.rendered(), "obabel 'input file.pdb' ''");
    }

    #[test]
    fn captures_stdout_of_a_successful_run() {
        let output = ToolCommand::new("/bin/sh")
            .arg("-c")
            .arg("printf hello")
            .run()
            .unwrap();
        assert!(output.success());
        assert_eq!(output.stdout, "hello");
        assert!(output.require_success("sh").is_ok());
    }

    #[test]
    fn nonzero_exit_becomes_a_failed_error() {
        let output = ToolCommand::new("/bin/sh")
            .arg("-c")
            .arg("echo boom >&2; exit 3")
            .run()
            .unwrap();
        assert_eq!(output.status, ToolStatus::Exited(3));
        let err = output.require_success("sh").unwrap_err();
        match err {
            ExecError::Failed {
                code,
                stderr_excerpt,
                ..
            } => {
                assert_eq!(code, 3);
                assert!(stderr_excerpt.contains("boom"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_binaries_fail_to_launch() {
        let err = ToolCommand::new("/definitely/not/a/tool").run().unwrap_err();
        assert!(matches!(err, ExecError::Launch { .. }));
    }

    #[test]
    fn slow_tools_are_killed_at_the_limit() {
        let output = ToolCommand::new("/bin/sh")
            .arg("-c")
            .arg("sleep 5")
            .run_with_timeout(Duration::from_millis(100))
            .unwrap();
        assert_eq!(output.status, ToolStatus::TimedOut { limit_secs: 0 });
        assert_eq!(output.status.code(), TIMEOUT_EXIT_CODE);
        assert!(matches!(
            output.require_success("sh").unwrap_err(),
            ExecError::TimedOut { .. }
        ));
    }

    #[test]
    fn fast_tools_finish_under_the_limit() {
        let output = ToolCommand::new("/bin/sh")
            .arg("-c")
            .arg("printf done")
            .run_with_timeout(Duration::from_secs(10))
            .unwrap();
        assert!(output.success());
        assert_eq!(output.stdout, "done");
    }

    #[test]
    fn stderr_excerpt_keeps_the_last_lines() {
        assert_eq!(excerpt(""), "(no stderr output)");
        let text = excerpt("one\ntwo\nthree\nfour\n");
        assert_eq!(text, "two | three | four");
    }

    #[test]
    #[serial]
    fn find_in_path_scans_the_path_variable() {
        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("autodock_gpu_64wi");
        std::fs::write(&tool, "#!/bin/sh\n").unwrap();

        let original = env::var_os("PATH");
        unsafe { env::set_var("PATH", dir.path()) };
        let found = find_in_path("autodock_gpu_64wi");
        let missing = find_in_path("some_other_tool");
        match original {
            Some(value) => unsafe { env::set_var("PATH", value) },
            None => unsafe { env::remove_var("PATH") },
        }

        assert_eq!(found, Some(tool));
        assert!(missing.is_none());
    }

    #[test]
    fn explicit_paths_bypass_the_path_scan() {
        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("qvina2.1");
        std::fs::write(&tool, "").unwrap();

        assert_eq!(find_in_path(tool.to_str().unwrap()), Some(tool.clone()));
        assert!(find_in_path("/missing/qvina2.1").is_none());
        assert!(tool_available(tool.to_str().unwrap()));
    }
}
