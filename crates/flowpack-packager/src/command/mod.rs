//! External command execution with concurrent stream draining.
//!
//! [`ProcessRunner`] spawns a child with both output streams piped and drains
//! each on its own scoped thread, so a chatty build can never stall on a full
//! pipe buffer. The drain threads log through the caller's subscriber. The
//! call returns only after both drains have finished and the process has
//! exited.

use std::ffi::{OsStr, OsString};
use std::io::{BufRead, BufReader, Read};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread;

use tracing::{Dispatch, debug, dispatcher, info};

use crate::error::PackError;

/// Tracing target for external command execution.
const COMMAND_TARGET: &str = "flowpack::command";

/// Captured result of an external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    status: Option<i32>,
    stdout: Vec<String>,
    stderr: Vec<String>,
}

impl CommandOutput {
    /// Creates an output record.
    #[must_use]
    pub const fn new(status: Option<i32>, stdout: Vec<String>, stderr: Vec<String>) -> Self {
        Self {
            status,
            stdout,
            stderr,
        }
    }

    /// Exit code, or `None` when the process was terminated by a signal.
    #[must_use]
    pub const fn status(&self) -> Option<i32> {
        self.status
    }

    /// Returns `true` when the process exited with code zero.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.status, Some(0))
    }

    /// Captured standard output lines.
    #[must_use]
    pub fn stdout(&self) -> &[String] {
        &self.stdout
    }

    /// Captured standard error lines.
    #[must_use]
    pub fn stderr(&self) -> &[String] {
        &self.stderr
    }

    /// Diagnostic text for failure reports: standard error, or standard
    /// output when nothing was written to standard error.
    #[must_use]
    pub fn diagnostics(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.join("\n")
        } else {
            self.stderr.join("\n")
        }
    }
}

/// Runs external commands to completion.
pub trait CommandRunner {
    /// Runs `program` with `args` and captures its output.
    ///
    /// A non-zero exit is reported through [`CommandOutput::status`], not as
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::Spawn`] when the process cannot be started and
    /// [`PackError::CollectOutput`] when its output cannot be read.
    fn run(&self, program: &OsStr, args: &[OsString]) -> Result<CommandOutput, PackError>;
}

/// Runs commands as child processes of the packager.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner {
    echo: bool,
}

impl ProcessRunner {
    /// Creates a runner; `echo` logs every captured line as it arrives.
    #[must_use]
    pub const fn new(echo: bool) -> Self {
        Self { echo }
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &OsStr, args: &[OsString]) -> Result<CommandOutput, PackError> {
        let program_name = program.to_string_lossy().into_owned();
        debug!(
            target: COMMAND_TARGET,
            program = %program_name,
            args = ?args,
            "spawning command"
        );

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|error| PackError::Spawn {
                program: program_name.clone(),
                source: Arc::new(error),
            })?;

        let collect_error = |message: &str| PackError::CollectOutput {
            program: program_name.clone(),
            message: message.to_owned(),
        };
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| collect_error("stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| collect_error("stderr was not captured"))?;

        let echo = self.echo;
        let stdout_dispatch = dispatcher::get_default(Dispatch::clone);
        let stderr_dispatch = stdout_dispatch.clone();
        let (stdout_drained, stderr_drained, waited) = thread::scope(|scope| {
            let stdout_drain = scope.spawn(move || {
                dispatcher::with_default(&stdout_dispatch, || drain(stdout, Stream::Stdout, echo))
            });
            let stderr_drain = scope.spawn(move || {
                dispatcher::with_default(&stderr_dispatch, || drain(stderr, Stream::Stderr, echo))
            });
            let exit = child.wait();
            (stdout_drain.join(), stderr_drain.join(), exit)
        });

        let status = waited.map_err(|error| collect_error(&error.to_string()))?;
        let stdout_lines = joined(stdout_drained).map_err(|message| collect_error(&message))?;
        let stderr_lines = joined(stderr_drained).map_err(|message| collect_error(&message))?;

        debug!(
            target: COMMAND_TARGET,
            program = %program_name,
            status = ?status.code(),
            stdout_lines = stdout_lines.len(),
            stderr_lines = stderr_lines.len(),
            "command finished"
        );
        Ok(CommandOutput::new(status.code(), stdout_lines, stderr_lines))
    }
}

type DrainResult = thread::Result<std::io::Result<Vec<String>>>;

fn joined(result: DrainResult) -> Result<Vec<String>, String> {
    match result {
        Ok(Ok(lines)) => Ok(lines),
        Ok(Err(error)) => Err(error.to_string()),
        Err(_) => Err(String::from("output reader panicked")),
    }
}

fn drain(source: impl Read, stream: Stream, echo: bool) -> std::io::Result<Vec<String>> {
    let mut reader = BufReader::new(source);
    let mut lines = Vec::new();
    let mut buffer = Vec::new();
    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer)? == 0 {
            return Ok(lines);
        }
        let line = String::from_utf8_lossy(&buffer)
            .trim_end_matches(['\r', '\n'])
            .to_owned();
        if echo {
            info!(target: COMMAND_TARGET, stream = stream.as_str(), "{line}");
        }
        lines.push(line);
    }
}
