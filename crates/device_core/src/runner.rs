use std::{
    process::{Command, Stdio},
    str::FromStr,
    sync::Arc,
};

use serde::Deserialize;
use shared::protocol::{ProcessOutput, RunStatus};
use tracing::{debug, warn};

/// Runs one command line to completion and returns what it printed.
///
/// Implementations block until the process exits and never fail outright: launch
/// errors come back as [`RunStatus::LaunchFailed`] with the message as output text.
pub trait ProcessRunner: Send + Sync {
    fn run(&self, command_line: &str) -> ProcessOutput;
}

impl<R> ProcessRunner for Arc<R>
where
    R: ProcessRunner + ?Sized,
{
    fn run(&self, command_line: &str) -> ProcessOutput {
        (**self).run(command_line)
    }
}

impl<R> ProcessRunner for &R
where
    R: ProcessRunner + ?Sized,
{
    fn run(&self, command_line: &str) -> ProcessOutput {
        (**self).run(command_line)
    }
}

/// Where a child's standard error goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StderrMode {
    #[default]
    Inherit,
    Discard,
    /// Appended to the captured text after stdout.
    Capture,
}

impl FromStr for StderrMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "inherit" => Ok(Self::Inherit),
            "discard" => Ok(Self::Discard),
            "capture" => Ok(Self::Capture),
            other => Err(format!(
                "unknown stderr mode '{other}' (expected inherit, discard or capture)"
            )),
        }
    }
}

/// Runs commands through the host shell (`/bin/sh -c`, or `cmd.exe /C` on Windows).
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    stderr: StderrMode,
}

impl ShellRunner {
    pub fn new(stderr: StderrMode) -> Self {
        Self { stderr }
    }

    fn command(command_line: &str) -> Command {
        if cfg!(windows) {
            let mut command = Command::new("cmd.exe");
            command.arg("/C").arg(command_line);
            command
        } else {
            let mut command = Command::new("/bin/sh");
            command.arg("-c").arg(command_line);
            command
        }
    }
}

impl ProcessRunner for ShellRunner {
    fn run(&self, command_line: &str) -> ProcessOutput {
        let mut command = Self::command(command_line);
        command.stdin(Stdio::null()).stdout(Stdio::piped());
        command.stderr(match self.stderr {
            StderrMode::Inherit => Stdio::inherit(),
            StderrMode::Discard => Stdio::null(),
            StderrMode::Capture => Stdio::piped(),
        });

        debug!(command = command_line, "running shell command");
        match command.output() {
            Ok(output) => {
                let mut text = join_lines(&output.stdout);
                if self.stderr == StderrMode::Capture {
                    text.push_str(&join_lines(&output.stderr));
                }
                let status = RunStatus::from_exit_code(output.status.code());
                debug!(command = command_line, ?status, bytes = text.len(), "shell command finished");
                ProcessOutput { text, status }
            }
            Err(error) => {
                warn!(command = command_line, %error, "failed to run shell command");
                ProcessOutput::launch_failed(format!("failed to run `{command_line}`: {error}"))
            }
        }
    }
}

/// Every captured line terminated by `\n`, CRLF normalized.
fn join_lines(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .lines()
        .fold(String::new(), |mut text, line| {
            text.push_str(line);
            text.push('\n');
            text
        })
}
