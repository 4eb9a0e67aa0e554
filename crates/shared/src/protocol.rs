use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DeviceSerial;

/// How one external command ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    ExitCode { code: i32 },
    /// Process ended without an exit code (killed by a signal).
    Terminated,
    /// The process could not be started or waited on.
    LaunchFailed { message: String },
}

impl RunStatus {
    pub fn from_exit_code(code: Option<i32>) -> Self {
        match code {
            Some(0) => Self::Success,
            Some(code) => Self::ExitCode { code },
            None => Self::Terminated,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Captured text of one process run plus its exit state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessOutput {
    pub text: String,
    pub status: RunStatus,
}

impl ProcessOutput {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            status: RunStatus::Success,
        }
    }

    /// Failure message stands in for the command's output.
    pub fn launch_failed(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            text: message.clone(),
            status: RunStatus::LaunchFailed { message },
        }
    }
}

/// Outcome of one command of an action, reported individually.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub template: String,
    pub command_line: String,
    pub device: DeviceSerial,
    pub output: String,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

impl CommandResult {
    pub fn succeeded(&self) -> bool {
        self.status.is_success()
    }
}
