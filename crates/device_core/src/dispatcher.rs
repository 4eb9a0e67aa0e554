use std::{
    sync::{Mutex, PoisonError},
    time::Instant,
};

use chrono::Utc;
use shared::{
    domain::{Action, DeviceSerial},
    protocol::{CommandResult, RunStatus},
};
use tracing::{debug, info, warn};

use crate::{context::DeviceContext, runner::ProcessRunner};

pub const DEFAULT_PROGRAM: &str = "adb";
/// Replaced by the device serial inside command templates.
pub const DEVICE_PLACEHOLDER: &str = "{device}";
const SEPARATOR_WIDTH: usize = 50;

/// Receives echoed command lines and their output.
pub trait OutputSink {
    fn append(&mut self, text: &str);
}

impl OutputSink for String {
    fn append(&mut self, text: &str) {
        self.push_str(text);
    }
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn append(&mut self, _text: &str) {}
}

/// Builds the line handed to the shell for one command template.
///
/// `<program> -s <serial> <command>`; the `-s` part is left out when no device is
/// selected, and an empty program runs the command verbatim.
pub fn resolve_command_line(program: &str, template: &str, device: &DeviceSerial) -> String {
    let command = template.replace(DEVICE_PLACEHOLDER, device.as_str());
    let program = program.trim();
    if program.is_empty() {
        command
    } else if device.is_empty() {
        format!("{program} {command}")
    } else {
        format!("{program} -s {} {command}", device.as_str())
    }
}

/// Runs an action's commands, one after another, against a device.
pub struct ActionDispatcher<R> {
    runner: R,
    context: DeviceContext,
    program: String,
    in_flight: Mutex<()>,
}

impl<R> ActionDispatcher<R>
where
    R: ProcessRunner,
{
    pub fn new(runner: R, context: DeviceContext) -> Self {
        Self {
            runner,
            context,
            program: DEFAULT_PROGRAM.to_string(),
            in_flight: Mutex::new(()),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn context(&self) -> &DeviceContext {
        &self.context
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Dispatches against whichever device the context holds right now.
    pub fn invoke_current(&self, action: &Action, sink: &mut dyn OutputSink) -> Vec<CommandResult> {
        let device = self.context.current();
        self.invoke(action, &device, sink)
    }

    /// Runs every command of `action` in order and reports each one.
    ///
    /// A failing command does not stop the ones after it. When `action.show` is set,
    /// each command line and its output reach `sink` before the next command starts.
    /// Concurrent calls on the same dispatcher run one at a time.
    pub fn invoke(
        &self,
        action: &Action,
        device: &DeviceSerial,
        sink: &mut dyn OutputSink,
    ) -> Vec<CommandResult> {
        let _in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        info!(
            action = %action.name,
            device = %device,
            commands = action.commands.len(),
            "dispatching action"
        );

        let mut results = Vec::with_capacity(action.commands.len());
        for template in &action.commands {
            let command_line = resolve_command_line(&self.program, template, device);
            let started_at = Utc::now();
            let clock = Instant::now();
            let output = self.runner.run(&command_line);
            let elapsed_ms = u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX);

            match &output.status {
                RunStatus::Success => debug!(command = %command_line, elapsed_ms, "command finished"),
                status => warn!(command = %command_line, ?status, "command did not succeed"),
            }

            let result = CommandResult {
                template: template.clone(),
                command_line,
                device: device.clone(),
                output: output.text,
                status: output.status,
                started_at,
                elapsed_ms,
            };
            if action.show {
                echo(sink, &result);
            }
            results.push(result);
        }
        results
    }
}

/// Appends one command's transcript: the line, its output, a non-success marker, a rule.
pub fn echo(sink: &mut dyn OutputSink, result: &CommandResult) {
    sink.append(&format!("$ {}\n", result.command_line));
    if !result.output.is_empty() {
        sink.append(&result.output);
        if !result.output.ends_with('\n') {
            sink.append("\n");
        }
    }
    match &result.status {
        RunStatus::Success => {}
        RunStatus::ExitCode { code } => sink.append(&format!("[exit code {code}]\n")),
        RunStatus::Terminated => sink.append("[terminated]\n"),
        RunStatus::LaunchFailed { .. } => sink.append("[failed to start]\n"),
    }
    sink.append(&"=".repeat(SEPARATOR_WIDTH));
    sink.append("\n");
}

#[cfg(test)]
#[path = "tests/dispatcher_tests.rs"]
mod tests;
