use std::io::{self, Write};

use device_core::OutputSink;
use shared::protocol::{CommandResult, RunStatus};

/// Forwards echoed output to a writer. The first write error is kept and every later
/// append is dropped; [`WriteSink::finish`] reports it.
pub struct WriteSink<W: Write> {
    inner: W,
    error: Option<io::Error>,
}

impl<W: Write> WriteSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, error: None }
    }

    pub fn finish(mut self) -> io::Result<W> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> OutputSink for WriteSink<W> {
    fn append(&mut self, text: &str) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.inner.write_all(text.as_bytes()) {
            self.error = Some(error);
        }
    }
}

pub fn status_label(status: &RunStatus) -> String {
    match status {
        RunStatus::Success => "ok".to_string(),
        RunStatus::ExitCode { code } => format!("exit code {code}"),
        RunStatus::Terminated => "terminated".to_string(),
        RunStatus::LaunchFailed { message } => format!("failed to start: {message}"),
    }
}

/// One status line per command, for actions that do not echo their output.
pub fn summarize(results: &[CommandResult]) -> String {
    let mut out = String::new();
    for result in results {
        out.push_str(&format!(
            "{} ({} ms): {}\n",
            result.command_line,
            result.elapsed_ms,
            status_label(&result.status)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::domain::DeviceSerial;

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn result(command_line: &str, status: RunStatus) -> CommandResult {
        CommandResult {
            template: command_line.to_string(),
            command_line: command_line.to_string(),
            device: DeviceSerial::none(),
            output: String::new(),
            status,
            started_at: Utc::now(),
            elapsed_ms: 7,
        }
    }

    #[test]
    fn write_sink_forwards_text() {
        let mut sink = WriteSink::new(Vec::new());
        sink.append("$ adb devices\n");
        sink.append("List of devices attached\n");
        let bytes = sink.finish().expect("finish");
        assert_eq!(bytes, b"$ adb devices\nList of devices attached\n");
    }

    #[test]
    fn write_sink_reports_first_error() {
        let mut sink = WriteSink::new(Broken);
        sink.append("one");
        sink.append("two");
        let error = sink.finish().err().expect("error");
        assert_eq!(error.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn summary_has_one_line_per_command() {
        let summary = summarize(&[
            result("adb shell true", RunStatus::Success),
            result("adb shell false", RunStatus::ExitCode { code: 1 }),
            result(
                "adb reboot",
                RunStatus::LaunchFailed {
                    message: "adb: not found".into(),
                },
            ),
        ]);
        assert_eq!(
            summary,
            "adb shell true (7 ms): ok\n\
             adb shell false (7 ms): exit code 1\n\
             adb reboot (7 ms): failed to start: adb: not found\n"
        );
    }
}
