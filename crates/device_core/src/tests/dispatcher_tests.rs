use super::*;
use shared::protocol::ProcessOutput;
use std::sync::Arc;

#[derive(Default)]
struct FakeRunner {
    calls: Arc<Mutex<Vec<String>>>,
    /// Commands containing the key get the scripted output instead of an echo.
    scripted: Vec<(&'static str, ProcessOutput)>,
}

impl FakeRunner {
    fn scripted(mut self, needle: &'static str, output: ProcessOutput) -> Self {
        self.scripted.push((needle, output));
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls").clone()
    }
}

impl ProcessRunner for FakeRunner {
    fn run(&self, command_line: &str) -> ProcessOutput {
        self.calls
            .lock()
            .expect("calls")
            .push(command_line.to_string());
        self.scripted
            .iter()
            .find(|(needle, _)| command_line.contains(needle))
            .map(|(_, output)| output.clone())
            .unwrap_or_else(|| ProcessOutput::success(format!("ran {command_line}\n")))
    }
}

fn action(show: bool, commands: &[&str]) -> Action {
    Action::new(
        "Test",
        show,
        commands.iter().map(|c| c.to_string()).collect(),
    )
}

#[test]
fn resolves_device_flag_placeholder_and_program() {
    let device = DeviceSerial::new("emulator-5554");
    assert_eq!(
        resolve_command_line("adb", "shell getprop", &device),
        "adb -s emulator-5554 shell getprop"
    );
    assert_eq!(
        resolve_command_line("adb", "shell getprop", &DeviceSerial::none()),
        "adb shell getprop"
    );
    assert_eq!(
        resolve_command_line("", "scrcpy --serial {device}", &device),
        "scrcpy --serial emulator-5554"
    );
    assert_eq!(
        resolve_command_line(" adb ", "pull /sdcard/{device}.png", &device),
        "adb -s emulator-5554 pull /sdcard/emulator-5554.png"
    );
}

#[test]
fn runs_commands_in_order_and_echoes_when_shown() {
    let runner = FakeRunner::default();
    let dispatcher = ActionDispatcher::new(&runner, DeviceContext::new());
    let mut sink = String::new();

    let results = dispatcher.invoke(
        &action(true, &["shell one", "shell two"]),
        &DeviceSerial::new("serial-1"),
        &mut sink,
    );

    assert_eq!(
        runner.calls(),
        vec!["adb -s serial-1 shell one", "adb -s serial-1 shell two"]
    );
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.succeeded()));
    assert_eq!(results[1].template, "shell two");
    let rule = "=".repeat(50);
    assert_eq!(
        sink,
        format!(
            "$ adb -s serial-1 shell one\nran adb -s serial-1 shell one\n{rule}\n\
             $ adb -s serial-1 shell two\nran adb -s serial-1 shell two\n{rule}\n"
        )
    );
}

#[test]
fn hidden_action_still_runs_but_echoes_nothing() {
    let runner = FakeRunner::default();
    let dispatcher = ActionDispatcher::new(&runner, DeviceContext::new());
    let mut sink = String::new();

    let results = dispatcher.invoke(
        &action(false, &["reboot"]),
        &DeviceSerial::new("s"),
        &mut sink,
    );

    assert_eq!(runner.calls(), vec!["adb -s s reboot"]);
    assert_eq!(results[0].output, "ran adb -s s reboot\n");
    assert!(sink.is_empty());
}

#[test]
fn failures_do_not_stop_remaining_commands() {
    let runner = FakeRunner::default()
        .scripted(
            "broken",
            ProcessOutput::launch_failed("failed to run `broken`: No such file"),
        )
        .scripted(
            "exit",
            ProcessOutput {
                text: "partial\n".into(),
                status: RunStatus::ExitCode { code: 1 },
            },
        );
    let dispatcher = ActionDispatcher::new(&runner, DeviceContext::new()).with_program("");
    let mut sink = String::new();

    let results = dispatcher.invoke(
        &action(true, &["broken", "exit", "fine"]),
        &DeviceSerial::none(),
        &mut sink,
    );

    assert_eq!(runner.calls(), vec!["broken", "exit", "fine"]);
    assert!(matches!(results[0].status, RunStatus::LaunchFailed { .. }));
    assert_eq!(results[0].output, "failed to run `broken`: No such file");
    assert_eq!(results[1].status, RunStatus::ExitCode { code: 1 });
    assert!(results[2].succeeded());
    assert!(sink.contains("[failed to start]"));
    assert!(sink.contains("partial\n[exit code 1]\n"));
    assert!(sink.contains("$ fine\nran fine\n"));
}

#[test]
fn current_device_is_read_at_invocation_time() {
    let runner = FakeRunner::default();
    let context = DeviceContext::new();
    let dispatcher = ActionDispatcher::new(&runner, context.clone());

    context.set_device("first");
    context.set_device("second");
    context.set_device("third");
    let results = dispatcher.invoke_current(&action(false, &["shell id"]), &mut NullSink);

    context.set_device("fourth");
    dispatcher.invoke_current(&action(false, &["shell id"]), &mut NullSink);

    assert_eq!(results[0].device.as_str(), "third");
    assert_eq!(
        runner.calls(),
        vec!["adb -s third shell id", "adb -s fourth shell id"]
    );
}

#[test]
fn empty_action_dispatches_nothing() {
    let runner = FakeRunner::default();
    let dispatcher = ActionDispatcher::new(&runner, DeviceContext::new());
    let mut sink = String::new();

    let results = dispatcher.invoke(&action(true, &[]), &DeviceSerial::new("s"), &mut sink);

    assert!(results.is_empty());
    assert!(runner.calls().is_empty());
    assert!(sink.is_empty());
}

#[test]
fn concurrent_invocations_do_not_interleave() {
    let runner = Arc::new(FakeRunner::default());
    let dispatcher = Arc::new(ActionDispatcher::new(Arc::clone(&runner), DeviceContext::new()));

    let handles: Vec<_> = ["a", "b"]
        .into_iter()
        .map(|tag| {
            let dispatcher = Arc::clone(&dispatcher);
            std::thread::spawn(move || {
                let commands: Vec<String> = (0..20).map(|i| format!("{tag}{i}")).collect();
                let action = Action::new(tag, false, commands);
                dispatcher.invoke(&action, &DeviceSerial::none(), &mut NullSink);
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread");
    }

    let calls = runner.calls();
    assert_eq!(calls.len(), 40);
    let first_tag = calls[0].split_whitespace().nth(1).expect("cmd").chars().next();
    assert!(calls[..20]
        .iter()
        .all(|c| c.split_whitespace().nth(1).and_then(|s| s.chars().next()) == first_tag));
}
