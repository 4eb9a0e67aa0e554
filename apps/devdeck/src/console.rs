//! Line-oriented interactive front end over the command tree and the dispatcher.

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
};

use command_tree::ConfigLoader;
use device_core::{
    enumerate_devices, ActionDispatcher, DeviceSubscriber, LoggingSubscriber, ProcessRunner,
    SubscriptionId,
};
use shared::domain::{Action, CommandTree, DeviceSerial, DeviceSummary};
use tracing::debug;

use crate::{
    config::{parse_layout_width, DEFAULT_LAYOUT_WIDTH},
    output::{summarize, WriteSink},
    ui,
};

const HELP: &str = "\
commands:
  help                     show this list
  tree                     show categories and numbered actions
  devices                  refresh the device list and select the first device
  use <serial|index>       select a device
  run <n>                  run action number n
  run <category>/<action>  run an action by name
  show <n>                 list the commands of action n
  width <n>                set the layout width in columns
  reload                   reload the command file
  clear                    clear the screen
  quit                     leave the console
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunTarget {
    Number(usize),
    Named { category: String, action: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Empty,
    Help,
    Tree,
    Devices,
    Use(String),
    Run(RunTarget),
    Show(usize),
    Width(String),
    Reload,
    Clear,
    Quit,
    Invalid(String),
}

pub fn parse_line(line: &str) -> ConsoleCommand {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match verb.to_ascii_lowercase().as_str() {
        "" => ConsoleCommand::Empty,
        "help" | "?" => ConsoleCommand::Help,
        "tree" | "ls" => ConsoleCommand::Tree,
        "devices" => ConsoleCommand::Devices,
        "use" if !rest.is_empty() => ConsoleCommand::Use(rest.to_string()),
        "use" => ConsoleCommand::Invalid("usage: use <serial|index>".into()),
        "run" => match parse_run_target(rest) {
            Some(target) => ConsoleCommand::Run(target),
            None => ConsoleCommand::Invalid("usage: run <n> | run <category>/<action>".into()),
        },
        "show" => match rest.parse() {
            Ok(number) => ConsoleCommand::Show(number),
            Err(_) => ConsoleCommand::Invalid("usage: show <n>".into()),
        },
        "width" => ConsoleCommand::Width(rest.to_string()),
        "reload" => ConsoleCommand::Reload,
        "clear" => ConsoleCommand::Clear,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => ConsoleCommand::Invalid(format!("unknown command '{other}' (try 'help')")),
    }
}

fn parse_run_target(rest: &str) -> Option<RunTarget> {
    if let Ok(number) = rest.parse() {
        return Some(RunTarget::Number(number));
    }
    let (category, action) = rest.split_once('/')?;
    let (category, action) = (category.trim(), action.trim());
    if category.is_empty() || action.is_empty() {
        return None;
    }
    Some(RunTarget::Named {
        category: category.to_string(),
        action: action.to_string(),
    })
}

/// Mirrors the active device for the prompt.
#[derive(Debug, Default)]
pub struct PromptState {
    device: Mutex<DeviceSerial>,
}

impl PromptState {
    pub fn prompt(&self) -> String {
        let device = self.device.lock().unwrap_or_else(PoisonError::into_inner);
        if device.is_empty() {
            "devdeck> ".to_string()
        } else {
            format!("devdeck [{device}]> ")
        }
    }
}

impl DeviceSubscriber for PromptState {
    fn on_device_selected(&self, serial: &DeviceSerial) {
        *self.device.lock().unwrap_or_else(PoisonError::into_inner) = serial.clone();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub struct Console<R: ProcessRunner> {
    loader: ConfigLoader,
    command_file: PathBuf,
    tree: CommandTree,
    dispatcher: ActionDispatcher<R>,
    devices: Vec<DeviceSummary>,
    width: u16,
    prompt: Arc<PromptState>,
    subscriptions: Vec<SubscriptionId>,
}

impl<R: ProcessRunner> Console<R> {
    pub fn new(
        loader: ConfigLoader,
        command_file: PathBuf,
        dispatcher: ActionDispatcher<R>,
        width: u16,
    ) -> Self {
        let prompt = Arc::new(PromptState::default());
        let context = dispatcher.context();
        let subscriptions = vec![
            context.subscribe(prompt.clone()),
            context.subscribe(Arc::new(LoggingSubscriber)),
        ];

        Self {
            loader,
            command_file,
            tree: CommandTree::empty(),
            dispatcher,
            devices: Vec::new(),
            width,
            prompt,
            subscriptions,
        }
    }

    pub fn prompt(&self) -> String {
        self.prompt.prompt()
    }

    /// Loads the command file, then reads commands until `quit` or end of input.
    pub fn run<I, W>(&mut self, input: I, out: &mut W) -> io::Result<()>
    where
        I: BufRead,
        W: Write,
    {
        self.reload(out)?;
        self.show_tree(out)?;

        let mut lines = input.lines();
        loop {
            write!(out, "{}", self.prompt())?;
            out.flush()?;
            let Some(line) = lines.next().transpose()? else {
                writeln!(out)?;
                return Ok(());
            };
            if self.execute(parse_line(&line), out)? == Flow::Quit {
                return Ok(());
            }
        }
    }

    fn execute<W: Write>(&mut self, command: ConsoleCommand, out: &mut W) -> io::Result<Flow> {
        debug!(?command, "console command");
        match command {
            ConsoleCommand::Empty => {}
            ConsoleCommand::Help => out.write_all(HELP.as_bytes())?,
            ConsoleCommand::Tree => self.show_tree(out)?,
            ConsoleCommand::Devices => self.refresh_devices(out)?,
            ConsoleCommand::Use(choice) => self.select(&choice, out)?,
            ConsoleCommand::Run(target) => self.run_target(&target, out)?,
            ConsoleCommand::Show(number) => match self.tree.action_by_number(number) {
                Some((category, action)) => {
                    writeln!(out, "{} / {}", category.name, action.name)?;
                    out.write_all(ui::preview(action).as_bytes())?;
                }
                None => writeln!(out, "no action numbered {number}")?,
            },
            ConsoleCommand::Width(raw) => {
                self.width = parse_layout_width(&raw, DEFAULT_LAYOUT_WIDTH);
                writeln!(out, "layout width: {}", self.width)?;
            }
            ConsoleCommand::Reload => {
                self.reload(out)?;
                self.show_tree(out)?;
            }
            ConsoleCommand::Clear => out.write_all(b"\x1b[2J\x1b[H")?,
            ConsoleCommand::Quit => return Ok(Flow::Quit),
            ConsoleCommand::Invalid(message) => writeln!(out, "{message}")?,
        }
        Ok(Flow::Continue)
    }

    fn reload<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let report = self.loader.load_lenient(&self.command_file);
        if let Some(warning) = &report.warning {
            writeln!(out, "warning: {warning}")?;
        }
        self.tree = report.tree;
        Ok(())
    }

    fn show_tree<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if self.tree.is_empty() {
            return writeln!(out, "no actions loaded from {}", self.command_file.display());
        }
        out.write_all(ui::render_tree(&self.tree, self.width, false).as_bytes())
    }

    fn refresh_devices<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        match enumerate_devices(self.dispatcher.runner(), self.dispatcher.program()) {
            Ok(devices) => self.devices = devices,
            Err(error) => return writeln!(out, "error: {error}"),
        }

        if self.devices.is_empty() {
            return writeln!(out, "no devices attached");
        }
        for (index, device) in self.devices.iter().enumerate() {
            writeln!(out, "{:>3}  {}\t{}", index + 1, device.serial, device.raw_state)?;
        }
        self.dispatcher
            .context()
            .set_device(self.devices[0].serial.clone());
        Ok(())
    }

    fn select<W: Write>(&mut self, choice: &str, out: &mut W) -> io::Result<()> {
        // Numbers index the last `devices` listing; with no listing they are serials.
        let serial = match choice.parse::<usize>() {
            Ok(index) if (1..=self.devices.len()).contains(&index) => {
                self.devices[index - 1].serial.clone()
            }
            Ok(index) if !self.devices.is_empty() => {
                return writeln!(
                    out,
                    "no device numbered {index} (1-{} listed)",
                    self.devices.len()
                );
            }
            _ => DeviceSerial::new(choice),
        };
        writeln!(out, "using {serial}")?;
        self.dispatcher.context().set_device(serial);
        Ok(())
    }

    fn run_target<W: Write>(&self, target: &RunTarget, out: &mut W) -> io::Result<()> {
        let action: Option<&Action> = match target {
            RunTarget::Number(number) => self.tree.action_by_number(*number).map(|(_, a)| a),
            RunTarget::Named { category, action } => self.tree.find(category, action),
        };
        let Some(action) = action else {
            return writeln!(out, "no such action");
        };

        let mut sink = WriteSink::new(&mut *out);
        let results = self.dispatcher.invoke_current(action, &mut sink);
        sink.finish()?;
        if !action.show {
            out.write_all(summarize(&results).as_bytes())?;
        }
        Ok(())
    }
}

impl<R: ProcessRunner> Drop for Console<R> {
    fn drop(&mut self) {
        let context = self.dispatcher.context();
        for id in self.subscriptions.drain(..) {
            context.unsubscribe(id);
        }
    }
}

#[cfg(test)]
#[path = "tests/console_tests.rs"]
mod tests;
