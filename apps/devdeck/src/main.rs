mod config;
mod console;
mod output;
mod ui;

use std::{
    io::{self, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use command_tree::{ConfigLoader, SchemaHint};
use device_core::{
    enumerate_devices, ActionDispatcher, DeviceContext, LoggingSubscriber, ShellRunner, StderrMode,
};
use shared::{
    domain::{DeviceSerial, DeviceSummary},
    protocol::CommandResult,
};
use tracing_subscriber::EnvFilter;

use crate::{
    config::{load_settings, parse_layout_width, Settings},
    console::Console,
    output::{summarize, WriteSink},
};

#[derive(Parser, Debug)]
#[command(name = "devdeck", version, about = "Run configured device commands from a terminal")]
struct Cli {
    /// Command file (XML or JSON).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Settings file; defaults to ./devdeck.toml when present.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
    /// Device bridge executable.
    #[arg(long, global = true)]
    program: Option<String>,
    #[arg(long, global = true)]
    schema: Option<SchemaHint>,
    #[arg(long, global = true)]
    stderr: Option<StderrMode>,
    /// Log filter, e.g. `debug` or `device_core=trace`. Overrides RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print categories and numbered actions.
    Tree {
        /// Layout width in columns.
        #[arg(long)]
        width: Option<String>,
        #[arg(long)]
        json: bool,
        /// List each action's commands.
        #[arg(long)]
        verbose: bool,
    },
    /// List attached devices.
    Devices {
        #[arg(long)]
        json: bool,
    },
    /// Run one action against a device.
    Run {
        category: String,
        action: String,
        /// Device serial; the first attached device when omitted.
        #[arg(long)]
        device: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Interactive console (the default).
    Console,
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn apply_cli_overrides(settings: &mut Settings, cli: &Cli) {
    if let Some(path) = &cli.config {
        settings.command_file = path.clone();
    }
    if let Some(program) = &cli.program {
        settings.program = program.clone();
    }
    if let Some(schema) = cli.schema {
        settings.schema = schema;
    }
    if let Some(stderr) = cli.stderr {
        settings.stderr = stderr;
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let mut settings = load_settings(cli.settings.as_deref())?;
    apply_cli_overrides(&mut settings, &cli);
    tracing::debug!(?settings, "settings resolved");

    let loader = ConfigLoader::new(settings.schema);
    let context = DeviceContext::new();
    let dispatcher = ActionDispatcher::new(ShellRunner::new(settings.stderr), context.clone())
        .with_program(settings.program.clone());

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command.unwrap_or(Command::Console) {
        Command::Tree {
            width,
            json,
            verbose,
        } => {
            let report = loader.load_lenient(&settings.command_file);
            if let Some(warning) = &report.warning {
                eprintln!("warning: {warning}");
            }
            if json {
                serde_json::to_writer_pretty(&mut out, &report.tree)?;
                writeln!(out)?;
            } else {
                let width = width
                    .as_deref()
                    .map(|raw| parse_layout_width(raw, settings.layout_width))
                    .unwrap_or(settings.layout_width);
                out.write_all(ui::render_tree(&report.tree, width, verbose).as_bytes())?;
            }
        }
        Command::Devices { json } => {
            let devices = enumerate_devices(dispatcher.runner(), dispatcher.program())?;
            print_devices(&mut out, &devices, json)?;
        }
        Command::Run {
            category,
            action: action_name,
            device,
            json,
        } => {
            let tree = loader
                .load(&settings.command_file)
                .context("cannot run an action without a command tree")?;
            let Some(action) = tree.find(&category, &action_name) else {
                bail!("no action '{action_name}' in category '{category}'");
            };

            context.subscribe(Arc::new(LoggingSubscriber));
            let serial = match device {
                Some(serial) => DeviceSerial::new(serial),
                None => first_device(&dispatcher)?,
            };
            context.set_device(serial);

            let results = if json {
                dispatcher.invoke_current(action, &mut device_core::NullSink)
            } else {
                let mut sink = WriteSink::new(&mut out);
                let results = dispatcher.invoke_current(action, &mut sink);
                sink.finish()?;
                results
            };
            print_results(&mut out, &results, action.show, json)?;
        }
        Command::Console => {
            let mut console = Console::new(
                loader,
                settings.command_file.clone(),
                dispatcher,
                settings.layout_width,
            );
            console.run(io::stdin().lock(), &mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}

fn first_device(dispatcher: &ActionDispatcher<ShellRunner>) -> Result<DeviceSerial> {
    let devices = enumerate_devices(dispatcher.runner(), dispatcher.program())?;
    match devices.into_iter().next() {
        Some(device) => Ok(device.serial),
        None => {
            tracing::warn!("no devices attached; running without a device selection");
            Ok(DeviceSerial::none())
        }
    }
}

fn print_devices<W: Write>(out: &mut W, devices: &[DeviceSummary], json: bool) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, devices)?;
        writeln!(out)?;
    } else if devices.is_empty() {
        writeln!(out, "no devices attached")?;
    } else {
        for device in devices {
            writeln!(out, "{}\t{}", device.serial, device.raw_state)?;
        }
    }
    Ok(())
}

fn print_results<W: Write>(
    out: &mut W,
    results: &[CommandResult],
    echoed: bool,
    json: bool,
) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, results)?;
        writeln!(out)?;
    } else if !echoed {
        out.write_all(summarize(results).as_bytes())?;
    }
    Ok(())
}
