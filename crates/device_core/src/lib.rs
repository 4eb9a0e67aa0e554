//! Device-side half of devdeck: running shell commands, tracking the active device,
//! and dispatching configured actions against it.

pub mod context;
pub mod devices;
pub mod dispatcher;
pub mod runner;

pub use context::{DeviceContext, DeviceSubscriber, LoggingSubscriber, SubscriptionId};
pub use devices::{enumerate_devices, parse_device_list, DeviceListError};
pub use dispatcher::{
    resolve_command_line, ActionDispatcher, NullSink, OutputSink, DEFAULT_PROGRAM,
    DEVICE_PLACEHOLDER,
};
pub use runner::{ProcessRunner, ShellRunner, StderrMode};
