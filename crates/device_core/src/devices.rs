use shared::{
    domain::{DeviceSerial, DeviceState, DeviceSummary},
    protocol::RunStatus,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::runner::ProcessRunner;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceListError {
    #[error("device listing could not start: {0}")]
    LaunchFailed(String),
    #[error("`{command}` exited with {status:?}")]
    CommandFailed { command: String, status: RunStatus },
}

/// Parses the tabular report of `<program> devices`.
///
/// Blank lines, the `List of devices` header and `*`-prefixed daemon notices are
/// skipped; any other row needs at least a serial and a state column.
pub fn parse_device_list(report: &str) -> Vec<DeviceSummary> {
    report
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with('*') && !line.contains("List of devices"))
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let serial = fields.next()?;
            let Some(raw_state) = fields.next() else {
                debug!(line, "skipping device row without a state column");
                return None;
            };
            Some(DeviceSummary {
                serial: DeviceSerial::new(serial),
                state: DeviceState::parse(raw_state),
                raw_state: raw_state.to_string(),
            })
        })
        .collect()
}

/// Runs the device listing through `runner` and parses the result.
pub fn enumerate_devices<R>(runner: &R, program: &str) -> Result<Vec<DeviceSummary>, DeviceListError>
where
    R: ProcessRunner + ?Sized,
{
    let command = list_command(program);
    let output = runner.run(&command);
    match output.status {
        RunStatus::Success => {
            let devices = parse_device_list(&output.text);
            info!(count = devices.len(), "enumerated devices");
            Ok(devices)
        }
        RunStatus::LaunchFailed { message } => Err(DeviceListError::LaunchFailed(message)),
        status => Err(DeviceListError::CommandFailed { command, status }),
    }
}

pub fn list_command(program: &str) -> String {
    let program = program.trim();
    if program.is_empty() {
        "adb devices".to_string()
    } else {
        format!("{program} devices")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::protocol::ProcessOutput;

    const REPORT: &str = "* daemon not running; starting now at tcp:5037\n\
                          * daemon started successfully\n\
                          List of devices attached\n\
                          emulator-5554\tdevice\n\
                          \n\
                          R58M1234ABC\tunauthorized\n\
                          192.168.1.20:5555\toffline\n\
                          0123456789ABCDEF       device usb:1-1 product:foo model:Pixel_7\n";

    struct Canned(ProcessOutput);

    impl ProcessRunner for Canned {
        fn run(&self, _command_line: &str) -> ProcessOutput {
            self.0.clone()
        }
    }

    #[test]
    fn parses_rows_and_skips_noise() {
        let devices = parse_device_list(REPORT);
        let serials: Vec<_> = devices.iter().map(|d| d.serial.as_str()).collect();
        assert_eq!(
            serials,
            vec![
                "emulator-5554",
                "R58M1234ABC",
                "192.168.1.20:5555",
                "0123456789ABCDEF"
            ]
        );
        assert_eq!(devices[1].state, DeviceState::Unauthorized);
        assert_eq!(devices[2].state, DeviceState::Offline);
        assert_eq!(devices[3].state, DeviceState::Device);
    }

    #[test]
    fn header_only_report_has_no_devices() {
        assert!(parse_device_list("List of devices attached\n\n").is_empty());
        assert!(parse_device_list("").is_empty());
    }

    #[test]
    fn rows_without_state_are_ignored() {
        assert!(parse_device_list("lonely-serial\n").is_empty());
    }

    #[test]
    fn enumerate_surfaces_runner_failures() {
        let runner = Canned(ProcessOutput::launch_failed("adb: not found"));
        assert_eq!(
            enumerate_devices(&runner, "adb"),
            Err(DeviceListError::LaunchFailed("adb: not found".into()))
        );

        let runner = Canned(ProcessOutput {
            text: String::new(),
            status: RunStatus::ExitCode { code: 127 },
        });
        assert!(matches!(
            enumerate_devices(&runner, "adb"),
            Err(DeviceListError::CommandFailed { .. })
        ));
    }

    #[test]
    fn enumerate_parses_successful_output() {
        let runner = Canned(ProcessOutput::success(REPORT));
        let devices = enumerate_devices(&runner, "adb").expect("devices");
        assert_eq!(devices.len(), 4);
        assert_eq!(list_command(" /opt/sdk/adb "), "/opt/sdk/adb devices");
    }
}
