use crate::config::AppConfig;
use crate::error::{Result, ScanError};
use crate::models::RawReports;
use crate::scanner::command::{CommandOutput, run_with_timeout};
use log::{debug, info, warn};

/// smartctl exit bit 0: command line did not parse.
const EXIT_BAD_COMMAND_LINE: i32 = 0x01;
/// smartctl exit bit 1: device open failed.
const EXIT_OPEN_FAILED: i32 = 0x02;

/// Fetches `smartctl -A` and `smartctl -i` output for `device`, trying each
/// configured device type until one of them works.
///
/// A missing smartctl binary or a timeout stops the search immediately; any
/// other per-type failure moves on to the next type.
pub fn fetch_reports(config: &AppConfig, device: &str) -> Result<RawReports> {
    let mut last_detail = String::new();

    for dev_type in &config.device_types {
        let attempt = run_smartctl(config, "-A", dev_type, device)
            .and_then(|attributes| run_smartctl(config, "-i", dev_type, device).map(|info| (attributes, info)));

        match attempt {
            Ok((attributes, info)) => {
                info!("{}: SMART data read with device type '{}'", device, dev_type);
                return Ok(RawReports { attributes, info });
            }
            Err(ScanError::CommandFailed { detail, .. }) => {
                debug!("{}: device type '{}' failed: {}", device, dev_type, detail);
                last_detail = detail;
            }
            Err(e) => return Err(e),
        }
    }

    warn!("{}: no usable smartctl device type", device);
    Err(ScanError::NoUsableDeviceType {
        device: device.to_string(),
        detail: if last_detail.is_empty() {
            "SMART data is not available or not supported".to_string()
        } else {
            last_detail
        },
    })
}

fn run_smartctl(config: &AppConfig, mode: &str, dev_type: &str, device: &str) -> Result<String> {
    let output = run_with_timeout(
        &config.smartctl,
        &[mode, "-d", dev_type, device],
        device,
        config.command_timeout,
    )?;
    check_status(&output, device)?;
    Ok(output.stdout)
}

/// Only the command-line and open-failure bits mean there is nothing to
/// parse; the remaining bits describe the drive, not the invocation.
fn check_status(output: &CommandOutput, device: &str) -> Result<()> {
    let failed = match output.status.code() {
        Some(code) => code & (EXIT_BAD_COMMAND_LINE | EXIT_OPEN_FAILED) != 0,
        None => true,
    };
    if failed {
        return Err(ScanError::CommandFailed {
            tool: "smartctl".to_string(),
            device: device.to_string(),
            detail: output.detail(),
        });
    }
    Ok(())
}
