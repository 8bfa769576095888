use crate::diagnostics::{parse_attributes, parse_device_info, score};
use crate::models::{DeviceInfo, DeviceReport, DiagnosticResult, RawReports, SmartSupport};
use log::{debug, info};

/// Runs the whole pipeline over one device's smartctl output.
///
/// Every call parses and scores from scratch; nothing is carried over from a
/// previous query.
pub fn diagnose(device: &str, reports: &RawReports) -> DeviceReport {
    let info = parse_device_info(&reports.info);

    if info.smart_support() == Some(SmartSupport::Disabled) {
        info!("{}: SMART is disabled, skipping attribute scoring", device);
        return DeviceReport {
            info,
            attributes: Vec::new(),
            result: DiagnosticResult::unknown("SMART is disabled or not supported on this device."),
        };
    }

    let attributes = parse_attributes(&reports.attributes);
    debug!("{}: parsed {} attributes, {} info fields", device, attributes.len(), info.len());

    let result = score(&attributes, &info);
    info!("{}: health {} ({})", device, result.score(), result.verdict());

    DeviceReport { info, attributes, result }
}

/// Report for a device whose smartctl output could not be obtained.
pub fn unavailable(device: &str, detail: &str) -> DeviceReport {
    info!("{}: no SMART data ({})", device, detail);
    DeviceReport {
        info: DeviceInfo::new(),
        attributes: Vec::new(),
        result: DiagnosticResult::unknown(format!("SMART data could not be read: {}", detail)),
    }
}
