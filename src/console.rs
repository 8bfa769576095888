// Plain-text front-end for the scan and report subcommands

use crate::config::AppConfig;
use crate::diagnostics::{self, attribute_status};
use crate::error::{Result, ScanError};
use crate::models::{AttributeStatus, DeviceReport, DiskEntry, RawReports};
use crate::scanner::{self, diagnose_disk, list_disks};
use log::info;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Diagnoses every disk (or just `device`) and prints the reports followed by
/// a one-line summary per disk.
pub fn run_scan(config: &AppConfig, device: Option<&str>) -> Result<()> {
    if !scanner::is_root() {
        println!("Warning: not running as root, smartctl will probably be refused access.\n");
    }

    let disks = match device {
        Some(path) => vec![disk_from_path(path)],
        None => list_disks(config)?,
    };
    if disks.is_empty() {
        println!("No physical disks were found.");
        return Ok(());
    }

    let mut summary = Vec::with_capacity(disks.len());
    for disk in &disks {
        info!("analysing {}", disk.path);
        let report = diagnose_disk(config, disk);
        println!("{}", render_report(&disk.display_name(), &report));
        summary.push(summary_line(disk, &report));
    }

    println!("=== Summary ===");
    for line in summary {
        println!("{}", line);
    }
    Ok(())
}

/// Diagnoses saved smartctl output.
pub fn run_report(attributes: &Path, info: &Path) -> Result<()> {
    let reports = load_reports(attributes, info)?;
    let report = diagnostics::diagnose(&attributes.display().to_string(), &reports);
    println!("{}", render_report(&attributes.display().to_string(), &report));
    Ok(())
}

pub fn load_reports(attributes: &Path, info: &Path) -> Result<RawReports> {
    Ok(RawReports {
        attributes: fs::read_to_string(attributes)?,
        info: fs::read_to_string(info)?,
    })
}

fn disk_from_path(path: &str) -> DiskEntry {
    let name = path.rsplit('/').next().unwrap_or(path).to_string();
    DiskEntry {
        path: path.to_string(),
        name,
        size: "?".to_string(),
        model: String::new(),
    }
}

pub fn summary_line(disk: &DiskEntry, report: &DeviceReport) -> String {
    format!("{} ==> {} {}", disk.path, report.result.score(), report.result.verdict())
}

/// Text rendering of one device report.
pub fn render_report(title: &str, report: &DeviceReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", title);

    out.push_str("General information\n");
    if report.info.is_empty() {
        out.push_str("  (no device information)\n");
    }
    for (field, value) in report.info.iter() {
        let _ = writeln!(out, "  {}: {}", field.label(), value);
    }

    let _ = writeln!(out, "\nHealth: {} ({})", report.result.score(), report.result.verdict());
    let _ = writeln!(out, "Notes:\n{}", report.result.notes());

    if report.attributes.is_empty() {
        out.push_str("\nNo attribute table available.\n");
        return out;
    }

    let _ = writeln!(
        out,
        "\n{:<4} {:<25} {:<6} {:<6} {:<6} {:<12} {:<12} {}",
        "ID", "Name", "Cur", "Wor", "Thr", "Type", "Raw Value", "Status"
    );
    let _ = writeln!(out, "{}", "-".repeat(80));
    for attr in &report.attributes {
        let status = match attribute_status(attr) {
            AttributeStatus::Good => "ok",
            AttributeStatus::Warning => "WARN",
            AttributeStatus::Critical => "CRIT",
        };
        let _ = writeln!(
            out,
            "{:<4} {:<25} {:<6} {:<6} {:<6} {:<12} {:<12} {}",
            attr.id, attr.name, attr.current, attr.worst, attr.threshold, attr.kind, attr.raw_value, status
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ATTRIBUTES: &str = "\
ID# ATTRIBUTE_NAME          FLAG     VALUE WORST THRESH TYPE      UPDATED  WHEN_FAILED RAW_VALUE
  5 Reallocated_Sector_Ct   0x0033   100   100   010    Pre-fail  Always       -       16
  9 Power_On_Hours          0x0032   092   092   000    Old_age   Always       -       7421
";

    const INFO: &str = "\
Device Model:     WDC WD10EZEX-08WN4A0
User Capacity:    1,000,204,886,016 bytes [1.00 TB]
SMART support is: Enabled
";

    #[test]
    fn renders_scored_report() {
        let report = diagnostics::diagnose(
            "/dev/sda",
            &RawReports { attributes: ATTRIBUTES.into(), info: INFO.into() },
        );
        insta::assert_snapshot!(render_report("/dev/sda", &report), @r"
        === /dev/sda ===
        General information
          Device Model: WDC WD10EZEX-08WN4A0
          Capacity: 1.00 TB
          SMART Supported: Enabled

        Health: 90% (Excellent)
        Notes:
        Drive condition is EXCELLENT. No action is required.

        Detected warnings:
        - 'Reallocated_Sector_Ct' (ID 5) raw value is above zero (16)

        ID   Name                      Cur    Wor    Thr    Type         Raw Value    Status
        --------------------------------------------------------------------------------
        5    Reallocated_Sector_Ct     100    100    10     Pre-fail     16           WARN
        9    Power_On_Hours            92     92     0      Old_age      7421         ok
        ");
    }

    #[test]
    fn renders_unknown_report() {
        let report = diagnostics::unavailable("/dev/sdb", "smartctl timed out");
        let text = render_report("/dev/sdb", &report);
        assert!(text.contains("Health: Unknown (Unknown)"));
        assert!(text.contains("(no device information)"));
        assert!(text.ends_with("No attribute table available.\n"));
    }

    #[test]
    fn summary_line_format() {
        let disk = disk_from_path("/dev/sdb");
        assert_eq!(disk.name, "sdb");
        let report = diagnostics::unavailable("/dev/sdb", "no data");
        assert_eq!(summary_line(&disk, &report), "/dev/sdb ==> Unknown Unknown");
    }

    #[test]
    fn loads_saved_reports() {
        let mut attrs = tempfile::NamedTempFile::new().unwrap();
        attrs.write_all(ATTRIBUTES.as_bytes()).unwrap();
        let mut info = tempfile::NamedTempFile::new().unwrap();
        info.write_all(INFO.as_bytes()).unwrap();

        let reports = load_reports(attrs.path(), info.path()).unwrap();
        assert_eq!(reports.attributes, ATTRIBUTES);
        assert_eq!(reports.info, INFO);
    }

    #[test]
    fn missing_report_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");
        let err = load_reports(&missing, &missing).unwrap_err();
        assert!(matches!(err, ScanError::Io(_)));
    }
}
