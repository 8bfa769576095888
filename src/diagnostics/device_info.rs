use crate::models::{DeviceInfo, InfoField, InfoValue, SmartSupport};
use log::trace;
use regex::Regex;
use std::sync::LazyLock;

static BRACKETED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[(.*?)\]").unwrap());
static HOURS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d[\d,]*)\s+hours").unwrap());
static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d[\d,]*").unwrap());

/// How a field's value is pulled out of its line.
#[derive(Clone, Copy, Debug)]
enum Extract {
    /// Trimmed text after the first colon
    AfterColon,
    /// Text inside the first `[...]`, falling back to the text before `bytes`
    Bracketed,
    /// Digits in front of `hours`, falling back to the number after the colon
    Hours,
    /// First number after the label
    Number,
    /// `Enabled` if the line says so, otherwise `Disabled`
    SmartFlag,
    /// First all-digit column after an attribute-table name
    AttributeValue,
}

struct FieldRule {
    field: InfoField,
    labels: &'static [&'static str],
    extract: Extract,
}

/// Checked in order; the first rule whose label appears on a line claims it.
const RULES: &[FieldRule] = &[
    FieldRule { field: InfoField::ModelFamily, labels: &["Model Family:"], extract: Extract::AfterColon },
    FieldRule {
        field: InfoField::DeviceModel,
        labels: &["Device Model:", "Model Number:"],
        extract: Extract::AfterColon,
    },
    FieldRule { field: InfoField::SerialNumber, labels: &["Serial Number:"], extract: Extract::AfterColon },
    FieldRule { field: InfoField::FirmwareVersion, labels: &["Firmware Version:"], extract: Extract::AfterColon },
    FieldRule {
        field: InfoField::UserCapacity,
        labels: &["User Capacity:", "Total NVM Capacity:"],
        extract: Extract::Bracketed,
    },
    FieldRule { field: InfoField::RotationRate, labels: &["Rotation Rate:"], extract: Extract::AfterColon },
    FieldRule { field: InfoField::SmartSupport, labels: &["SMART support is:"], extract: Extract::SmartFlag },
    FieldRule { field: InfoField::LocalTime, labels: &["Local Time is:"], extract: Extract::AfterColon },
    FieldRule { field: InfoField::PowerOnHours, labels: &["Power On Hours:"], extract: Extract::Hours },
    FieldRule {
        field: InfoField::PowerCycleCount,
        labels: &["Power Cycle Count:", "Power Cycles:"],
        extract: Extract::Number,
    },
    FieldRule { field: InfoField::WearLeveling, labels: &["Wear_Leveling_Count"], extract: Extract::AttributeValue },
    FieldRule {
        field: InfoField::MediaWearout,
        labels: &["Media_Wearout_Indicator"],
        extract: Extract::AttributeValue,
    },
    FieldRule { field: InfoField::DataUnitsWritten, labels: &["Data Units Written:"], extract: Extract::AfterColon },
    FieldRule { field: InfoField::DataUnitsRead, labels: &["Data Units Read:"], extract: Extract::AfterColon },
];

/// Extracts the recognised identity fields from `smartctl -i` output.
///
/// Fields missing from the report are missing from the result. When a label
/// repeats, the last occurrence wins.
pub fn parse_device_info(report: &str) -> DeviceInfo {
    let mut info = DeviceInfo::new();

    for line in report.lines() {
        let Some((rule, label)) = RULES.iter().find_map(|rule| {
            rule.labels
                .iter()
                .find(|label| line.contains(*label))
                .map(|label| (rule, *label))
        }) else {
            continue;
        };

        match extract(line, label, rule.extract) {
            Some(value) => info.insert(rule.field, value),
            None => trace!("no value for {:?} in {:?}", rule.field, line),
        }
    }

    info
}

fn extract(line: &str, label: &str, how: Extract) -> Option<InfoValue> {
    match how {
        Extract::AfterColon => after_colon(line).map(|s| InfoValue::Text(s.to_string())),
        Extract::Bracketed => bracketed(line).map(|s| InfoValue::Text(s.to_string())),
        Extract::Hours => HOURS
            .captures(line)
            .and_then(|cap| parse_count(&cap[1]))
            .or_else(|| after_colon(line).and_then(first_number))
            .map(InfoValue::Count),
        Extract::Number => after_label(line, label).and_then(first_number).map(InfoValue::Count),
        Extract::SmartFlag => {
            let flag = if line.contains("Enabled") {
                SmartSupport::Enabled
            } else {
                SmartSupport::Disabled
            };
            Some(InfoValue::Text(flag.as_str().to_string()))
        }
        Extract::AttributeValue => after_label(line, label)?
            .split_whitespace()
            .find(|tok| tok.chars().all(|c| c.is_ascii_digit()))
            .and_then(|tok| tok.parse().ok())
            .map(InfoValue::Count),
    }
}

fn after_colon(line: &str) -> Option<&str> {
    let (_, value) = line.split_once(':')?;
    let value = value.trim();
    if value.is_empty() { None } else { Some(value) }
}

fn after_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    line.find(label).map(|idx| &line[idx + label.len()..])
}

fn bracketed(line: &str) -> Option<&str> {
    if let Some(cap) = BRACKETED.captures(line) {
        return cap.get(1).map(|m| m.as_str().trim());
    }
    let value = after_colon(line)?;
    let value = value.split("bytes").next().unwrap_or(value).trim();
    if value.is_empty() { None } else { Some(value) }
}

fn first_number(text: &str) -> Option<u64> {
    NUMBER.find(text).and_then(|m| parse_count(m.as_str()))
}

fn parse_count(digits: &str) -> Option<u64> {
    digits.replace(',', "").parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ATA_INFO: &str = "\
smartctl 7.3 2022-02-28 r5338 [x86_64-linux-6.1.0] (local build)

=== START OF INFORMATION SECTION ===
Model Family:     Western Digital Blue
Device Model:     WDC WD10EZEX-08WN4A0
Serial Number:    WD-WCC6Y0ABCDEF
Firmware Version: 02.01A02
User Capacity:    1,000,204,886,016 bytes [1.00 TB]
Sector Sizes:     512 bytes logical, 4096 bytes physical
Rotation Rate:    7200 rpm
Local Time is:    Sat Oct 18 10:00:00 2026 UTC
SMART support is: Available - device has SMART capability.
SMART support is: Enabled
";

    const NVME_INFO: &str = "\
=== START OF INFORMATION SECTION ===
Model Number:                       Samsung SSD 970 EVO Plus 1TB
Serial Number:                      S4EWNX0R123456
Firmware Version:                   2B2QEXM7
Total NVM Capacity:                 1,000,204,886,016 [1.00 TB]
Data Units Read:                    12,345,678 [6.32 TB]
Data Units Written:                 23,456,789 [12.0 TB]
Power Cycles:                       1,024
Power On Hours:                     5,321
";

    #[test]
    fn ata_identity_fields() {
        let info = parse_device_info(ATA_INFO);
        assert_eq!(info.text(InfoField::ModelFamily), Some("Western Digital Blue"));
        assert_eq!(info.text(InfoField::DeviceModel), Some("WDC WD10EZEX-08WN4A0"));
        assert_eq!(info.text(InfoField::SerialNumber), Some("WD-WCC6Y0ABCDEF"));
        assert_eq!(info.text(InfoField::FirmwareVersion), Some("02.01A02"));
        assert_eq!(info.text(InfoField::RotationRate), Some("7200 rpm"));
        assert_eq!(info.text(InfoField::LocalTime), Some("Sat Oct 18 10:00:00 2026 UTC"));
    }

    #[test]
    fn capacity_prefers_bracketed_value() {
        let info = parse_device_info("User Capacity: 1,000,204,886,016 bytes [1.00 TB]");
        assert_eq!(info.text(InfoField::UserCapacity), Some("1.00 TB"));
    }

    #[test]
    fn capacity_without_brackets_uses_byte_count() {
        let info = parse_device_info("User Capacity:    500,107,862,016 bytes");
        assert_eq!(info.text(InfoField::UserCapacity), Some("500,107,862,016"));
    }

    #[test]
    fn smart_support_last_line_wins() {
        let info = parse_device_info(ATA_INFO);
        assert_eq!(info.smart_support(), Some(SmartSupport::Enabled));

        let disabled = parse_device_info("SMART support is: Disabled\n");
        assert_eq!(disabled.smart_support(), Some(SmartSupport::Disabled));
    }

    #[test]
    fn nvme_variants() {
        let info = parse_device_info(NVME_INFO);
        assert_eq!(info.text(InfoField::DeviceModel), Some("Samsung SSD 970 EVO Plus 1TB"));
        assert_eq!(info.text(InfoField::UserCapacity), Some("1.00 TB"));
        assert_eq!(info.text(InfoField::DataUnitsRead), Some("12,345,678 [6.32 TB]"));
        assert_eq!(info.text(InfoField::DataUnitsWritten), Some("23,456,789 [12.0 TB]"));
        assert_eq!(info.count(InfoField::PowerCycleCount), Some(1024));
        assert_eq!(info.count(InfoField::PowerOnHours), Some(5321));
    }

    #[test]
    fn power_on_hours_before_unit_word() {
        let info = parse_device_info("Power On Hours: about 4,210 hours (175 days)");
        assert_eq!(info.count(InfoField::PowerOnHours), Some(4210));
    }

    #[test]
    fn wear_indicators_read_value_column() {
        let report = "177 Wear_Leveling_Count     0x0013   094   094   000    Pre-fail  Always       -       61\n\
                      233 Media_Wearout_Indicator 0x0032   087   087   000    Old_age   Always       -       0\n";
        let info = parse_device_info(report);
        assert_eq!(info.count(InfoField::WearLeveling), Some(94));
        assert_eq!(info.count(InfoField::MediaWearout), Some(87));
    }

    #[test]
    fn absent_fields_stay_absent() {
        let info = parse_device_info(ATA_INFO);
        assert!(!info.contains(InfoField::PowerOnHours));
        assert!(!info.contains(InfoField::DataUnitsWritten));
        assert_eq!(info.count(InfoField::PowerCycleCount), None);

        let empty = parse_device_info("");
        assert!(empty.is_empty());
    }

    #[test]
    fn unrecognised_lines_are_ignored() {
        let info = parse_device_info("Sector Sizes: 512 bytes logical\nATA Version is: ACS-3\n");
        assert!(info.is_empty());
    }
}
