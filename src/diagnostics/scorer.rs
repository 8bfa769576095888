use crate::models::{Attribute, AttributeStatus, DeviceInfo, DiagnosticResult};
use log::debug;

/// Attribute ids whose raw counter should stay at zero on a healthy drive:
/// read errors, reallocations, seek errors, reallocation events, pending,
/// uncorrectable and interface CRC errors.
pub const FAILURE_COUNTER_IDS: [u16; 7] = [1, 5, 7, 196, 197, 198, 199];

const TEMPERATURE_HIGH: i64 = 50;
const TEMPERATURE_CRITICAL: i64 = 60;
const WEAR_LEVELING_ID: u16 = 177;
const WEAR_LEVELING_LIMIT: i64 = 50_000;
const MEDIA_WEAROUT_ID: u16 = 233;

/// One scoring heuristic. Every rule is checked against every attribute and
/// all deductions that fire are summed.
pub struct Rule {
    pub name: &'static str,
    pub deduction: i32,
    pub applies: fn(&Attribute) -> bool,
    pub message: fn(&Attribute) -> String,
}

/// The temperature rules are independent: a reading above 60 also crosses
/// 50, so it is charged by both.
pub const RULES: &[Rule] = &[
    Rule {
        name: "below-threshold",
        deduction: 15,
        applies: |a| a.threshold > 0 && a.current < a.threshold,
        message: |a| {
            format!(
                "'{}' (ID {}) is below its critical threshold ({} < {})",
                a.name, a.id, a.current, a.threshold
            )
        },
    },
    Rule {
        name: "failure-counter",
        deduction: 10,
        applies: |a| FAILURE_COUNTER_IDS.contains(&a.id) && a.raw_value > 0,
        message: |a| format!("'{}' (ID {}) raw value is above zero ({})", a.name, a.id, a.raw_value),
    },
    Rule {
        name: "temperature-high",
        deduction: 5,
        applies: |a| a.is_temperature() && a.temperature_reading() > TEMPERATURE_HIGH,
        message: |a| format!("Drive temperature is high ({}°C)", a.temperature_reading()),
    },
    Rule {
        name: "temperature-critical",
        deduction: 15,
        applies: |a| a.is_temperature() && a.temperature_reading() > TEMPERATURE_CRITICAL,
        message: |a| format!("Drive temperature is critical ({}°C)!", a.temperature_reading()),
    },
    Rule {
        name: "wear-leveling",
        deduction: 5,
        applies: |a| a.id == WEAR_LEVELING_ID && a.raw_value > WEAR_LEVELING_LIMIT,
        message: |a| format!("SSD wear level is high: {} (Wear_Leveling_Count)", a.raw_value),
    },
    Rule {
        name: "remaining-life-critical",
        deduction: 20,
        applies: |a| a.id == MEDIA_WEAROUT_ID && a.raw_value < 100 && a.raw_value < 20,
        message: |a| format!("SSD remaining life is critical: {}% (Media_Wearout_Indicator)", a.raw_value),
    },
    Rule {
        name: "remaining-life-low",
        deduction: 10,
        applies: |a| a.id == MEDIA_WEAROUT_ID && a.raw_value < 100 && (20..50).contains(&a.raw_value),
        message: |a| format!("SSD remaining life is low: {}% (Media_Wearout_Indicator)", a.raw_value),
    },
];

/// Scores a drive from its parsed attributes.
///
/// An empty attribute list yields the unknown result, never a numeric score.
/// The info record is accepted for future rules; none of the current rules
/// read it.
pub fn score(attributes: &[Attribute], _info: &DeviceInfo) -> DiagnosticResult {
    if attributes.is_empty() {
        return DiagnosticResult::unknown("No SMART attributes could be read from this device.");
    }

    let mut total: i32 = 100;
    let mut warnings = Vec::new();

    for attr in attributes {
        for rule in RULES.iter().filter(|rule| (rule.applies)(attr)) {
            debug!("{} (id {}): {} -{}", attr.name, attr.id, rule.name, rule.deduction);
            total -= rule.deduction;
            warnings.push((rule.message)(attr));
        }
    }

    let clamped = total.clamp(0, 100) as u8;
    DiagnosticResult::scored(clamped, warnings)
}

/// Row classification used when displaying the attribute table.
pub fn attribute_status(attr: &Attribute) -> AttributeStatus {
    if attr.threshold > 0 && attr.current < attr.threshold {
        AttributeStatus::Critical
    } else if (FAILURE_COUNTER_IDS.contains(&attr.id) && attr.raw_value > 0)
        || (attr.is_temperature() && attr.temperature_reading() > TEMPERATURE_HIGH)
    {
        AttributeStatus::Warning
    } else {
        AttributeStatus::Good
    }
}
