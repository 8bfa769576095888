use crate::models::Attribute;
use log::trace;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Header line that opens the attribute table.
const TABLE_HEADER: &str = "ID# ATTRIBUTE_NAME";

/// Section titles that close the attribute table.
const SECTION_BOUNDARIES: [&str; 2] = ["SMART Error Log", "SMART Self-test Log"];

/// `id name flags current worst threshold type updated when_failed raw`
/// with an optional trailing annotation such as `(Min/Max 18/52)`.
static ROW_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(\d+)\s+([A-Za-z0-9_]+)\s+(\S+)\s+(\d+)\s+(\d+)\s+(\d+)\s+(\S+)\s+(\S+)\s+(\S+)(?:\s+(\S+))?(?:\s+\(.*\))?\s*$",
    )
    .unwrap()
});

/// Parses the attribute table out of `smartctl -A` output.
///
/// Lines before the table header are ignored and the table ends at the first
/// blank line or section boundary. Rows that do not fit the grammar are
/// skipped; a raw value that is not an integer becomes 0.
pub fn parse_attributes(report: &str) -> Vec<Attribute> {
    let mut attributes = Vec::new();
    let mut in_table = false;

    for line in report.lines() {
        if !in_table {
            in_table = line.contains(TABLE_HEADER);
            continue;
        }

        if line.trim().is_empty() || SECTION_BOUNDARIES.iter().any(|b| line.contains(b)) {
            break;
        }

        match ROW_REGEX.captures(line).and_then(|cap| row_from_captures(&cap)) {
            Some(attr) => attributes.push(attr),
            None => trace!("skipping non-attribute line: {:?}", line),
        }
    }

    attributes
}

fn row_from_captures(cap: &Captures<'_>) -> Option<Attribute> {
    let id = cap[1].parse::<u16>().ok()?;
    Some(Attribute {
        id,
        name: cap[2].to_string(),
        current: parse_value(&cap[4]),
        worst: parse_value(&cap[5]),
        threshold: parse_value(&cap[6]),
        kind: cap[7].to_string(),
        updated: cap[8].to_string(),
        raw_value: cap.get(10).map(|m| parse_raw(m.as_str())).unwrap_or(0),
    })
}

fn parse_value(token: &str) -> u16 {
    token.parse().unwrap_or(0)
}

/// Raw values that are placeholders (`-`) or not plain integers read as 0.
fn parse_raw(token: &str) -> i64 {
    token.parse().unwrap_or(0)
}
