// Data models for parsed smartctl reports, diagnostic results and erase progress

use std::collections::BTreeMap;
use std::fmt;

/// Represents a single row of the smartctl attribute table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    /// Vendor-assigned attribute identifier
    pub id: u16,
    /// Vendor mnemonic (e.g., Reallocated_Sector_Ct)
    pub name: String,
    /// Normalised current value
    pub current: u16,
    /// Worst normalised value ever recorded
    pub worst: u16,
    /// Failure threshold, 0 means the vendor defines none
    pub threshold: u16,
    /// Attribute type tag (Pre-fail, Old_age)
    pub kind: String,
    /// Update policy (Always, Offline), informational only
    pub updated: String,
    /// Attribute-specific raw counter
    pub raw_value: i64,
}

impl Attribute {
    /// Temperature attributes are recognised by id 194 or by name.
    pub fn is_temperature(&self) -> bool {
        self.id == 194 || self.name.contains("Temperature")
    }

    /// Reading used by the temperature heuristics: raw value for id 194,
    /// normalised current value otherwise.
    pub fn temperature_reading(&self) -> i64 {
        if self.id == 194 {
            self.raw_value
        } else {
            i64::from(self.current)
        }
    }
}

/// Display classification for a single attribute row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeStatus {
    /// Nothing notable
    Good,
    /// Failure counter is nonzero or the drive runs warm
    Warning,
    /// Current value dropped below the vendor threshold
    Critical,
}

/// Fields recognised in a smartctl info report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InfoField {
    ModelFamily,
    DeviceModel,
    SerialNumber,
    FirmwareVersion,
    UserCapacity,
    RotationRate,
    SmartSupport,
    LocalTime,
    PowerOnHours,
    PowerCycleCount,
    WearLeveling,
    MediaWearout,
    DataUnitsWritten,
    DataUnitsRead,
}

impl InfoField {
    /// Every field in display order.
    pub const ALL: [InfoField; 14] = [
        InfoField::ModelFamily,
        InfoField::DeviceModel,
        InfoField::SerialNumber,
        InfoField::FirmwareVersion,
        InfoField::UserCapacity,
        InfoField::RotationRate,
        InfoField::SmartSupport,
        InfoField::LocalTime,
        InfoField::PowerOnHours,
        InfoField::PowerCycleCount,
        InfoField::WearLeveling,
        InfoField::MediaWearout,
        InfoField::DataUnitsWritten,
        InfoField::DataUnitsRead,
    ];

    /// Human-readable label used by the front-ends.
    pub fn label(self) -> &'static str {
        match self {
            InfoField::ModelFamily => "Model Family",
            InfoField::DeviceModel => "Device Model",
            InfoField::SerialNumber => "Serial Number",
            InfoField::FirmwareVersion => "Firmware",
            InfoField::UserCapacity => "Capacity",
            InfoField::RotationRate => "Rotation Rate",
            InfoField::SmartSupport => "SMART Supported",
            InfoField::LocalTime => "Local Time",
            InfoField::PowerOnHours => "Power On Hours",
            InfoField::PowerCycleCount => "Power Cycles",
            InfoField::WearLeveling => "Wear Leveling",
            InfoField::MediaWearout => "Media Wearout",
            InfoField::DataUnitsWritten => "Data Units Written",
            InfoField::DataUnitsRead => "Data Units Read",
        }
    }
}

/// A parsed info value; counters are kept numeric.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InfoValue {
    Text(String),
    Count(u64),
}

impl fmt::Display for InfoValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfoValue::Text(s) => f.write_str(s),
            InfoValue::Count(n) => write!(f, "{}", n),
        }
    }
}

/// Normalised SMART support state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SmartSupport {
    Enabled,
    Disabled,
}

impl SmartSupport {
    pub fn as_str(self) -> &'static str {
        match self {
            SmartSupport::Enabled => "Enabled",
            SmartSupport::Disabled => "Disabled",
        }
    }
}

/// Identity and capability fields extracted from an info report.
/// Only fields actually present in the report are stored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    fields: BTreeMap<InfoField, InfoValue>,
}

impl DeviceInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: InfoField, value: InfoValue) {
        self.fields.insert(field, value);
    }

    pub fn get(&self, field: InfoField) -> Option<&InfoValue> {
        self.fields.get(&field)
    }

    /// Text value of a field, if present and textual.
    pub fn text(&self, field: InfoField) -> Option<&str> {
        match self.fields.get(&field) {
            Some(InfoValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Numeric value of a field, if present and numeric.
    pub fn count(&self, field: InfoField) -> Option<u64> {
        match self.fields.get(&field) {
            Some(InfoValue::Count(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn smart_support(&self) -> Option<SmartSupport> {
        match self.text(InfoField::SmartSupport) {
            Some("Enabled") => Some(SmartSupport::Enabled),
            Some("Disabled") => Some(SmartSupport::Disabled),
            _ => None,
        }
    }

    pub fn contains(&self, field: InfoField) -> bool {
        self.fields.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Present fields in display order.
    pub fn iter(&self) -> impl Iterator<Item = (InfoField, &InfoValue)> {
        self.fields.iter().map(|(k, v)| (*k, v))
    }
}

/// Numeric health score, or unknown when no attribute data could be evaluated.
/// `Value(0)` means the drive was evaluated and is in catastrophic condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HealthScore {
    Unknown,
    Value(u8),
}

impl HealthScore {
    pub fn value(self) -> Option<u8> {
        match self {
            HealthScore::Unknown => None,
            HealthScore::Value(v) => Some(v),
        }
    }
}

impl fmt::Display for HealthScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthScore::Unknown => f.write_str("Unknown"),
            HealthScore::Value(v) => write!(f, "{}%", v),
        }
    }
}

/// Health category derived from the score band.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verdict {
    Excellent,
    Good,
    Fair,
    Critical,
    Unknown,
}

impl Verdict {
    /// Maps a clamped score to its band.
    pub fn from_score(score: u8) -> Self {
        match score {
            85.. => Verdict::Excellent,
            70..=84 => Verdict::Good,
            60..=69 => Verdict::Fair,
            _ => Verdict::Critical,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Verdict::Excellent => "Excellent",
            Verdict::Good => "Good",
            Verdict::Fair => "Fair",
            Verdict::Critical => "Poor / Critical",
            Verdict::Unknown => "Unknown",
        }
    }

    /// Fixed note shown above the warning list.
    pub fn note(self) -> &'static str {
        match self {
            Verdict::Excellent => "Drive condition is EXCELLENT. No action is required.",
            Verdict::Good => {
                "Drive condition is GOOD. Minor warnings may be present. Regular checks are recommended."
            }
            Verdict::Fair => {
                "Drive condition is FAIR. Some problems were detected. Back up your data and keep an eye on the drive."
            }
            Verdict::Critical => {
                "Drive condition is POOR or CRITICAL. Back up immediately and replace the drive. Risk of data loss is very high!"
            }
            Verdict::Unknown => "Drive health cannot be determined.",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of one scoring pass. Built once and never modified afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticResult {
    score: HealthScore,
    verdict: Verdict,
    warnings: Vec<String>,
    /// Explanation attached to an unknown result
    reason: Option<String>,
}

impl DiagnosticResult {
    pub(crate) fn scored(score: u8, warnings: Vec<String>) -> Self {
        Self {
            score: HealthScore::Value(score),
            verdict: Verdict::from_score(score),
            warnings,
            reason: None,
        }
    }

    /// Result for a device whose attributes could not be evaluated.
    pub fn unknown(reason: impl Into<String>) -> Self {
        Self {
            score: HealthScore::Unknown,
            verdict: Verdict::Unknown,
            warnings: Vec::new(),
            reason: Some(reason.into()),
        }
    }

    pub fn score(&self) -> HealthScore {
        self.score
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn is_unknown(&self) -> bool {
        self.score == HealthScore::Unknown
    }

    /// Band note followed by the warning list, one dash-prefixed line each.
    pub fn notes(&self) -> String {
        let mut notes = String::from(self.verdict.note());
        if let Some(reason) = &self.reason {
            notes.push(' ');
            notes.push_str(reason);
        }
        if !self.warnings.is_empty() {
            notes.push_str("\n\nDetected warnings:");
            for w in &self.warnings {
                notes.push_str("\n- ");
                notes.push_str(w);
            }
        }
        notes
    }
}

/// Raw text obtained from smartctl for one device.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawReports {
    /// Output of `smartctl -A`
    pub attributes: String,
    /// Output of `smartctl -i`
    pub info: String,
}

/// Everything produced by diagnosing one device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceReport {
    pub info: DeviceInfo,
    pub attributes: Vec<Attribute>,
    pub result: DiagnosticResult,
}

/// A whole disk as listed by lsblk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiskEntry {
    /// Device path (e.g., /dev/sda)
    pub path: String,
    /// Kernel name (e.g., sda)
    pub name: String,
    /// Human size column (e.g., 931.5G)
    pub size: String,
    /// Model and vendor columns joined, may be empty
    pub model: String,
}

impl DiskEntry {
    /// Label used in disk lists: "sda (931.5G) - Samsung SSD".
    pub fn display_name(&self) -> String {
        if self.model.is_empty() {
            format!("{} ({})", self.name, self.size)
        } else {
            format!("{} ({}) - {}", self.name, self.size, self.model)
        }
    }
}

/// Information about a mounted partition on a disk.
#[derive(Clone, Debug)]
pub struct PartitionInfo {
    /// Directory where the partition is mounted (e.g., /home)
    pub mount_point: String,
    /// Filesystem type (e.g., ext4, ntfs)
    pub fs_type: String,
    /// Total capacity in gigabytes
    pub total_gb: f64,
    /// Used space in gigabytes
    pub used_gb: f64,
    /// Available free space in gigabytes
    pub free_gb: f64,
    /// Percentage of space currently used (0-100)
    pub used_percent: f64,
}

/// Lifecycle of an erase operation as seen by the progress tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErasePhase {
    Idle,
    Running,
    Terminated,
}

/// Mutable tracker state, owned by one tracker for one erase operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressState {
    pub phase: ErasePhase,
    /// Most recent percentage seen on a completed line
    pub last_percentage: Option<u8>,
    /// Unterminated tail of the stream, kept until its newline arrives
    pub pending_partial_line: Vec<u8>,
    /// A pass-start marker was seen before any percentage
    pub started: bool,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            phase: ErasePhase::Idle,
            last_percentage: None,
            pending_partial_line: Vec::new(),
            started: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_bands() {
        assert_eq!(Verdict::from_score(100), Verdict::Excellent);
        assert_eq!(Verdict::from_score(85), Verdict::Excellent);
        assert_eq!(Verdict::from_score(84), Verdict::Good);
        assert_eq!(Verdict::from_score(70), Verdict::Good);
        assert_eq!(Verdict::from_score(69), Verdict::Fair);
        assert_eq!(Verdict::from_score(60), Verdict::Fair);
        assert_eq!(Verdict::from_score(59), Verdict::Critical);
        assert_eq!(Verdict::from_score(0), Verdict::Critical);
    }

    #[test]
    fn unknown_is_not_zero() {
        let unknown = DiagnosticResult::unknown("no data");
        let zero = DiagnosticResult::scored(0, vec![]);
        assert_ne!(unknown.score(), zero.score());
        assert_eq!(unknown.score().value(), None);
        assert_eq!(zero.score().value(), Some(0));
        assert_eq!(unknown.verdict(), Verdict::Unknown);
        assert_eq!(zero.verdict(), Verdict::Critical);
    }

    #[test]
    fn temperature_reading_source() {
        let mut attr = Attribute {
            id: 194,
            name: "Temperature_Celsius".into(),
            current: 40,
            worst: 30,
            threshold: 0,
            kind: "Old_age".into(),
            updated: "Always".into(),
            raw_value: 65,
        };
        assert_eq!(attr.temperature_reading(), 65);
        attr.id = 190;
        attr.name = "Airflow_Temperature_Cel".into();
        assert!(attr.is_temperature());
        assert_eq!(attr.temperature_reading(), 40);
    }

    #[test]
    fn disk_display_name() {
        let disk = DiskEntry {
            path: "/dev/sda".into(),
            name: "sda".into(),
            size: "931.5G".into(),
            model: "WDC WD10EZEX".into(),
        };
        assert_eq!(disk.display_name(), "sda (931.5G) - WDC WD10EZEX");
    }
}
