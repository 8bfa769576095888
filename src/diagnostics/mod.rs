// Diagnostic core: smartctl text parsing, health scoring and erase progress tracking

// Attribute table parsing (smartctl -A)
mod attributes;
// Identity field extraction (smartctl -i)
mod device_info;
// Incremental shred progress scanner
mod progress;
// Heuristic health scoring rules
mod scorer;
// Parse-then-score composition for one device
mod session;

pub use attributes::parse_attributes;
pub use device_info::parse_device_info;
pub use progress::{ProgressStatus, ProgressTracker};
pub use scorer::{FAILURE_COUNTER_IDS, RULES, Rule, attribute_status, score};
pub use session::{diagnose, unavailable};
