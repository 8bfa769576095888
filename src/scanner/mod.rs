// External tool plumbing: lsblk, smartctl and shred

// Child process execution with a deadline
mod command;
// Disk listing and mounted partition lookup
mod disks;
// Background shred job and its progress
mod erase;
// smartctl invocation with device-type fallback
mod smartctl;

pub use disks::{list_disks, mounted_partitions, parse_lsblk};
pub use erase::{EraseEvent, EraseMonitor, EraseOutcome};
pub use smartctl::fetch_reports;

use crate::config::AppConfig;
use crate::diagnostics;
use crate::models::{DeviceReport, DiskEntry};
use log::warn;

/// smartctl and shred need raw device access.
pub fn is_root() -> bool {
    nix::unistd::geteuid().is_root()
}

/// Fetches and diagnoses one disk. Tool failures become an unknown result.
pub fn diagnose_disk(config: &AppConfig, disk: &DiskEntry) -> DeviceReport {
    match fetch_reports(config, &disk.path) {
        Ok(reports) => diagnostics::diagnose(&disk.path, &reports),
        Err(e) => {
            warn!("{}: {}", disk.path, e);
            diagnostics::unavailable(&disk.path, &e.to_string())
        }
    }
}
