use crate::config::AppConfig;
use crate::error::{Result, ScanError};
use crate::models::{DiskEntry, PartitionInfo};
use crate::scanner::command::run_with_timeout;
use log::debug;
use std::collections::HashSet;
use std::path::Path;
use sysinfo::Disks;

/// Lists whole disks with `lsblk -o NAME,SIZE,TYPE,MODEL,VENDOR -n`.
pub fn list_disks(config: &AppConfig) -> Result<Vec<DiskEntry>> {
    let stdout = run_lsblk(config, &["-o", "NAME,SIZE,TYPE,MODEL,VENDOR", "-n"], "all disks")?;
    let disks = parse_lsblk(&stdout);
    debug!("lsblk reported {} disks", disks.len());
    Ok(disks)
}

fn run_lsblk(config: &AppConfig, args: &[&str], device: &str) -> Result<String> {
    let output = run_with_timeout(&config.lsblk, args, device, config.command_timeout)?;
    if !output.status.success() {
        return Err(ScanError::CommandFailed {
            tool: config.lsblk.display().to_string(),
            device: device.to_string(),
            detail: output.detail(),
        });
    }
    Ok(output.stdout)
}

/// Keeps rows whose TYPE column is `disk`; partitions, loops and ROMs drop out.
pub fn parse_lsblk(text: &str) -> Vec<DiskEntry> {
    let mut disks: Vec<DiskEntry> = text
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 3 || parts[2] != "disk" {
                return None;
            }
            Some(DiskEntry {
                path: format!("/dev/{}", parts[0]),
                name: parts[0].to_string(),
                size: parts[1].to_string(),
                model: parts[3..].join(" "),
            })
        })
        .collect();
    disks.sort_by(|a, b| a.path.cmp(&b.path));
    disks
}

/// Mounted filesystems that live on `dev_name` (e.g. `sda`, `nvme0n1`),
/// including those on partitions, LVM volumes and dm-crypt mappings stacked on it.
pub fn mounted_partitions(config: &AppConfig, dev_name: &str) -> Result<Vec<PartitionInfo>> {
    let tree = run_lsblk(config, &["-nr", "-o", "KNAME,PKNAME,MOUNTPOINT"], dev_name)?;
    let mounts = owned_mount_points(&tree, dev_name);
    debug!("{} has {} mounted filesystems", dev_name, mounts.len());

    let disks = Disks::new_with_refreshed_list();
    let parts = mounts
        .into_iter()
        .map(|mount_point| {
            // swap and unusual mounts have no sysinfo entry
            let Some(disk) = disks.iter().find(|d| d.mount_point() == Path::new(&mount_point)) else {
                return PartitionInfo {
                    mount_point,
                    fs_type: "-".to_string(),
                    total_gb: 0.0,
                    used_gb: 0.0,
                    free_gb: 0.0,
                    used_percent: 0.0,
                };
            };

            let total = disk.total_space() as f64 / 1_000_000_000.0;
            let available = disk.available_space() as f64 / 1_000_000_000.0;
            let used = total - available;
            let used_percent = if total > 0.0 { (used / total) * 100.0 } else { 0.0 };

            PartitionInfo {
                mount_point,
                fs_type: disk.file_system().to_string_lossy().into_owned(),
                total_gb: total,
                used_gb: used,
                free_gb: available,
                used_percent,
            }
        })
        .collect();

    Ok(parts)
}

/// One row of `lsblk -nr -o KNAME,PKNAME,MOUNTPOINT`.
#[derive(Debug, PartialEq)]
struct BlockRow {
    kname: String,
    parent: String,
    mount_point: Option<String>,
}

fn parse_block_rows(text: &str) -> Vec<BlockRow> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut fields = line.splitn(3, ' ');
            let kname = fields.next().unwrap_or("").to_string();
            let parent = fields.next().unwrap_or("").to_string();
            let mount_point = fields.next().map(unescape).filter(|m| !m.is_empty());
            BlockRow { kname, parent, mount_point }
        })
        .collect()
}

/// Mount points of `dev_name` and every device below it in the block tree.
/// Ownership follows PKNAME links, so `nvme0n10` is never taken for a
/// partition of `nvme0n1` and `dm-*` children are followed through.
fn owned_mount_points(text: &str, dev_name: &str) -> Vec<String> {
    let rows = parse_block_rows(text);
    let mut owned: HashSet<&str> = HashSet::from([dev_name]);
    loop {
        let before = owned.len();
        for row in &rows {
            if owned.contains(row.parent.as_str()) {
                owned.insert(row.kname.as_str());
            }
        }
        if owned.len() == before {
            break;
        }
    }

    let mut mounts: Vec<String> = rows
        .iter()
        .filter(|row| owned.contains(row.kname.as_str()))
        .filter_map(|row| row.mount_point.clone())
        .collect();
    mounts.sort();
    mounts.dedup();
    mounts
}

/// lsblk raw output writes unsafe characters as `\xHH`.
fn unescape(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut rest = field;
    while let Some(pos) = rest.find("\\x") {
        out.push_str(&rest[..pos]);
        match rest.get(pos + 2..pos + 4).and_then(|hex| u8::from_str_radix(hex, 16).ok()) {
            Some(byte) => {
                out.push(byte as char);
                rest = &rest[pos + 4..];
            }
            None => {
                out.push_str("\\x");
                rest = &rest[pos + 2..];
            }
        }
    }
    out.push_str(rest);
    out
}
