// Command line and runtime configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Device-type hints handed to `smartctl -d`, tried in order.
pub const DEFAULT_DEVICE_TYPES: [&str; 8] = ["sat", "nvme", "usb", "usbjm", "usbscsi", "jmicron", "scsi", "ata"];

#[derive(Parser, Debug)]
#[command(name = "hdd_doctor", version, about = "Disk health checker and secure erase tool")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// smartctl binary
    #[arg(long, global = true, env = "HDD_DOCTOR_SMARTCTL", default_value = "smartctl")]
    pub smartctl: PathBuf,

    /// shred binary used for secure erase
    #[arg(long, global = true, env = "HDD_DOCTOR_SHRED", default_value = "shred")]
    pub shred: PathBuf,

    /// lsblk binary used to list disks
    #[arg(long, global = true, env = "HDD_DOCTOR_LSBLK", default_value = "lsblk")]
    pub lsblk: PathBuf,

    /// Seconds before a smartctl call is abandoned
    #[arg(long, global = true, env = "HDD_DOCTOR_TIMEOUT", default_value_t = 20)]
    pub timeout: u64,

    /// Comma separated smartctl device types to try
    #[arg(long, global = true, env = "HDD_DOCTOR_DEVICE_TYPES")]
    pub device_types: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open the graphical interface (default)
    Gui,
    /// Diagnose disks and print the results
    Scan {
        /// Only diagnose this device (e.g. /dev/sda)
        #[arg(long)]
        device: Option<String>,
    },
    /// Diagnose saved smartctl output
    Report {
        /// File holding `smartctl -A` output
        #[arg(long)]
        attributes: PathBuf,
        /// File holding `smartctl -i` output
        #[arg(long)]
        info: PathBuf,
    },
}

/// Settings shared by the scanner, the erase job and the front-ends.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub smartctl: PathBuf,
    pub shred: PathBuf,
    pub lsblk: PathBuf,
    pub device_types: Vec<String>,
    pub command_timeout: Duration,
    /// How often the GUI drains erase events
    pub poll_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            smartctl: PathBuf::from("smartctl"),
            shred: PathBuf::from("shred"),
            lsblk: PathBuf::from("lsblk"),
            device_types: DEFAULT_DEVICE_TYPES.iter().map(|s| s.to_string()).collect(),
            command_timeout: Duration::from_secs(20),
            poll_interval: Duration::from_millis(250),
        }
    }
}

impl From<&Cli> for AppConfig {
    fn from(cli: &Cli) -> Self {
        let mut config = AppConfig {
            smartctl: cli.smartctl.clone(),
            shred: cli.shred.clone(),
            lsblk: cli.lsblk.clone(),
            command_timeout: Duration::from_secs(cli.timeout.max(1)),
            ..AppConfig::default()
        };
        if let Some(list) = &cli.device_types {
            let types = parse_device_types(list);
            if !types.is_empty() {
                config.device_types = types;
            }
        }
        config
    }
}

fn parse_device_types(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_arguments() {
        let cli = Cli::try_parse_from(["hdd_doctor"]).unwrap();
        assert_eq!(cli.command, None);
        let config = AppConfig::from(&cli);
        assert_eq!(config.device_types.len(), DEFAULT_DEVICE_TYPES.len());
        assert_eq!(config.device_types[0], "sat");
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "hdd_doctor",
            "scan",
            "--device",
            "/dev/sdb",
            "--timeout",
            "5",
            "--device-types",
            "nvme, sat,,",
            "--smartctl",
            "/usr/sbin/smartctl",
        ])
        .unwrap();
        assert_eq!(cli.command, Some(Command::Scan { device: Some("/dev/sdb".into()) }));

        let config = AppConfig::from(&cli);
        assert_eq!(config.device_types, vec!["nvme".to_string(), "sat".to_string()]);
        assert_eq!(config.command_timeout, Duration::from_secs(5));
        assert_eq!(config.smartctl, PathBuf::from("/usr/sbin/smartctl"));
    }

    #[test]
    fn report_requires_both_files() {
        assert!(Cli::try_parse_from(["hdd_doctor", "report", "--attributes", "a.txt"]).is_err());
    }
}
