use std::path::PathBuf;
use thiserror::Error;

/// Failures of the external tools this program drives.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("'{0}' was not found, make sure it is installed and on PATH")]
    ToolNotFound(PathBuf),

    #[error("{tool} timed out after {secs}s on {device}")]
    Timeout { tool: String, device: String, secs: u64 },

    #[error("{tool} failed on {device}: {detail}")]
    CommandFailed { tool: String, device: String, detail: String },

    #[error("no device type gave SMART data for {device}: {detail}")]
    NoUsableDeviceType { device: String, detail: String },

    #[error("an erase is already running on {0}")]
    EraseInProgress(String),

    #[error("could not start {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Process exit code for the console front-end.
    pub fn exit_code(&self) -> i32 {
        match self {
            ScanError::ToolNotFound(_) => 127,
            ScanError::Timeout { .. } => 124,
            ScanError::EraseInProgress(_) => 3,
            ScanError::Io(_)
            | ScanError::CommandFailed { .. }
            | ScanError::NoUsableDeviceType { .. }
            | ScanError::Spawn { .. } => 1,
        }
    }

    /// Maps a spawn failure, turning a missing binary into `ToolNotFound`.
    pub fn from_spawn(tool: &std::path::Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            ScanError::ToolNotFound(tool.to_path_buf())
        } else {
            ScanError::Spawn { tool: tool.display().to_string(), source: err }
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::Path;

    #[test]
    fn missing_binary_maps_to_tool_not_found() {
        let err = ScanError::from_spawn(Path::new("smartctl"), io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, ScanError::ToolNotFound(_)));
        assert_eq!(err.exit_code(), 127);

        let err = ScanError::from_spawn(Path::new("shred"), io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, ScanError::Spawn { .. }));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn exit_codes() {
        let timeout = ScanError::Timeout { tool: "lsblk".into(), device: "all disks".into(), secs: 5 };
        assert_eq!(timeout.exit_code(), 124);
        assert_eq!(ScanError::EraseInProgress("/dev/sdb".into()).exit_code(), 3);
        let failed = ScanError::NoUsableDeviceType { device: "/dev/sdb".into(), detail: "none".into() };
        assert_eq!(failed.exit_code(), 1);
    }

    #[test]
    fn messages() {
        let err = ScanError::Timeout { tool: "smartctl".into(), device: "/dev/sda".into(), secs: 20 };
        assert_eq!(err.to_string(), "smartctl timed out after 20s on /dev/sda");
    }
}
