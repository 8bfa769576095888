use crate::error::{Result, ScanError};
use log::debug;
use std::io::Read;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const WAIT_STEP: Duration = Duration::from_millis(25);

/// Captured result of a finished external command.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Stderr if it says anything, otherwise stdout; smartctl reports most
    /// problems on stdout.
    pub fn detail(&self) -> String {
        let err = self.stderr.trim();
        if err.is_empty() {
            let out = self.stdout.trim();
            if out.is_empty() {
                format!("exit status {}", self.status)
            } else {
                out.lines().last().unwrap_or(out).to_string()
            }
        } else {
            err.to_string()
        }
    }
}

/// Runs `tool args...`, killing it once `timeout` passes.
///
/// Both pipes are drained on helper threads so a chatty child cannot block on
/// a full pipe while we wait for it.
pub fn run_with_timeout(tool: &Path, args: &[&str], device: &str, timeout: Duration) -> Result<CommandOutput> {
    debug!("running {} {}", tool.display(), args.join(" "));

    let mut child = Command::new(tool)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ScanError::from_spawn(tool, e))?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let stdout_reader = thread::spawn(move || drain(stdout));
    let stderr_reader = thread::spawn(move || drain(stderr));

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ScanError::Timeout {
                tool: tool.display().to_string(),
                device: device.to_string(),
                secs: timeout.as_secs(),
            });
        }
        thread::sleep(WAIT_STEP);
    };

    let stdout = stdout_reader.join().unwrap_or_default();
    let stderr = stderr_reader.join().unwrap_or_default();

    Ok(CommandOutput {
        status,
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
    })
}

fn drain<R: Read>(pipe: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf);
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;

    #[test]
    fn detail_prefers_stderr() {
        let out = CommandOutput {
            status: ExitStatus::from_raw(2 << 8),
            stdout: "smartctl 7.3\nSmartctl open device: /dev/sdz failed: No such device\n".into(),
            stderr: String::new(),
        };
        assert_eq!(out.detail(), "Smartctl open device: /dev/sdz failed: No such device");

        let out = CommandOutput { stderr: "permission denied\n".into(), ..out };
        assert_eq!(out.detail(), "permission denied");
    }

    #[test]
    fn missing_tool_is_reported() {
        let err = run_with_timeout(
            Path::new("/nonexistent/hdd-doctor-test-tool"),
            &[],
            "/dev/null",
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert!(matches!(err, ScanError::ToolNotFound(_)));
    }
}
