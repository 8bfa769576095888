use crate::config::AppConfig;
use crate::diagnostics::ProgressTracker;
use crate::error::{Result, ScanError};
use log::{error, info, warn};
use std::io::{ErrorKind, Read};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

const CHUNK_SIZE: usize = 4096;
/// Stderr kept for the failure message.
const DETAIL_LIMIT: usize = 2048;

/// Messages sent from the stderr reader thread to the owner of the monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EraseEvent {
    /// A raw chunk of shred's stderr, not aligned to lines
    Output(Vec<u8>),
    /// The process ended
    Exited { code: Option<i32>, detail: String },
}

/// How the last erase ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EraseOutcome {
    Completed,
    Failed { code: Option<i32>, detail: String },
}

/// Owns at most one running `shred` job and its progress tracker.
///
/// The tracker is only touched from the thread that calls [`EraseMonitor::poll`];
/// the reader thread just forwards bytes.
#[derive(Debug, Default)]
pub struct EraseMonitor {
    device: Option<String>,
    events: Option<Receiver<EraseEvent>>,
    tracker: ProgressTracker,
    outcome: Option<EraseOutcome>,
}

impl EraseMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.events.is_some()
    }

    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }

    pub fn outcome(&self) -> Option<&EraseOutcome> {
        self.outcome.as_ref()
    }

    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    /// Starts `shred -v -n 0 -z <device>`. Refused while another job runs.
    pub fn start(&mut self, config: &AppConfig, device: &str) -> Result<()> {
        if let Some(running) = self.device.as_deref().filter(|_| self.is_running()) {
            return Err(ScanError::EraseInProgress(running.to_string()));
        }

        let mut child = Command::new(&config.shred)
            .args(["-v", "-n", "0", "-z", device])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ScanError::from_spawn(&config.shred, e))?;
        info!("erase started on {} (pid {})", device, child.id());

        let stderr = child.stderr.take();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let detail = forward(stderr, &tx);
            let code = match child.wait() {
                Ok(status) => status.code(),
                Err(e) => {
                    error!("waiting for shred failed: {}", e);
                    None
                }
            };
            let _ = tx.send(EraseEvent::Exited { code, detail });
        });

        self.attach(device, rx);
        Ok(())
    }

    fn attach(&mut self, device: &str, events: Receiver<EraseEvent>) {
        self.tracker.reset();
        self.outcome = None;
        self.device = Some(device.to_string());
        self.events = Some(events);
    }

    /// Applies every event that has arrived. Returns true if anything did.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        loop {
            let Some(events) = &self.events else {
                return changed;
            };
            match events.try_recv() {
                Ok(event) => {
                    self.handle(event);
                    changed = true;
                }
                Err(TryRecvError::Empty) => return changed,
                Err(TryRecvError::Disconnected) => {
                    warn!("erase reader went away without an exit status");
                    self.handle(EraseEvent::Exited { code: None, detail: "reader thread stopped".to_string() });
                    return true;
                }
            }
        }
    }

    fn handle(&mut self, event: EraseEvent) {
        match event {
            EraseEvent::Output(chunk) => {
                self.tracker.feed(&chunk);
            }
            EraseEvent::Exited { code, detail } => {
                self.tracker.finish();
                self.events = None;
                let device = self.device.as_deref().unwrap_or("?");
                self.outcome = Some(if code == Some(0) {
                    info!("erase of {} completed", device);
                    EraseOutcome::Completed
                } else {
                    error!("erase of {} failed with {:?}: {}", device, code, detail.trim());
                    EraseOutcome::Failed { code, detail }
                });
            }
        }
    }

    /// Single-line status for the progress label.
    pub fn progress_label(&self) -> String {
        let progress = self.tracker.status().display();
        if self.is_running() {
            format!("Erasing: {}", progress)
        } else if self.outcome.is_some() {
            format!("Finished: {}", progress)
        } else {
            "No erase running".to_string()
        }
    }
}

/// Forwards stderr chunks until EOF and returns the tail of what was read.
fn forward<R: Read>(pipe: Option<R>, tx: &Sender<EraseEvent>) -> String {
    let mut tail: Vec<u8> = Vec::new();
    let Some(mut pipe) = pipe else {
        return String::new();
    };
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        match pipe.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                tail.extend_from_slice(&buf[..n]);
                if tail.len() > DETAIL_LIMIT {
                    tail.drain(..tail.len() - DETAIL_LIMIT);
                }
                if tx.send(EraseEvent::Output(buf[..n].to_vec())).is_err() {
                    break;
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("reading shred output failed: {}", e);
                break;
            }
        }
    }
    String::from_utf8_lossy(&tail).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ProgressStatus;
    use crate::models::ErasePhase;
    use std::path::PathBuf;

    fn attached(device: &str) -> (EraseMonitor, Sender<EraseEvent>) {
        let (tx, rx) = mpsc::channel();
        let mut monitor = EraseMonitor::new();
        monitor.attach(device, rx);
        (monitor, tx)
    }

    #[test]
    fn events_drive_the_tracker() {
        let (mut monitor, tx) = attached("/dev/sdz");
        assert!(monitor.is_running());
        assert_eq!(monitor.progress_label(), "Erasing: --%");

        tx.send(EraseEvent::Output(b"shred: /dev/sdz: pass 1/1 (000000)...\n".to_vec())).unwrap();
        assert!(monitor.poll());
        assert_eq!(monitor.progress_label(), "Erasing: Starting...");

        tx.send(EraseEvent::Output(b"shred: /dev/sdz: pass 1/1 (000000)...1GiB/4GiB 2".to_vec())).unwrap();
        tx.send(EraseEvent::Output(b"5%\n".to_vec())).unwrap();
        monitor.poll();
        assert_eq!(monitor.tracker().status(), ProgressStatus::Percent(25));
        assert!(!monitor.poll());
    }

    #[test]
    fn exit_records_outcome_and_keeps_last_percentage() {
        let (mut monitor, tx) = attached("/dev/sdz");
        tx.send(EraseEvent::Output(b"pass 1/1 (000000)...3GiB/4GiB 75%\npass 1/1".to_vec())).unwrap();
        tx.send(EraseEvent::Exited { code: Some(1), detail: "shred: /dev/sdz: error writing".into() })
            .unwrap();
        monitor.poll();

        assert!(!monitor.is_running());
        assert_eq!(monitor.tracker().phase(), ErasePhase::Terminated);
        assert_eq!(monitor.progress_label(), "Finished: 75%");
        assert_eq!(
            monitor.outcome(),
            Some(&EraseOutcome::Failed { code: Some(1), detail: "shred: /dev/sdz: error writing".into() })
        );
    }

    #[test]
    fn dropped_sender_counts_as_exit() {
        let (mut monitor, tx) = attached("/dev/sdz");
        drop(tx);
        assert!(monitor.poll());
        assert!(!monitor.is_running());
        assert!(matches!(monitor.outcome(), Some(EraseOutcome::Failed { code: None, .. })));
    }

    #[test]
    fn second_erase_is_refused() {
        let (mut monitor, _tx) = attached("/dev/sdz");
        let err = monitor.start(&AppConfig::default(), "/dev/sdy").unwrap_err();
        assert!(matches!(err, ScanError::EraseInProgress(ref d) if d == "/dev/sdz"));
    }

    #[test]
    fn missing_shred_is_reported() {
        let config = AppConfig { shred: PathBuf::from("/nonexistent/shred"), ..AppConfig::default() };
        let mut monitor = EraseMonitor::new();
        let err = monitor.start(&config, "/dev/null").unwrap_err();
        assert!(matches!(err, ScanError::ToolNotFound(_)));
        assert!(!monitor.is_running());
        assert_eq!(monitor.progress_label(), "No erase running");
    }

    #[test]
    fn forward_keeps_tail() {
        let (tx, rx) = mpsc::channel();
        let data: &[u8] = b"line one\nline two\n";
        let detail = forward(Some(data), &tx);
        assert_eq!(detail, "line one\nline two\n");
        assert_eq!(rx.try_recv().unwrap(), EraseEvent::Output(data.to_vec()));
    }
}
