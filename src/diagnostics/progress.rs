use crate::models::{ErasePhase, ProgressState};
use log::{debug, trace};
use regex::Regex;
use std::sync::LazyLock;

static PERCENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)%").unwrap());

/// shred announces each pass as `pass 1/1 (000000)...`; older builds print
/// `Pass 1/1 (zero)...`.
static PASS_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bpass \d+/\d+").unwrap());

/// What the front-end should show for the erase operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressStatus {
    /// No bytes seen yet
    Waiting,
    /// A pass has started but no percentage was printed yet
    Starting,
    Percent(u8),
}

impl ProgressStatus {
    pub fn display(self) -> String {
        match self {
            ProgressStatus::Waiting => "--%".to_string(),
            ProgressStatus::Starting => "Starting...".to_string(),
            ProgressStatus::Percent(p) => format!("{}%", p),
        }
    }
}

/// Line scanner over the stderr stream of a running erase.
///
/// Bytes arrive in arbitrary chunks. Only newline-terminated lines are
/// inspected; an unterminated tail waits in the state until the rest of the
/// line arrives.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    state: ProgressState,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears everything left over from a previous operation.
    pub fn reset(&mut self) {
        self.state = ProgressState::default();
    }

    /// Consumes one chunk of stream data. Returns the percentage found on the
    /// lines completed by this chunk, if any; the last one wins.
    pub fn feed(&mut self, chunk: &[u8]) -> Option<u8> {
        if chunk.is_empty() {
            return None;
        }
        match self.state.phase {
            ErasePhase::Terminated => {
                debug!("ignoring {} bytes after erase terminated", chunk.len());
                return None;
            }
            ErasePhase::Idle => self.state.phase = ErasePhase::Running,
            ErasePhase::Running => {}
        }

        self.state.pending_partial_line.extend_from_slice(chunk);

        let Some(last_newline) = self.state.pending_partial_line.iter().rposition(|b| *b == b'\n') else {
            return None;
        };
        let tail = self.state.pending_partial_line.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.state.pending_partial_line, tail);

        let mut latest = None;
        for raw in complete.split(|b| *b == b'\n') {
            let line = String::from_utf8_lossy(raw);
            let line = line.trim_end_matches('\r');
            trace!("erase output: {}", line);

            if let Some(pct) = PERCENT.captures(line).and_then(|cap| cap[1].parse::<u32>().ok()) {
                latest = Some(pct.min(100) as u8);
            } else if PASS_START.is_match(line) && self.state.last_percentage.is_none() && latest.is_none() {
                self.state.started = true;
            }
        }

        if latest.is_some() {
            self.state.last_percentage = latest;
            debug!("erase progress {:?}%", latest);
        }
        latest
    }

    /// Marks the stream closed. Any unterminated tail is dropped unread and
    /// the last percentage is kept as observed.
    pub fn finish(&mut self) {
        self.state.phase = ErasePhase::Terminated;
        self.state.pending_partial_line.clear();
    }

    pub fn status(&self) -> ProgressStatus {
        match self.state.last_percentage {
            Some(p) => ProgressStatus::Percent(p),
            None if self.state.started => ProgressStatus::Starting,
            None => ProgressStatus::Waiting,
        }
    }

    pub fn phase(&self) -> ErasePhase {
        self.state.phase
    }

    pub fn last_percentage(&self) -> Option<u8> {
        self.state.last_percentage
    }

    pub fn pending(&self) -> &[u8] {
        &self.state.pending_partial_line
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_split_across_chunks() {
        let mut tracker = ProgressTracker::new();
        assert_eq!(tracker.feed(b"Pass 1/1 (zero)...12"), None);
        assert_eq!(tracker.pending(), b"Pass 1/1 (zero)...12");

        assert_eq!(tracker.feed(b"%\ndone\n"), Some(12));
        assert_eq!(tracker.status().display(), "12%");
        assert!(tracker.pending().is_empty());
    }

    #[test]
    fn empty_chunk_keeps_tracker_idle() {
        let mut tracker = ProgressTracker::new();
        assert_eq!(tracker.feed(b""), None);
        assert_eq!(tracker.phase(), ErasePhase::Idle);
        assert_eq!(tracker.status(), ProgressStatus::Waiting);

        tracker.feed(b"p");
        assert_eq!(tracker.phase(), ErasePhase::Running);
    }

    #[test]
    fn chunk_without_newline_is_held() {
        let mut tracker = ProgressTracker::new();
        assert_eq!(tracker.feed(b"shred: /dev/sdb: pass 1/1 (000000)...1.0GiB/10GiB 10%"), None);
        assert_eq!(tracker.last_percentage(), None);
        assert_eq!(tracker.pending(), b"shred: /dev/sdb: pass 1/1 (000000)...1.0GiB/10GiB 10%");
        assert_eq!(tracker.phase(), ErasePhase::Running);
    }

    #[test]
    fn latest_line_in_batch_wins() {
        let mut tracker = ProgressTracker::new();
        let chunk = b"pass 1/1 (000000)...1GiB/10GiB 10%\npass 1/1 (000000)...2GiB/10GiB 20%\npass 1/1 (000000)...3GiB";
        assert_eq!(tracker.feed(chunk), Some(20));
        assert_eq!(tracker.pending(), b"pass 1/1 (000000)...3GiB");
        assert_eq!(tracker.feed(b"/10GiB 30%\n"), Some(30));
    }

    #[test]
    fn lines_without_percentage_keep_previous_value() {
        let mut tracker = ProgressTracker::new();
        tracker.feed(b"45%\n");
        assert_eq!(tracker.feed(b"syncing\n"), None);
        assert_eq!(tracker.last_percentage(), Some(45));
    }

    #[test]
    fn pass_marker_reports_starting() {
        let mut tracker = ProgressTracker::new();
        assert_eq!(tracker.status(), ProgressStatus::Waiting);
        assert_eq!(tracker.status().display(), "--%");

        tracker.feed(b"shred: /dev/sdb: pass 1/1 (000000)...\n");
        assert_eq!(tracker.status(), ProgressStatus::Starting);
        assert_eq!(tracker.status().display(), "Starting...");

        tracker.feed(b"shred: /dev/sdb: pass 1/1 (000000)...512MiB/10GiB 5%\n");
        assert_eq!(tracker.status(), ProgressStatus::Percent(5));
    }

    #[test]
    fn finish_drops_partial_line_and_keeps_last_value() {
        let mut tracker = ProgressTracker::new();
        tracker.feed(b"pass 1/1 (000000)...9GiB/10GiB 90%\npass 1/1 (000000)...10GiB/10");
        tracker.finish();
        assert_eq!(tracker.phase(), ErasePhase::Terminated);
        assert!(tracker.pending().is_empty());
        assert_eq!(tracker.last_percentage(), Some(90));

        assert_eq!(tracker.feed(b"GiB 100%\n"), None);
        assert_eq!(tracker.last_percentage(), Some(90));
    }

    #[test]
    fn reset_starts_fresh() {
        let mut tracker = ProgressTracker::new();
        tracker.feed(b"77%\npartial");
        tracker.finish();
        tracker.reset();
        assert_eq!(tracker.state(), &ProgressState::default());
        assert_eq!(tracker.phase(), ErasePhase::Idle);
    }

    #[test]
    fn carriage_returns_and_invalid_utf8() {
        let mut tracker = ProgressTracker::new();
        assert_eq!(tracker.feed(b"\xff\xfe 33%\r\n"), Some(33));
    }
}
