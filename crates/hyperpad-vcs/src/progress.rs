//! Parsing git's `--progress` output.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static PROGRESS_LINE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"^(?:remote:\s*)?([A-Za-z][A-Za-z ]*?):\s+(\d{1,3})% \((\d+)/(\d+)\)").ok()
});

/// One progress update: `(task, percent, current, total)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub task: String,
    pub percent: u8,
    pub current: u64,
    pub total: u64,
}

/// Receives progress updates while an operation runs.
pub trait ProgressSink: Send {
    fn update(&mut self, progress: &Progress);
}

impl<F> ProgressSink for F
where
    F: FnMut(&Progress) + Send,
{
    fn update(&mut self, progress: &Progress) {
        self(progress)
    }
}

/// A sink that drops every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreProgress;

impl ProgressSink for IgnoreProgress {
    fn update(&mut self, _progress: &Progress) {}
}

/// Parses one line of git progress output.
pub fn parse_progress(line: &str) -> Option<Progress> {
    let captures = PROGRESS_LINE.as_ref()?.captures(line.trim())?;
    Some(Progress {
        task: captures[1].trim().to_string(),
        percent: captures[2].parse::<u8>().ok()?.min(100),
        current: captures[3].parse().ok()?,
        total: captures[4].parse().ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local_line() {
        let progress = parse_progress("Receiving objects:  45% (45/100), 1.20 MiB | 1.00 MiB/s").unwrap();
        assert_eq!(
            progress,
            Progress {
                task: "Receiving objects".to_string(),
                percent: 45,
                current: 45,
                total: 100,
            }
        );
    }

    #[test]
    fn test_parse_remote_line() {
        let progress = parse_progress("remote: Counting objects: 100% (12/12), done.").unwrap();
        assert_eq!(progress.task, "Counting objects");
        assert_eq!(progress.percent, 100);
        assert_eq!(progress.total, 12);
    }

    #[test]
    fn test_other_lines_are_ignored() {
        assert!(parse_progress("From https://example.com/x").is_none());
        assert!(parse_progress(" * branch  main -> FETCH_HEAD").is_none());
        assert!(parse_progress("").is_none());
    }

    #[test]
    fn test_closure_sink() {
        let mut seen = Vec::new();
        {
            let mut sink = |progress: &Progress| seen.push(progress.percent);
            let sink: &mut dyn ProgressSink = &mut sink;
            sink.update(&parse_progress("Resolving deltas:  50% (1/2)").unwrap());
        }
        assert_eq!(seen, vec![50]);
    }
}
