//! Outcome event publishing.
//!
//! An optional collaborator: every submission outcome can be fanned out to
//! an external bus. The runner logs outcomes regardless; publishers are
//! additive and must never fail the run.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::job::outcome::SubmissionOutcome;

/// Receives one event per beneficiary outcome.
pub trait OutcomePublisher {
    fn publish(&self, outcome: &SubmissionOutcome);
}

/// Publisher for runs with no event bus attached.
#[derive(Debug, Default)]
pub struct NullPublisher;

impl OutcomePublisher for NullPublisher {
    fn publish(&self, _outcome: &SubmissionOutcome) {}
}

/// Appends outcomes as JSON lines to a file.
///
/// Write errors are logged and swallowed: the event log is an audit aid,
/// not a dependency of the run.
#[derive(Debug)]
pub struct FileEventLog {
    path: PathBuf,
}

impl FileEventLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn append(&self, outcome: &SubmissionOutcome) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let line = serde_json::to_string(outcome)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writeln!(file, "{}", line)
    }
}

impl OutcomePublisher for FileEventLog {
    fn publish(&self, outcome: &SubmissionOutcome) {
        if let Err(e) = self.append(outcome) {
            tracing::error!(
                path = %self.path.display(),
                error = %e,
                "Failed to append outcome event"
            );
        }
    }
}
