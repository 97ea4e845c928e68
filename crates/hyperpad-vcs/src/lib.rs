//! # Hyperpad VCS
//!
//! Drives the `git` executable for a project directory.
//!
//! ## Learning: Shelling Out
//!
//! Rather than linking a git implementation, every operation is one `git`
//! invocation through [`tokio::process::Command`]. Network operations run
//! with `--progress`, and git's carriage-return-separated stderr is parsed
//! into [`Progress`] updates:
//!
//! ```text
//! Receiving objects:  45% (45/100), 1.20 MiB | 1.00 MiB/s\r
//! └──── task ─────┘   └┘  └┘ └─┘
//!                percent cur total
//! ```
//!
//! [`GitTask`] wraps an operation so that failures become a message for the
//! user and a `false` flag instead of an error the host has to handle.

pub mod credentials;
pub mod progress;
pub mod repository;
pub mod task;

pub use credentials::{Credentials, redact_url};
pub use progress::{IgnoreProgress, Progress, ProgressSink, parse_progress};
pub use repository::{CommitSummary, GitRepository};
pub use task::{GitTask, TaskOutcome};

/// Result type for VCS operations
pub type VcsResult<T> = Result<T, VcsError>;

/// Errors that can occur while running git
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git {command} failed: {message}")]
    Failed { command: String, message: String },

    #[error("Remote not found: {0}")]
    UnknownRemote(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
