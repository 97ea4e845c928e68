//! Turning git results into messages for the user.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use tracing::{error, info};

use crate::VcsResult;

/// The operations a host can start from its menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GitTask {
    Init,
    Add,
    Commit,
    Checkout,
    Fetch,
    Pull,
    Push,
}

/// What the host shows once a task finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub task: GitTask,
    pub success: bool,
    pub message: String,
}

impl GitTask {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Add => "add",
            Self::Commit => "commit",
            Self::Checkout => "checkout",
            Self::Fetch => "fetch",
            Self::Pull => "pull",
            Self::Push => "push",
        }
    }

    pub fn start_message(&self) -> &'static str {
        match self {
            Self::Init => "Initialising repository...",
            Self::Add => "Staging changes...",
            Self::Commit => "Committing...",
            Self::Checkout => "Switching branch...",
            Self::Fetch => "Fetching from remote...",
            Self::Pull => "Pulling from remote...",
            Self::Push => "Pushing to remote...",
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            Self::Init => "Repository initialised",
            Self::Add => "Changes staged",
            Self::Commit => "Changes committed",
            Self::Checkout => "Branch switched",
            Self::Fetch => "Fetch complete",
            Self::Pull => "Pull complete",
            Self::Push => "Push complete",
        }
    }

    /// Converts an operation's result into an outcome, logging failures.
    pub fn outcome<T>(self, result: VcsResult<T>) -> TaskOutcome {
        match result {
            Ok(_) => {
                info!(task = self.name(), "git task succeeded");
                TaskOutcome {
                    task: self,
                    success: true,
                    message: self.success_message().to_string(),
                }
            }
            Err(err) => {
                error!(task = self.name(), error = %err, "git task failed");
                TaskOutcome {
                    task: self,
                    success: false,
                    message: err.to_string(),
                }
            }
        }
    }

    /// Runs an operation to completion and reports how it went.
    pub async fn run<T, F>(self, operation: F) -> TaskOutcome
    where
        F: Future<Output = VcsResult<T>>,
    {
        info!(task = self.name(), "{}", self.start_message());
        self.outcome(operation.await)
    }
}

impl fmt::Display for GitTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VcsError;

    #[test]
    fn test_success_outcome() {
        let outcome = GitTask::Push.outcome(Ok(()));
        assert!(outcome.success);
        assert_eq!(outcome.message, "Push complete");
    }

    #[test]
    fn test_failure_outcome_carries_error_text() {
        let outcome = GitTask::Fetch.outcome::<()>(Err(VcsError::UnknownRemote("upstream".into())));
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Remote not found: upstream");
    }

    #[tokio::test]
    async fn test_run_awaits_operation() {
        let outcome = GitTask::Commit
            .run(async {
                Err::<(), _>(VcsError::Failed {
                    command: "commit".into(),
                    message: "nothing to commit".into(),
                })
            })
            .await;
        assert_eq!(outcome.task, GitTask::Commit);
        assert_eq!(outcome.message, "git commit failed: nothing to commit");
    }

    #[test]
    fn test_display() {
        assert_eq!(GitTask::Checkout.to_string(), "checkout");
    }
}
