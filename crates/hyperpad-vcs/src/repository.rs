//! A project directory under git.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, info};

use crate::credentials::{Credentials, redact_url};
use crate::progress::{ProgressSink, parse_progress};
use crate::{VcsError, VcsResult};

/// One line of `git log`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    pub id: String,
    pub summary: String,
}

/// Runs git commands inside one working directory.
#[derive(Debug, Clone)]
pub struct GitRepository {
    workdir: PathBuf,
    program: String,
}

impl GitRepository {
    pub fn open(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            program: "git".to_string(),
        }
    }

    /// Uses a different git executable.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    // ==================== Local Operations ====================

    /// Creates the directory if needed and initialises a repository in it.
    pub async fn init(&self) -> VcsResult<()> {
        tokio::fs::create_dir_all(&self.workdir).await?;
        self.run(&["init"]).await?;
        info!(path = %self.workdir.display(), "initialised repository");
        Ok(())
    }

    /// Stages every change in the working tree.
    pub async fn add_all(&self) -> VcsResult<()> {
        self.run(&["add", "-A"]).await.map(drop)
    }

    pub async fn commit(&self, message: &str) -> VcsResult<()> {
        self.run(&["commit", "-m", message]).await.map(drop)
    }

    /// Switches branch, creating it first when `create` is set.
    pub async fn checkout(&self, branch: &str, create: bool) -> VcsResult<()> {
        if create {
            self.run(&["checkout", "-b", branch]).await.map(drop)
        } else {
            self.run(&["checkout", branch]).await.map(drop)
        }
    }

    /// Sets a repository-local config value.
    pub async fn set_config(&self, key: &str, value: &str) -> VcsResult<()> {
        self.run(&["config", key, value]).await.map(drop)
    }

    pub async fn current_branch(&self) -> VcsResult<String> {
        let output = self.run(&["rev-parse", "--abbrev-ref", "HEAD"]).await?;
        Ok(output.trim().to_string())
    }

    /// Whether the working tree has anything to commit.
    pub async fn has_changes(&self) -> VcsResult<bool> {
        let output = self.run(&["status", "--porcelain"]).await?;
        Ok(!output.trim().is_empty())
    }

    /// The most recent commits, newest first.
    pub async fn commits(&self, limit: usize) -> VcsResult<Vec<CommitSummary>> {
        let limit = limit.to_string();
        let output = self
            .run(&["log", "--format=%H%x09%s", "-n", limit.as_str()])
            .await?;
        Ok(output
            .lines()
            .filter_map(|line| line.split_once('\t'))
            .map(|(id, summary)| CommitSummary {
                id: id.to_string(),
                summary: summary.to_string(),
            })
            .collect())
    }

    // ==================== Remotes ====================

    pub async fn remotes(&self) -> VcsResult<Vec<String>> {
        let output = self.run(&["remote"]).await?;
        Ok(output.lines().map(str::to_string).collect())
    }

    pub async fn add_remote(&self, name: &str, url: &str) -> VcsResult<()> {
        self.run(&["remote", "add", name, url]).await.map(drop)
    }

    pub async fn remove_remote(&self, name: &str) -> VcsResult<()> {
        self.run(&["remote", "remove", name]).await.map(drop)
    }

    pub async fn remote_url(&self, name: &str) -> VcsResult<String> {
        match self.run(&["remote", "get-url", name]).await {
            Ok(output) => Ok(output.trim().to_string()),
            Err(VcsError::Failed { .. }) => Err(VcsError::UnknownRemote(name.to_string())),
            Err(err) => Err(err),
        }
    }

    // ==================== Network Operations ====================

    pub async fn fetch(
        &self,
        remote: &str,
        credentials: Option<&Credentials>,
        sink: &mut dyn ProgressSink,
    ) -> VcsResult<()> {
        let target = self.remote_target(remote, credentials).await?;
        let refspec = format!("+refs/heads/*:refs/remotes/{remote}/*");
        let mut args = vec!["fetch", "--progress", target.as_str()];
        if target.is_url() {
            args.push(&refspec);
        }
        self.run_with_progress(&args, &target, sink).await
    }

    /// Pulls the current branch.
    pub async fn pull(
        &self,
        remote: &str,
        credentials: Option<&Credentials>,
        sink: &mut dyn ProgressSink,
    ) -> VcsResult<()> {
        let branch = self.current_branch().await?;
        let target = self.remote_target(remote, credentials).await?;
        let args = ["pull", "--progress", target.as_str(), branch.as_str()];
        self.run_with_progress(&args, &target, sink).await
    }

    /// Pushes the current branch.
    pub async fn push(
        &self,
        remote: &str,
        credentials: Option<&Credentials>,
        sink: &mut dyn ProgressSink,
    ) -> VcsResult<()> {
        let branch = self.current_branch().await?;
        let target = self.remote_target(remote, credentials).await?;
        let args = ["push", "--progress", target.as_str(), branch.as_str()];
        self.run_with_progress(&args, &target, sink).await
    }

    /// The remote name, or its URL with credentials for http(s) remotes.
    async fn remote_target(
        &self,
        remote: &str,
        credentials: Option<&Credentials>,
    ) -> VcsResult<RemoteTarget> {
        let Some(credentials) = credentials else {
            return Ok(RemoteTarget::Name(remote.to_string()));
        };
        let url = self.remote_url(remote).await?;
        let injected = credentials.inject(&url);
        if injected == url {
            Ok(RemoteTarget::Name(remote.to_string()))
        } else {
            Ok(RemoteTarget::Url {
                injected,
                redacted: redact_url(&url),
            })
        }
    }

    // ==================== Process Plumbing ====================

    fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .current_dir(&self.workdir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .kill_on_drop(true);
        command
    }

    async fn run(&self, args: &[&str]) -> VcsResult<String> {
        debug!(?args, "running git");
        let output = self
            .command(args)
            .output()
            .await
            .map_err(|source| self.spawn_error(source))?;

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }
        Err(failure(
            args,
            &String::from_utf8_lossy(&output.stderr),
            output.status.code(),
        ))
    }

    async fn run_with_progress(
        &self,
        args: &[&str],
        target: &RemoteTarget,
        sink: &mut dyn ProgressSink,
    ) -> VcsResult<()> {
        debug!(command = args.first().copied().unwrap_or_default(), remote = %target, "running git");
        let mut child = self
            .command(args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| self.spawn_error(source))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| VcsError::Io(std::io::Error::other("git stderr was not captured")))?;

        let mut transcript = String::new();
        let mut pending = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let read = stderr.read(&mut chunk).await?;
            if read == 0 {
                break;
            }
            for &byte in &chunk[..read] {
                if byte == b'\r' || byte == b'\n' {
                    flush_line(&mut pending, &mut transcript, sink);
                } else {
                    pending.push(byte);
                }
            }
        }
        flush_line(&mut pending, &mut transcript, sink);

        let status = child.wait().await?;
        if status.success() {
            return Ok(());
        }
        let message = target.scrub(&transcript);
        Err(failure(args, &message, status.code()))
    }

    fn spawn_error(&self, source: std::io::Error) -> VcsError {
        VcsError::Spawn {
            program: self.program.clone(),
            source,
        }
    }
}

enum RemoteTarget {
    Name(String),
    Url { injected: String, redacted: String },
}

impl RemoteTarget {
    fn as_str(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Url { injected, .. } => injected,
        }
    }

    fn is_url(&self) -> bool {
        matches!(self, Self::Url { .. })
    }

    /// Replaces the credentialed URL in git's output with the redacted one.
    fn scrub(&self, text: &str) -> String {
        match self {
            Self::Name(_) => text.to_string(),
            Self::Url { injected, redacted } => text.replace(injected.as_str(), redacted),
        }
    }
}

impl std::fmt::Display for RemoteTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Url { redacted, .. } => f.write_str(redacted),
        }
    }
}

fn flush_line(pending: &mut Vec<u8>, transcript: &mut String, sink: &mut dyn ProgressSink) {
    if pending.is_empty() {
        return;
    }
    let line = String::from_utf8_lossy(pending).into_owned();
    pending.clear();
    match parse_progress(&line) {
        Some(progress) => sink.update(&progress),
        None => {
            transcript.push_str(&line);
            transcript.push('\n');
        }
    }
}

fn failure(args: &[&str], stderr: &str, code: Option<i32>) -> VcsError {
    let stderr = stderr.trim();
    let message = if stderr.is_empty() {
        match code {
            Some(code) => format!("exit status {code}"),
            None => "terminated by signal".to_string(),
        }
    } else {
        stderr.to_string()
    };
    VcsError::Failed {
        command: args.first().copied().unwrap_or_default().to_string(),
        message,
    }
}
