//! An edit pipeline running on its own task.
//!
//! ## Learning: Actors with `tokio::select!`
//!
//! The session task owns the [`EditPipeline`] outright; everyone else talks
//! to it through an mpsc channel. The loop waits for whichever comes first,
//! a command or the pipeline's deadline, so a burst of edits keeps pushing
//! the deadline back and exactly one pass runs once typing stops.
//!
//! Dropping every [`EditorSession`] handle (or calling
//! [`EditorSession::detach`]) ends the task and cancels any pending pass.

use hyperpad_buffer::Selection;
use hyperpad_syntax::HighlightSpan;
use std::ops::Range;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, warn};

use crate::document::{Document, DocumentId};
use crate::event::EditorEvent;
use crate::event::EventBus;
use crate::pipeline::{EditOp, EditPipeline, PipelineState};
use crate::{CoreError, CoreResult};

/// A point-in-time view of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub text: String,
    pub spans: Vec<HighlightSpan>,
    pub selection: Selection,
    pub state: PipelineState,
    pub passes: u64,
}

enum Command {
    Edit(EditOp, oneshot::Sender<CoreResult<()>>),
    SetText(String, oneshot::Sender<()>),
    Suspend,
    Resume,
    Snapshot(oneshot::Sender<Snapshot>),
    Detach(oneshot::Sender<Document>),
}

/// Handle to a running session.
pub struct EditorSession {
    id: DocumentId,
    commands: mpsc::Sender<Command>,
    task: JoinHandle<()>,
}

impl EditorSession {
    /// Spawns the session task. Must be called inside a tokio runtime.
    pub fn spawn(pipeline: EditPipeline, events: Option<EventBus>) -> Self {
        let id = pipeline.document_id();
        let (commands, receiver) = mpsc::channel(64);

        if let Some(bus) = &events {
            bus.emit(EditorEvent::DocumentAttached(id));
        }
        let task = tokio::spawn(run(pipeline, receiver, events));
        debug!(document = %id, "editor session attached");

        Self { id, commands, task }
    }

    pub fn document_id(&self) -> DocumentId {
        self.id
    }

    /// Applies an edit.
    pub async fn edit(&self, op: EditOp) -> CoreResult<()> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Edit(op, reply)).await?;
        response.await.map_err(|_| CoreError::SessionClosed)?
    }

    pub async fn insert(&self, at: usize, text: impl Into<String>) -> CoreResult<()> {
        self.edit(EditOp::Insert {
            at,
            text: text.into(),
        })
        .await
    }

    pub async fn delete(&self, range: Range<usize>) -> CoreResult<()> {
        self.edit(EditOp::Delete(range)).await
    }

    /// Replaces the text and highlights it without waiting for the debounce.
    pub async fn set_text(&self, text: impl Into<String>) -> CoreResult<()> {
        let (reply, response) = oneshot::channel();
        self.send(Command::SetText(text.into(), reply)).await?;
        response.await.map_err(|_| CoreError::SessionClosed)
    }

    pub async fn suspend(&self) -> CoreResult<()> {
        self.send(Command::Suspend).await
    }

    pub async fn resume(&self) -> CoreResult<()> {
        self.send(Command::Resume).await
    }

    pub async fn snapshot(&self) -> CoreResult<Snapshot> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Snapshot(reply)).await?;
        response.await.map_err(|_| CoreError::SessionClosed)
    }

    /// Stops the session, cancelling any pending pass, and hands the
    /// document back.
    pub async fn detach(self) -> CoreResult<Document> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Detach(reply)).await?;
        let document = response.await.map_err(|_| CoreError::SessionClosed)?;
        if let Err(err) = self.task.await {
            warn!(document = %self.id, error = %err, "editor session task failed");
        }
        Ok(document)
    }

    async fn send(&self, command: Command) -> CoreResult<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| CoreError::SessionClosed)
    }
}

async fn run(
    mut pipeline: EditPipeline,
    mut commands: mpsc::Receiver<Command>,
    events: Option<EventBus>,
) {
    let id = pipeline.document_id();
    if let Some(bus) = &events {
        pipeline.set_event_bus(bus.clone());
    }

    loop {
        let deadline = pipeline.deadline();
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else {
                    pipeline.cancel();
                    break;
                };
                match command {
                    Command::Edit(op, reply) => {
                        let _ = reply.send(pipeline.apply(op, Instant::now()));
                    }
                    Command::SetText(text, reply) => {
                        pipeline.set_text_highlighted(&text);
                        let _ = reply.send(());
                    }
                    Command::Suspend => pipeline.suspend(),
                    Command::Resume => pipeline.resume(Instant::now()),
                    Command::Snapshot(reply) => {
                        let _ = reply.send(snapshot(&pipeline));
                    }
                    Command::Detach(reply) => {
                        pipeline.cancel();
                        if let Some(bus) = &events {
                            bus.emit(EditorEvent::DocumentDetached(id));
                        }
                        let _ = reply.send(pipeline.into_document());
                        debug!(document = %id, "editor session detached");
                        return;
                    }
                }
            }
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                pipeline.fire_due(Instant::now());
            }
        }
    }

    if let Some(bus) = &events {
        bus.emit(EditorEvent::DocumentDetached(id));
    }
    debug!(document = %id, "editor session dropped");
}

fn snapshot(pipeline: &EditPipeline) -> Snapshot {
    let document = pipeline.document();
    Snapshot {
        text: document.text().into_owned(),
        spans: document.highlights().spans().to_vec(),
        selection: document.selection(),
        state: pipeline.state(),
        passes: pipeline.highlight_passes(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineConfig;
    use hyperpad_syntax::{Language, Theme};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn session(text: &str) -> (EditorSession, Arc<Mutex<Vec<String>>>) {
        let mut pipeline = EditPipeline::new(
            Document::from_text(Language::Html, text),
            Theme::light(),
            PipelineConfig::default(),
        );
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        pipeline.set_listener(Box::new(move |text| sink.lock().unwrap().push(text.to_string())));
        (EditorSession::spawn(pipeline, None), seen)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_edits_runs_one_pass() {
        let (session, seen) = session("");

        for (i, c) in "<b>".chars().enumerate() {
            session.insert(i, c.to_string()).await.unwrap();
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
        assert_eq!(session.snapshot().await.unwrap().passes, 0);

        tokio::time::sleep(Duration::from_millis(1600)).await;
        let snapshot = session.snapshot().await.unwrap();
        assert_eq!(snapshot.passes, 1);
        assert_eq!(snapshot.spans.len(), 1);
        assert_eq!(*seen.lock().unwrap(), vec!["<b>".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_detach_cancels_pending_pass() {
        let (session, seen) = session("");
        session.insert(0, "<i>").await.unwrap();

        let document = session.detach().await.unwrap();
        assert_eq!(document.text(), "<i>");
        assert!(document.highlights().is_empty());

        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_text_is_immediate() {
        let (session, seen) = session("");
        session.set_text("<p></p>").await.unwrap();

        let snapshot = session.snapshot().await.unwrap();
        assert_eq!(snapshot.passes, 1);
        assert_eq!(snapshot.state, PipelineState::Idle);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_notifies_once() {
        let (session, seen) = session("");
        session.suspend().await.unwrap();
        session.insert(0, "<a>").await.unwrap();
        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert!(seen.lock().unwrap().is_empty());

        session.resume().await.unwrap();
        let snapshot = session.snapshot().await.unwrap();
        assert!(matches!(snapshot.state, PipelineState::PendingHighlight { .. }));
        assert_eq!(*seen.lock().unwrap(), vec!["<a>".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_errors_are_returned() {
        let (session, _) = session("<p>");
        let result = session.delete(2..10).await;
        assert!(matches!(result, Err(CoreError::Buffer(_))));
        assert_eq!(session.snapshot().await.unwrap().text, "<p>");
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_follow_lifecycle() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let pipeline = EditPipeline::new(
            Document::from_text(Language::Css, ""),
            Theme::dark(),
            PipelineConfig::default(),
        );
        let session = EditorSession::spawn(pipeline, Some(bus));
        let id = session.document_id();

        session.set_text("a { }").await.unwrap();
        session.detach().await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), EditorEvent::DocumentAttached(id));
        assert!(matches!(rx.recv().await.unwrap(), EditorEvent::HighlightApplied { .. }));
        assert!(matches!(rx.recv().await.unwrap(), EditorEvent::TextChanged { .. }));
        assert_eq!(rx.recv().await.unwrap(), EditorEvent::DocumentDetached(id));
    }
}
