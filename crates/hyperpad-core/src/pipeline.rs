//! The debounced edit pipeline.
//!
//! ## Learning: State Machines as Enums
//!
//! ```text
//!            edit                     deadline reached
//!   Idle ───────────► PendingHighlight ───────────────► Highlighting
//!    ▲                 │    ▲                                 │
//!    │                 └────┘ edit (deadline moves)           │
//!    └────────────────────────────────────────────────────────┘
//!
//!   suspend(): any state ──► Suspended      resume(): ──► PendingHighlight
//! ```
//!
//! Applying a highlight result goes straight to the [`Document`] and never
//! through the edit path, so a pass can't re-arm its own timer.

use hyperpad_buffer::Selection;
use hyperpad_syntax::{HighlightResult, Theme, highlight};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::completion::{Completer, Suggestion};
use crate::config::EditorConfig;
use crate::document::{Document, DocumentId};
use crate::event::{EditorEvent, EventBus};
use crate::indent::auto_indent;
use crate::overlay::{OverlayLine, TextLayout, compute_overlay};
use crate::CoreResult;

/// Callback fired with the settled text.
pub type TextChangedListener = Box<dyn FnMut(&str) + Send>;

/// Where the pipeline is in its debounce cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    /// A pass will run at `deadline` unless another edit moves it
    PendingHighlight { deadline: Instant },
    Highlighting,
    /// Edits are accepted but nothing is scheduled
    Suspended,
}

/// Pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub update_delay: Duration,
    pub auto_indent: bool,
    pub indent_unit: String,
    /// Undo steps kept for the owned document
    pub undo_limit: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from(&EditorConfig::default())
    }
}

impl From<&EditorConfig> for PipelineConfig {
    fn from(config: &EditorConfig) -> Self {
        Self {
            update_delay: config.update_delay(),
            auto_indent: config.auto_indent,
            indent_unit: config.indent_unit.clone(),
            undo_limit: config.undo_limit,
        }
    }
}

/// An edit request, as sent to an [`EditPipeline`] or an editor session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    /// Typed or pasted text; a lone `"\n"` is auto-indented
    Insert { at: usize, text: String },
    Delete(Range<usize>),
    Replace { range: Range<usize>, text: String },
    Undo,
    Redo,
    Refactor { from: String, to: String },
    CommentSelection,
    Select(Selection),
    AcceptSuggestion { cursor: usize, suggestion: Suggestion },
}

/// Owns a document and keeps its highlighting up to date.
pub struct EditPipeline {
    document: Document,
    theme: Theme,
    config: PipelineConfig,
    state: PipelineState,
    completer: Completer,
    listener: Option<TextChangedListener>,
    events: Option<EventBus>,
    passes: u64,
}

impl EditPipeline {
    pub fn new(mut document: Document, theme: Theme, config: PipelineConfig) -> Self {
        document.set_undo_limit(config.undo_limit);
        let completer = Completer::for_language(document.language());
        Self {
            document,
            theme,
            config,
            state: PipelineState::Idle,
            completer,
            listener: None,
            events: None,
            passes: 0,
        }
    }

    /// Registers the text-changed callback, replacing any previous one.
    pub fn set_listener(&mut self, listener: TextChangedListener) {
        self.listener = Some(listener);
    }

    pub fn set_event_bus(&mut self, events: EventBus) {
        self.events = Some(events);
    }

    /// Swaps the palette. Takes effect on the next pass.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    // ==================== State ====================

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// When the next pass is due, if one is scheduled.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            PipelineState::PendingHighlight { deadline } => Some(deadline),
            _ => None,
        }
    }

    pub fn is_highlighting(&self) -> bool {
        self.state == PipelineState::Highlighting
    }

    /// Number of completed highlight passes.
    pub fn highlight_passes(&self) -> u64 {
        self.passes
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_id(&self) -> DocumentId {
        self.document.id()
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    // ==================== Edits ====================

    /// Applies an edit and re-arms the debounce timer.
    pub fn apply(&mut self, op: EditOp, now: Instant) -> CoreResult<()> {
        match op {
            EditOp::Insert { at, text } => self.insert(at, &text, now),
            EditOp::Delete(range) => self.delete(range, now),
            EditOp::Replace { range, text } => self.replace(range, &text, now),
            EditOp::Undo => {
                self.document.undo()?;
                self.on_edit(now);
                Ok(())
            }
            EditOp::Redo => {
                self.document.redo()?;
                self.on_edit(now);
                Ok(())
            }
            EditOp::Refactor { from, to } => {
                self.document.refactor(&from, &to)?;
                self.on_edit(now);
                Ok(())
            }
            EditOp::CommentSelection => {
                self.document.comment_selection()?;
                self.on_edit(now);
                Ok(())
            }
            EditOp::Select(selection) => {
                self.document.set_selection(selection);
                Ok(())
            }
            EditOp::AcceptSuggestion { cursor, suggestion } => {
                self.accept_suggestion(cursor, &suggestion, now)
            }
        }
    }

    /// Inserts text. A single newline is replaced by the auto-indented text.
    pub fn insert(&mut self, at: usize, text: &str, now: Instant) -> CoreResult<()> {
        let inserted = if self.config.auto_indent && text == "\n" {
            let current = self.document.text();
            auto_indent(&current, at, &self.config.indent_unit).newline_text()
        } else {
            text.to_string()
        };
        self.document.insert(at, &inserted)?;
        self.on_edit(now);
        Ok(())
    }

    pub fn delete(&mut self, range: Range<usize>, now: Instant) -> CoreResult<()> {
        self.document.delete(range)?;
        self.on_edit(now);
        Ok(())
    }

    pub fn replace(&mut self, range: Range<usize>, text: &str, now: Instant) -> CoreResult<()> {
        self.document.replace(range, text)?;
        self.on_edit(now);
        Ok(())
    }

    /// Replaces the completion token at `cursor` with the accepted suggestion.
    pub fn accept_suggestion(
        &mut self,
        cursor: usize,
        suggestion: &Suggestion,
        now: Instant,
    ) -> CoreResult<()> {
        let (range, inserted) = Completer::accept(&self.document.text(), cursor, suggestion);
        self.replace(range, &inserted, now)
    }

    /// Suggestions for the token under the caret.
    pub fn suggestions(&self) -> Vec<Suggestion> {
        self.completer
            .suggestions(&self.document.text(), self.document.caret())
    }

    /// Overlay for the current caret.
    pub fn overlay(&self, layout: &impl TextLayout, show_line_numbers: bool) -> Vec<OverlayLine> {
        compute_overlay(
            &self.document.text(),
            layout,
            Some(self.document.caret()),
            show_line_numbers,
        )
    }

    fn on_edit(&mut self, now: Instant) {
        match self.state {
            PipelineState::Suspended => {}
            _ => {
                let deadline = now + self.config.update_delay;
                self.state = PipelineState::PendingHighlight { deadline };
                debug!(document = %self.document.id(), ?deadline, "highlight scheduled");
            }
        }
    }

    // ==================== Highlighting ====================

    /// Runs the pending pass if its deadline has passed.
    ///
    /// Returns true when a pass ran.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.state {
            PipelineState::PendingHighlight { deadline } if now >= deadline => {
                // listeners see the settled text before it is repainted
                self.notify_text_changed();
                self.run_highlight();
                true
            }
            _ => false,
        }
    }

    /// Replaces the whole text and paints it immediately, skipping the
    /// debounce. The text-changed listener fires once afterwards.
    pub fn set_text_highlighted(&mut self, text: &str) {
        let suspended = self.state == PipelineState::Suspended;
        self.document.set_text(text);
        self.run_highlight();
        if suspended {
            self.state = PipelineState::Suspended;
        }
        self.notify_text_changed();
    }

    /// Runs a pass right now, cancelling any pending one. No notification.
    pub fn highlight_now(&mut self) -> &HighlightResult {
        let suspended = self.state == PipelineState::Suspended;
        self.run_highlight();
        if suspended {
            self.state = PipelineState::Suspended;
        }
        self.document.highlights()
    }

    fn run_highlight(&mut self) {
        self.state = PipelineState::Highlighting;
        let result = highlight(
            &self.document.text(),
            self.document.language(),
            &self.theme,
        );
        let spans = result.spans().to_vec();
        self.document.set_highlights(result);
        self.passes += 1;
        self.state = PipelineState::Idle;

        debug!(document = %self.document.id(), spans = spans.len(), pass = self.passes, "highlight applied");
        self.emit(EditorEvent::HighlightApplied {
            document: self.document.id(),
            spans,
        });
    }

    // ==================== Lifecycle ====================

    /// Cancels any pending pass and stops scheduling new ones.
    pub fn suspend(&mut self) {
        self.state = PipelineState::Suspended;
        debug!(document = %self.document.id(), "pipeline suspended");
    }

    /// Reports the settled text once and starts a fresh debounce cycle.
    pub fn resume(&mut self, now: Instant) {
        if self.state != PipelineState::Suspended {
            return;
        }
        self.state = PipelineState::Idle;
        self.notify_text_changed();
        self.on_edit(now);
    }

    /// Cancels a pending pass without suspending.
    pub fn cancel(&mut self) {
        if let PipelineState::PendingHighlight { .. } = self.state {
            self.state = PipelineState::Idle;
            debug!(document = %self.document.id(), "pending highlight cancelled");
        }
    }

    fn notify_text_changed(&mut self) {
        let text = self.document.text().into_owned();
        if let Some(listener) = self.listener.as_mut() {
            listener(&text);
        }
        self.emit(EditorEvent::TextChanged {
            document: self.document.id(),
            text,
        });
    }

    fn emit(&self, event: EditorEvent) {
        if let Some(events) = &self.events {
            events.emit(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyperpad_syntax::{ColorRole, Language};
    use std::sync::{Arc, Mutex};

    const DELAY: Duration = Duration::from_millis(2000);

    fn pipeline(language: Language, text: &str) -> (EditPipeline, Arc<Mutex<Vec<String>>>) {
        let mut pipeline = EditPipeline::new(
            Document::from_text(language, text),
            Theme::light(),
            PipelineConfig::default(),
        );
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        pipeline.set_listener(Box::new(move |text| sink.lock().unwrap().push(text.to_string())));
        (pipeline, seen)
    }

    #[test]
    fn test_edits_coalesce_into_one_pass() {
        let (mut pipeline, seen) = pipeline(Language::Html, "");
        let start = Instant::now();

        for (i, c) in "<div>".chars().enumerate() {
            let now = start + Duration::from_millis(300 * i as u64);
            pipeline.insert(i, &c.to_string(), now).unwrap();
            assert!(!pipeline.fire_due(now));
        }

        let last_edit = start + Duration::from_millis(1200);
        assert_eq!(pipeline.deadline(), Some(last_edit + DELAY));
        assert!(!pipeline.fire_due(last_edit + DELAY - Duration::from_millis(1)));
        assert!(pipeline.fire_due(last_edit + DELAY));

        assert_eq!(pipeline.highlight_passes(), 1);
        assert_eq!(*seen.lock().unwrap(), vec!["<div>".to_string()]);
        assert_eq!(pipeline.state(), PipelineState::Idle);
        assert_eq!(pipeline.document().highlights().role_at(1), Some(ColorRole::Keyword));
    }

    #[test]
    fn test_pass_does_not_rearm() {
        let (mut pipeline, _) = pipeline(Language::Css, "a { }");
        let now = Instant::now();
        pipeline.insert(5, " ", now).unwrap();
        assert!(pipeline.fire_due(now + DELAY));
        assert_eq!(pipeline.deadline(), None);
        assert!(!pipeline.fire_due(now + DELAY * 3));
    }

    #[test]
    fn test_newline_is_auto_indented() {
        let (mut pipeline, _) = pipeline(Language::Js, "  if (x) {");
        pipeline.insert(10, "\n", Instant::now()).unwrap();
        assert_eq!(pipeline.document().text(), "  if (x) {\n  \t");
        assert_eq!(pipeline.document().caret(), 14);
    }

    #[test]
    fn test_auto_indent_can_be_disabled() {
        let config = PipelineConfig {
            auto_indent: false,
            ..PipelineConfig::default()
        };
        let mut pipeline =
            EditPipeline::new(Document::from_text(Language::Js, "  {"), Theme::light(), config);
        pipeline.insert(3, "\n", Instant::now()).unwrap();
        assert_eq!(pipeline.document().text(), "  {\n");
    }

    #[test]
    fn test_undo_limit_comes_from_editor_config() {
        let editor = EditorConfig {
            undo_limit: 2,
            ..EditorConfig::default()
        };
        let mut pipeline = EditPipeline::new(
            Document::from_text(Language::Css, ""),
            Theme::light(),
            PipelineConfig::from(&editor),
        );
        let now = Instant::now();
        for (i, line) in ["a\n", "b\n", "c\n"].into_iter().enumerate() {
            pipeline.insert(i * 2, line, now).unwrap();
        }

        pipeline.apply(EditOp::Undo, now).unwrap();
        pipeline.apply(EditOp::Undo, now).unwrap();
        assert!(pipeline.apply(EditOp::Undo, now).is_err());
        assert_eq!(pipeline.document().text(), "a\n");
    }

    #[test]
    fn test_set_text_highlighted_paints_immediately() {
        let (mut pipeline, seen) = pipeline(Language::Html, "");
        let now = Instant::now();
        pipeline.insert(0, "x", now).unwrap();

        pipeline.set_text_highlighted("<p>hi</p>");
        assert_eq!(pipeline.state(), PipelineState::Idle);
        assert_eq!(pipeline.highlight_passes(), 1);
        assert_eq!(pipeline.document().highlights().role_at(1), Some(ColorRole::Keyword));
        assert_eq!(*seen.lock().unwrap(), vec!["<p>hi</p>".to_string()]);
        assert!(!pipeline.fire_due(now + DELAY));
    }

    #[test]
    fn test_suspend_and_resume() {
        let (mut pipeline, seen) = pipeline(Language::Css, "");
        let now = Instant::now();
        pipeline.insert(0, "p", now).unwrap();
        pipeline.suspend();
        pipeline.insert(1, " {}", now).unwrap();
        assert_eq!(pipeline.deadline(), None);
        assert!(!pipeline.fire_due(now + DELAY));

        let later = now + DELAY * 2;
        pipeline.resume(later);
        assert_eq!(*seen.lock().unwrap(), vec!["p {}".to_string()]);
        assert_eq!(pipeline.deadline(), Some(later + DELAY));
        assert!(pipeline.fire_due(later + DELAY));
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_accept_suggestion() {
        let (mut pipeline, _) = pipeline(Language::Html, "<di");
        pipeline
            .apply(EditOp::Select(Selection::caret(3)), Instant::now())
            .unwrap();
        let suggestion = pipeline
            .suggestions()
            .into_iter()
            .find(|s| s.label == "div")
            .unwrap();

        pipeline
            .apply(EditOp::AcceptSuggestion { cursor: 3, suggestion }, Instant::now())
            .unwrap();
        assert_eq!(pipeline.document().text(), "<div></div>");
        assert!(pipeline.deadline().is_some());
    }

    #[test]
    fn test_events_are_emitted() {
        let (mut pipeline, _) = pipeline(Language::Css, "");
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        pipeline.set_event_bus(bus);

        pipeline.set_text_highlighted("b { }");
        assert!(matches!(rx.try_recv(), Ok(EditorEvent::HighlightApplied { spans, .. }) if spans.len() == 1));
        assert!(matches!(rx.try_recv(), Ok(EditorEvent::TextChanged { text, .. }) if text == "b { }"));
    }

    #[test]
    fn test_timed_pass_notifies_before_painting() {
        let (mut pipeline, _) = pipeline(Language::Html, "");
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        pipeline.set_event_bus(bus);

        let now = Instant::now();
        pipeline.insert(0, "<b>", now).unwrap();
        assert!(pipeline.fire_due(now + DELAY));

        assert!(matches!(rx.try_recv(), Ok(EditorEvent::TextChanged { text, .. }) if text == "<b>"));
        assert!(matches!(rx.try_recv(), Ok(EditorEvent::HighlightApplied { .. })));
    }

    #[test]
    fn test_cancel_keeps_text() {
        let (mut pipeline, seen) = pipeline(Language::Js, "");
        let now = Instant::now();
        pipeline.insert(0, "let", now).unwrap();
        pipeline.cancel();
        assert!(!pipeline.fire_due(now + DELAY));
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(pipeline.document().text(), "let");
    }
}
