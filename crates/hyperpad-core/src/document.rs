//! Documents: a buffer plus the annotations and caret that belong to it.
//!
//! ## Learning: Type Aliases and Newtypes
//!
//! `DocumentId` is a newtype wrapper around `Uuid`, so an id can never be
//! confused with some other `Uuid` (or a plain string) at a call site.
//!
//! ## Keeping colors attached
//!
//! Between highlight passes the annotation set is stale. Rather than let
//! colors drift onto the wrong characters, every edit shifts the current
//! [`HighlightResult`] the same way it shifts the caret.

use hyperpad_buffer::{Edit, EditKind, Selection, TextBuffer};
use hyperpad_syntax::{HighlightResult, Language};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::ops::Range;
use std::path::Path;
use uuid::Uuid;

use crate::{CoreError, CoreResult};

/// Unique identifier for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Creates a new unique document ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single file being edited.
#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    buffer: TextBuffer,
    /// Annotations from the last pass, shifted by later edits
    highlights: HighlightResult,
    selection: Selection,
    language: Language,
    /// Display name
    name: String,
}

impl Document {
    /// Creates a new empty document.
    pub fn new(language: Language) -> Self {
        Self {
            id: DocumentId::new(),
            buffer: TextBuffer::new(),
            highlights: HighlightResult::default(),
            selection: Selection::default(),
            language,
            name: "Untitled".to_string(),
        }
    }

    /// Creates an unhighlighted document holding `text`.
    pub fn from_text(language: Language, text: &str) -> Self {
        let mut doc = Self::new(language);
        doc.set_text(text);
        doc
    }

    /// Opens a file, detecting the language from its extension.
    pub fn open(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let language = Language::from_path(path)
            .ok_or_else(|| CoreError::UnsupportedLanguage(path.display().to_string()))?;
        Self::open_as(path, language)
    }

    /// Opens a file with an explicit language.
    pub fn open_as(path: impl AsRef<Path>, language: Language) -> CoreResult<Self> {
        let path = path.as_ref();
        let buffer = TextBuffer::from_file(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string());

        Ok(Self {
            highlights: HighlightResult::empty(buffer.len_chars()),
            buffer,
            name,
            ..Self::new(language)
        })
    }

    /// Saves the document to its file.
    pub fn save(&mut self) -> CoreResult<()> {
        self.buffer.save()?;
        Ok(())
    }

    /// Saves the document under a new path.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> CoreResult<()> {
        let path = path.as_ref();
        self.buffer.save_as(path)?;
        if let Some(name) = path.file_name() {
            self.name = name.to_string_lossy().into_owned();
        }
        Ok(())
    }

    // ==================== Accessors ====================

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.buffer.file_path()
    }

    pub fn text(&self) -> Cow<'_, str> {
        self.buffer.text()
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn len_chars(&self) -> usize {
        self.buffer.len_chars()
    }

    pub fn is_modified(&self) -> bool {
        self.buffer.is_modified()
    }

    pub fn highlights(&self) -> &HighlightResult {
        &self.highlights
    }

    /// Replaces the annotation set wholesale.
    pub fn set_highlights(&mut self, highlights: HighlightResult) {
        self.highlights = highlights;
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Caret offset (the active end of the selection).
    pub fn caret(&self) -> usize {
        self.selection.active
    }

    /// Caps the number of undo steps kept for this document.
    pub fn set_undo_limit(&mut self, limit: usize) {
        self.buffer.set_history_limit(limit);
    }

    /// Sets the selection, clamped to the text.
    pub fn set_selection(&mut self, mut selection: Selection) {
        selection.clamp(self.len_chars());
        self.selection = selection;
    }

    // ==================== Editing ====================

    /// Inserts text and leaves the caret after it.
    pub fn insert(&mut self, at: usize, text: &str) -> CoreResult<()> {
        self.buffer.insert(at, text)?;
        self.after_insert(at, text.chars().count());
        Ok(())
    }

    /// Deletes a range and returns the removed text.
    pub fn delete(&mut self, range: Range<usize>) -> CoreResult<String> {
        let removed = self.buffer.delete(range.clone())?;
        self.after_delete(range);
        Ok(removed)
    }

    /// Replaces a range as one undo step; the caret ends after the new text.
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> CoreResult<String> {
        let removed = self.buffer.replace(range.clone(), text)?;
        self.after_delete(range.clone());
        self.after_insert(range.start, text.chars().count());
        Ok(removed)
    }

    /// Replaces all content. History and annotations are reset.
    pub fn set_text(&mut self, text: &str) {
        self.buffer.set_text(text);
        self.highlights = HighlightResult::empty(self.buffer.len_chars());
        self.selection = Selection::caret(0);
    }

    pub fn undo(&mut self) -> CoreResult<()> {
        let applied = self.buffer.undo()?;
        self.replay(&applied);
        Ok(())
    }

    pub fn redo(&mut self) -> CoreResult<()> {
        let applied = self.buffer.redo()?;
        self.replay(&applied);
        Ok(())
    }

    /// Replaces every occurrence of `from` with `to`.
    ///
    /// Both strings must be non-empty. Returns the number of replacements.
    /// The selection stays on the text it covered.
    pub fn refactor(&mut self, from: &str, to: &str) -> CoreResult<usize> {
        if from.is_empty() || to.is_empty() {
            return Err(CoreError::InvalidOperation(
                "refactor needs a non-empty search and replacement".to_string(),
            ));
        }

        let starts = self.buffer.find_all(from);
        let count = self.buffer.replace_all(from, to)?;
        let (from_len, to_len) = (from.chars().count(), to.chars().count());
        for &start in starts.iter().rev() {
            self.highlights.shift_for_delete(start..start + from_len);
            self.highlights.shift_for_insert(start, to_len);
            self.selection.shift_for_delete(start..start + from_len);
            self.selection.shift_for_insert(start, to_len);
        }
        Ok(count)
    }

    /// Wraps the selection in the language's comment markers and selects
    /// the result.
    pub fn comment_selection(&mut self) -> CoreResult<()> {
        if self.selection.is_caret() {
            return Err(CoreError::EmptySelection);
        }
        let range = self.selection.range();

        let (open, close) = self.language.comment_markers();
        let selected = self.buffer.slice(range.clone())?.into_owned();
        let wrapped = format!("{open}{selected}{close}");
        self.replace(range.clone(), &wrapped)?;
        self.selection = Selection::new(range.start, range.start + wrapped.chars().count());
        Ok(())
    }

    fn replay(&mut self, edits: &[Edit]) {
        for edit in edits {
            match edit.kind {
                EditKind::Insert => self.after_insert(edit.position, edit.len_chars()),
                EditKind::Delete => {
                    self.after_delete(edit.position..edit.position + edit.len_chars())
                }
            }
        }
    }

    fn after_insert(&mut self, at: usize, len: usize) {
        self.highlights.shift_for_insert(at, len);
        self.selection.collapse_to(at + len);
    }

    fn after_delete(&mut self, range: Range<usize>) {
        self.highlights.shift_for_delete(range.clone());
        self.selection.collapse_to(range.start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyperpad_syntax::{ColorRole, Theme, highlight};

    fn highlighted(language: Language, text: &str) -> Document {
        let mut doc = Document::from_text(language, text);
        doc.set_highlights(highlight(text, language, &Theme::light()));
        doc
    }

    #[test]
    fn test_insert_moves_caret_and_colors() {
        let mut doc = highlighted(Language::Html, "<b></b>");
        doc.insert(0, "xx").unwrap();

        assert_eq!(doc.text(), "xx<b></b>");
        assert_eq!(doc.caret(), 2);
        assert_eq!(doc.highlights().role_at(3), Some(ColorRole::Keyword));
        assert_eq!(doc.highlights().role_at(1), None);
    }

    #[test]
    fn test_undo_shifts_colors_back() {
        let mut doc = highlighted(Language::Html, "<b></b>");
        doc.insert(1, "i ").unwrap();
        assert_eq!(doc.highlights().role_at(3), Some(ColorRole::Keyword));

        doc.undo().unwrap();
        assert_eq!(doc.text(), "<b></b>");
        assert_eq!(doc.highlights().role_at(1), Some(ColorRole::Keyword));
        assert_eq!(doc.caret(), 1);

        doc.redo().unwrap();
        assert_eq!(doc.text(), "<i b></b>");
    }

    #[test]
    fn test_refactor() {
        let mut doc = Document::from_text(Language::Js, "var a = 1; var b = 2;");
        let count = doc.refactor("var", "let").unwrap();
        assert_eq!(count, 2);
        assert_eq!(doc.text(), "let a = 1; let b = 2;");

        doc.undo().unwrap();
        assert_eq!(doc.text(), "var a = 1; var b = 2;");
    }

    #[test]
    fn test_refactor_keeps_selection_on_its_text() {
        let mut doc = highlighted(Language::Js, "a + b; a;");
        doc.set_selection(Selection::new(4, 5));
        doc.refactor("a", "alpha").unwrap();

        assert_eq!(doc.text(), "alpha + b; alpha;");
        assert_eq!(doc.selection(), Selection::new(8, 9));
        assert_eq!(doc.highlights().len_chars(), 17);
    }

    #[test]
    fn test_undo_limit() {
        let mut doc = Document::from_text(Language::Html, "");
        doc.set_undo_limit(1);
        doc.insert(0, "<p>\n").unwrap();
        doc.insert(4, "<b>\n").unwrap();

        doc.undo().unwrap();
        assert_eq!(doc.text(), "<p>\n");
        assert!(doc.undo().is_err());
    }

    #[test]
    fn test_refactor_rejects_empty_arguments() {
        let mut doc = Document::from_text(Language::Js, "x");
        assert!(matches!(
            doc.refactor("", "y"),
            Err(CoreError::InvalidOperation(_))
        ));
        assert!(doc.refactor("x", "").is_err());
        assert_eq!(doc.text(), "x");
    }

    #[test]
    fn test_comment_selection() {
        let mut doc = Document::from_text(Language::Css, "a { } b { }");
        doc.set_selection(Selection::new(0, 5));
        doc.comment_selection().unwrap();

        assert_eq!(doc.text(), "/* a { } */ b { }");
        assert_eq!(doc.selection().range(), 0..11);

        let mut html = Document::from_text(Language::Html, "<p>");
        html.set_selection(Selection::caret(1));
        assert!(matches!(html.comment_selection(), Err(CoreError::EmptySelection)));
    }

    #[test]
    fn test_open_detects_language() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("style.css");
        std::fs::write(&path, "body { }").unwrap();

        let doc = Document::open(&path).unwrap();
        assert_eq!(doc.language(), Language::Css);
        assert_eq!(doc.name(), "style.css");
        assert_eq!(doc.path(), Some(path.as_path()));
        assert_eq!(doc.text(), "body { }");
        assert_eq!(doc.highlights().len_chars(), 8);

        let other = dir.path().join("notes.txt");
        std::fs::write(&other, "x").unwrap();
        assert!(matches!(
            Document::open(&other),
            Err(CoreError::UnsupportedLanguage(_))
        ));
    }
}
