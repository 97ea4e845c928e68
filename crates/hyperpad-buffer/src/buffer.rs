//! Core text buffer implementation using a rope.
//!
//! ## Why Rope?
//!
//! The editing surface mutates text one keystroke at a time, anywhere in the
//! document. A rope keeps each insertion and deletion O(log n), while
//! `text()` still hands the highlighter a contiguous `&str` for the common
//! small-file case without copying.

use ropey::Rope;
use std::borrow::Cow;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::history::{Edit, EditKind, History};
use crate::{BufferError, BufferResult};

const DEFAULT_HISTORY: usize = 1000;

/// A text buffer backed by a rope data structure.
///
/// # Thread Safety
///
/// `TextBuffer` is `Send` but not `Sync`. The edit pipeline owns it on a
/// single task; snapshots for highlighting are taken with [`TextBuffer::text`].
#[derive(Debug, Clone)]
pub struct TextBuffer {
    /// The rope holding our text content
    rope: Rope,

    /// Edit history for undo/redo
    history: History,

    /// Whether the buffer has unsaved changes
    modified: bool,

    /// Associated file path (if any)
    file_path: Option<PathBuf>,
}

impl TextBuffer {
    /// Creates a new empty buffer.
    ///
    /// # Example
    /// ```
    /// use hyperpad_buffer::TextBuffer;
    ///
    /// let buffer = TextBuffer::new();
    /// assert!(buffer.is_empty());
    /// ```
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            history: History::new(DEFAULT_HISTORY),
            modified: false,
            file_path: None,
        }
    }

    /// Loads a buffer from a file.
    pub fn from_file(path: impl AsRef<Path>) -> BufferResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let mut buffer = Self::from(content.as_str());
        buffer.file_path = Some(path.to_path_buf());
        Ok(buffer)
    }

    /// Saves the buffer to its associated file.
    pub fn save(&mut self) -> BufferResult<()> {
        let path = self.file_path.clone().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "No file path set")
        })?;
        self.save_as(&path)
    }

    /// Saves the buffer to a specific path.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> BufferResult<()> {
        let path = path.as_ref();

        // Write to a temporary file first, then rename (atomic write)
        let temp_path = path.with_extension("tmp");
        std::fs::write(&temp_path, self.text().as_bytes())?;
        std::fs::rename(&temp_path, path)?;

        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        Ok(())
    }

    // ==================== Text Access ====================

    /// Returns the entire text content.
    #[inline]
    pub fn text(&self) -> Cow<'_, str> {
        self.rope.slice(..).into()
    }

    /// Returns a slice of text by character range.
    pub fn slice(&self, range: Range<usize>) -> BufferResult<Cow<'_, str>> {
        self.check_range(&range)?;
        Ok(self.rope.slice(range).into())
    }

    // ==================== Measurements ====================

    /// Returns true if the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Returns the number of characters in the buffer.
    #[inline]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    // ==================== Mutations ====================

    /// Inserts text at a character index.
    pub fn insert(&mut self, char_idx: usize, text: &str) -> BufferResult<()> {
        if char_idx > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(char_idx));
        }
        if text.is_empty() {
            return Ok(());
        }

        self.history.push(Edit::insert(char_idx, text));
        self.rope.insert(char_idx, text);
        self.modified = true;
        Ok(())
    }

    /// Deletes text in a character range, returning what was removed.
    pub fn delete(&mut self, range: Range<usize>) -> BufferResult<String> {
        self.check_range(&range)?;
        if range.is_empty() {
            return Ok(String::new());
        }

        let deleted: String = self.rope.slice(range.clone()).into();
        self.history.push(Edit::delete(range.start, deleted.clone()));
        self.rope.remove(range);
        self.modified = true;
        Ok(deleted)
    }

    /// Replaces text in a range with new text as one undo step.
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> BufferResult<String> {
        self.check_range(&range)?;

        self.history.begin_group();
        let result = self.delete(range.clone()).and_then(|deleted| {
            self.insert(range.start, text)?;
            Ok(deleted)
        });
        self.history.end_group();
        result
    }

    /// Replaces the whole content and forgets the history.
    ///
    /// Used when a file's content is attached to the buffer; the result is
    /// not considered a modification.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.history.clear();
        self.modified = false;
    }

    // ==================== Undo/Redo ====================

    /// Undoes the last step.
    ///
    /// Returns the edits that were applied to the rope, in application order,
    /// so that callers can keep offsets (carets, annotations) in sync.
    pub fn undo(&mut self) -> BufferResult<Vec<Edit>> {
        let group = self.history.undo().ok_or(BufferError::NothingToUndo)?;
        let applied: Vec<Edit> = group.iter().rev().map(Edit::inverse).collect();
        for edit in &applied {
            self.apply_untracked(edit);
        }
        self.modified = true;
        Ok(applied)
    }

    /// Redoes the last undone step. Returns the edits applied to the rope.
    pub fn redo(&mut self) -> BufferResult<Vec<Edit>> {
        let group = self.history.redo().ok_or(BufferError::NothingToRedo)?;
        for edit in &group {
            self.apply_untracked(edit);
        }
        self.modified = true;
        Ok(group)
    }

    /// Returns true if there are edits to undo.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Returns true if there are edits to redo.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Keeps at most `max_history` undo steps, dropping the oldest ones.
    pub fn set_history_limit(&mut self, max_history: usize) {
        self.history.set_limit(max_history);
    }

    fn apply_untracked(&mut self, edit: &Edit) {
        match edit.kind {
            EditKind::Insert => self.rope.insert(edit.position, &edit.content),
            EditKind::Delete => {
                let end = edit.position + edit.len_chars();
                self.rope.remove(edit.position..end);
            }
        }
    }

    // ==================== State Queries ====================

    /// Returns true if the buffer has unsaved changes.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Returns the associated file path, if any.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    // ==================== Search ====================

    /// Finds all non-overlapping occurrences of a pattern.
    ///
    /// Returns character offsets of each match start.
    pub fn find_all(&self, pattern: &str) -> Vec<usize> {
        if pattern.is_empty() {
            return Vec::new();
        }
        let text = self.text();
        let mut chars_seen = 0;
        let mut bytes_seen = 0;
        text.match_indices(pattern)
            .map(|(byte_idx, _)| {
                chars_seen += text[bytes_seen..byte_idx].chars().count();
                bytes_seen = byte_idx;
                chars_seen
            })
            .collect()
    }

    /// Replaces all occurrences of a pattern as one undo step.
    ///
    /// Returns the number of replacements.
    pub fn replace_all(&mut self, pattern: &str, replacement: &str) -> BufferResult<usize> {
        let matches = self.find_all(pattern);
        if matches.is_empty() {
            return Ok(0);
        }

        let pattern_len = pattern.chars().count();

        self.history.begin_group();
        // Back to front keeps earlier offsets valid
        let result = matches.iter().rev().try_for_each(|&start| {
            self.delete(start..start + pattern_len)?;
            self.insert(start, replacement)
        });
        self.history.end_group();
        result.map(|()| matches.len())
    }

    fn check_range(&self, range: &Range<usize>) -> BufferResult<()> {
        if range.start > range.end || range.end > self.len_chars() {
            return Err(BufferError::InvalidRange {
                start: range.start,
                end: range.end,
            });
        }
        Ok(())
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TextBuffer {
    fn from(s: &str) -> Self {
        let mut buffer = Self::new();
        buffer.rope = Rope::from_str(s);
        buffer
    }
}

impl From<String> for TextBuffer {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}
