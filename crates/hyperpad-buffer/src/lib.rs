//! # Hyperpad Buffer
//!
//! Mutable text storage for the editing surface.
//!
//! ## Key Concepts
//!
//! ### Offsets, not positions
//! Every API in this crate speaks in **character offsets** (Unicode scalar
//! values counted from the start of the buffer). The highlighter, the
//! auto-indenter and the completion tokenizer all reason about "the character
//! before" or "the character after" an offset, so a flat offset space keeps
//! them simple. Line views are derived from the text where needed.
//!
//! ### Ownership
//! - `TextBuffer` owns its rope exclusively
//! - Readers borrow (`text()` returns a `Cow<str>`)
//! - Mutations require `&mut self`, so a highlight pass holding a snapshot
//!   can never observe a half-applied edit

mod buffer;
mod history;
mod selection;

pub use buffer::TextBuffer;
pub use history::{Edit, EditKind, History};
pub use selection::Selection;

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur during buffer operations
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("Invalid character index: {0}")]
    InvalidCharIndex(usize),

    #[error("Invalid range: {start}..{end}")]
    InvalidRange { start: usize, end: usize },

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_creation() {
        let buffer = TextBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.len_chars(), 0);
    }

    #[test]
    fn test_buffer_from_string() {
        let buffer = TextBuffer::from("<p>Hello</p>");
        assert_eq!(buffer.len_chars(), 12);
        assert_eq!(buffer.text(), "<p>Hello</p>");
    }

    #[test]
    fn test_insert_and_delete() {
        let mut buffer = TextBuffer::new();
        buffer.insert(0, "<div>").unwrap();
        buffer.insert(5, "</div>").unwrap();
        assert_eq!(buffer.text(), "<div></div>");

        buffer.delete(0..5).unwrap();
        assert_eq!(buffer.text(), "</div>");
    }

    #[test]
    fn test_undo_redo() {
        let mut buffer = TextBuffer::new();
        buffer.insert(0, "body {").unwrap();
        buffer.insert(6, "\n}").unwrap();
        assert_eq!(buffer.text(), "body {\n}");

        buffer.undo().unwrap();
        assert_eq!(buffer.text(), "body {");

        buffer.redo().unwrap();
        assert_eq!(buffer.text(), "body {\n}");
    }
}
