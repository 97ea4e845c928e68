//! Tag completion.
//!
//! The token under the caret starts right after the nearest `<` before it
//! and ends at the next whitespace, `>` or `/`. Accepting a tag name turns
//! `<di|` into `<div></div>`.

use hyperpad_syntax::{Language, html_tags};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Char span of the token being completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionToken {
    pub start: usize,
    pub end: usize,
}

impl CompletionToken {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// One entry of the suggestion list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub label: String,
    /// Already carries its own structure and is inserted verbatim
    pub already_structured: bool,
}

impl Suggestion {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            already_structured: false,
        }
    }

    /// A suggestion inserted exactly as written.
    pub fn structured(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            already_structured: true,
        }
    }
}

/// Suggests tag names for the token under the caret.
#[derive(Debug, Clone)]
pub struct Completer {
    vocabulary: &'static [&'static str],
    /// Minimum typed characters before suggesting
    threshold: usize,
}

impl Completer {
    /// Every language completes HTML tag names.
    pub fn for_language(_language: Language) -> Self {
        Self {
            vocabulary: html_tags(),
            threshold: 1,
        }
    }

    /// Start of the token: just after the last `<` before `cursor`, or
    /// `cursor` itself when there is none.
    pub fn token_start(text: &str, cursor: usize) -> usize {
        let head = prefix(text, cursor);
        match head.rfind('<') {
            Some(idx) => cursor.min(head.chars().count()) - head[idx + 1..].chars().count(),
            None => cursor,
        }
    }

    /// End of the token: the first whitespace, `>` or `/` at or after `cursor`.
    pub fn token_end(text: &str, cursor: usize) -> usize {
        let head_len = prefix(text, cursor).chars().count();
        let rest = text.chars().skip(head_len);
        head_len
            + rest
                .take_while(|&c| !(c.is_whitespace() || c == '>' || c == '/'))
                .count()
    }

    pub fn token(text: &str, cursor: usize) -> CompletionToken {
        CompletionToken {
            start: Self::token_start(text, cursor),
            end: Self::token_end(text, cursor),
        }
    }

    /// Tags starting with what was typed between the token start and the
    /// caret. Matching ignores ASCII case.
    pub fn suggestions(&self, text: &str, cursor: usize) -> Vec<Suggestion> {
        let start = Self::token_start(text, cursor);
        let typed: String = prefix(text, cursor).chars().skip(start).collect();
        if typed.chars().count() < self.threshold {
            return Vec::new();
        }
        let typed = typed.to_ascii_lowercase();
        self.vocabulary
            .iter()
            .filter(|tag| tag.starts_with(&typed))
            .map(|tag| Suggestion::new(*tag))
            .collect()
    }

    /// Text that replaces the token when `suggestion` is accepted.
    pub fn terminate(suggestion: &Suggestion) -> String {
        let label = &suggestion.label;
        if suggestion.already_structured || label.ends_with(char::is_whitespace) {
            label.clone()
        } else {
            format!("{label}></{label}>")
        }
    }

    /// Returns the span to replace and the text to put there.
    pub fn accept(text: &str, cursor: usize, suggestion: &Suggestion) -> (Range<usize>, String) {
        (Self::token(text, cursor).range(), Self::terminate(suggestion))
    }
}

/// `text` up to char offset `cursor`, clamped.
fn prefix(text: &str, cursor: usize) -> &str {
    let end = text
        .char_indices()
        .nth(cursor)
        .map_or(text.len(), |(idx, _)| idx);
    &text[..end]
}
