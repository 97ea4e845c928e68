//! # Hyperpad Syntax
//!
//! Regex-driven syntax highlighting for HTML, CSS and JavaScript.
//!
//! ## Why not a parser?
//!
//! The editing surface re-colors the whole buffer after typing settles.
//! Documents are small, so a handful of regular expressions run over the
//! full text is fast enough and, unlike a grammar, never rejects half-typed
//! input. Every pass starts from scratch and returns a fresh
//! [`HighlightResult`]; nothing is patched incrementally.
//!
//! ## Learning: Layered Paint
//!
//! Rules are applied in order and each match paints its span. When two
//! rules cover the same character, the later one wins:
//!
//! ```text
//! text     |  color: red; /* x: y; */
//! params   |  ^^^^^
//! value    |        ^^^^       ^^
//! comment  |              ^^^^^^^^^^^
//! result   |  PPPPP EEEE  CCCCCCCCCCC
//! ```
//!
//! [`HighlightResult::layers`] keeps every annotation in application order;
//! [`HighlightResult::spans`] is the flattened, non-overlapping view a
//! renderer consumes.

mod highlighter;
mod language;
mod rules;
mod theme;
mod words;

pub use highlighter::{Annotation, HighlightResult, HighlightSpan, Highlighter, highlight};
pub use language::Language;
pub use rules::{Guard, Matcher, TokenRule, rules_for};
pub use theme::{Color, ColorRole, EditorColors, SyntaxColors, Theme, color_for};
pub use words::html_tags;

/// Result type for syntax operations
pub type SyntaxResult<T> = Result<T, SyntaxError>;

/// Errors raised while building rule sets or painting a pass.
///
/// None of these reach callers of [`highlight`]: a failing pass is logged
/// and returns what it painted so far.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SyntaxError {
    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("Invalid pattern for rule '{rule}': {source}")]
    InvalidPattern {
        rule: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("Rule '{rule}' painted {start}..{end} outside a text of {len} bytes")]
    RangeOutOfBounds {
        rule: &'static str,
        start: usize,
        end: usize,
        len: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_noop() {
        for language in [Language::Html, Language::Css, Language::Js] {
            let result = highlight("", language, &Theme::light());
            assert!(result.is_empty());
            assert!(result.spans().is_empty());
        }
    }

    #[test]
    fn test_language_from_extension() {
        assert_eq!(Language::from_extension("css"), Some(Language::Css));
        assert_eq!(Language::from_path("site/app.js"), Some(Language::Js));
        assert_eq!(Language::from_extension("rs"), None);
    }

    #[test]
    fn test_layered_paint_last_rule_wins() {
        let text = "a { color: red; } /* b: c; */";
        let result = highlight(text, Language::Css, &Theme::light());

        // "b" inside the comment is first painted by the value scan, then by the comment
        let b = text.find("b:").unwrap();
        assert_eq!(result.role_at(b), Some(ColorRole::Comment));
        assert_eq!(result.role_at(text.find("color").unwrap()), Some(ColorRole::Params));
    }
}
