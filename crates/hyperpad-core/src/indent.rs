//! Auto-indent for newline insertions.
//!
//! ## Learning: Scanning Backward
//!
//! There is no syntax tree to ask "am I inside a block?". Instead the
//! line before the caret is read right to left:
//!
//! ```text
//!   if (x) {|        ◄── walk starts at the caret
//!           ^ first non-blank is '{'      open -= 1
//!         ^ ')'                           open += 1
//!     ^ '('                               open -= 1
//! ```
//!
//! A negative balance means the line opened something (a block, an
//! unfinished expression, an open paren), so the new line gets one more
//! indent unit than the current one.

use serde::{Deserialize, Serialize};

/// Characters that leave the next line "open" when they end a line.
const OPENERS: &[char] = &['{', '+', '-', '*', '/', '%', '^', '='];

/// Whitespace to add after an inserted newline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndentDecision {
    pub inserted_whitespace: String,
}

impl IndentDecision {
    /// The full text to insert in place of the bare newline.
    pub fn newline_text(&self) -> String {
        format!("\n{}", self.inserted_whitespace)
    }
}

/// Computes the indentation for a newline inserted at char offset `at`.
///
/// The line before `at` contributes its leading whitespace. When the caret
/// splits a line that starts with `//`, the marker is carried over too, so a
/// line comment continues on the new line. Offsets past the end are clamped.
pub fn auto_indent(text: &str, at: usize, indent_unit: &str) -> IndentDecision {
    let split = text.char_indices().nth(at).map_or(text.len(), |(idx, _)| idx);
    let (head, tail) = text.split_at(split);

    let mut open = 0i32;
    let mut seen_content = false;
    let mut line_start = 0;
    for (idx, c) in head.char_indices().rev() {
        if c == '\n' {
            line_start = idx + 1;
            break;
        }
        if c == ' ' || c == '\t' {
            continue;
        }
        if !seen_content {
            if OPENERS.contains(&c) {
                open -= 1;
            }
            seen_content = true;
        }
        match c {
            '(' => open -= 1,
            ')' => open += 1,
            _ => {}
        }
    }

    let splits_line = tail.chars().next().is_some_and(|c| c != '\n');
    let line = &head[line_start..];
    let mut indent_end = line.len();
    for (idx, c) in line.char_indices() {
        if splits_line && c == '/' && line[idx + 1..].starts_with('/') {
            indent_end = idx + 2;
            break;
        }
        if c != ' ' && c != '\t' {
            indent_end = idx;
            break;
        }
    }

    let mut inserted_whitespace = line[..indent_end].to_string();
    if open < 0 {
        inserted_whitespace.push_str(indent_unit);
    }
    IndentDecision {
        inserted_whitespace,
    }
}
