//! Caret-line shading and line numbers.
//!
//! The overlay is recomputed from scratch on every paint. Logical line
//! numbers are drawn on the first visual row of each line; wrapped
//! continuation rows get no number.

use serde::{Deserialize, Serialize};
use std::ops::Range;
use unicode_width::UnicodeWidthChar;

/// The host's text layout, in visual rows.
pub trait TextLayout {
    /// Number of visual rows. Never zero.
    fn line_count(&self) -> usize;

    /// Char offset of the first character of a row.
    fn line_start(&self, line: usize) -> usize;

    /// Char offset just past a row, including its newline if it has one.
    fn line_end(&self, line: usize) -> usize;

    /// Baseline of a row, in the host's units.
    fn line_baseline(&self, line: usize) -> f32;

    /// Row containing a char offset.
    fn line_for_offset(&self, offset: usize) -> usize;
}

/// Fixed-height rows with optional soft wrapping at a column width.
#[derive(Debug, Clone)]
pub struct MonospaceLayout {
    rows: Vec<Range<usize>>,
    line_height: f32,
}

impl MonospaceLayout {
    /// Lays out `text`. A `wrap_columns` of 0 disables wrapping.
    pub fn new(text: &str, wrap_columns: usize, line_height: f32) -> Self {
        let mut rows = Vec::new();
        let mut start = 0;
        let mut width = 0;
        let mut offset = 0;

        for c in text.chars() {
            if c == '\n' {
                rows.push(start..offset + 1);
                offset += 1;
                start = offset;
                width = 0;
                continue;
            }
            let char_width = c.width().unwrap_or(0);
            if wrap_columns > 0 && offset > start && width + char_width > wrap_columns {
                rows.push(start..offset);
                start = offset;
                width = 0;
            }
            width += char_width;
            offset += 1;
        }
        rows.push(start..offset);

        Self { rows, line_height }
    }
}

impl TextLayout for MonospaceLayout {
    fn line_count(&self) -> usize {
        self.rows.len()
    }

    fn line_start(&self, line: usize) -> usize {
        self.rows.get(line).map_or(0, |row| row.start)
    }

    fn line_end(&self, line: usize) -> usize {
        self.rows.get(line).map_or(0, |row| row.end)
    }

    fn line_baseline(&self, line: usize) -> f32 {
        (line + 1) as f32 * self.line_height
    }

    fn line_for_offset(&self, offset: usize) -> usize {
        let row = self.rows.partition_point(|row| row.end <= offset);
        row.min(self.rows.len().saturating_sub(1))
    }
}

/// What the host draws next to one visual row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayLine {
    pub baseline: f32,
    /// Shade this row
    pub is_caret_line: bool,
    /// 1-based logical line number to draw, if any
    pub number: Option<usize>,
}

/// Computes the overlay for one paint.
pub fn compute_overlay(
    text: &str,
    layout: &impl TextLayout,
    caret: Option<usize>,
    show_line_numbers: bool,
) -> Vec<OverlayLine> {
    let caret_row = caret.map(|offset| layout.line_for_offset(offset));
    let newline_ends: Vec<bool> = text.chars().map(|c| c == '\n').collect();

    let mut logical = 0;
    (0..layout.line_count())
        .map(|row| {
            let start = layout.line_start(row);
            let starts_line = row == 0
                || start
                    .checked_sub(1)
                    .and_then(|prev| newline_ends.get(prev).copied())
                    .unwrap_or(false);
            if starts_line {
                logical += 1;
            }
            OverlayLine {
                baseline: layout.line_baseline(row),
                is_caret_line: caret_row == Some(row),
                number: (show_line_numbers && starts_line).then_some(logical),
            }
        })
        .collect()
}

/// The text of each visual row, newlines included.
pub fn visual_lines(text: &str, layout: &impl TextLayout) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    (0..layout.line_count())
        .map(|row| {
            let end = layout.line_end(row).min(chars.len());
            let start = layout.line_start(row).min(end);
            chars[start..end].iter().collect()
        })
        .collect()
}
