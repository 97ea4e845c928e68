//! Caret and selection handling.
//!
//! ## Learning: Range Types
//!
//! Selections are half-open character ranges, the same convention as
//! `std::ops::Range`: an empty selection (`anchor == active`) is the caret.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A selection anchored at one offset and extended to another.
///
/// `anchor` stays where the selection was started; `active` follows the
/// caret. Either may be the smaller of the two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: usize,
    pub active: usize,
}

impl Selection {
    /// Creates a selection from anchor to active.
    pub fn new(anchor: usize, active: usize) -> Self {
        Self { anchor, active }
    }

    /// Creates a zero-width selection (caret).
    pub fn caret(offset: usize) -> Self {
        Self {
            anchor: offset,
            active: offset,
        }
    }

    /// Returns true if this is a caret.
    pub fn is_caret(&self) -> bool {
        self.anchor == self.active
    }

    /// Smaller end.
    pub fn start(&self) -> usize {
        self.anchor.min(self.active)
    }

    /// Larger end.
    pub fn end(&self) -> usize {
        self.anchor.max(self.active)
    }

    /// The normalised half-open range.
    pub fn range(&self) -> Range<usize> {
        self.start()..self.end()
    }

    /// Collapses to a caret at `offset`.
    pub fn collapse_to(&mut self, offset: usize) {
        self.anchor = offset;
        self.active = offset;
    }

    /// Clamps both ends to a buffer of `len` characters.
    pub fn clamp(&mut self, len: usize) {
        self.anchor = self.anchor.min(len);
        self.active = self.active.min(len);
    }

    /// Adjusts the selection for an insertion of `len` characters at `at`.
    ///
    /// Offsets at or after the insertion point move right, so a caret sitting
    /// where text is typed ends up after it.
    pub fn shift_for_insert(&mut self, at: usize, len: usize) {
        let shift = |offset: usize| if offset >= at { offset + len } else { offset };
        self.anchor = shift(self.anchor);
        self.active = shift(self.active);
    }

    /// Adjusts the selection for the removal of `removed`.
    pub fn shift_for_delete(&mut self, removed: Range<usize>) {
        let width = removed.end - removed.start;
        let shift = |offset: usize| {
            if offset >= removed.end {
                offset - width
            } else if offset > removed.start {
                removed.start
            } else {
                offset
            }
        };
        self.anchor = shift(self.anchor);
        self.active = shift(self.active);
    }
}
