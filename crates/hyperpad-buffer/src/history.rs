//! Undo/redo history.
//!
//! ## Learning: The Command Pattern
//!
//! Each mutation of the buffer is stored as an [`Edit`] value that can be
//! reversed with [`Edit::inverse`]. Typing is coalesced: consecutive
//! single-line insertions that continue each other collapse into one undo
//! step, and a newline always starts a new step so that undoing an
//! auto-indented line break removes the indentation together with it.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// The type of edit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditKind {
    /// Text was inserted
    Insert,
    /// Text was deleted
    Delete,
}

/// A single edit operation, expressed in character offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    /// What kind of edit this is
    pub kind: EditKind,
    /// Character offset where the edit occurred
    pub position: usize,
    /// The text that was inserted or deleted
    pub content: String,
}

impl Edit {
    /// Creates an insert edit.
    pub fn insert(position: usize, content: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Insert,
            position,
            content: content.into(),
        }
    }

    /// Creates a delete edit.
    pub fn delete(position: usize, content: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Delete,
            position,
            content: content.into(),
        }
    }

    /// Number of characters carried by this edit.
    pub fn len_chars(&self) -> usize {
        self.content.chars().count()
    }

    /// Returns the edit that undoes this one.
    pub fn inverse(&self) -> Self {
        Self {
            kind: match self.kind {
                EditKind::Insert => EditKind::Delete,
                EditKind::Delete => EditKind::Insert,
            },
            position: self.position,
            content: self.content.clone(),
        }
    }

    /// Returns true if `next` continues this edit closely enough to share
    /// one undo step.
    fn continues_with(&self, next: &Edit) -> bool {
        if self.kind != next.kind || self.content.contains('\n') || next.content.contains('\n') {
            return false;
        }

        match self.kind {
            EditKind::Insert => self.position + self.len_chars() == next.position,
            // Backspace walks left, forward-delete stays put
            EditKind::Delete => {
                next.position + next.len_chars() == self.position || next.position == self.position
            }
        }
    }

    fn absorb(&mut self, next: Edit) {
        match self.kind {
            EditKind::Insert => self.content.push_str(&next.content),
            EditKind::Delete if next.position < self.position => {
                self.content = next.content + &self.content;
                self.position = next.position;
            }
            EditKind::Delete => self.content.push_str(&next.content),
        }
    }
}

/// Manages undo/redo stacks of edit groups.
///
/// A group is the unit of undo: all of its edits are reverted together.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: VecDeque<Vec<Edit>>,
    redo_stack: Vec<Vec<Edit>>,
    max_size: usize,
    open_group: bool,
}

impl History {
    /// Creates a new history keeping at most `max_size` undo steps.
    pub fn new(max_size: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_size: max_size.max(1),
            open_group: false,
        }
    }

    /// Records an edit. Clears the redo stack.
    pub fn push(&mut self, edit: Edit) {
        self.redo_stack.clear();

        if let Some(group) = self.undo_stack.back_mut() {
            if self.open_group {
                group.push(edit);
                return;
            }
            if group.len() == 1 && group[0].continues_with(&edit) {
                group[0].absorb(edit);
                return;
            }
        }

        self.undo_stack.push_back(vec![edit]);
        while self.undo_stack.len() > self.max_size {
            self.undo_stack.pop_front();
        }
    }

    /// Starts a compound step: every edit until [`History::end_group`]
    /// becomes one undo step.
    pub fn begin_group(&mut self) {
        self.redo_stack.clear();
        self.undo_stack.push_back(Vec::new());
        self.open_group = true;
    }

    /// Closes the compound step opened by [`History::begin_group`].
    pub fn end_group(&mut self) {
        self.open_group = false;
        if self.undo_stack.back().is_some_and(|group| group.is_empty()) {
            self.undo_stack.pop_back();
        }
        while self.undo_stack.len() > self.max_size {
            self.undo_stack.pop_front();
        }
    }

    /// Pops the most recent step. Edits are returned in the order they were
    /// originally applied.
    pub fn undo(&mut self) -> Option<Vec<Edit>> {
        let group = self.undo_stack.pop_back()?;
        self.redo_stack.push(group.clone());
        Some(group)
    }

    /// Pops the most recently undone step, in original application order.
    pub fn redo(&mut self) -> Option<Vec<Edit>> {
        let group = self.redo_stack.pop()?;
        self.undo_stack.push_back(group.clone());
        Some(group)
    }

    /// Returns true if there are edits to undo.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if there are edits to redo.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Clears all history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.open_group = false;
    }

    /// Changes the step limit, dropping the oldest steps beyond it.
    pub fn set_limit(&mut self, max_size: usize) {
        self.max_size = max_size.max(1);
        while self.undo_stack.len() > self.max_size {
            self.undo_stack.pop_front();
        }
    }
}
