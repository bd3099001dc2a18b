// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Undo/redo history.
//!
//! A bounded, linear log of full project snapshots with a cursor. The entry
//! at the cursor always mirrors the last committed state; undo and redo only
//! move the cursor and hand back a copy of the snapshot there.

use crate::models::project::MemeProject;

/// Maximum number of retained snapshots.
pub const MAX_HISTORY: usize = 50;

#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<MemeProject>,
    index: usize,
    max_size: usize,
}

impl History {
    /// Start a history whose only entry is `initial`.
    pub fn new(initial: &MemeProject) -> Self {
        Self::with_capacity(initial, MAX_HISTORY)
    }

    pub fn with_capacity(initial: &MemeProject, max_size: usize) -> Self {
        Self {
            entries: vec![initial.clone()],
            index: 0,
            max_size: max_size.max(1),
        }
    }

    /// Forget everything and start again from `initial`.
    pub fn reset(&mut self, initial: &MemeProject) {
        self.entries.clear();
        self.entries.push(initial.clone());
        self.index = 0;
    }

    /// Record a completed action. Any redo entries are discarded and the
    /// oldest entry is dropped once the cap is exceeded.
    pub fn commit(&mut self, project: &MemeProject) {
        self.entries.truncate(self.index + 1);
        self.entries.push(project.clone());
        if self.entries.len() > self.max_size {
            let overflow = self.entries.len() - self.max_size;
            self.entries.drain(..overflow);
        }
        self.index = self.entries.len() - 1;
    }

    /// Step back. Returns `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<MemeProject> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        Some(self.entries[self.index].clone())
    }

    /// Step forward. Returns `None` at the newest entry.
    pub fn redo(&mut self) -> Option<MemeProject> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        Some(self.entries[self.index].clone())
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Snapshot at the cursor.
    pub fn current(&self) -> &MemeProject {
        &self.entries[self.index]
    }

    /// Patch the snapshot at the cursor without recording an action. Only
    /// for state that is not part of the edit history.
    pub fn amend_current(&mut self, patch: impl FnOnce(&mut MemeProject)) {
        patch(&mut self.entries[self.index]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::element::CanvasElement;

    fn with_elements(base: &MemeProject, count: usize) -> MemeProject {
        let mut project = base.clone();
        for _ in 0..count {
            project.elements.push(CanvasElement::text());
        }
        project
    }

    #[test]
    fn test_undo_walks_back_to_initial() {
        let initial = MemeProject::default();
        let mut history = History::new(&initial);
        let mut states = vec![initial.clone()];
        let mut current = initial.clone();
        for _ in 0..5 {
            current = with_elements(&current, 1);
            history.commit(&current);
            states.push(current.clone());
        }

        assert_eq!(history.undo().as_ref(), Some(&states[4]));
        for expected in states[..4].iter().rev() {
            assert_eq!(history.undo().as_ref(), Some(expected));
        }
        assert!(!history.can_undo());
        assert_eq!(history.undo(), None);
        assert_eq!(history.current(), &initial);
    }

    #[test]
    fn test_redo_restores_exact_snapshot() {
        let initial = MemeProject::default();
        let mut history = History::new(&initial);
        let next = with_elements(&initial, 2);
        history.commit(&next);

        history.undo();
        assert!(history.can_redo());
        assert_eq!(history.redo(), Some(next));
        assert!(!history.can_redo());
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn test_commit_discards_redo_branch() {
        let initial = MemeProject::default();
        let mut history = History::new(&initial);
        history.commit(&with_elements(&initial, 1));
        history.commit(&with_elements(&initial, 2));
        history.undo();

        let branch = with_elements(&initial, 7);
        history.commit(&branch);
        assert_eq!(history.len(), 3);
        assert!(!history.can_redo());
        assert_eq!(history.current(), &branch);
    }

    #[test]
    fn test_history_is_capped() {
        let initial = MemeProject::default();
        let mut history = History::new(&initial);
        let mut states = vec![initial.clone()];
        for n in 1..=MAX_HISTORY {
            let state = with_elements(&initial, n);
            history.commit(&state);
            states.push(state);
        }
        // 51 states were recorded; only the newest 50 remain.
        assert_eq!(history.len(), MAX_HISTORY);
        assert_eq!(history.index(), MAX_HISTORY - 1);

        let mut undone = 0;
        while history.undo().is_some() {
            undone += 1;
        }
        assert_eq!(undone, MAX_HISTORY - 1);
        assert_eq!(history.current(), &states[1]);
    }

    #[test]
    fn test_boundary_noops() {
        let initial = MemeProject::default();
        let mut history = History::new(&initial);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), None);
        assert_eq!(history.len(), 1);
    }
}
