// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Group operations.
//!
//! Groups only hold element ids; the paint order lives in the project's
//! element list and none of these operations touch it.

use super::store::LayerMove;
use super::{Editor, EditorError, EditorResult};
use crate::models::element::ElementId;
use crate::models::group::{GroupId, LayerGroup};
use std::collections::HashSet;

impl Editor {
    /// Detach `id` from whatever group holds it.
    fn detach(&mut self, id: ElementId) {
        for group in &mut self.project.groups {
            group.remove(id);
        }
    }

    /// Create a group from `ids`. Unknown ids are dropped, ids already in
    /// another group are moved into the new one.
    pub fn create_group(&mut self, ids: &[ElementId], name: &str) -> EditorResult<GroupId> {
        let mut seen = HashSet::new();
        let members: Vec<ElementId> = ids
            .iter()
            .copied()
            .filter(|id| self.project.element(*id).is_some() && seen.insert(*id))
            .collect();
        for &id in &members {
            self.detach(id);
        }

        let group = LayerGroup::new(name, members);
        let group_id = group.id;
        log::info!("Created group {} with {} elements", group.name, group.elements.len());
        self.project.groups.push(group);
        self.mark_changed();
        self.commit("create group");
        Ok(group_id)
    }

    /// Move `id` back to the ungrouped list. No-op when it is ungrouped.
    pub fn remove_from_group(&mut self, id: ElementId) -> EditorResult<()> {
        if self.project.element(id).is_none() {
            return Err(EditorError::UnknownElement(id));
        }
        if self.project.group_of(id).is_none() {
            return Ok(());
        }
        self.detach(id);
        self.mark_changed();
        self.commit("remove from group");
        Ok(())
    }

    /// Move `id` into `group`, leaving any previous group.
    pub fn add_to_group(&mut self, id: ElementId, group: GroupId) -> EditorResult<()> {
        if self.project.element(id).is_none() {
            return Err(EditorError::UnknownElement(id));
        }
        if self.project.group(group).is_none() {
            return Err(EditorError::UnknownGroup(group));
        }
        if self.project.group_of(id) == Some(group) {
            return Ok(());
        }
        self.detach(id);
        if let Some(target) = self.project.group_mut(group) {
            target.elements.push(id);
        }
        self.mark_changed();
        self.commit("add to group");
        Ok(())
    }

    /// Remove a group. Its elements stay on the canvas, ungrouped.
    pub fn delete_group(&mut self, group: GroupId) -> EditorResult<()> {
        let index = self
            .project
            .groups
            .iter()
            .position(|g| g.id == group)
            .ok_or(EditorError::UnknownGroup(group))?;
        let removed = self.project.groups.remove(index);
        self.mark_changed();
        self.commit("delete group");
        log::info!("Deleted group {}, {} elements ungrouped", removed.name, removed.elements.len());
        Ok(())
    }

    pub fn rename_group(&mut self, group: GroupId, name: &str) -> EditorResult<()> {
        let target = self.project.group_mut(group).ok_or(EditorError::UnknownGroup(group))?;
        let name = name.trim();
        if name.is_empty() || target.name == name {
            return Ok(());
        }
        target.name = name.to_string();
        self.mark_changed();
        self.commit("rename group");
        Ok(())
    }

    /// Collapse or expand a group in the layers panel. Not an edit: no
    /// history entry and no new modification time. The committed snapshot
    /// follows along so the flag survives undo and redo.
    pub fn toggle_group_expanded(&mut self, group: GroupId) -> EditorResult<()> {
        let target = self.project.group_mut(group).ok_or(EditorError::UnknownGroup(group))?;
        target.expanded = !target.expanded;
        let expanded = target.expanded;
        self.history.amend_current(|snapshot| {
            if let Some(committed) = snapshot.group_mut(group) {
                committed.expanded = expanded;
            }
        });
        self.revision = self.revision.wrapping_add(1);
        Ok(())
    }

    /// Move `id` one step within its group's member order. Moving past
    /// either end is a no-op.
    pub fn move_in_group(&mut self, group: GroupId, id: ElementId, direction: LayerMove) -> EditorResult<()> {
        let target = self.project.group(group).ok_or(EditorError::UnknownGroup(group))?;
        let index = target
            .elements
            .iter()
            .position(|member| *member == id)
            .ok_or(EditorError::UnknownElement(id))?;
        let neighbour = match direction {
            LayerMove::Up => index + 1,
            LayerMove::Down => match index.checked_sub(1) {
                Some(neighbour) => neighbour,
                None => return Ok(()),
            },
        };
        if neighbour >= target.elements.len() {
            return Ok(());
        }
        let mut order = target.elements.clone();
        order.swap(index, neighbour);
        self.reorder_elements_in_group(group, &order)
    }

    /// Reorder the members of `group`. `order` must be a permutation of its
    /// current members.
    pub fn reorder_elements_in_group(&mut self, group: GroupId, order: &[ElementId]) -> EditorResult<()> {
        let target = self.project.group(group).ok_or(EditorError::UnknownGroup(group))?;
        let current: HashSet<ElementId> = target.elements.iter().copied().collect();
        let proposed: HashSet<ElementId> = order.iter().copied().collect();
        if order.len() != target.elements.len() || proposed != current {
            return Err(EditorError::InvalidOrder(format!(
                "order is not a permutation of the members of group {group}"
            )));
        }
        if target.elements == order {
            return Ok(());
        }

        if let Some(target) = self.project.group_mut(group) {
            target.elements = order.to_vec();
        }
        self.mark_changed();
        self.commit("reorder group");
        Ok(())
    }

    /// Element ids in paint order that belong to no group.
    pub fn ungrouped(&self) -> Vec<ElementId> {
        self.project.ungrouped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::group::DEFAULT_GROUP_NAME;

    fn editor_with(count: usize) -> (Editor, Vec<ElementId>) {
        let mut editor = Editor::default();
        let ids = (0..count).map(|_| editor.add_text()).collect();
        (editor, ids)
    }

    #[test]
    fn test_create_group_filters_and_moves() {
        let (mut editor, ids) = editor_with(3);
        let first = editor.create_group(&[ids[0], ids[1]], "").unwrap();
        assert_eq!(editor.project().group(first).unwrap().name, DEFAULT_GROUP_NAME);

        let ghost = ElementId::new();
        let second = editor.create_group(&[ids[1], ghost, ids[2], ids[2]], "b").unwrap();
        assert_eq!(editor.project().group(first).unwrap().elements, vec![ids[0]]);
        assert_eq!(editor.project().group(second).unwrap().elements, vec![ids[1], ids[2]]);
        assert!(editor.project().check_integrity().is_ok());
    }

    #[test]
    fn test_in_group_reorder_leaves_flat_list_alone() {
        let (mut editor, ids) = editor_with(4);
        let group = editor.create_group(&[ids[0], ids[2]], "pair").unwrap();
        let flat_before: Vec<ElementId> = editor.project().elements.iter().map(|e| e.id).collect();
        let ungrouped_before = editor.ungrouped();

        editor.reorder_elements_in_group(group, &[ids[2], ids[0]]).unwrap();

        let flat_after: Vec<ElementId> = editor.project().elements.iter().map(|e| e.id).collect();
        assert_eq!(flat_after, flat_before);
        assert_eq!(editor.ungrouped(), ungrouped_before);
        assert_eq!(ungrouped_before, vec![ids[1], ids[3]]);
        assert_eq!(editor.project().group(group).unwrap().elements, vec![ids[2], ids[0]]);
    }

    #[test]
    fn test_in_group_reorder_rejects_foreign_ids() {
        let (mut editor, ids) = editor_with(3);
        let group = editor.create_group(&[ids[0], ids[1]], "pair").unwrap();
        let entries = editor.history().len();

        assert!(matches!(
            editor.reorder_elements_in_group(group, &[ids[0], ids[2]]),
            Err(EditorError::InvalidOrder(_))
        ));
        assert!(matches!(
            editor.reorder_elements_in_group(group, &[ids[0]]),
            Err(EditorError::InvalidOrder(_))
        ));
        assert_eq!(editor.history().len(), entries);
    }

    #[test]
    fn test_delete_group_keeps_elements() {
        let (mut editor, ids) = editor_with(2);
        let group = editor.create_group(&ids, "both").unwrap();
        editor.delete_group(group).unwrap();

        assert!(editor.project().groups.is_empty());
        assert_eq!(editor.project().elements.len(), 2);
        assert_eq!(editor.ungrouped(), ids);
        assert_eq!(editor.delete_group(group), Err(EditorError::UnknownGroup(group)));
    }

    #[test]
    fn test_membership_moves() {
        let (mut editor, ids) = editor_with(2);
        let a = editor.create_group(&[ids[0]], "a").unwrap();
        let b = editor.create_group(&[ids[1]], "b").unwrap();

        editor.add_to_group(ids[0], b).unwrap();
        assert!(editor.project().group(a).unwrap().elements.is_empty());
        assert_eq!(editor.project().group(b).unwrap().elements, vec![ids[1], ids[0]]);

        editor.remove_from_group(ids[1]).unwrap();
        assert_eq!(editor.ungrouped(), vec![ids[1]]);
        assert!(editor.project().check_integrity().is_ok());
    }

    #[test]
    fn test_toggle_expanded_is_not_an_edit() {
        let (mut editor, ids) = editor_with(1);
        let group = editor.create_group(&ids, "g").unwrap();
        let entries = editor.history().len();
        let updated_at = editor.project().updated_at;

        editor.toggle_group_expanded(group).unwrap();
        assert!(!editor.project().group(group).unwrap().expanded);
        assert_eq!(editor.history().len(), entries);
        assert_eq!(editor.project().updated_at, updated_at);
    }

    #[test]
    fn test_expanded_flag_survives_undo_and_redo() {
        let (mut editor, ids) = editor_with(2);
        let group = editor.create_group(&ids[..1], "g").unwrap();
        editor.toggle_group_expanded(group).unwrap();
        editor.add_shape(crate::models::element::ShapeKind::Star);

        assert!(editor.undo());
        assert!(!editor.project().group(group).unwrap().expanded);
        editor.toggle_group_expanded(group).unwrap();
        assert!(editor.redo());
        assert!(editor.project().group(group).unwrap().expanded);

        // Toggling alone never leaves anything to commit.
        assert!(!editor.commit_edit("edit"));
    }

    #[test]
    fn test_move_in_group_swaps_members_only() {
        let (mut editor, ids) = editor_with(3);
        let group = editor.create_group(&ids[..2], "g").unwrap();
        let paint_order: Vec<ElementId> = editor.project().elements.iter().map(|e| e.id).collect();
        let entries = editor.history().len();

        editor.move_in_group(group, ids[0], LayerMove::Up).unwrap();
        assert_eq!(editor.project().group(group).unwrap().elements, vec![ids[1], ids[0]]);
        let after: Vec<ElementId> = editor.project().elements.iter().map(|e| e.id).collect();
        assert_eq!(after, paint_order);
        assert_eq!(editor.history().len(), entries + 1);

        editor.move_in_group(group, ids[0], LayerMove::Up).unwrap();
        assert_eq!(editor.history().len(), entries + 1);
        assert_eq!(
            editor.move_in_group(group, ids[2], LayerMove::Down),
            Err(EditorError::UnknownElement(ids[2]))
        );
    }

    #[test]
    fn test_rename_group() {
        let (mut editor, ids) = editor_with(1);
        let group = editor.create_group(&ids, "g").unwrap();
        editor.rename_group(group, " Captions ").unwrap();
        assert_eq!(editor.project().group(group).unwrap().name, "Captions");
    }
}
