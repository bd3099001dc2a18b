// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Element operations on the live project.
//!
//! Every discrete operation here is one history entry, except
//! [`Editor::update_element`], which leaves the commit to its caller so that
//! continuous edits (drags, slider moves) collapse into a single entry.

use super::{Editor, EditorError, EditorResult};
use crate::models::element::{CanvasElement, ElementId, ShapeKind};
use crate::models::project::{CanvasSettings, CropRatio};
use crate::util::geometry::{clamp_rect, fit_within};
use std::collections::HashSet;

/// Direction for a single-step z-order move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerMove {
    /// One step towards the front (later in paint order).
    Up,
    /// One step towards the back.
    Down,
}

impl Editor {
    /// Clamp geometry and opacity of `element` to the live canvas.
    fn normalize(&self, element: &mut CanvasElement) {
        element.normalize(self.project.bounds());
    }

    /// Append `element` on top of the paint order and select it.
    pub fn add_element(&mut self, mut element: CanvasElement) -> ElementId {
        self.normalize(&mut element);
        let id = element.id;
        log::info!("Added {:?} element {}", element.element_type(), id);
        self.project.elements.push(element);
        self.selection = Some(id);
        self.mark_changed();
        self.commit("add element");
        id
    }

    pub fn add_text(&mut self) -> ElementId {
        self.add_element(CanvasElement::text())
    }

    /// Add an image, scaled down to fit the canvas when its natural size is
    /// larger.
    pub fn add_image(&mut self, src: impl Into<String>, natural_size: Option<(u32, u32)>) -> ElementId {
        let mut element = CanvasElement::image(src, natural_size);
        let bounds = self.project.bounds();
        let (width, height) = fit_within(element.width, element.height, bounds.width, bounds.height);
        element.width = width;
        element.height = height;
        self.add_element(element)
    }

    pub fn add_shape(&mut self, shape: ShapeKind) -> ElementId {
        self.add_element(CanvasElement::shape(shape))
    }

    /// Apply `patch` to the element with `id`. Geometry is re-clamped; the
    /// id cannot change. No history entry is pushed.
    pub fn update_element<F>(&mut self, id: ElementId, patch: F) -> EditorResult<()>
    where
        F: FnOnce(&mut CanvasElement),
    {
        let index = self.project.index_of(id).ok_or(EditorError::UnknownElement(id))?;
        let mut element = self.project.elements[index].clone();
        patch(&mut element);
        element.id = id;
        self.normalize(&mut element);
        if element != self.project.elements[index] {
            self.project.elements[index] = element;
            self.mark_changed();
        }
        Ok(())
    }

    /// Replace the element with the same id. No history entry is pushed.
    pub fn replace_element(&mut self, element: CanvasElement) -> EditorResult<()> {
        let id = element.id;
        self.update_element(id, move |current| *current = element)
    }

    /// Remove an element and every group reference to it.
    pub fn delete_element(&mut self, id: ElementId) -> EditorResult<()> {
        let index = self.project.index_of(id).ok_or(EditorError::UnknownElement(id))?;
        self.project.elements.remove(index);
        for group in &mut self.project.groups {
            group.remove(id);
        }
        if self.selection == Some(id) {
            self.selection = None;
        }
        self.mark_changed();
        self.commit("delete element");
        log::info!("Deleted element {}, total: {}", id, self.project.elements.len());
        Ok(())
    }

    /// Clone an element with a new id, offset by (+20, +20), on top of the
    /// paint order. The copy joins the original's group.
    pub fn duplicate_element(&mut self, id: ElementId) -> EditorResult<ElementId> {
        let original = self.project.element(id).ok_or(EditorError::UnknownElement(id))?;
        let mut copy = original.duplicate();
        self.normalize(&mut copy);
        let copy_id = copy.id;

        if let Some(group_id) = self.project.group_of(id) {
            if let Some(group) = self.project.group_mut(group_id) {
                group.elements.push(copy_id);
            }
        }
        self.project.elements.push(copy);
        self.selection = Some(copy_id);
        self.mark_changed();
        self.commit("duplicate element");
        log::info!("Duplicated element {} as {}", id, copy_id);
        Ok(copy_id)
    }

    /// Replace the paint order wholesale. `order` must be a permutation of
    /// the current element ids. Group membership is untouched.
    pub fn reorder_elements(&mut self, order: &[ElementId]) -> EditorResult<()> {
        if order.len() != self.project.elements.len() {
            return Err(EditorError::InvalidOrder(format!(
                "expected {} ids, got {}",
                self.project.elements.len(),
                order.len()
            )));
        }
        let mut seen = HashSet::new();
        let mut reordered = Vec::with_capacity(order.len());
        for &id in order {
            if !seen.insert(id) {
                return Err(EditorError::InvalidOrder(format!("{id} listed twice")));
            }
            let element = self.project.element(id).ok_or(EditorError::UnknownElement(id))?;
            reordered.push(element.clone());
        }
        if reordered == self.project.elements {
            return Ok(());
        }
        self.project.elements = reordered;
        self.mark_changed();
        self.commit("reorder elements");
        Ok(())
    }

    /// Swap an element with its neighbour in paint order. Moving past
    /// either end is a no-op.
    pub fn move_layer(&mut self, id: ElementId, direction: LayerMove) -> EditorResult<()> {
        let index = self.project.index_of(id).ok_or(EditorError::UnknownElement(id))?;
        let target = match direction {
            LayerMove::Up => index + 1,
            LayerMove::Down => match index.checked_sub(1) {
                Some(target) => target,
                None => return Ok(()),
            },
        };
        if target >= self.project.elements.len() {
            return Ok(());
        }
        let mut order: Vec<ElementId> = self.project.elements.iter().map(|e| e.id).collect();
        order.swap(index, target);
        self.reorder_elements(&order)
    }

    /// Swap an ungrouped element with the next ungrouped element in paint
    /// order, stepping over grouped ones. Moving past either end is a no-op.
    pub fn move_ungrouped(&mut self, id: ElementId, direction: LayerMove) -> EditorResult<()> {
        let ungrouped = self.project.ungrouped();
        let position = ungrouped
            .iter()
            .position(|member| *member == id)
            .ok_or(EditorError::UnknownElement(id))?;
        let neighbour = match direction {
            LayerMove::Up => ungrouped.get(position + 1),
            LayerMove::Down => position.checked_sub(1).and_then(|p| ungrouped.get(p)),
        };
        let Some(&neighbour) = neighbour else {
            return Ok(());
        };
        let mut order: Vec<ElementId> = self.project.elements.iter().map(|e| e.id).collect();
        let (Some(from), Some(to)) = (self.project.index_of(id), self.project.index_of(neighbour)) else {
            return Ok(());
        };
        order.swap(from, to);
        self.reorder_elements(&order)
    }

    pub fn bring_to_front(&mut self, id: ElementId) -> EditorResult<()> {
        let index = self.project.index_of(id).ok_or(EditorError::UnknownElement(id))?;
        let mut order: Vec<ElementId> = self.project.elements.iter().map(|e| e.id).collect();
        let moved = order.remove(index);
        order.push(moved);
        self.reorder_elements(&order)
    }

    pub fn send_to_back(&mut self, id: ElementId) -> EditorResult<()> {
        let index = self.project.index_of(id).ok_or(EditorError::UnknownElement(id))?;
        let mut order: Vec<ElementId> = self.project.elements.iter().map(|e| e.id).collect();
        let moved = order.remove(index);
        order.insert(0, moved);
        self.reorder_elements(&order)
    }

    /// Patch an element and commit the result as one action.
    fn edit_and_commit<F>(&mut self, id: ElementId, action: &str, patch: F) -> EditorResult<()>
    where
        F: FnOnce(&mut CanvasElement),
    {
        self.update_element(id, patch)?;
        self.commit_edit(action);
        Ok(())
    }

    pub fn toggle_visibility(&mut self, id: ElementId) -> EditorResult<()> {
        self.edit_and_commit(id, "toggle visibility", |e| e.visible = !e.visible)
    }

    pub fn toggle_lock(&mut self, id: ElementId) -> EditorResult<()> {
        self.edit_and_commit(id, "toggle lock", |e| e.locked = !e.locked)
    }

    /// Set the layer name. A blank name restores the derived one.
    pub fn rename_element(&mut self, id: ElementId, name: &str) -> EditorResult<()> {
        let name = name.trim();
        let name = (!name.is_empty()).then(|| name.to_string());
        self.edit_and_commit(id, "rename element", move |e| e.name = name)
    }

    pub fn rotate_by(&mut self, id: ElementId, degrees: f64) -> EditorResult<()> {
        self.edit_and_commit(id, "rotate element", move |e| e.rotation += degrees)
    }

    /// Resize the canvas (clamped to 100..=5000 per side). Elements are
    /// pulled back inside the new bounds.
    pub fn set_canvas_size(&mut self, width: u32, height: u32) {
        let (width, height) = CanvasSettings::clamp_size(width, height);
        if (width, height) == (self.project.canvas.width, self.project.canvas.height) {
            return;
        }
        self.project.canvas.width = width;
        self.project.canvas.height = height;
        let bounds = self.project.bounds();
        for element in &mut self.project.elements {
            element.set_rect(clamp_rect(element.rect(), bounds));
        }
        self.mark_changed();
        self.commit("resize canvas");
        log::info!("Canvas resized to {}x{}", width, height);
    }

    pub fn set_canvas_background(&mut self, color: &str) {
        if self.project.canvas.background_color == color {
            return;
        }
        self.project.canvas.background_color = color.to_string();
        self.mark_changed();
        self.commit("canvas background");
    }

    /// Change the background without committing; used while a colour
    /// picker is open.
    pub fn preview_canvas_background(&mut self, color: &str) {
        if self.project.canvas.background_color != color {
            self.project.canvas.background_color = color.to_string();
            self.mark_changed();
        }
    }

    /// Apply a size preset. Free-form presets keep the current size.
    pub fn apply_crop_ratio(&mut self, preset: &CropRatio) {
        if preset.ratio <= 0.0 {
            return;
        }
        self.set_canvas_size(preset.width, preset.height);
    }
}
