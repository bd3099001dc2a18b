// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Pointer and keyboard gestures on the canvas.
//!
//! A gesture mutates the live element on every pointer move without
//! touching the history; the whole gesture becomes one history entry when
//! the pointer is released or leaves the canvas.

use super::Editor;
use crate::models::element::ElementId;
use crate::util::geometry::{drag_to, handle_at, resize, Point, Rect, ResizeHandle};

/// Default resize handle hit radius, in canvas pixels.
pub const HANDLE_RADIUS: f64 = 8.0;

/// Arrow key step, plain and with Shift held.
pub const NUDGE_STEP: f64 = 1.0;
pub const NUDGE_STEP_LARGE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging {
        id: ElementId,
        /// Pointer position relative to the element origin.
        offset: Point,
        /// Element rect when the drag started.
        origin: Rect,
    },
    Resizing {
        id: ElementId,
        handle: ResizeHandle,
        origin: Rect,
        /// Pointer position when the resize started.
        start: Point,
    },
}

impl Gesture {
    pub fn is_active(&self) -> bool {
        !matches!(self, Gesture::Idle)
    }

    pub fn element(&self) -> Option<ElementId> {
        match *self {
            Gesture::Idle => None,
            Gesture::Dragging { id, .. } | Gesture::Resizing { id, .. } => Some(id),
        }
    }
}

impl Editor {
    /// Topmost visible element under `pos`.
    pub fn hit_test(&self, pos: Point) -> Option<ElementId> {
        self.project
            .elements
            .iter()
            .rev()
            .find(|e| e.visible && e.rect().contains(pos))
            .map(|e| e.id)
    }

    /// Handle of the selected element under `pos`, if the selection can be
    /// resized.
    pub fn handle_under(&self, pos: Point) -> Option<ResizeHandle> {
        let element = self.selected_element()?;
        if !element.is_interactive() || !element.is_resizable() {
            return None;
        }
        handle_at(&element.rect(), pos, self.handle_tolerance)
    }

    pub fn pointer_down(&mut self, pos: Point) {
        if self.gesture.is_active() {
            self.end_gesture();
        }

        let target = self.selected_element().map(|e| (e.id, e.rect()));
        if let (Some(handle), Some((id, origin))) = (self.handle_under(pos), target) {
            self.gesture = Gesture::Resizing { id, handle, origin, start: pos };
            log::debug!("Resize {:?} started on {}", handle, id);
            return;
        }

        let Some(id) = self.hit_test(pos) else {
            self.selection = None;
            return;
        };
        self.selection = Some(id);
        if let Some(element) = self.project.element(id).filter(|e| !e.locked) {
            self.gesture = Gesture::Dragging {
                id,
                offset: Point::new(pos.x - element.x, pos.y - element.y),
                origin: element.rect(),
            };
        }
    }

    pub fn pointer_move(&mut self, pos: Point) {
        let bounds = self.project.bounds();
        let (id, rect) = match self.gesture {
            Gesture::Idle => return,
            Gesture::Dragging { id, offset, origin } => {
                (id, drag_to(origin, pos.x - offset.x, pos.y - offset.y, bounds))
            }
            Gesture::Resizing { id, handle, origin, start } => {
                (id, resize(origin, handle, pos.x - start.x, pos.y - start.y, bounds))
            }
        };

        let Some(element) = self.project.element_mut(id) else {
            // Element vanished mid-gesture.
            self.gesture = Gesture::Idle;
            return;
        };
        if element.rect() != rect {
            element.set_rect(rect);
            self.mark_changed();
        }
    }

    pub fn pointer_up(&mut self) {
        self.end_gesture();
    }

    pub fn pointer_leave(&mut self) {
        self.end_gesture();
    }

    fn end_gesture(&mut self) {
        let action = match self.gesture {
            Gesture::Idle => return,
            Gesture::Dragging { .. } => "move element",
            Gesture::Resizing { .. } => "resize element",
        };
        self.gesture = Gesture::Idle;
        self.commit_edit(action);
    }

    /// Abort the gesture in progress and put the element back where it
    /// started.
    pub fn cancel_gesture(&mut self) {
        let (id, origin) = match self.gesture {
            Gesture::Idle => return,
            Gesture::Dragging { id, origin, .. } | Gesture::Resizing { id, origin, .. } => (id, origin),
        };
        self.gesture = Gesture::Idle;
        if let Some(element) = self.project.element_mut(id) {
            if element.rect() != origin {
                element.set_rect(origin);
                self.mark_changed();
            }
        }
        self.commit_edit("cancel gesture");
    }

    /// Delete the selected element. Returns whether anything was removed.
    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selection else {
            return false;
        };
        self.gesture = Gesture::Idle;
        self.delete_element(id).is_ok()
    }

    /// Move the selected element by `(dx, dy)`, clamped to the canvas. Locked
    /// elements stay put.
    pub fn nudge_selected(&mut self, dx: f64, dy: f64) -> bool {
        let bounds = self.project.bounds();
        let Some(element) = self.selection.and_then(|id| self.project.element_mut(id)) else {
            return false;
        };
        if element.locked {
            return false;
        }
        let rect = drag_to(element.rect(), element.x + dx, element.y + dy, bounds);
        if rect == element.rect() {
            return false;
        }
        element.set_rect(rect);
        self.mark_changed();
        self.commit_edit("nudge element")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::element::ShapeKind;

    #[test]
    fn test_drag_scenario_clamps_to_canvas_corner() {
        let mut editor = Editor::default();
        let id = editor.add_text();
        let entries = editor.history().len();

        editor.pointer_down(Point::new(60.0, 60.0));
        assert!(matches!(editor.gesture(), Gesture::Dragging { .. }));
        editor.pointer_move(Point::new(1060.0, 1060.0));
        editor.pointer_up();

        let element = editor.project().element(id).unwrap();
        assert_eq!(element.rect(), Rect::new(600.0, 550.0, 200.0, 50.0));
        assert_eq!(editor.history().len(), entries + 1);
        assert_eq!(editor.gesture(), &Gesture::Idle);
    }

    #[test]
    fn test_many_moves_make_one_history_entry() {
        let mut editor = Editor::default();
        editor.add_shape(ShapeKind::Circle);
        let entries = editor.history().len();

        editor.pointer_down(Point::new(100.0, 100.0));
        for step in 1..=25 {
            editor.pointer_move(Point::new(100.0 + step as f64 * 3.0, 100.0 + step as f64));
        }
        editor.pointer_up();
        assert_eq!(editor.history().len(), entries + 1);

        assert!(editor.undo());
        assert_eq!(editor.project().elements[0].rect(), Rect::new(50.0, 50.0, 100.0, 100.0));
    }

    #[test]
    fn test_click_without_move_commits_nothing() {
        let mut editor = Editor::default();
        let id = editor.add_text();
        editor.clear_selection();
        let entries = editor.history().len();

        editor.pointer_down(Point::new(70.0, 70.0));
        editor.pointer_up();
        assert_eq!(editor.selection(), Some(id));
        assert_eq!(editor.history().len(), entries);
    }

    #[test]
    fn test_locked_element_selects_but_does_not_move() {
        let mut editor = Editor::default();
        let id = editor.add_text();
        editor.toggle_lock(id).unwrap();
        let entries = editor.history().len();

        editor.pointer_down(Point::new(60.0, 60.0));
        assert_eq!(editor.selection(), Some(id));
        assert_eq!(editor.gesture(), &Gesture::Idle);
        editor.pointer_move(Point::new(400.0, 400.0));
        editor.pointer_up();

        assert_eq!(editor.project().element(id).unwrap().rect(), Rect::new(50.0, 50.0, 200.0, 50.0));
        assert_eq!(editor.history().len(), entries);
        assert!(!editor.nudge_selected(5.0, 0.0));
    }

    #[test]
    fn test_topmost_visible_element_wins() {
        let mut editor = Editor::default();
        let bottom = editor.add_shape(ShapeKind::Square);
        let top = editor.add_shape(ShapeKind::Circle);
        assert_eq!(editor.hit_test(Point::new(60.0, 60.0)), Some(top));

        editor.toggle_visibility(top).unwrap();
        assert_eq!(editor.hit_test(Point::new(60.0, 60.0)), Some(bottom));
        assert_eq!(editor.hit_test(Point::new(700.0, 500.0)), None);
    }

    #[test]
    fn test_empty_canvas_clears_selection() {
        let mut editor = Editor::default();
        editor.add_text();
        editor.pointer_down(Point::new(700.0, 500.0));
        assert_eq!(editor.selection(), None);
        assert_eq!(editor.gesture(), &Gesture::Idle);
    }

    #[test]
    fn test_resize_from_south_east_handle() {
        let mut editor = Editor::default();
        let id = editor.add_shape(ShapeKind::Square);
        let entries = editor.history().len();

        editor.pointer_down(Point::new(151.0, 149.0));
        assert!(matches!(
            editor.gesture(),
            Gesture::Resizing { handle: ResizeHandle::SE, .. }
        ));
        editor.pointer_move(Point::new(201.0, 179.0));
        editor.pointer_leave();

        let element = editor.project().element(id).unwrap();
        assert_eq!(element.rect(), Rect::new(50.0, 50.0, 150.0, 130.0));
        assert_eq!(editor.history().len(), entries + 1);
    }

    /// Press on the south-east handle of a selected square that `disable`
    /// made non-interactive, then drag away.
    fn assert_handle_inert(disable: fn(&mut Editor, ElementId)) {
        let mut editor = Editor::default();
        let id = editor.add_shape(ShapeKind::Square);
        disable(&mut editor, id);
        editor.select(id);
        let entries = editor.history().len();

        assert_eq!(editor.handle_under(Point::new(151.0, 149.0)), None);
        editor.pointer_down(Point::new(151.0, 149.0));
        assert!(!matches!(editor.gesture(), Gesture::Resizing { .. }));
        editor.pointer_move(Point::new(300.0, 300.0));
        editor.pointer_up();

        assert_eq!(editor.project().element(id).unwrap().rect(), Rect::new(50.0, 50.0, 100.0, 100.0));
        assert_eq!(editor.history().len(), entries);
    }

    #[test]
    fn test_locked_selection_has_no_resize_handles() {
        assert_handle_inert(|editor, id| editor.toggle_lock(id).unwrap());
    }

    #[test]
    fn test_hidden_selection_has_no_resize_handles() {
        assert_handle_inert(|editor, id| editor.toggle_visibility(id).unwrap());
    }

    #[test]
    fn test_resize_from_north_west_keeps_opposite_corner() {
        let mut editor = Editor::default();
        let id = editor.add_shape(ShapeKind::Square);

        editor.pointer_down(Point::new(50.0, 50.0));
        editor.pointer_move(Point::new(200.0, 200.0));
        editor.pointer_up();

        let element = editor.project().element(id).unwrap();
        assert_eq!(element.rect(), Rect::new(130.0, 130.0, 20.0, 20.0));
    }

    #[test]
    fn test_cancel_restores_origin() {
        let mut editor = Editor::default();
        let id = editor.add_text();
        let entries = editor.history().len();

        editor.pointer_down(Point::new(60.0, 60.0));
        editor.pointer_move(Point::new(300.0, 300.0));
        editor.cancel_gesture();

        assert_eq!(editor.project().element(id).unwrap().rect(), Rect::new(50.0, 50.0, 200.0, 50.0));
        assert_eq!(editor.history().len(), entries);
    }

    #[test]
    fn test_nudge_and_delete_selected() {
        let mut editor = Editor::default();
        let id = editor.add_text();
        let entries = editor.history().len();

        assert!(editor.nudge_selected(-NUDGE_STEP_LARGE, NUDGE_STEP));
        assert_eq!(editor.project().element(id).unwrap().rect(), Rect::new(40.0, 51.0, 200.0, 50.0));
        assert_eq!(editor.history().len(), entries + 1);

        assert!(editor.delete_selected());
        assert!(editor.project().elements.is_empty());
        assert!(!editor.delete_selected());
    }
}
