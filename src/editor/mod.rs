// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Editor state.
//!
//! [`Editor`] is the single owned state object of the application: the live
//! project, the selection, the undo history and the pointer gesture in
//! progress. Every mutation goes through its methods, which are split across
//! the submodules:
//!
//! - [`store`]: element operations (add, update, delete, duplicate, reorder)
//! - [`layers`]: group membership overlay
//! - [`interaction`]: pointer and keyboard gestures
//!
//! Each mutation bumps [`Editor::revision`], which the UI and the autosave
//! debouncer use as their change notification. Discrete user actions also
//! commit a snapshot to the [`History`].

pub mod autosave;
pub mod history;
pub mod interaction;
pub mod layers;
pub mod store;

use crate::models::element::{CanvasElement, ElementId, ElementKind};
use crate::models::group::GroupId;
use crate::models::project::{CanvasSettings, MemeProject, ProjectId};
use crate::models::template::MemeTemplate;
use crate::util::geometry::clamp_rect;
use history::History;
use interaction::Gesture;
use thiserror::Error;

/// Errors returned by store and layer operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("no element with id {0}")]
    UnknownElement(ElementId),
    #[error("no group with id {0}")]
    UnknownGroup(GroupId),
    #[error("invalid order: {0}")]
    InvalidOrder(String),
}

pub type EditorResult<T> = Result<T, EditorError>;

pub struct Editor {
    project: MemeProject,
    selection: Option<ElementId>,
    history: History,
    gesture: Gesture,
    /// Resize handle hit radius in canvas pixels.
    handle_tolerance: f64,
    revision: u64,
    /// Set by mutations not yet committed to the history.
    dirty: bool,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(MemeProject::default())
    }
}

impl Editor {
    pub fn new(mut project: MemeProject) -> Self {
        project.sanitize();
        let history = History::new(&project);
        Self {
            project,
            selection: None,
            history,
            gesture: Gesture::Idle,
            handle_tolerance: interaction::HANDLE_RADIUS,
            revision: 0,
            dirty: false,
        }
    }

    pub fn project(&self) -> &MemeProject {
        &self.project
    }

    pub fn selection(&self) -> Option<ElementId> {
        self.selection
    }

    pub fn selected_element(&self) -> Option<&CanvasElement> {
        self.selection.and_then(|id| self.project.element(id))
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Monotonic change counter; bumps on every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn set_handle_tolerance(&mut self, radius: f64) {
        self.handle_tolerance = radius.max(1.0);
    }

    /// Select an existing element. Unknown ids clear the selection.
    pub fn select(&mut self, id: ElementId) {
        self.selection = self.project.element(id).map(|e| e.id);
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Stamp the project and bump the revision.
    fn mark_changed(&mut self) {
        self.project.touch();
        self.revision = self.revision.wrapping_add(1);
        self.dirty = true;
    }

    /// Push the live project onto the history.
    fn commit(&mut self, action: &str) {
        self.history.commit(&self.project);
        self.dirty = false;
        log::debug!(
            "Committed {} ({}/{} history entries)",
            action,
            self.history.index() + 1,
            self.history.len()
        );
    }

    /// Commit pending edits if the project differs from the last committed
    /// snapshot. Used to close continuous edits (gestures, slider drags).
    /// Returns whether an entry was pushed.
    pub fn commit_edit(&mut self, action: &str) -> bool {
        if !self.dirty {
            return false;
        }
        let current = self.history.current();
        let unchanged = MemeProject {
            updated_at: current.updated_at,
            ..self.project.clone()
        } == *current;
        if unchanged {
            // Edited and edited back: keep the committed timestamp too.
            self.project.updated_at = current.updated_at;
            self.dirty = false;
            return false;
        }
        self.commit(action);
        true
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                self.restore(snapshot);
                log::info!("Undo");
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                self.restore(snapshot);
                log::info!("Redo");
                true
            }
            None => false,
        }
    }

    fn restore(&mut self, mut snapshot: MemeProject) {
        // Collapsed groups are panel state and stay as the user left them.
        for group in &mut snapshot.groups {
            if let Some(live) = self.project.group(group.id) {
                group.expanded = live.expanded;
            }
        }
        let expanded = snapshot.clone();
        self.history.amend_current(|current| *current = expanded);
        self.project = snapshot;
        self.selection = None;
        self.gesture = Gesture::Idle;
        self.dirty = false;
        self.revision = self.revision.wrapping_add(1);
    }

    /// Replace the live project with an empty one and reset the history.
    pub fn new_project(&mut self, canvas: CanvasSettings) {
        self.open_project(MemeProject::new(canvas));
    }

    /// Start an empty project if `deleted` was the live one, so the next
    /// autosave does not bring it back. Returns whether that happened.
    pub fn close_deleted(&mut self, deleted: ProjectId, canvas: CanvasSettings) -> bool {
        if self.project.id != deleted {
            return false;
        }
        log::info!("Open project {} was deleted, starting a new one", deleted);
        self.new_project(canvas);
        true
    }

    /// Make `project` the live project. The history restarts from it.
    pub fn open_project(&mut self, mut project: MemeProject) {
        project.sanitize();
        log::info!("Opened project {} ({} elements)", project.name, project.elements.len());
        self.history.reset(&project);
        self.project = project;
        self.selection = None;
        self.gesture = Gesture::Idle;
        self.dirty = false;
        self.revision = self.revision.wrapping_add(1);
    }

    /// Rename the live project.
    pub fn rename_project(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() || name == self.project.name {
            return;
        }
        self.project.name = name.to_string();
        self.mark_changed();
        self.commit("rename project");
    }

    /// Restart the live project from `template`: the canvas takes the
    /// template size and the elements are replaced by the template's
    /// background and text boxes.
    pub fn load_template(&mut self, template: &MemeTemplate) {
        let (width, height) = CanvasSettings::clamp_size(template.width, template.height);
        self.project.canvas = CanvasSettings {
            width,
            height,
            background_color: "#ffffff".to_string(),
        };
        let bounds = self.project.bounds();
        self.project.elements = template
            .instantiate()
            .into_iter()
            .map(|mut element| {
                element.set_rect(clamp_rect(element.rect(), bounds));
                element
            })
            .collect();
        self.project.groups.clear();
        self.project.template = Some(template.clone());
        self.selection = None;
        self.mark_changed();
        self.commit("load template");
        log::info!("Loaded template {} ({}x{})", template.name, width, height);
    }

    /// Capture the live project as a reusable template. The background
    /// image, if any, becomes the template image.
    pub fn template_from_project(&self, name: &str) -> MemeTemplate {
        let image_url = self
            .project
            .elements
            .iter()
            .find_map(|element| match &element.kind {
                ElementKind::Image(image) if image.is_background => Some(image.src.clone()),
                _ => None,
            })
            .unwrap_or_default();
        let mut template = MemeTemplate::new(
            name,
            image_url,
            self.project.canvas.width,
            self.project.canvas.height,
        );
        template.text_boxes = MemeTemplate::text_boxes_from(&self.project.elements);
        template
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::template::TextBox;
    use crate::models::element::TextData;
    use crate::util::geometry::Rect;

    #[test]
    fn test_undo_after_commits_and_back_to_empty() {
        let mut editor = Editor::default();
        let initial = editor.project().clone();

        for _ in 0..3 {
            editor.add_text();
        }
        assert_eq!(editor.project().elements.len(), 3);

        assert!(editor.undo());
        assert_eq!(editor.project().elements.len(), 2);
        assert!(editor.undo());
        assert!(editor.undo());
        assert_eq!(editor.project(), &initial);
        assert!(!editor.can_undo());
        assert!(!editor.undo());
    }

    #[test]
    fn test_redo_restores_state_before_undo() {
        let mut editor = Editor::default();
        editor.add_text();
        editor.add_shape(crate::models::element::ShapeKind::Circle);
        let before = editor.project().clone();

        editor.undo();
        assert!(editor.selection().is_none());
        assert!(editor.redo());
        assert_eq!(editor.project(), &before);
        assert!(editor.selection().is_none());
    }

    #[test]
    fn test_commit_edit_skips_unchanged_project() {
        let mut editor = Editor::default();
        assert!(!editor.commit_edit("noop"));
        let id = editor.add_text();
        editor.update_element(id, |e| e.opacity = 0.5).unwrap();
        assert!(editor.commit_edit("opacity"));
        assert!(!editor.commit_edit("opacity"));
        assert_eq!(editor.history().len(), 3);
    }

    #[test]
    fn test_open_project_clamps_loaded_geometry() {
        let mut loaded = MemeProject::default();
        let mut element = CanvasElement::text();
        element.x = 5000.0;
        element.y = -300.0;
        element.width = 2.0;
        element.opacity = 7.0;
        loaded.elements.push(element);

        let mut editor = Editor::default();
        editor.open_project(loaded.clone());
        let opened = &editor.project().elements[0];
        assert_eq!(opened.rect(), Rect::new(780.0, 0.0, 20.0, 50.0));
        assert_eq!(opened.opacity, 1.0);
        assert_eq!(editor.history().current(), editor.project());

        let restored = Editor::new(loaded);
        assert_eq!(restored.project().elements[0].rect(), Rect::new(780.0, 0.0, 20.0, 50.0));
    }

    #[test]
    fn test_open_project_resets_history() {
        let mut editor = Editor::default();
        editor.add_text();
        let other = MemeProject::default();
        editor.open_project(other.clone());
        assert_eq!(editor.project(), &other);
        assert_eq!(editor.history().len(), 1);
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_deleting_open_project_starts_a_new_one() {
        let mut editor = Editor::default();
        editor.add_text();
        let open = editor.project().id;

        assert!(!editor.close_deleted(ProjectId::new(), CanvasSettings::default()));
        assert_eq!(editor.project().id, open);

        assert!(editor.close_deleted(open, CanvasSettings::default()));
        assert_ne!(editor.project().id, open);
        assert!(editor.project().elements.is_empty());
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_load_template_resizes_canvas_and_replaces_elements() {
        let mut editor = Editor::default();
        let keep = editor.add_text();
        editor.create_group(&[keep], "old").unwrap();

        let mut template = MemeTemplate::new("Doge", "templates/doge.jpg", 640, 480);
        template.text_boxes.push(TextBox {
            x: 600.0,
            y: 10.0,
            width: 200.0,
            height: 50.0,
            rotation: 0.0,
            opacity: 1.0,
            content: TextData::default(),
        });
        editor.load_template(&template);

        let project = editor.project();
        assert_eq!((project.canvas.width, project.canvas.height), (640, 480));
        assert_eq!(project.elements.len(), 2);
        assert!(project.groups.is_empty());
        // The text box hanging off the right edge is pulled back in.
        assert_eq!(project.elements[1].rect(), Rect::new(440.0, 10.0, 200.0, 50.0));
        assert!(project.check_integrity().is_ok());
        assert!(editor.can_undo());
    }

    #[test]
    fn test_template_round_trip_through_project() {
        let mut template = MemeTemplate::new("Doge", "templates/doge.jpg", 640, 480);
        template.text_boxes.push(TextBox {
            x: 20.0,
            y: 20.0,
            width: 300.0,
            height: 60.0,
            rotation: 5.0,
            opacity: 0.8,
            content: TextData { text: "wow".to_string(), ..TextData::default() },
        });
        let mut editor = Editor::default();
        editor.load_template(&template);

        let saved = editor.template_from_project("Doge copy");
        assert_eq!(saved.image_url, "templates/doge.jpg");
        assert_eq!(saved.text_boxes, template.text_boxes);
        assert_eq!((saved.width, saved.height), (640, 480));
    }
}
