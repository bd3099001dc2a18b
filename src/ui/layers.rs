// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Layers panel.
//!
//! Lists groups with their members, then the ungrouped elements, topmost
//! first. Rows select elements, toggle visibility and lock, and move
//! elements between groups.

use crate::editor::store::LayerMove;
use crate::editor::Editor;
use crate::models::element::{CanvasElement, ElementId, ElementType};
use crate::models::group::GroupId;

/// Result of layers panel interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum LayersAction {
    None,
    Select(ElementId),
    ToggleVisibility(ElementId),
    ToggleLock(ElementId),
    /// Step an ungrouped element past its ungrouped neighbour.
    Move(ElementId, LayerMove),
    /// Step a member within its group.
    MoveInGroup(GroupId, ElementId, LayerMove),
    Duplicate(ElementId),
    Delete(ElementId),
    RenameElement(ElementId, String),
    CreateGroup(Vec<ElementId>),
    AddToGroup(ElementId, GroupId),
    RemoveFromGroup(ElementId),
    ToggleGroup(GroupId),
    RenameGroup(GroupId, String),
    DeleteGroup(GroupId),
}

/// Something being renamed inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenameTarget {
    Element(ElementId),
    Group(GroupId),
}

#[derive(Debug, Default)]
pub struct LayersState {
    renaming: Option<(RenameTarget, String)>,
}

/// Apply a panel action to the editor.
pub fn apply(editor: &mut Editor, action: LayersAction) {
    let result = match action {
        LayersAction::None => Ok(()),
        LayersAction::Select(id) => {
            editor.select(id);
            Ok(())
        }
        LayersAction::ToggleVisibility(id) => editor.toggle_visibility(id),
        LayersAction::ToggleLock(id) => editor.toggle_lock(id),
        LayersAction::Move(id, direction) => editor.move_ungrouped(id, direction),
        LayersAction::MoveInGroup(group, id, direction) => editor.move_in_group(group, id, direction),
        LayersAction::Duplicate(id) => editor.duplicate_element(id).map(|_| ()),
        LayersAction::Delete(id) => editor.delete_element(id),
        LayersAction::RenameElement(id, name) => editor.rename_element(id, &name),
        LayersAction::CreateGroup(ids) => editor.create_group(&ids, "").map(|_| ()),
        LayersAction::AddToGroup(id, group) => editor.add_to_group(id, group),
        LayersAction::RemoveFromGroup(id) => editor.remove_from_group(id),
        LayersAction::ToggleGroup(group) => editor.toggle_group_expanded(group),
        LayersAction::RenameGroup(group, name) => editor.rename_group(group, &name),
        LayersAction::DeleteGroup(group) => editor.delete_group(group),
    };
    if let Err(e) = result {
        log::warn!("Layer operation failed: {}", e);
    }
}

fn type_icon(element: &CanvasElement) -> &'static str {
    match element.element_type() {
        ElementType::Text => "🔤",
        ElementType::Image => "🖼",
        ElementType::Shape => "⬛",
    }
}

/// Display the layers panel.
pub fn show(ui: &mut egui::Ui, editor: &Editor, state: &mut LayersState) -> LayersAction {
    let mut action = LayersAction::None;
    let project = editor.project();
    let groups: Vec<(GroupId, String)> = project.groups.iter().map(|g| (g.id, g.name.clone())).collect();

    ui.horizontal(|ui| {
        ui.heading("Layers");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let selection = editor.selection();
            if ui
                .add_enabled(selection.is_some(), egui::Button::new("📁 Group"))
                .on_hover_text("New group from the selection")
                .clicked()
            {
                if let Some(id) = selection {
                    action = LayersAction::CreateGroup(vec![id]);
                }
            }
        });
    });
    ui.separator();

    egui::ScrollArea::vertical().show(ui, |ui| {
        if project.elements.is_empty() {
            ui.label(egui::RichText::new("No elements yet").weak());
        }

        for group in &project.groups {
            ui.horizontal(|ui| {
                let arrow = if group.expanded { "⏷" } else { "⏵" };
                if ui.small_button(arrow).clicked() {
                    action = LayersAction::ToggleGroup(group.id);
                }
                if !rename_field(ui, state, RenameTarget::Group(group.id), &mut action) {
                    let label = ui.label(egui::RichText::new(format!("📁 {} ({})", group.name, group.elements.len())).strong());
                    if label.double_clicked() {
                        state.renaming = Some((RenameTarget::Group(group.id), group.name.clone()));
                    }
                    label.context_menu(|ui| {
                        if ui.button("Rename").clicked() {
                            state.renaming = Some((RenameTarget::Group(group.id), group.name.clone()));
                            ui.close_menu();
                        }
                        if ui.button("Delete group").clicked() {
                            action = LayersAction::DeleteGroup(group.id);
                            ui.close_menu();
                        }
                    });
                }
            });
            if group.expanded {
                ui.indent(group.id, |ui| {
                    for &member in group.elements.iter().rev() {
                        if let Some(element) = project.element(member) {
                            element_row(ui, editor, state, element, Some(group.id), &groups, &mut action);
                        }
                    }
                });
            }
        }

        let ungrouped = editor.ungrouped();
        if !project.groups.is_empty() && !ungrouped.is_empty() {
            ui.separator();
        }
        for &id in ungrouped.iter().rev() {
            if let Some(element) = project.element(id) {
                element_row(ui, editor, state, element, None, &groups, &mut action);
            }
        }
    });

    action
}

/// Inline rename editor. Returns whether it was shown for `target`.
fn rename_field(ui: &mut egui::Ui, state: &mut LayersState, target: RenameTarget, action: &mut LayersAction) -> bool {
    let Some((current, text)) = state.renaming.as_mut() else {
        return false;
    };
    if *current != target {
        return false;
    }
    let response = ui.text_edit_singleline(text);
    if !response.has_focus() && !response.lost_focus() {
        response.request_focus();
    }
    if response.lost_focus() {
        let name = text.clone();
        if !ui.input(|i| i.key_pressed(egui::Key::Escape)) {
            *action = match target {
                RenameTarget::Element(id) => LayersAction::RenameElement(id, name),
                RenameTarget::Group(group) => LayersAction::RenameGroup(group, name),
            };
        }
        state.renaming = None;
    }
    true
}

fn element_row(
    ui: &mut egui::Ui,
    editor: &Editor,
    state: &mut LayersState,
    element: &CanvasElement,
    group: Option<GroupId>,
    groups: &[(GroupId, String)],
    action: &mut LayersAction,
) {
    let id = element.id;
    let step = |direction| match group {
        Some(group) => LayersAction::MoveInGroup(group, id, direction),
        None => LayersAction::Move(id, direction),
    };
    ui.horizontal(|ui| {
        let eye = if element.visible { "👁" } else { "—" };
        if ui.small_button(eye).on_hover_text("Toggle visibility").clicked() {
            *action = LayersAction::ToggleVisibility(id);
        }
        let lock = if element.locked { "🔒" } else { "🔓" };
        if ui.small_button(lock).on_hover_text("Toggle lock").clicked() {
            *action = LayersAction::ToggleLock(id);
        }

        if rename_field(ui, state, RenameTarget::Element(id), action) {
            return;
        }

        let selected = editor.selection() == Some(id);
        let text = egui::RichText::new(format!("{} {}", type_icon(element), element.display_name()));
        let text = if element.visible { text } else { text.weak() };
        let label = ui.selectable_label(selected, text);
        if label.clicked() {
            *action = LayersAction::Select(id);
        }
        if label.double_clicked() {
            state.renaming = Some((RenameTarget::Element(id), element.display_name()));
        }
        label.context_menu(|ui| {
            if ui.button("Rename").clicked() {
                state.renaming = Some((RenameTarget::Element(id), element.display_name()));
                ui.close_menu();
            }
            if ui.button("Move up").clicked() {
                *action = step(LayerMove::Up);
                ui.close_menu();
            }
            if ui.button("Move down").clicked() {
                *action = step(LayerMove::Down);
                ui.close_menu();
            }
            ui.separator();
            if group.is_some() && ui.button("Remove from group").clicked() {
                *action = LayersAction::RemoveFromGroup(id);
                ui.close_menu();
            }
            let targets: Vec<&(GroupId, String)> = groups.iter().filter(|(g, _)| Some(*g) != group).collect();
            if !targets.is_empty() {
                ui.menu_button("Add to group", |ui| {
                    for (target, name) in targets {
                        if ui.button(name.as_str()).clicked() {
                            *action = LayersAction::AddToGroup(id, *target);
                            ui.close_menu();
                        }
                    }
                });
            }
            ui.separator();
            if ui.button("Duplicate").clicked() {
                *action = LayersAction::Duplicate(id);
                ui.close_menu();
            }
            if ui.button("Delete").clicked() {
                *action = LayersAction::Delete(id);
                ui.close_menu();
            }
        });

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.small_button("⏷").on_hover_text("Move down").clicked() {
                *action = step(LayerMove::Down);
            }
            if ui.small_button("⏶").on_hover_text("Move up").clicked() {
                *action = step(LayerMove::Up);
            }
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::element::ShapeKind;

    #[test]
    fn test_apply_group_actions() {
        let mut editor = Editor::default();
        let a = editor.add_text();
        let b = editor.add_shape(ShapeKind::Star);

        apply(&mut editor, LayersAction::CreateGroup(vec![a]));
        let group = editor.project().groups[0].id;
        apply(&mut editor, LayersAction::AddToGroup(b, group));
        assert_eq!(editor.project().group(group).unwrap().elements, vec![a, b]);

        apply(&mut editor, LayersAction::RenameGroup(group, "Captions".to_string()));
        assert_eq!(editor.project().group(group).unwrap().name, "Captions");

        apply(&mut editor, LayersAction::DeleteGroup(group));
        assert!(editor.project().groups.is_empty());
        assert_eq!(editor.ungrouped(), vec![a, b]);
    }

    #[test]
    fn test_move_within_group_reorders_members() {
        let mut editor = Editor::default();
        let a = editor.add_text();
        let b = editor.add_text();
        let c = editor.add_text();
        apply(&mut editor, LayersAction::CreateGroup(vec![a, b]));
        let group = editor.project().groups[0].id;
        let paint_order: Vec<ElementId> = editor.project().elements.iter().map(|e| e.id).collect();

        apply(&mut editor, LayersAction::MoveInGroup(group, a, LayerMove::Up));
        assert_eq!(editor.project().group(group).unwrap().elements, vec![b, a]);
        let after: Vec<ElementId> = editor.project().elements.iter().map(|e| e.id).collect();
        assert_eq!(after, paint_order);

        apply(&mut editor, LayersAction::Move(c, LayerMove::Down));
        let after: Vec<ElementId> = editor.project().elements.iter().map(|e| e.id).collect();
        assert_eq!(after, paint_order);
    }

    #[test]
    fn test_apply_ignores_unknown_ids() {
        let mut editor = Editor::default();
        let entries = editor.history().len();
        apply(&mut editor, LayersAction::Delete(ElementId::new()));
        apply(&mut editor, LayersAction::ToggleGroup(GroupId::new()));
        assert_eq!(editor.history().len(), entries);
    }
}
