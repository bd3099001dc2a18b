// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar with element creation and common editing operations.

use crate::editor::Editor;
use crate::models::element::ShapeKind;
use crate::ui::canvas::CanvasView;

/// Result of toolbar interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolbarAction {
    None,
    AddText,
    AddShape(ShapeKind),
    AddImage,
    Undo,
    Redo,
    Duplicate,
    Delete,
    RotateSelected,
    ToggleTemplates,
    Export,
}

/// Display the toolbar.
pub fn show(ui: &mut egui::Ui, editor: &Editor, view: &mut CanvasView) -> ToolbarAction {
    let mut action = ToolbarAction::None;
    let has_selection = editor.selection().is_some();

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        if ui.button("🔤 Text").on_hover_text("Add a text element").clicked() {
            action = ToolbarAction::AddText;
        }
        ui.menu_button("⬛ Shape", |ui| {
            for kind in ShapeKind::ALL {
                if ui.button(kind.label()).clicked() {
                    action = ToolbarAction::AddShape(kind);
                    ui.close_menu();
                }
            }
        });
        if ui.button("🖼 Image...").on_hover_text("Add an image from disk").clicked() {
            action = ToolbarAction::AddImage;
        }
        if ui.button("📚 Templates").clicked() {
            action = ToolbarAction::ToggleTemplates;
        }

        ui.separator();

        if ui.add_enabled(editor.can_undo(), egui::Button::new("↶ Undo")).clicked() {
            action = ToolbarAction::Undo;
        }
        if ui.add_enabled(editor.can_redo(), egui::Button::new("↷ Redo")).clicked() {
            action = ToolbarAction::Redo;
        }

        ui.separator();

        if ui.add_enabled(has_selection, egui::Button::new("⧉ Duplicate")).clicked() {
            action = ToolbarAction::Duplicate;
        }
        if ui.add_enabled(has_selection, egui::Button::new("⟳ Rotate")).clicked() {
            action = ToolbarAction::RotateSelected;
        }
        if ui.add_enabled(has_selection, egui::Button::new("🗑 Delete")).clicked() {
            action = ToolbarAction::Delete;
        }

        ui.separator();

        if ui.button("➖").on_hover_text("Zoom out").clicked() {
            view.zoom_out();
        }
        if ui.selectable_label(view.fit, format!("{:.0}%", view.zoom * 100.0)).on_hover_text("Fit to window").clicked() {
            view.fit_to_window();
        }
        if ui.button("➕").on_hover_text("Zoom in").clicked() {
            view.zoom_in();
        }

        ui.separator();

        if ui.button("💾 Export...").clicked() {
            action = ToolbarAction::Export;
        }
    });

    action
}
