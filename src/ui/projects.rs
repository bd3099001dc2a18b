// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Saved projects window.

use crate::models::project::{MemeProject, ProjectId};
use chrono::Local;

/// Result of project window interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectsAction {
    None,
    Refresh,
    SaveCurrent,
    Rename(String),
    Open(ProjectId),
    Delete(ProjectId),
}

#[derive(Debug, Default)]
pub struct ProjectsState {
    pub open: bool,
    /// Last listing from storage.
    pub projects: Vec<MemeProject>,
    rename: Option<String>,
    confirm_delete: Option<ProjectId>,
}

/// One line summary shown under a project name.
fn summary(project: &MemeProject) -> String {
    let updated = project.updated_at.with_timezone(&Local).format("%Y-%m-%d %H:%M");
    let count = project.elements.len();
    let noun = if count == 1 { "element" } else { "elements" };
    format!(
        "{}×{} · {} {} · {}",
        project.canvas.width, project.canvas.height, count, noun, updated
    )
}

/// Display the project window. `current` is the live project.
pub fn show(ctx: &egui::Context, state: &mut ProjectsState, current: &MemeProject) -> ProjectsAction {
    let mut action = ProjectsAction::None;
    let mut open = state.open;

    egui::Window::new("Projects")
        .open(&mut open)
        .default_width(380.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Current:");
                let name = state.rename.get_or_insert_with(|| current.name.clone());
                let response = ui.text_edit_singleline(name);
                if response.lost_focus() {
                    if !ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                        action = ProjectsAction::Rename(name.clone());
                    }
                    state.rename = None;
                } else if !response.has_focus() && *name != current.name {
                    // Renamed elsewhere, e.g. by undo.
                    *name = current.name.clone();
                }
            });
            ui.horizontal(|ui| {
                if ui.button("💾 Save current").clicked() {
                    action = ProjectsAction::SaveCurrent;
                }
                if ui.button("⟳ Refresh").clicked() {
                    action = ProjectsAction::Refresh;
                }
            });
            ui.separator();

            if state.projects.is_empty() {
                ui.label(egui::RichText::new("No saved projects").weak());
            }

            egui::ScrollArea::vertical().max_height(400.0).show(ui, |ui| {
                for project in &state.projects {
                    ui.horizontal(|ui| {
                        ui.vertical(|ui| {
                            let mut title = egui::RichText::new(&project.name).strong();
                            if project.id == current.id {
                                title = title.color(ui.visuals().selection.stroke.color);
                            }
                            ui.label(title);
                            ui.label(egui::RichText::new(summary(project)).small().weak());
                        });
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if state.confirm_delete == Some(project.id) {
                                if ui.button("Cancel").clicked() {
                                    state.confirm_delete = None;
                                }
                                if ui.button("Confirm").clicked() {
                                    action = ProjectsAction::Delete(project.id);
                                    state.confirm_delete = None;
                                }
                            } else {
                                if ui.button("🗑").on_hover_text("Delete").clicked() {
                                    state.confirm_delete = Some(project.id);
                                }
                                if ui.button("Open").clicked() {
                                    action = ProjectsAction::Open(project.id);
                                }
                            }
                        });
                    });
                    ui.separator();
                }
            });
        });

    state.open = open;
    action
}
