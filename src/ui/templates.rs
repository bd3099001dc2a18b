// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Template library window.

use crate::models::template::{MemeTemplate, TemplateId};
use crate::ui::canvas::TextureCache;

const THUMBNAIL_HEIGHT: f32 = 64.0;

/// Result of template window interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplatesAction {
    None,
    Refresh,
    Upload,
    Use(TemplateId),
    Delete(TemplateId),
    SaveCurrent(String),
}

#[derive(Debug, Default)]
pub struct TemplatesState {
    pub open: bool,
    /// Last listing from storage.
    pub templates: Vec<MemeTemplate>,
    filter: String,
    save_name: String,
}

/// Display the template library window.
pub fn show(ctx: &egui::Context, state: &mut TemplatesState, textures: &mut TextureCache) -> TemplatesAction {
    let mut action = TemplatesAction::None;
    let mut open = state.open;

    egui::Window::new("Template Library")
        .open(&mut open)
        .default_width(420.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("⬆ Upload...").clicked() {
                    action = TemplatesAction::Upload;
                }
                if ui.button("⟳ Refresh").clicked() {
                    action = TemplatesAction::Refresh;
                }
                ui.label("Filter:");
                ui.text_edit_singleline(&mut state.filter);
            });
            ui.horizontal(|ui| {
                ui.label("Save current as:");
                ui.text_edit_singleline(&mut state.save_name);
                let name = state.save_name.trim();
                if ui.add_enabled(!name.is_empty(), egui::Button::new("Save")).clicked() {
                    action = TemplatesAction::SaveCurrent(name.to_string());
                    state.save_name.clear();
                }
            });
            ui.separator();

            let filter = state.filter.to_lowercase();
            let visible: Vec<&MemeTemplate> = state
                .templates
                .iter()
                .filter(|t| filter.is_empty() || t.name.to_lowercase().contains(&filter))
                .collect();
            if visible.is_empty() {
                ui.label(egui::RichText::new("No templates found").weak());
            }

            egui::ScrollArea::vertical().max_height(420.0).show(ui, |ui| {
                for template in visible {
                    ui.horizontal(|ui| {
                        let thumbnail = if template.image_url.is_empty() {
                            None
                        } else {
                            textures.get(ctx, &template.image_url)
                        };
                        match thumbnail {
                            Some(texture) => {
                                let size = texture.size_vec2();
                                let scale = THUMBNAIL_HEIGHT / size.y.max(1.0);
                                ui.add(egui::Image::new((texture.id(), size * scale)));
                            }
                            None => {
                                ui.add_sized([THUMBNAIL_HEIGHT, THUMBNAIL_HEIGHT], egui::Label::new("—"));
                            }
                        }
                        ui.vertical(|ui| {
                            ui.label(egui::RichText::new(&template.name).strong());
                            ui.label(
                                egui::RichText::new(format!(
                                    "{}×{} · {} text boxes",
                                    template.width,
                                    template.height,
                                    template.text_boxes.len()
                                ))
                                .small()
                                .weak(),
                            );
                            ui.horizontal(|ui| {
                                if ui.button("Use").clicked() {
                                    action = TemplatesAction::Use(template.id);
                                }
                                if ui.button("Delete").clicked() {
                                    action = TemplatesAction::Delete(template.id);
                                }
                            });
                        });
                    });
                    ui.separator();
                }
            });
        });

    state.open = open;
    action
}
