// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Properties panel.
//!
//! Edits the selected element and the canvas settings. Widget changes are
//! applied to the live project immediately; the application commits them to
//! the history once the pointer is released and no field has focus.

use super::color_edit;
use crate::editor::Editor;
use crate::models::element::{CanvasElement, ElementKind, FontStyle, FontWeight, ShapeKind, TextAlign};
use crate::models::project::CROP_RATIOS;

pub const FONT_FAMILIES: [&str; 6] = ["Arial", "Impact", "Helvetica", "Times New Roman", "Courier New", "Comic Sans MS"];

/// Panel state that outlives a frame.
#[derive(Debug, Default)]
pub struct PropertiesState {
    /// Canvas size typed but not yet applied.
    pending_size: Option<(u32, u32)>,
}

/// Display the properties panel.
pub fn show(ui: &mut egui::Ui, editor: &mut Editor, state: &mut PropertiesState) {
    egui::ScrollArea::vertical().show(ui, |ui| {
        ui.heading("Properties");
        ui.separator();

        match editor.selected_element().cloned() {
            Some(original) => {
                let mut element = original.clone();
                element_section(ui, editor, &mut element);
                if element != original {
                    if let Err(e) = editor.replace_element(element) {
                        log::warn!("Property edit rejected: {}", e);
                    }
                }
            }
            None => {
                ui.label(egui::RichText::new("Select an element to edit it").weak());
            }
        }

        ui.add_space(12.0);
        canvas_section(ui, editor, state);
    });
}

fn element_section(ui: &mut egui::Ui, editor: &mut Editor, element: &mut CanvasElement) {
    ui.label(egui::RichText::new(element.display_name()).strong());

    let mut name = element.name.clone().unwrap_or_default();
    ui.horizontal(|ui| {
        ui.label("Name:");
        if ui.text_edit_singleline(&mut name).changed() {
            element.name = (!name.trim().is_empty()).then(|| name.clone());
        }
    });

    egui::Grid::new("geometry").num_columns(4).spacing([8.0, 4.0]).show(ui, |ui| {
        ui.label("X");
        ui.add(egui::DragValue::new(&mut element.x).speed(1.0));
        ui.label("Y");
        ui.add(egui::DragValue::new(&mut element.y).speed(1.0));
        ui.end_row();
        ui.label("W");
        ui.add(egui::DragValue::new(&mut element.width).speed(1.0));
        ui.label("H");
        ui.add(egui::DragValue::new(&mut element.height).speed(1.0));
        ui.end_row();
    });

    ui.horizontal(|ui| {
        ui.label("Rotation:");
        if ui.small_button("⟲").on_hover_text("Rotate left").clicked() {
            element.rotation -= 90.0;
        }
        ui.add(egui::DragValue::new(&mut element.rotation).speed(1.0).suffix("°"));
        if ui.small_button("⟳").on_hover_text("Rotate right").clicked() {
            element.rotation += 90.0;
        }
    });
    ui.horizontal(|ui| {
        ui.label("Opacity:");
        ui.add(egui::Slider::new(&mut element.opacity, 0.0..=1.0));
    });
    ui.horizontal(|ui| {
        ui.checkbox(&mut element.visible, "Visible");
        ui.checkbox(&mut element.locked, "Locked");
    });

    ui.separator();
    match &mut element.kind {
        ElementKind::Text(text) => {
            ui.label("Text:");
            ui.text_edit_multiline(&mut text.text);
            ui.horizontal(|ui| {
                ui.label("Size:");
                if ui.add(egui::DragValue::new(&mut text.font_size).speed(0.5)).changed() {
                    text.font_size = text.font_size.clamp(8.0, 200.0);
                }
            });
            egui::ComboBox::from_label("Font")
                .selected_text(text.font_family.as_str())
                .show_ui(ui, |ui| {
                    for family in FONT_FAMILIES {
                        ui.selectable_value(&mut text.font_family, family.to_string(), family);
                    }
                });
            ui.horizontal(|ui| {
                ui.selectable_value(&mut text.text_align, TextAlign::Left, "Left");
                ui.selectable_value(&mut text.text_align, TextAlign::Center, "Center");
                ui.selectable_value(&mut text.text_align, TextAlign::Right, "Right");
            });
            ui.horizontal(|ui| {
                let mut bold = text.font_weight == FontWeight::Bold;
                if ui.toggle_value(&mut bold, egui::RichText::new("B").strong()).changed() {
                    text.font_weight = if bold { FontWeight::Bold } else { FontWeight::Normal };
                }
                let mut italic = text.font_style == FontStyle::Italic;
                if ui.toggle_value(&mut italic, egui::RichText::new("I").italics()).changed() {
                    text.font_style = if italic { FontStyle::Italic } else { FontStyle::Normal };
                }
            });
            egui::Grid::new("text_colors").num_columns(2).show(ui, |ui| {
                ui.label("Color");
                color_edit(ui, &mut text.color);
                ui.end_row();
                ui.label("Background");
                color_edit(ui, &mut text.background_color);
                ui.end_row();
                ui.label("Border");
                color_edit(ui, &mut text.border_color);
                ui.end_row();
                ui.label("Border width");
                ui.add(egui::Slider::new(&mut text.border_width, 0.0..=10.0).clamp_to_range(false));
                ui.end_row();
            });
        }
        ElementKind::Image(image) => {
            ui.label(egui::RichText::new(&image.src).small().weak());
            if let (Some(w), Some(h)) = (image.original_width, image.original_height) {
                ui.label(format!("Original size: {w}×{h}"));
            }
            ui.checkbox(&mut image.resizable, "Resizable");
            ui.checkbox(&mut image.is_background, "Background image");
        }
        ElementKind::Shape(shape) => {
            egui::ComboBox::from_label("Shape")
                .selected_text(shape.shape.label())
                .show_ui(ui, |ui| {
                    for kind in ShapeKind::ALL {
                        ui.selectable_value(&mut shape.shape, kind, kind.label());
                    }
                });
            egui::Grid::new("shape_colors").num_columns(2).show(ui, |ui| {
                ui.label("Fill");
                color_edit(ui, &mut shape.fill);
                ui.end_row();
                ui.label("Border");
                color_edit(ui, &mut shape.border_color);
                ui.end_row();
                ui.label("Border width");
                ui.add(egui::Slider::new(&mut shape.border_width, 0.0..=10.0).clamp_to_range(false));
                ui.end_row();
            });
        }
    }

    ui.separator();
    let id = element.id;
    ui.horizontal(|ui| {
        let result = if ui.button("Bring to front").clicked() {
            editor.bring_to_front(id)
        } else if ui.button("Send to back").clicked() {
            editor.send_to_back(id)
        } else {
            Ok(())
        };
        if let Err(e) = result {
            log::warn!("Arrange failed: {}", e);
        }
    });
}

fn canvas_section(ui: &mut egui::Ui, editor: &mut Editor, state: &mut PropertiesState) {
    egui::CollapsingHeader::new("Canvas").default_open(true).show(ui, |ui| {
        let canvas = editor.project().canvas.clone();
        let (mut width, mut height) = state.pending_size.unwrap_or((canvas.width, canvas.height));

        ui.horizontal(|ui| {
            ui.label("Size:");
            let w = ui.add(egui::DragValue::new(&mut width).speed(1.0));
            ui.label("×");
            let h = ui.add(egui::DragValue::new(&mut height).speed(1.0));
            if w.changed() || h.changed() {
                state.pending_size = Some((width, height));
            }
        });
        if let Some((width, height)) = state.pending_size {
            ui.horizontal(|ui| {
                if ui.button("Apply").clicked() {
                    editor.set_canvas_size(width, height);
                    state.pending_size = None;
                }
                if ui.button("Cancel").clicked() {
                    state.pending_size = None;
                }
            });
        }

        egui::ComboBox::from_label("Preset")
            .selected_text("Choose...")
            .show_ui(ui, |ui| {
                for preset in CROP_RATIOS.iter().filter(|p| p.ratio > 0.0) {
                    let label = format!("{} ({}×{})", preset.name, preset.width, preset.height);
                    if ui.selectable_label(false, label).clicked() {
                        editor.apply_crop_ratio(preset);
                        state.pending_size = None;
                    }
                }
            });

        ui.horizontal(|ui| {
            ui.label("Background:");
            let mut background = canvas.background_color.clone();
            if color_edit(ui, &mut background).changed() {
                editor.preview_canvas_background(&background);
            }
            if ui.small_button("Reset").on_hover_text("White background").clicked() {
                editor.set_canvas_background("#ffffff");
            }
        });
    });
}
