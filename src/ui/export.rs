// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Export dialog.

use super::color_edit;
use crate::io::export::{format_size, ExportFormat, ExportOptions, SIZE_PRESETS};

/// Result of export dialog interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportAction {
    None,
    Export,
}

#[derive(Debug, Default)]
pub struct ExportState {
    pub open: bool,
    pub options: Option<ExportOptions>,
}

impl ExportState {
    /// Open the dialog with options sized to the canvas. Options from a
    /// previous export keep their format and file name.
    pub fn open_for(&mut self, canvas: (u32, u32)) {
        let mut options = ExportOptions::for_canvas(canvas.0, canvas.1);
        if let Some(previous) = self.options.take() {
            options.format = previous.format;
            options.quality = previous.quality;
            options.file_name = previous.file_name;
            options.background_color = previous.background_color;
            options.include_transparency = previous.include_transparency;
        }
        self.options = Some(options);
        self.open = true;
    }
}

/// Display the export dialog for a canvas of the given size.
pub fn show(ctx: &egui::Context, state: &mut ExportState, canvas: (u32, u32)) -> ExportAction {
    let mut action = ExportAction::None;
    let Some(options) = state.options.as_mut() else {
        state.open = false;
        return action;
    };
    let mut open = state.open;

    egui::Window::new("Export Meme")
        .open(&mut open)
        .resizable(false)
        .collapsible(false)
        .show(ctx, |ui| {
            ui.label(egui::RichText::new("Format").strong());
            for format in ExportFormat::ALL {
                ui.radio_value(&mut options.format, format, format.label())
                    .on_hover_text(format.description());
            }
            if options.format == ExportFormat::Jpeg {
                ui.horizontal(|ui| {
                    ui.label("Quality:");
                    ui.add(egui::Slider::new(&mut options.quality, 10..=100).suffix("%"));
                });
            }

            ui.separator();
            ui.label(egui::RichText::new("Size").strong());
            egui::ComboBox::from_label("Preset")
                .selected_text("Choose...")
                .show_ui(ui, |ui| {
                    if ui.selectable_label(false, format!("Original ({}×{})", canvas.0, canvas.1)).clicked() {
                        options.set_scale(canvas, 1.0);
                    }
                    for (name, width, height) in SIZE_PRESETS {
                        if ui.selectable_label(false, format!("{name} ({width}×{height})")).clicked() {
                            options.apply_preset(canvas, width, height);
                        }
                    }
                });
            ui.horizontal(|ui| {
                let mut width = options.width;
                let mut height = options.height;
                ui.label("W:");
                if ui.add(egui::DragValue::new(&mut width).speed(1.0)).changed() {
                    options.set_width(canvas, width.max(1));
                }
                ui.label("H:");
                if ui.add(egui::DragValue::new(&mut height).speed(1.0)).changed() {
                    options.set_height(canvas, height.max(1));
                }
            });
            ui.horizontal(|ui| {
                ui.label("Scale:");
                let mut scale = options.scale;
                if ui.add(egui::Slider::new(&mut scale, 0.1..=4.0).suffix("×")).changed() {
                    options.set_scale(canvas, scale);
                }
            });

            ui.separator();
            ui.label(egui::RichText::new("Background").strong());
            let transparency = options.format.supports_transparency();
            ui.add_enabled(
                transparency,
                egui::Checkbox::new(&mut options.include_transparency, "Keep transparency"),
            );
            if !transparency || !options.include_transparency {
                ui.horizontal(|ui| {
                    ui.label("Fill:");
                    color_edit(ui, &mut options.background_color);
                });
            }

            ui.separator();
            ui.horizontal(|ui| {
                ui.label("File name:");
                ui.text_edit_singleline(&mut options.file_name);
                ui.label(format!(".{}", options.format.extension()));
            });
            ui.label(
                egui::RichText::new(format!(
                    "{}×{} · about {}",
                    options.width,
                    options.height,
                    format_size(options.estimate_size())
                ))
                .weak(),
            );

            ui.add_space(6.0);
            if ui.button("💾 Export...").clicked() {
                action = ExportAction::Export;
            }
        });

    state.open = open && action == ExportAction::None;
    action
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_for_keeps_format_but_resizes() {
        let mut state = ExportState::default();
        state.open_for((800, 600));
        let options = state.options.as_mut().unwrap();
        options.format = ExportFormat::Jpeg;
        options.file_name = "cat".to_string();
        options.set_scale((800, 600), 2.0);

        state.open_for((400, 300));
        let options = state.options.as_ref().unwrap();
        assert!(state.open);
        assert_eq!(options.format, ExportFormat::Jpeg);
        assert_eq!(options.file_name, "cat");
        assert_eq!((options.width, options.height), (400, 300));
        assert_eq!(options.scale, 1.0);
    }
}
