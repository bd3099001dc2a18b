// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the memecraft application.

pub mod canvas;
pub mod export;
pub mod layers;
pub mod projects;
pub mod properties;
pub mod templates;
pub mod toolbar;

use crate::util::color::{parse_color_or, to_hex};

/// Convert a stored colour string for painting. Unreadable colours paint
/// as magenta so they stand out.
pub fn color32(value: &str) -> egui::Color32 {
    let [r, g, b, a] = parse_color_or(value, [255, 0, 255, 255]);
    egui::Color32::from_rgba_unmultiplied(r, g, b, a)
}

/// Colour picker button bound to a stored colour string.
pub fn color_edit(ui: &mut egui::Ui, value: &mut String) -> egui::Response {
    let mut rgba = parse_color_or(value, [0, 0, 0, 255]);
    let response = ui.color_edit_button_srgba_unmultiplied(&mut rgba);
    if response.changed() {
        *value = to_hex(rgba);
    }
    response
}
