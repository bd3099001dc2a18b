// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas.
//!
//! Paints the project's elements back-to-front at the current zoom and
//! translates pointer input into canvas-space events for the editor.

use super::color32;
use crate::editor::interaction::Gesture;
use crate::editor::Editor;
use crate::io::media;
use crate::models::element::{
    CanvasElement, ElementKind, FontStyle, FontWeight, ImageData, ShapeData, ShapeKind, TextAlign, TextData,
};
use crate::util::geometry::{Point, ResizeHandle};
use egui::emath::Rot2;
use egui::text::{LayoutJob, TextFormat};
use egui::{Color32, FontFamily, FontId, Mesh, Pos2, Shape, Stroke, Vec2};
use std::collections::HashMap;
use std::path::Path;

pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 4.0;
const ZOOM_STEP: f32 = 1.25;

const SELECTION_COLOR: Color32 = Color32::from_rgb(25, 118, 210);
const LOCKED_COLOR: Color32 = Color32::from_rgb(255, 152, 0);
const HANDLE_SIZE: f32 = 8.0;

/// Pointer input in canvas pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasAction {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp,
    PointerLeave,
}

/// Primary button state for one frame, in screen coordinates.
#[derive(Debug, Clone, Copy)]
struct PointerInput {
    pressed: bool,
    down: bool,
    pos: Option<Pos2>,
}

/// Translate one frame of pointer input into a canvas action. Only the
/// canvas itself counts as inside, not the padding around it; `hovered`
/// is false while another layer covers the canvas.
fn pointer_action(
    input: PointerInput,
    canvas: egui::Rect,
    hovered: bool,
    gesture_active: bool,
    to_canvas: impl Fn(Pos2) -> Point,
) -> Option<CanvasAction> {
    let inside = hovered && input.pos.is_some_and(|pos| canvas.contains(pos));
    match input.pos {
        Some(pos) if input.pressed && inside => Some(CanvasAction::PointerDown(to_canvas(pos))),
        _ if gesture_active && !inside => Some(CanvasAction::PointerLeave),
        _ if gesture_active && !input.down => Some(CanvasAction::PointerUp),
        Some(pos) if gesture_active => Some(CanvasAction::PointerMove(to_canvas(pos))),
        _ => None,
    }
}

/// View state that is not part of the project.
#[derive(Debug, Clone)]
pub struct CanvasView {
    pub zoom: f32,
    /// Fit the canvas to the panel instead of using `zoom`.
    pub fit: bool,
    /// Suppress the selection outline, e.g. while capturing an export.
    pub hide_selection: bool,
}

impl Default for CanvasView {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            fit: true,
            hide_selection: false,
        }
    }
}

impl CanvasView {
    pub fn zoom_in(&mut self) {
        self.fit = false;
        self.zoom = (self.zoom * ZOOM_STEP).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.fit = false;
        self.zoom = (self.zoom / ZOOM_STEP).max(MIN_ZOOM);
    }

    pub fn reset_zoom(&mut self) {
        self.fit = false;
        self.zoom = 1.0;
    }

    pub fn fit_to_window(&mut self) {
        self.fit = true;
    }
}

/// Decoded image textures, keyed by source path. Failed loads are cached
/// too, so a missing file is reported once.
#[derive(Default)]
pub struct TextureCache {
    textures: HashMap<String, Option<egui::TextureHandle>>,
}

impl TextureCache {
    pub fn get(&mut self, ctx: &egui::Context, src: &str) -> Option<&egui::TextureHandle> {
        self.textures
            .entry(src.to_string())
            .or_insert_with(|| load_texture(ctx, src))
            .as_ref()
    }

    /// Forget a source so it is decoded again on next use.
    pub fn invalidate(&mut self, src: &str) {
        self.textures.remove(src);
    }
}

fn load_texture(ctx: &egui::Context, src: &str) -> Option<egui::TextureHandle> {
    match media::load_image(Path::new(src)) {
        Ok(image) => {
            let color_image = egui::ColorImage::from_rgba_unmultiplied(image.size(), &image.rgba);
            Some(ctx.load_texture(src, color_image, egui::TextureOptions::LINEAR))
        }
        Err(e) => {
            log::warn!("{:#}", e);
            None
        }
    }
}

/// Display the canvas and collect pointer input. Returns the actions and the
/// screen rectangle the canvas occupies.
pub fn show(
    ui: &mut egui::Ui,
    editor: &Editor,
    view: &mut CanvasView,
    textures: &mut TextureCache,
) -> (Vec<CanvasAction>, egui::Rect) {
    let project = editor.project();
    let canvas_size = Vec2::new(project.canvas.width as f32, project.canvas.height as f32);
    let available = ui.available_size();
    if view.fit {
        let fit = (available.x / canvas_size.x).min(available.y / canvas_size.y).min(1.0);
        view.zoom = fit.clamp(MIN_ZOOM, MAX_ZOOM);
    }
    let zoom = view.zoom;

    let mut actions = Vec::new();
    let mut canvas_rect = egui::Rect::NOTHING;

    egui::ScrollArea::both().auto_shrink([false; 2]).show(ui, |ui| {
        let display = canvas_size * zoom;
        let region = display.max(ui.available_size());
        let (response, painter) = ui.allocate_painter(region, egui::Sense::click_and_drag());
        let rect = egui::Rect::from_center_size(response.rect.center(), display);
        canvas_rect = rect;

        let to_canvas = |pos: Pos2| Point::new(((pos.x - rect.min.x) / zoom) as f64, ((pos.y - rect.min.y) / zoom) as f64);

        // Pointer input
        let input = ui.input(|i| PointerInput {
            pressed: i.pointer.primary_pressed(),
            down: i.pointer.primary_down(),
            pos: i.pointer.interact_pos(),
        });
        let hovered = response.contains_pointer();
        if let Some(action) = pointer_action(input, rect, hovered, editor.gesture().is_active(), to_canvas) {
            actions.push(action);
        }

        if let Some(pos) = response.hover_pos() {
            set_cursor(ui, editor, to_canvas(pos));
        }

        // Painting
        let painter = painter.with_clip_rect(rect);
        painter.rect_filled(rect, 0.0, color32(&project.canvas.background_color));
        for element in project.elements.iter().filter(|e| e.visible) {
            paint_element(ui.ctx(), &painter, element, rect.min, zoom, textures);
        }
        if !view.hide_selection {
            if let Some(element) = editor.selected_element() {
                paint_selection(&painter, element, rect.min, zoom);
            }
        }
    });

    (actions, canvas_rect)
}

fn set_cursor(ui: &egui::Ui, editor: &Editor, pos: Point) {
    let icon = match editor.gesture() {
        Gesture::Dragging { .. } => egui::CursorIcon::Grabbing,
        Gesture::Resizing { handle, .. } => handle_cursor(*handle),
        Gesture::Idle => match editor.handle_under(pos) {
            Some(handle) => handle_cursor(handle),
            None => match editor.hit_test(pos).and_then(|id| editor.project().element(id)) {
                Some(element) if !element.locked => egui::CursorIcon::Grab,
                _ => return,
            },
        },
    };
    ui.ctx().set_cursor_icon(icon);
}

fn handle_cursor(handle: ResizeHandle) -> egui::CursorIcon {
    match handle {
        ResizeHandle::N | ResizeHandle::S => egui::CursorIcon::ResizeVertical,
        ResizeHandle::E | ResizeHandle::W => egui::CursorIcon::ResizeHorizontal,
        ResizeHandle::NW | ResizeHandle::SE => egui::CursorIcon::ResizeNwSe,
        ResizeHandle::NE | ResizeHandle::SW => egui::CursorIcon::ResizeNeSw,
    }
}

/// Screen rectangle of an element before rotation.
fn screen_rect(element: &CanvasElement, origin: Pos2, zoom: f32) -> egui::Rect {
    egui::Rect::from_min_size(
        origin + Vec2::new(element.x as f32, element.y as f32) * zoom,
        Vec2::new(element.width as f32, element.height as f32) * zoom,
    )
}

/// Map a point in the unit square onto `rect`, rotated about its centre.
fn place(rect: egui::Rect, rot: Rot2, u: f32, v: f32) -> Pos2 {
    let local = rect.min + Vec2::new(u * rect.width(), v * rect.height());
    rect.center() + rot * (local - rect.center())
}

fn paint_element(
    ctx: &egui::Context,
    painter: &egui::Painter,
    element: &CanvasElement,
    origin: Pos2,
    zoom: f32,
    textures: &mut TextureCache,
) {
    let rect = screen_rect(element, origin, zoom);
    let rot = Rot2::from_angle((element.rotation as f32).to_radians());
    let opacity = element.opacity.clamp(0.0, 1.0) as f32;

    match &element.kind {
        ElementKind::Text(text) => paint_text(painter, text, rect, rot, zoom, opacity),
        ElementKind::Image(image) => paint_image(ctx, painter, image, rect, rot, opacity, textures),
        ElementKind::Shape(shape) => paint_shape(painter, shape, rect, rot, zoom, opacity),
    }
}

fn paint_text(painter: &egui::Painter, text: &TextData, rect: egui::Rect, rot: Rot2, zoom: f32, opacity: f32) {
    let corners: Vec<Pos2> = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
        .iter()
        .map(|&(u, v)| place(rect, rot, u, v))
        .collect();
    let background = color32(&text.background_color).gamma_multiply(opacity);
    if background.a() > 0 {
        painter.add(Shape::convex_polygon(corners.clone(), background, Stroke::NONE));
    }
    if text.border_width > 0.0 {
        let border = color32(&text.border_color).gamma_multiply(opacity);
        painter.add(Shape::closed_line(corners, Stroke::new(text.border_width as f32 * zoom, border)));
    }

    let family = if text.font_family.to_ascii_lowercase().contains("mono")
        || text.font_family.to_ascii_lowercase().contains("courier")
    {
        FontFamily::Monospace
    } else {
        FontFamily::Proportional
    };
    let mut job = LayoutJob::default();
    job.wrap.max_width = rect.width();
    job.halign = match text.text_align {
        TextAlign::Left => egui::Align::LEFT,
        TextAlign::Center => egui::Align::Center,
        TextAlign::Right => egui::Align::RIGHT,
    };
    let color = color32(&text.color).gamma_multiply(opacity);
    job.append(
        &text.text,
        0.0,
        TextFormat {
            font_id: FontId::new((text.font_size as f32 * zoom).max(1.0), family),
            color,
            italics: text.font_style == FontStyle::Italic,
            ..Default::default()
        },
    );
    let galley = painter.layout_job(job);

    let anchor_x = match text.text_align {
        TextAlign::Left => rect.left(),
        TextAlign::Center => rect.center().x,
        TextAlign::Right => rect.right(),
    };
    let anchor = Pos2::new(anchor_x, rect.center().y - galley.size().y / 2.0);
    let pos = rect.center() + rot * (anchor - rect.center());
    let angle = rot.angle();

    if text.font_weight == FontWeight::Bold {
        // No bold face in the default fonts: overstrike slightly offset.
        let offset = rot * Vec2::new((text.font_size as f32 * zoom * 0.03).max(0.5), 0.0);
        painter.add(egui::epaint::TextShape::new(pos + offset, galley.clone(), color).with_angle(angle));
    }
    painter.add(egui::epaint::TextShape::new(pos, galley, color).with_angle(angle));
}

fn paint_image(
    ctx: &egui::Context,
    painter: &egui::Painter,
    image: &ImageData,
    rect: egui::Rect,
    rot: Rot2,
    opacity: f32,
    textures: &mut TextureCache,
) {
    match textures.get(ctx, &image.src) {
        Some(texture) => {
            let mut mesh = Mesh::with_texture(texture.id());
            let uv = egui::Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
            mesh.add_rect_with_uv(rect, uv, Color32::WHITE.gamma_multiply(opacity));
            mesh.rotate(rot, rect.center());
            painter.add(Shape::mesh(mesh));
        }
        None => {
            painter.rect_filled(rect, 0.0, Color32::from_gray(90).gamma_multiply(opacity));
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "Image not found",
                FontId::proportional(12.0),
                Color32::from_gray(220),
            );
        }
    }
}

/// Outline of a shape in unit-square coordinates plus a point every outline
/// vertex can see, used as the triangle fan centre.
fn shape_outline(kind: ShapeKind) -> (Vec<(f32, f32)>, (f32, f32)) {
    use std::f32::consts::{FRAC_PI_2, PI, TAU};
    match kind {
        ShapeKind::Square => (vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)], (0.5, 0.5)),
        ShapeKind::Circle => {
            let points = (0..64)
                .map(|i| {
                    let t = i as f32 / 64.0 * TAU;
                    (0.5 + 0.5 * t.cos(), 0.5 + 0.5 * t.sin())
                })
                .collect();
            (points, (0.5, 0.5))
        }
        ShapeKind::Star => {
            let points = (0..10)
                .map(|i| {
                    let radius = if i % 2 == 0 { 0.5 } else { 0.2 };
                    let t = -FRAC_PI_2 + i as f32 * PI / 5.0;
                    (0.5 + radius * t.cos(), 0.5 + radius * t.sin())
                })
                .collect();
            (points, (0.5, 0.5))
        }
        ShapeKind::Heart => {
            let raw: Vec<(f32, f32)> = (0..64)
                .map(|i| {
                    let t = i as f32 / 64.0 * TAU;
                    let x = 16.0 * t.sin().powi(3);
                    let y = -(13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos());
                    (x, y)
                })
                .collect();
            let (min_y, max_y) = raw
                .iter()
                .fold((f32::MAX, f32::MIN), |(lo, hi), &(_, y)| (lo.min(y), hi.max(y)));
            let points = raw
                .into_iter()
                .map(|(x, y)| ((x + 16.0) / 32.0, (y - min_y) / (max_y - min_y)))
                .collect();
            (points, (0.5, 0.5))
        }
        ShapeKind::Arrow => (
            vec![
                (0.0, 0.35),
                (0.6, 0.35),
                (0.6, 0.1),
                (1.0, 0.5),
                (0.6, 0.9),
                (0.6, 0.65),
                (0.0, 0.65),
            ],
            (0.6, 0.5),
        ),
    }
}

fn paint_shape(painter: &egui::Painter, shape: &ShapeData, rect: egui::Rect, rot: Rot2, zoom: f32, opacity: f32) {
    let (outline, (cu, cv)) = shape_outline(shape.shape);
    let points: Vec<Pos2> = outline.iter().map(|&(u, v)| place(rect, rot, u, v)).collect();

    let fill = color32(&shape.fill).gamma_multiply(opacity);
    if fill.a() > 0 {
        let mut mesh = Mesh::default();
        mesh.colored_vertex(place(rect, rot, cu, cv), fill);
        for point in &points {
            mesh.colored_vertex(*point, fill);
        }
        let n = points.len() as u32;
        for i in 0..n {
            mesh.add_triangle(0, 1 + i, 1 + (i + 1) % n);
        }
        painter.add(Shape::mesh(mesh));
    }
    if shape.border_width > 0.0 {
        let border = color32(&shape.border_color).gamma_multiply(opacity);
        painter.add(Shape::closed_line(points, Stroke::new(shape.border_width as f32 * zoom, border)));
    }
}

fn paint_selection(painter: &egui::Painter, element: &CanvasElement, origin: Pos2, zoom: f32) {
    let rect = screen_rect(element, origin, zoom);
    let color = if element.locked { LOCKED_COLOR } else { SELECTION_COLOR };
    painter.rect_stroke(rect.expand(1.0), 0.0, Stroke::new(2.0, color));

    if !element.is_interactive() || !element.is_resizable() {
        return;
    }
    let canvas_rect = element.rect();
    for handle in ResizeHandle::ALL {
        let anchor = handle.position(&canvas_rect);
        let center = origin + Vec2::new(anchor.x as f32, anchor.y as f32) * zoom;
        let square = egui::Rect::from_center_size(center, Vec2::splat(HANDLE_SIZE));
        painter.rect_filled(square, 1.0, Color32::WHITE);
        painter.rect_stroke(square, 1.0, Stroke::new(1.5, SELECTION_COLOR));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(pressed: bool, down: bool, x: f32, y: f32) -> PointerInput {
        PointerInput { pressed, down, pos: Some(Pos2::new(x, y)) }
    }

    #[test]
    fn test_padding_around_canvas_is_outside() {
        // Canvas drawn at (100, 50) in a wider painter region.
        let canvas = egui::Rect::from_min_size(Pos2::new(100.0, 50.0), Vec2::new(400.0, 300.0));
        let to_canvas = |pos: Pos2| Point::new((pos.x - 100.0) as f64, (pos.y - 50.0) as f64);

        assert_eq!(pointer_action(input(true, true, 60.0, 100.0), canvas, true, false, to_canvas), None);
        assert_eq!(
            pointer_action(input(true, true, 110.0, 60.0), canvas, true, false, to_canvas),
            Some(CanvasAction::PointerDown(Point::new(10.0, 10.0)))
        );
        assert_eq!(
            pointer_action(input(false, true, 60.0, 100.0), canvas, true, true, to_canvas),
            Some(CanvasAction::PointerLeave)
        );
        assert_eq!(
            pointer_action(input(false, true, 300.0, 200.0), canvas, true, true, to_canvas),
            Some(CanvasAction::PointerMove(Point::new(200.0, 150.0)))
        );
        assert_eq!(
            pointer_action(input(false, false, 300.0, 200.0), canvas, true, true, to_canvas),
            Some(CanvasAction::PointerUp)
        );
        assert_eq!(pointer_action(input(true, true, 110.0, 60.0), canvas, false, false, to_canvas), None);
    }

    #[test]
    fn test_zoom_steps_are_bounded() {
        let mut view = CanvasView::default();
        for _ in 0..50 {
            view.zoom_in();
        }
        assert_eq!(view.zoom, MAX_ZOOM);
        assert!(!view.fit);
        for _ in 0..50 {
            view.zoom_out();
        }
        assert_eq!(view.zoom, MIN_ZOOM);
        view.reset_zoom();
        assert_eq!(view.zoom, 1.0);
    }

    #[test]
    fn test_shape_outlines_stay_in_unit_square() {
        for kind in ShapeKind::ALL {
            let (points, (cu, cv)) = shape_outline(kind);
            assert!(points.len() >= 4, "{kind:?}");
            for (u, v) in points.into_iter().chain([(cu, cv)]) {
                assert!((-1e-4..=1.0 + 1e-4).contains(&u), "{kind:?} u = {u}");
                assert!((-1e-4..=1.0 + 1e-4).contains(&v), "{kind:?} v = {v}");
            }
        }
    }

    #[test]
    fn test_place_rotates_about_centre() {
        let rect = egui::Rect::from_min_size(Pos2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        let rotated = place(rect, Rot2::from_angle(std::f32::consts::PI), 0.0, 0.0);
        assert!((rotated.x - 10.0).abs() < 1e-4);
        assert!((rotated.y - 10.0).abs() < 1e-4);
    }
}
