// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! `MemeApp` owns the [`Editor`] and the storage backend, routes panel
//! actions to them and drives the autosave and export side effects.

use crate::config::AppConfig;
use crate::editor::autosave::Debouncer;
use crate::editor::interaction::{HANDLE_RADIUS, NUDGE_STEP, NUDGE_STEP_LARGE};
use crate::editor::Editor;
use crate::io::export::{self, ExportOptions};
use crate::io::storage::{restore_current, FileStorage, Storage};
use crate::io::{media, serialization};
use crate::models::project::MemeProject;
use crate::ui::canvas::{self, CanvasAction, CanvasView, TextureCache};
use crate::ui::export::{ExportAction, ExportState};
use crate::ui::layers::{self, LayersState};
use crate::ui::projects::{self, ProjectsAction, ProjectsState};
use crate::ui::properties::{self, PropertiesState};
use crate::ui::templates::{self, TemplatesAction, TemplatesState};
use crate::ui::toolbar::{self, ToolbarAction};
use anyhow::{anyhow, Context as _, Result};
use image::RgbaImage;
use std::path::Path;
use std::time::{Duration, Instant};

const NOTICE_DURATION: Duration = Duration::from_secs(4);
const SCREENSHOT_TIMEOUT: Duration = Duration::from_secs(3);
const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// Progress of an image export. The canvas is redrawn without the
/// selection outline before the window is captured.
enum ExportStage {
    Prepare,
    Capture { canvas_rect: egui::Rect, requested_at: Instant },
}

struct PendingExport {
    options: ExportOptions,
    stage: ExportStage,
    saved_view: CanvasView,
}

/// Main application state.
pub struct MemeApp {
    config: AppConfig,
    editor: Editor,
    storage: FileStorage,
    autosave: Debouncer,

    view: CanvasView,
    textures: TextureCache,
    properties: PropertiesState,
    layers: LayersState,
    templates: TemplatesState,
    projects: ProjectsState,
    export: ExportState,
    pending_export: Option<PendingExport>,
    show_about: bool,

    /// Transient status bar message.
    notice: Option<(String, Instant)>,
}

impl MemeApp {
    /// Create the application, restoring the autosaved project if there is
    /// one.
    pub fn new(config: AppConfig) -> Self {
        let storage = FileStorage::new(&config.data_dir);
        let project = restore_current(&storage).unwrap_or_else(|| MemeProject::new(config.default_canvas.clone()));
        let autosave = Debouncer::new(config.autosave_delay());
        log::info!("Data directory: {}", storage.root().display());

        Self {
            editor: Editor::new(project),
            storage,
            autosave,
            view: CanvasView::default(),
            textures: TextureCache::default(),
            properties: PropertiesState::default(),
            layers: LayersState::default(),
            templates: TemplatesState::default(),
            projects: ProjectsState::default(),
            export: ExportState::default(),
            pending_export: None,
            show_about: false,
            notice: None,
            config,
        }
    }

    fn notify(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{}", message);
        self.notice = Some((message, Instant::now()));
    }

    fn report(&mut self, context: &str, error: impl std::fmt::Display) {
        log::error!("{}: {}", context, error);
        self.notice = Some((format!("{}: {}", context, error), Instant::now()));
    }

    fn canvas_size(&self) -> (u32, u32) {
        let canvas = &self.editor.project().canvas;
        (canvas.width, canvas.height)
    }

    fn add_image_from_disk(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &IMAGE_EXTENSIONS)
            .pick_file()
        else {
            return;
        };
        let natural = match media::image_dimensions(&path) {
            Ok(size) => Some(size),
            Err(e) => {
                self.report("Cannot read image", format!("{:#}", e));
                return;
            }
        };
        self.editor.add_image(path.to_string_lossy(), natural);
    }

    fn duplicate_selected(&mut self) {
        if let Some(id) = self.editor.selection() {
            if let Err(e) = self.editor.duplicate_element(id) {
                log::warn!("Duplicate failed: {}", e);
            }
        }
    }

    fn handle_toolbar(&mut self, action: ToolbarAction) {
        match action {
            ToolbarAction::None => {}
            ToolbarAction::AddText => {
                self.editor.add_text();
            }
            ToolbarAction::AddShape(kind) => {
                self.editor.add_shape(kind);
            }
            ToolbarAction::AddImage => self.add_image_from_disk(),
            ToolbarAction::Undo => {
                self.editor.undo();
            }
            ToolbarAction::Redo => {
                self.editor.redo();
            }
            ToolbarAction::Duplicate => self.duplicate_selected(),
            ToolbarAction::Delete => {
                self.editor.delete_selected();
            }
            ToolbarAction::RotateSelected => {
                if let Some(id) = self.editor.selection() {
                    if let Err(e) = self.editor.rotate_by(id, 90.0) {
                        log::warn!("Rotate failed: {}", e);
                    }
                }
            }
            ToolbarAction::ToggleTemplates => {
                self.templates.open = !self.templates.open;
                if self.templates.open {
                    self.refresh_templates();
                }
            }
            ToolbarAction::Export => self.export.open_for(self.canvas_size()),
        }
    }

    fn handle_canvas(&mut self, actions: Vec<CanvasAction>) {
        for action in actions {
            match action {
                CanvasAction::PointerDown(pos) => self.editor.pointer_down(pos),
                CanvasAction::PointerMove(pos) => self.editor.pointer_move(pos),
                CanvasAction::PointerUp => self.editor.pointer_up(),
                CanvasAction::PointerLeave => self.editor.pointer_leave(),
            }
        }
    }

    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        // Text fields keep their own shortcuts.
        if ctx.wants_keyboard_input() {
            return;
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            if self.editor.gesture().is_active() {
                self.editor.cancel_gesture();
            } else {
                self.editor.clear_selection();
            }
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace)) {
            self.editor.delete_selected();
        }

        // Undo (Ctrl+Z)
        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::Z) && !i.modifiers.shift) {
            self.editor.undo();
        }

        // Redo (Ctrl+Shift+Z or Ctrl+Y)
        if ctx.input(|i| {
            (i.modifiers.command && i.modifiers.shift && i.key_pressed(egui::Key::Z))
                || (i.modifiers.command && i.key_pressed(egui::Key::Y))
        }) {
            self.editor.redo();
        }

        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::D)) {
            self.duplicate_selected();
        }

        let (dx, dy, large) = ctx.input(|i| {
            let mut dx = 0.0;
            let mut dy = 0.0;
            if i.key_pressed(egui::Key::ArrowLeft) {
                dx -= 1.0;
            }
            if i.key_pressed(egui::Key::ArrowRight) {
                dx += 1.0;
            }
            if i.key_pressed(egui::Key::ArrowUp) {
                dy -= 1.0;
            }
            if i.key_pressed(egui::Key::ArrowDown) {
                dy += 1.0;
            }
            (dx, dy, i.modifiers.shift)
        });
        if dx != 0.0 || dy != 0.0 {
            let step = if large { NUDGE_STEP_LARGE } else { NUDGE_STEP };
            self.editor.nudge_selected(dx * step, dy * step);
        }
    }

    fn refresh_templates(&mut self) {
        match self.storage.list_templates() {
            Ok(templates) => self.templates.templates = templates,
            Err(e) => self.report("Failed to list templates", e),
        }
    }

    fn refresh_projects(&mut self) {
        match self.storage.list_projects() {
            Ok(projects) => self.projects.projects = projects,
            Err(e) => self.report("Failed to list projects", e),
        }
    }

    fn upload_template(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg", "gif", "webp"])
            .pick_file()
        else {
            return;
        };
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => return self.report("Failed to read template", e),
        };
        let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        let name = path.file_stem().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        match self.storage.upload_template(&bytes, &file_name, &name, None, None) {
            Ok(template) => {
                self.notify(format!("Uploaded template {}", template.name));
                self.refresh_templates();
            }
            Err(e) => self.report("Upload rejected", e),
        }
    }

    fn handle_templates(&mut self, action: TemplatesAction) {
        match action {
            TemplatesAction::None => {}
            TemplatesAction::Refresh => self.refresh_templates(),
            TemplatesAction::Upload => self.upload_template(),
            TemplatesAction::Use(id) => {
                if let Some(template) = self.templates.templates.iter().find(|t| t.id == id).cloned() {
                    self.editor.load_template(&template);
                    self.templates.open = false;
                }
            }
            TemplatesAction::Delete(id) => {
                let image_url = self
                    .templates
                    .templates
                    .iter()
                    .find(|t| t.id == id)
                    .map(|t| t.image_url.clone());
                match self.storage.delete_template(id) {
                    Ok(removed) => {
                        if let Some(url) = image_url {
                            self.textures.invalidate(&url);
                        }
                        log::info!("Deleted template {} ({} files)", id, removed);
                        self.refresh_templates();
                    }
                    Err(e) => self.report("Failed to delete template", e),
                }
            }
            TemplatesAction::SaveCurrent(name) => {
                let template = self.editor.template_from_project(&name);
                match self.storage.save_template(&template) {
                    Ok(()) => {
                        self.notify(format!("Saved template {}", template.name));
                        self.refresh_templates();
                    }
                    Err(e) => self.report("Failed to save template", e),
                }
            }
        }
    }

    fn handle_projects(&mut self, action: ProjectsAction) {
        match action {
            ProjectsAction::None => {}
            ProjectsAction::Refresh => self.refresh_projects(),
            ProjectsAction::SaveCurrent => self.save_project(),
            ProjectsAction::Rename(name) => self.editor.rename_project(&name),
            ProjectsAction::Open(id) => {
                if let Some(project) = self.projects.projects.iter().find(|p| p.id == id).cloned() {
                    self.editor.open_project(project);
                }
            }
            ProjectsAction::Delete(id) => match self.storage.delete_project(id) {
                Ok(true) => {
                    self.editor.close_deleted(id, self.config.default_canvas.clone());
                    self.refresh_projects();
                }
                Ok(false) => log::warn!("Project {} was already gone", id),
                Err(e) => self.report("Failed to delete project", e),
            },
        }
    }

    fn save_project(&mut self) {
        match self.storage.save_project(self.editor.project()) {
            Ok(saved) => {
                self.notify(format!("Saved project {}", saved.name));
                self.refresh_projects();
            }
            Err(e) => self.report("Failed to save project", e),
        }
    }

    fn import_project_file(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Projects", &["yaml", "yml", "json"])
            .pick_file()
        else {
            return;
        };
        match serialization::import_project(&path) {
            Ok(project) => self.editor.open_project(project),
            Err(e) => self.report("Import failed", format!("{:#}", e)),
        }
    }

    fn export_project_file(&mut self, extension: &str, filter: &str) {
        let file_name = format!("{}.{}", self.editor.project().name, extension);
        let Some(path) = rfd::FileDialog::new()
            .add_filter(filter, &[extension])
            .set_file_name(file_name)
            .save_file()
        else {
            return;
        };
        match serialization::export_project(self.editor.project(), &path) {
            Ok(()) => self.notify(format!("Exported project to {}", path.display())),
            Err(e) => self.report("Export failed", format!("{:#}", e)),
        }
    }

    /// Begin an export: redraw the canvas fitted and without the selection
    /// outline, then capture it on the following frame.
    fn start_export(&mut self, ctx: &egui::Context) {
        let Some(options) = self.export.options.clone() else {
            return;
        };
        let saved_view = self.view.clone();
        self.view.hide_selection = true;
        self.view.fit_to_window();
        self.pending_export = Some(PendingExport {
            options,
            stage: ExportStage::Prepare,
            saved_view,
        });
        ctx.request_repaint();
    }

    /// Advance a pending export after the canvas has been drawn.
    fn advance_export(&mut self, ctx: &egui::Context, canvas_rect: egui::Rect) {
        let Some(pending) = self.pending_export.as_mut() else {
            return;
        };
        match pending.stage {
            ExportStage::Prepare => {
                pending.stage = ExportStage::Capture {
                    canvas_rect,
                    requested_at: Instant::now(),
                };
                ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot);
            }
            ExportStage::Capture { requested_at, .. } => {
                let screenshot = ctx.input(|i| {
                    i.events.iter().find_map(|event| match event {
                        egui::Event::Screenshot { image, .. } => Some(image.clone()),
                        _ => None,
                    })
                });
                if let Some(image) = screenshot {
                    self.finish_export(ctx, &image);
                } else if requested_at.elapsed() > SCREENSHOT_TIMEOUT {
                    if let Some(pending) = self.pending_export.take() {
                        self.view = pending.saved_view;
                    }
                    self.report("Export failed", "the window could not be captured");
                }
            }
        }
        ctx.request_repaint();
    }

    fn finish_export(&mut self, ctx: &egui::Context, screenshot: &egui::ColorImage) {
        let Some(pending) = self.pending_export.take() else {
            return;
        };
        self.view = pending.saved_view;
        let ExportStage::Capture { canvas_rect, .. } = pending.stage else {
            return;
        };

        let result = capture_canvas(ctx, screenshot, canvas_rect).and_then(|pixels| {
            let bytes = export::encode(&pixels, &pending.options)?;
            Ok(bytes)
        });
        let bytes = match result {
            Ok(bytes) => bytes,
            Err(e) => return self.report("Export failed", format!("{:#}", e)),
        };

        let format = pending.options.format;
        let Some(path) = rfd::FileDialog::new()
            .add_filter(format.label(), &[format.extension()])
            .set_file_name(pending.options.output_file_name())
            .save_file()
        else {
            return;
        };
        match write_export(&path, &bytes) {
            Ok(()) => self.notify(format!(
                "Exported {} ({})",
                path.display(),
                export::format_size(bytes.len() as u64)
            )),
            Err(e) => self.report("Export failed", format!("{:#}", e)),
        }
    }

    fn menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("New Project").clicked() {
                        self.editor.new_project(self.config.default_canvas.clone());
                        ui.close_menu();
                    }
                    if ui.button("Projects...").clicked() {
                        self.projects.open = true;
                        self.refresh_projects();
                        ui.close_menu();
                    }
                    if ui.button("Save Project").clicked() {
                        self.save_project();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Import Project...").clicked() {
                        self.import_project_file();
                        ui.close_menu();
                    }
                    ui.menu_button("Export Project", |ui| {
                        if ui.button("Export as YAML...").clicked() {
                            self.export_project_file("yaml", "YAML");
                            ui.close_menu();
                        }
                        if ui.button("Export as JSON...").clicked() {
                            self.export_project_file("json", "JSON");
                            ui.close_menu();
                        }
                    });
                    ui.separator();
                    if ui.button("Templates...").clicked() {
                        self.templates.open = true;
                        self.refresh_templates();
                        ui.close_menu();
                    }
                    if ui.button("Export Image...").clicked() {
                        self.export.open_for(self.canvas_size());
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Edit", |ui| {
                    if ui.add_enabled(self.editor.can_undo(), egui::Button::new("Undo (Ctrl+Z)")).clicked() {
                        self.editor.undo();
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(self.editor.can_redo(), egui::Button::new("Redo (Ctrl+Shift+Z)"))
                        .clicked()
                    {
                        self.editor.redo();
                        ui.close_menu();
                    }
                    ui.separator();
                    let has_selection = self.editor.selection().is_some();
                    if ui.add_enabled(has_selection, egui::Button::new("Duplicate (Ctrl+D)")).clicked() {
                        self.duplicate_selected();
                        ui.close_menu();
                    }
                    if ui.add_enabled(has_selection, egui::Button::new("Delete Selected")).clicked() {
                        self.editor.delete_selected();
                        ui.close_menu();
                    }
                    if ui.add_enabled(has_selection, egui::Button::new("Deselect (Esc)")).clicked() {
                        self.editor.clear_selection();
                        ui.close_menu();
                    }
                });

                ui.menu_button("View", |ui| {
                    if ui.button("Zoom In").clicked() {
                        self.view.zoom_in();
                        ui.close_menu();
                    }
                    if ui.button("Zoom Out").clicked() {
                        self.view.zoom_out();
                        ui.close_menu();
                    }
                    if ui.button("Actual Size").clicked() {
                        self.view.reset_zoom();
                        ui.close_menu();
                    }
                    if ui.button("Fit to Window").clicked() {
                        self.view.fit_to_window();
                        ui.close_menu();
                    }
                });

                ui.menu_button("Help", |ui| {
                    if ui.button("About").clicked() {
                        self.show_about = true;
                        ui.close_menu();
                    }
                });
            });
        });
    }

    fn status_bar(&mut self, ctx: &egui::Context) {
        if self.notice.as_ref().is_some_and(|(_, at)| at.elapsed() > NOTICE_DURATION) {
            self.notice = None;
        }

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let project = self.editor.project();
                let history = self.editor.history();
                ui.label(format!("{}  ·  {}×{}", project.name, project.canvas.width, project.canvas.height));
                ui.separator();
                ui.label(format!("{} elements", project.elements.len()));
                ui.separator();
                ui.label(format!("History {}/{}", history.index() + 1, history.len()));
                if self.autosave.is_pending() {
                    ui.separator();
                    ui.label(egui::RichText::new("Unsaved changes").weak());
                }
                if let Some((message, _)) = &self.notice {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(message);
                    });
                }
            });
        });
    }

    fn about_window(&mut self, ctx: &egui::Context) {
        egui::Window::new("About")
            .open(&mut self.show_about)
            .resizable(false)
            .collapsible(false)
            .show(ctx, |ui| {
                ui.heading("memecraft");
                ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
                ui.label("Place, transform and layer text, image and shape elements.");
                ui.label(format!("Data directory: {}", self.storage.root().display()));
            });
    }

    /// Save the live project to the autosave slot once edits settle.
    fn autosave(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        self.autosave.observe(self.editor.revision(), now);
        if self.autosave.poll(now) {
            match self.storage.save_current(self.editor.project()) {
                Ok(()) => log::debug!("Autosaved {}", self.editor.project().name),
                Err(e) => self.report("Autosave failed", e),
            }
        }
        if let Some(remaining) = self.autosave.remaining(now) {
            ctx.request_repaint_after(remaining);
        }
        if let Some((_, at)) = &self.notice {
            ctx.request_repaint_after(NOTICE_DURATION.saturating_sub(at.elapsed()));
        }
    }
}

/// Cut the canvas out of a window screenshot.
fn capture_canvas(ctx: &egui::Context, screenshot: &egui::ColorImage, canvas_rect: egui::Rect) -> Result<RgbaImage> {
    let pixels_per_point = ctx.pixels_per_point();
    let screen = egui::Rect::from_min_size(
        egui::Pos2::ZERO,
        egui::vec2(screenshot.size[0] as f32, screenshot.size[1] as f32) / pixels_per_point,
    );
    let region = canvas_rect.intersect(screen);
    if !region.is_positive() {
        return Err(anyhow!("The canvas is not on screen"));
    }
    let cropped = screenshot.region(&region, Some(pixels_per_point));
    let [width, height] = cropped.size;
    let raw: Vec<u8> = cropped.pixels.iter().flat_map(|c| c.to_srgba_unmultiplied()).collect();
    RgbaImage::from_raw(width as u32, height as u32, raw).ok_or_else(|| anyhow!("Screenshot has an unexpected size"))
}

fn write_export(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}

impl eframe::App for MemeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.menu_bar(ctx);

        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, &self.editor, &mut self.view))
            .inner;
        self.handle_toolbar(toolbar_action);

        self.status_bar(ctx);

        let layers_action = egui::SidePanel::left("layers")
            .default_width(230.0)
            .show(ctx, |ui| layers::show(ui, &self.editor, &mut self.layers))
            .inner;
        layers::apply(&mut self.editor, layers_action);

        egui::SidePanel::right("properties")
            .default_width(270.0)
            .show(ctx, |ui| properties::show(ui, &mut self.editor, &mut self.properties));

        self.handle_keyboard(ctx);

        let (canvas_actions, canvas_rect) = egui::CentralPanel::default()
            .frame(egui::Frame::central_panel(&ctx.style()).fill(egui::Color32::from_gray(48)))
            .show(ctx, |ui| canvas::show(ui, &self.editor, &mut self.view, &mut self.textures))
            .inner;
        // Handles keep the same on-screen size at any zoom.
        self.editor.set_handle_tolerance(HANDLE_RADIUS / self.view.zoom as f64);
        self.handle_canvas(canvas_actions);
        if self.pending_export.is_some() {
            self.advance_export(ctx, canvas_rect);
        }

        let templates_action = templates::show(ctx, &mut self.templates, &mut self.textures);
        self.handle_templates(templates_action);

        let projects_action = projects::show(ctx, &mut self.projects, self.editor.project());
        self.handle_projects(projects_action);

        let canvas_size = self.canvas_size();
        if crate::ui::export::show(ctx, &mut self.export, canvas_size) == ExportAction::Export {
            self.start_export(ctx);
        }

        self.about_window(ctx);

        // Continuous edits become one history entry once the interaction ends.
        let idle = !self.editor.gesture().is_active()
            && !ctx.input(|i| i.pointer.any_down())
            && ctx.memory(|m| m.focused().is_none());
        if idle {
            self.editor.commit_edit("edit properties");
        }

        if ctx.input(|i| i.viewport().close_requested()) {
            if let Err(e) = self.storage.save_current(self.editor.project()) {
                log::error!("Failed to save on exit: {}", e);
            }
        } else {
            self.autosave(ctx);
        }
    }
}
