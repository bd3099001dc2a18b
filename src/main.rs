// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! memecraft - a desktop meme editor
//!
//! Place text, image and shape elements on a fixed-size canvas, move,
//! resize and layer them, and export the result as an image.

mod app;
mod config;
mod editor;
mod io;
mod models;
mod ui;
mod util;

use anyhow::Result;
use app::MemeApp;
use config::AppConfig;

fn main() -> Result<()> {
    // Initialize logging, `RUST_LOG` overrides the default level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load();

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([900.0, 600.0])
            .with_title("memecraft"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "memecraft",
        options,
        Box::new(|_cc| Ok(Box::new(MemeApp::new(config)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
