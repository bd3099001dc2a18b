// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image file loading.
//!
//! Decodes image elements and template backgrounds into RGBA pixels for
//! texture upload in egui.

use anyhow::{Context, Result};
use std::path::Path;

/// A decoded image ready to become an egui texture.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8 pixels.
    pub rgba: Vec<u8>,
}

impl LoadedImage {
    pub fn size(&self) -> [usize; 2] {
        [self.width as usize, self.height as usize]
    }
}

/// Load and decode an image file.
pub fn load_image(path: &Path) -> Result<LoadedImage> {
    let image = image::open(path)
        .with_context(|| format!("Failed to open image {}", path.display()))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    log::debug!("Decoded {} ({}x{})", path.display(), width, height);
    Ok(LoadedImage {
        width,
        height,
        rgba: image.into_raw(),
    })
}

/// Read the image size from the file header without decoding pixels.
pub fn image_dimensions(path: &Path) -> Result<(u32, u32)> {
    image::image_dimensions(path)
        .with_context(|| format!("Failed to read image header {}", path.display()))
}
