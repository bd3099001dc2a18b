// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Raster export of the rendered canvas.
//!
//! The canvas is captured from the window as RGBA pixels; this module crops
//! the canvas region, scales it to the requested output size and encodes it.

use crate::util::color::parse_color_or;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage, RgbaImage};
use thiserror::Error;

pub const DEFAULT_QUALITY: u8 = 90;
pub const DEFAULT_FILE_NAME: &str = "my-meme";

/// Output sizes offered by the export dialog, besides the canvas size.
pub const SIZE_PRESETS: [(&str, u32, u32); 6] = [
    ("HD (1080p)", 1920, 1080),
    ("Square (1:1)", 1080, 1080),
    ("Instagram Post", 1080, 1080),
    ("Facebook Post", 1200, 628),
    ("Twitter Post", 1200, 675),
    ("YouTube Thumbnail", 1280, 720),
];

const WHITE: [u8; 4] = [255, 255, 255, 255];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Nothing to export: the captured image is empty")]
    EmptyImage,

    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
    WebP,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Png, ExportFormat::Jpeg, ExportFormat::WebP];

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Png => "PNG",
            ExportFormat::Jpeg => "JPEG",
            ExportFormat::WebP => "WebP",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::WebP => "webp",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ExportFormat::Png => "Best quality with transparency",
            ExportFormat::Jpeg => "Smaller file size, no transparency",
            ExportFormat::WebP => "Lossless, widely supported on the web",
        }
    }

    pub fn supports_transparency(self) -> bool {
        !matches!(self, ExportFormat::Jpeg)
    }

    fn bytes_per_pixel(self) -> u64 {
        match self {
            ExportFormat::Jpeg => 3,
            _ => 4,
        }
    }
}

/// Export dialog state. Width, height and scale are kept consistent with
/// the canvas aspect ratio by the setters.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// JPEG quality, 1..=100.
    pub quality: u8,
    pub width: u32,
    pub height: u32,
    pub scale: f64,
    pub file_name: String,
    pub background_color: String,
    /// Keep the alpha channel for formats that support it.
    pub include_transparency: bool,
}

impl ExportOptions {
    pub fn for_canvas(width: u32, height: u32) -> Self {
        Self {
            format: ExportFormat::default(),
            quality: DEFAULT_QUALITY,
            width,
            height,
            scale: 1.0,
            file_name: DEFAULT_FILE_NAME.to_string(),
            background_color: "#ffffff".to_string(),
            include_transparency: true,
        }
    }

    pub fn set_scale(&mut self, canvas: (u32, u32), scale: f64) {
        if !scale.is_finite() || scale <= 0.0 {
            return;
        }
        self.scale = scale;
        self.width = scaled(canvas.0, scale);
        self.height = scaled(canvas.1, scale);
    }

    /// Set the output width; height follows the canvas aspect ratio.
    pub fn set_width(&mut self, canvas: (u32, u32), width: u32) {
        if width == 0 || canvas.0 == 0 {
            return;
        }
        self.set_scale(canvas, width as f64 / canvas.0 as f64);
        self.width = width;
    }

    /// Set the output height; width follows the canvas aspect ratio.
    pub fn set_height(&mut self, canvas: (u32, u32), height: u32) {
        if height == 0 || canvas.1 == 0 {
            return;
        }
        self.set_scale(canvas, height as f64 / canvas.1 as f64);
        self.height = height;
    }

    /// Use a fixed output size, which may change the aspect ratio.
    pub fn apply_preset(&mut self, canvas: (u32, u32), width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        if canvas.0 > 0 {
            self.scale = width as f64 / canvas.0 as f64;
        }
    }

    /// Rough output size in bytes, shown before exporting.
    pub fn estimate_size(&self) -> u64 {
        self.width as u64 * self.height as u64 * self.format.bytes_per_pixel()
    }

    /// File name with the format extension.
    pub fn output_file_name(&self) -> String {
        let stem = self.file_name.trim();
        let stem = if stem.is_empty() { DEFAULT_FILE_NAME } else { stem };
        format!("{}.{}", stem, self.format.extension())
    }
}

fn scaled(size: u32, scale: f64) -> u32 {
    ((size as f64 * scale).round() as u32).max(1)
}

/// Human-readable byte count: `B`, `KB` or `MB` with one decimal.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

/// Cut the canvas region out of a window capture. The region is clipped to
/// the capture.
pub fn crop(capture: &RgbaImage, x: u32, y: u32, width: u32, height: u32) -> RgbaImage {
    imageops::crop_imm(capture, x, y, width, height).to_image()
}

/// Composite `image` over an opaque background colour.
pub fn flatten(image: &RgbaImage, background: [u8; 4]) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let alpha = a as u32;
        let blend = |fg: u8, bg: u8| ((fg as u32 * alpha + bg as u32 * (255 - alpha) + 127) / 255) as u8;
        Rgb([blend(r, background[0]), blend(g, background[1]), blend(b, background[2])])
    })
}

/// Scale the canvas pixels to the requested size and encode them.
pub fn encode(canvas: &RgbaImage, options: &ExportOptions) -> Result<Vec<u8>, ExportError> {
    if canvas.width() == 0 || canvas.height() == 0 {
        return Err(ExportError::EmptyImage);
    }
    let (width, height) = (options.width.max(1), options.height.max(1));
    let resized = if (width, height) == canvas.dimensions() {
        canvas.clone()
    } else {
        imageops::resize(canvas, width, height, FilterType::Lanczos3)
    };

    let background = parse_color_or(&options.background_color, WHITE);
    let keep_alpha = options.format.supports_transparency() && options.include_transparency;

    let mut bytes = Vec::new();
    if keep_alpha {
        write_rgba(&mut bytes, options, &resized)?;
    } else {
        let flat = flatten(&resized, background);
        write_rgb(&mut bytes, options, &flat)?;
    }
    log::info!(
        "Encoded {}x{} {} ({})",
        width,
        height,
        options.format.label(),
        format_size(bytes.len() as u64)
    );
    Ok(bytes)
}

fn write_rgba(out: &mut Vec<u8>, options: &ExportOptions, image: &RgbaImage) -> Result<(), ExportError> {
    let (w, h) = image.dimensions();
    match options.format {
        ExportFormat::Png => PngEncoder::new(out).write_image(image.as_raw(), w, h, ExtendedColorType::Rgba8)?,
        ExportFormat::WebP => {
            WebPEncoder::new_lossless(out).write_image(image.as_raw(), w, h, ExtendedColorType::Rgba8)?
        }
        ExportFormat::Jpeg => {
            let flat = flatten(image, WHITE);
            return write_rgb(out, options, &flat);
        }
    }
    Ok(())
}

fn write_rgb(out: &mut Vec<u8>, options: &ExportOptions, image: &RgbImage) -> Result<(), ExportError> {
    let (w, h) = image.dimensions();
    match options.format {
        ExportFormat::Png => PngEncoder::new(out).write_image(image.as_raw(), w, h, ExtendedColorType::Rgb8)?,
        ExportFormat::WebP => {
            WebPEncoder::new_lossless(out).write_image(image.as_raw(), w, h, ExtendedColorType::Rgb8)?
        }
        ExportFormat::Jpeg => {
            let quality = options.quality.clamp(1, 100);
            JpegEncoder::new_with_quality(out, quality).write_image(image.as_raw(), w, h, ExtendedColorType::Rgb8)?
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn canvas(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 255]))
    }

    fn decoded_size(bytes: &[u8]) -> (u32, u32) {
        let image = image::load_from_memory(bytes).unwrap();
        (image.width(), image.height())
    }

    #[test]
    fn test_scale_keeps_aspect() {
        let mut options = ExportOptions::for_canvas(800, 600);
        options.set_scale((800, 600), 0.5);
        assert_eq!((options.width, options.height), (400, 300));

        options.set_width((800, 600), 1600);
        assert_eq!((options.width, options.height), (1600, 1200));
        assert_eq!(options.scale, 2.0);

        options.set_height((800, 600), 0);
        assert_eq!(options.height, 1200);
    }

    #[test]
    fn test_estimate_and_format_size() {
        let mut options = ExportOptions::for_canvas(800, 600);
        assert_eq!(options.estimate_size(), 800 * 600 * 4);
        options.format = ExportFormat::Jpeg;
        assert_eq!(options.estimate_size(), 800 * 600 * 3);
        assert_eq!(format_size(options.estimate_size()), "1.4 MB");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
    }

    #[test]
    fn test_encode_respects_target_size() {
        let source = canvas(80, 60);
        for format in ExportFormat::ALL {
            let mut options = ExportOptions::for_canvas(80, 60);
            options.format = format;
            options.set_scale((80, 60), 0.5);
            let bytes = encode(&source, &options).unwrap();
            assert_eq!(decoded_size(&bytes), (40, 30), "{format:?}");
        }
    }

    #[test]
    fn test_jpeg_is_flattened_onto_background() {
        let source = RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 0]));
        let mut options = ExportOptions::for_canvas(16, 16);
        options.format = ExportFormat::Jpeg;
        options.quality = 100;
        options.background_color = "#00ff00".to_string();

        let bytes = encode(&source, &options).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        let Rgb([r, g, b]) = *decoded.get_pixel(8, 8);
        assert!(r < 10 && g > 245 && b < 10, "got {r},{g},{b}");
    }

    #[test]
    fn test_flatten_blends_alpha() {
        let image = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 128]));
        let flat = flatten(&image, [0, 0, 0, 255]);
        assert_eq!(flat.get_pixel(0, 0).0, [128, 128, 128]);
    }

    #[test]
    fn test_crop_and_empty_capture() {
        let capture = canvas(100, 100);
        assert_eq!(crop(&capture, 10, 20, 30, 40).dimensions(), (30, 40));
        assert_eq!(crop(&capture, 90, 90, 30, 40).dimensions(), (10, 10));

        let options = ExportOptions::for_canvas(1, 1);
        assert!(matches!(encode(&RgbaImage::new(0, 0), &options), Err(ExportError::EmptyImage)));
    }

    #[test]
    fn test_output_file_name() {
        let mut options = ExportOptions::for_canvas(10, 10);
        assert_eq!(options.output_file_name(), "my-meme.png");
        options.format = ExportFormat::WebP;
        options.file_name = "  ".to_string();
        assert_eq!(options.output_file_name(), "my-meme.webp");
    }
}
