// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Template upload validation.
//!
//! Checks an uploaded template image before anything is written: the
//! content type must be an allowed image type, the payload must be
//! non-empty and at most 10 MB.

use super::storage::{StorageError, StorageResult};
use image::{ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;

/// Largest accepted upload, in bytes.
pub const MAX_TEMPLATE_BYTES: usize = 10 * 1024 * 1024;

pub const ALLOWED_MIME_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// Size recorded when the image header cannot be read.
pub const FALLBACK_TEMPLATE_SIZE: (u32, u32) = (800, 600);

/// A validated upload, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUpload {
    pub name: String,
    pub mime_type: &'static str,
    /// File extension for the stored image, without the dot.
    pub extension: &'static str,
    pub width: u32,
    pub height: u32,
}

/// Sniff the image format from the bytes, falling back to the file name.
pub fn detect_format(bytes: &[u8], file_name: &str) -> Option<ImageFormat> {
    image::guess_format(bytes)
        .ok()
        .or_else(|| ImageFormat::from_path(Path::new(file_name)).ok())
}

/// Decoded size of the image header, if readable.
pub fn sniff_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

/// Validate an upload. Explicit `width`/`height` override the decoded size.
pub fn validate_upload(
    bytes: &[u8],
    file_name: &str,
    name: &str,
    width: Option<u32>,
    height: Option<u32>,
) -> StorageResult<ValidatedUpload> {
    if bytes.is_empty() {
        return Err(StorageError::Validation("no file uploaded".to_string()));
    }
    if bytes.len() > MAX_TEMPLATE_BYTES {
        return Err(StorageError::Validation(format!(
            "file is {} bytes, the limit is {} bytes",
            bytes.len(),
            MAX_TEMPLATE_BYTES
        )));
    }

    let format = detect_format(bytes, file_name)
        .ok_or_else(|| StorageError::Validation(format!("unrecognised file type: {file_name}")))?;
    let mime_type = format.to_mime_type();
    if !ALLOWED_MIME_TYPES.contains(&mime_type) {
        return Err(StorageError::Validation(format!(
            "invalid file type {mime_type}, only images are allowed"
        )));
    }
    let extension = format.extensions_str().first().copied().unwrap_or("img");

    let name = name.trim();
    let name = if name.is_empty() { file_name.to_string() } else { name.to_string() };

    let (detected_width, detected_height) = sniff_dimensions(bytes).unwrap_or(FALLBACK_TEMPLATE_SIZE);
    Ok(ValidatedUpload {
        name,
        mime_type,
        extension,
        width: width.filter(|w| *w > 0).unwrap_or(detected_width),
        height: height.filter(|h| *h > 0).unwrap_or(detected_height),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{DynamicImage, RgbaImage};

    /// Encode a blank image of the given size.
    pub(crate) fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let image = DynamicImage::ImageRgba8(RgbaImage::new(width, height));
        let mut bytes = Cursor::new(Vec::new());
        let image = if format == ImageFormat::Jpeg {
            DynamicImage::ImageRgb8(image.to_rgb8())
        } else {
            image
        };
        image.write_to(&mut bytes, format).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_png_upload_reads_dimensions() {
        let bytes = encoded_image(64, 48, ImageFormat::Png);
        let upload = validate_upload(&bytes, "drake.png", "Drake", None, None).unwrap();
        assert_eq!(upload.mime_type, "image/png");
        assert_eq!(upload.extension, "png");
        assert_eq!((upload.width, upload.height), (64, 48));
        assert_eq!(upload.name, "Drake");
    }

    #[test]
    fn test_blank_name_defaults_to_file_name() {
        let bytes = encoded_image(8, 8, ImageFormat::Jpeg);
        let upload = validate_upload(&bytes, "cat.jpeg", "  ", Some(500), None).unwrap();
        assert_eq!(upload.name, "cat.jpeg");
        assert_eq!(upload.mime_type, "image/jpeg");
        assert_eq!((upload.width, upload.height), (500, 8));
    }

    #[test]
    fn test_rejects_empty_and_oversized() {
        assert!(matches!(
            validate_upload(&[], "a.png", "a", None, None),
            Err(StorageError::Validation(_))
        ));
        let huge = vec![0u8; MAX_TEMPLATE_BYTES + 1];
        assert!(matches!(
            validate_upload(&huge, "a.png", "a", None, None),
            Err(StorageError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_non_image_content() {
        let pdf = b"%PDF-1.7 not an image".to_vec();
        assert!(matches!(
            validate_upload(&pdf, "notes.pdf", "notes", None, None),
            Err(StorageError::Validation(_))
        ));
        let bmp = encoded_image(4, 4, ImageFormat::Bmp);
        assert!(matches!(
            validate_upload(&bmp, "pic.bmp", "pic", None, None),
            Err(StorageError::Validation(_))
        ));
    }

    #[test]
    fn test_extension_fallback_with_unreadable_header() {
        // Unrecognised bytes under an allowed extension still pass; the
        // size falls back to the default.
        let bytes = b"not really a gif".to_vec();
        let upload = validate_upload(&bytes, "wave.gif", "", None, None).unwrap();
        assert_eq!(upload.mime_type, "image/gif");
        assert_eq!((upload.width, upload.height), FALLBACK_TEMPLATE_SIZE);
    }
}
