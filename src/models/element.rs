// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Canvas element data structures.
//!
//! An element is one placed object on the canvas. Its geometry is shared by
//! all kinds; the kind-specific payload lives in [`ElementKind`].

use super::uuid_id;
use crate::util::geometry::{clamp_rect, Bounds, Rect};
use serde::{Deserialize, Serialize};

uuid_id!(
    /// Unique, immutable identifier of a canvas element.
    ElementId
);

pub const DEFAULT_FONT_SIZE: f64 = 32.0;
pub const DEFAULT_FONT_FAMILY: &str = "Arial";
pub const DEFAULT_TEXT: &str = "Your text here";
pub const DEFAULT_SHAPE_FILL: &str = "#1976d2";

/// Where new elements land.
pub const DEFAULT_ORIGIN: (f64, f64) = (50.0, 50.0);
pub const DEFAULT_TEXT_SIZE: (f64, f64) = (200.0, 50.0);
pub const DEFAULT_IMAGE_SIZE: (f64, f64) = (200.0, 200.0);
pub const DEFAULT_SHAPE_SIZE: (f64, f64) = (100.0, 100.0);

/// Offset applied to duplicated elements.
pub const DUPLICATE_OFFSET: f64 = 20.0;

/// Element type, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Text,
    Image,
    Shape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Normal,
    #[default]
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// Text content and style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextData {
    pub text: String,
    pub font_size: f64,
    pub font_family: String,
    pub color: String,
    pub background_color: String,
    pub border_color: String,
    pub border_width: f64,
    pub text_align: TextAlign,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
}

impl Default for TextData {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEXT.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            color: "#000000".to_string(),
            background_color: "transparent".to_string(),
            border_color: "#000000".to_string(),
            border_width: 0.0,
            text_align: TextAlign::default(),
            font_weight: FontWeight::default(),
            font_style: FontStyle::default(),
        }
    }
}

/// Image source reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_height: Option<u32>,
    #[serde(default = "default_true")]
    pub resizable: bool,
    #[serde(default)]
    pub is_background: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Circle,
    #[default]
    Square,
    Star,
    Heart,
    Arrow,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 5] = [
        ShapeKind::Circle,
        ShapeKind::Square,
        ShapeKind::Star,
        ShapeKind::Heart,
        ShapeKind::Arrow,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ShapeKind::Circle => "circle",
            ShapeKind::Square => "square",
            ShapeKind::Star => "star",
            ShapeKind::Heart => "heart",
            ShapeKind::Arrow => "arrow",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeData {
    pub shape: ShapeKind,
    pub fill: String,
    pub border_color: String,
    pub border_width: f64,
}

impl Default for ShapeData {
    fn default() -> Self {
        Self {
            shape: ShapeKind::default(),
            fill: DEFAULT_SHAPE_FILL.to_string(),
            border_color: "#000000".to_string(),
            border_width: 0.0,
        }
    }
}

/// Kind-specific payload of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Text(TextData),
    Image(ImageData),
    Shape(ShapeData),
}

/// One placed object on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasElement {
    pub id: ElementId,
    pub kind: ElementKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Degrees about the centre; rendering only.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_opacity() -> f64 {
    1.0
}

impl CanvasElement {
    /// Create an element with a fresh id at `rect`.
    pub fn new(kind: ElementKind, rect: Rect) -> Self {
        Self {
            id: ElementId::new(),
            kind,
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            rotation: 0.0,
            opacity: 1.0,
            visible: true,
            locked: false,
            name: None,
        }
    }

    /// Default text element at `(50, 50, 200, 50)`.
    pub fn text() -> Self {
        let (x, y) = DEFAULT_ORIGIN;
        let (w, h) = DEFAULT_TEXT_SIZE;
        Self::new(ElementKind::Text(TextData::default()), Rect::new(x, y, w, h))
    }

    /// Image element at the default origin. Unknown natural sizes fall back
    /// to 200×200.
    pub fn image(src: impl Into<String>, natural_size: Option<(u32, u32)>) -> Self {
        let (x, y) = DEFAULT_ORIGIN;
        let (w, h) = natural_size
            .map(|(w, h)| (w as f64, h as f64))
            .unwrap_or(DEFAULT_IMAGE_SIZE);
        let data = ImageData {
            src: src.into(),
            original_width: natural_size.map(|(w, _)| w),
            original_height: natural_size.map(|(_, h)| h),
            resizable: true,
            is_background: false,
        };
        Self::new(ElementKind::Image(data), Rect::new(x, y, w, h))
    }

    /// Default shape element at `(50, 50, 100, 100)`.
    pub fn shape(shape: ShapeKind) -> Self {
        let (x, y) = DEFAULT_ORIGIN;
        let (w, h) = DEFAULT_SHAPE_SIZE;
        let data = ShapeData { shape, ..ShapeData::default() };
        Self::new(ElementKind::Shape(data), Rect::new(x, y, w, h))
    }

    pub fn element_type(&self) -> ElementType {
        match self.kind {
            ElementKind::Text(_) => ElementType::Text,
            ElementKind::Image(_) => ElementType::Image,
            ElementKind::Shape(_) => ElementType::Shape,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.x = rect.x;
        self.y = rect.y;
        self.width = rect.width;
        self.height = rect.height;
    }

    /// Images can opt out of resizing; everything else resizes.
    pub fn is_resizable(&self) -> bool {
        match &self.kind {
            ElementKind::Image(image) => image.resizable,
            _ => true,
        }
    }

    /// Whether pointer gestures may move or resize this element.
    pub fn is_interactive(&self) -> bool {
        self.visible && !self.locked
    }

    /// Name shown in the layers panel.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        match &self.kind {
            ElementKind::Text(text) if !text.text.is_empty() => {
                let preview: String = text.text.chars().take(20).collect();
                format!("\"{preview}...\"")
            }
            ElementKind::Text(_) => "Text".to_string(),
            ElementKind::Image(_) => "Image".to_string(),
            ElementKind::Shape(shape) => format!("{} Shape", shape.shape.label()),
        }
    }

    /// Clamp geometry onto a canvas of `bounds` and opacity into `[0, 1]`.
    /// Returns whether anything changed.
    pub fn normalize(&mut self, bounds: Bounds) -> bool {
        let rect = clamp_rect(self.rect(), bounds);
        let opacity = if self.opacity.is_finite() { self.opacity.clamp(0.0, 1.0) } else { 1.0 };
        let changed = rect != self.rect() || opacity != self.opacity;
        self.set_rect(rect);
        self.opacity = opacity;
        changed
    }

    /// Copy with a new id, shifted by [`DUPLICATE_OFFSET`] on both axes.
    pub fn duplicate(&self) -> Self {
        Self {
            id: ElementId::new(),
            x: self.x + DUPLICATE_OFFSET,
            y: self.y + DUPLICATE_OFFSET,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_text_geometry() {
        let element = CanvasElement::text();
        assert_eq!(element.rect(), Rect::new(50.0, 50.0, 200.0, 50.0));
        assert_eq!(element.element_type(), ElementType::Text);
        assert!(element.visible);
        assert!(!element.locked);
    }

    #[test]
    fn test_image_without_natural_size() {
        let element = CanvasElement::image("cat.png", None);
        assert_eq!(element.rect(), Rect::new(50.0, 50.0, 200.0, 200.0));
        assert!(element.is_resizable());
    }

    #[test]
    fn test_display_names() {
        let mut text = CanvasElement::text();
        assert_eq!(text.display_name(), "\"Your text here...\"");
        text.name = Some("Caption".to_string());
        assert_eq!(text.display_name(), "Caption");

        let shape = CanvasElement::shape(ShapeKind::Star);
        assert_eq!(shape.display_name(), "star Shape");
        assert_eq!(CanvasElement::image("a.png", None).display_name(), "Image");
    }

    #[test]
    fn test_duplicate_offsets_and_keeps_payload() {
        let original = CanvasElement::shape(ShapeKind::Heart);
        let copy = original.duplicate();
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.x, original.x + 20.0);
        assert_eq!(copy.y, original.y + 20.0);
        assert_eq!(copy.kind, original.kind);
        assert_eq!(copy.element_type(), original.element_type());
    }

    #[test]
    fn test_json_shape_and_missing_flags() {
        let element = CanvasElement::text();
        let json = serde_json::to_value(&element).unwrap();
        assert_eq!(json["kind"]["type"], "text");
        assert_eq!(json["kind"]["font_weight"], "bold");

        let legacy = serde_json::json!({
            "id": element.id,
            "kind": { "type": "shape", "shape": "circle" },
            "x": 1.0, "y": 2.0, "width": 30.0, "height": 40.0
        });
        let parsed: CanvasElement = serde_json::from_value(legacy).unwrap();
        assert!(parsed.visible);
        assert!(!parsed.locked);
        assert_eq!(parsed.opacity, 1.0);
        match parsed.kind {
            ElementKind::Shape(shape) => {
                assert_eq!(shape.shape, ShapeKind::Circle);
                assert_eq!(shape.fill, DEFAULT_SHAPE_FILL);
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }
}
