// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Meme templates.
//!
//! A template is a background image plus preset text boxes. Instantiating
//! it yields the element list a fresh project starts from.

use super::element::{CanvasElement, ElementKind, ImageData, TextData};
use super::uuid_id;
use crate::util::geometry::Rect;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

uuid_id!(
    /// Identifier of a template; also the stem of its files on disk.
    TemplateId
);

/// Preset text element carried by a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    pub content: TextData,
}

fn default_opacity() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemeTemplate {
    pub id: TemplateId,
    pub name: String,
    /// Path of the stored template image. Empty for templates saved from a
    /// project without an image.
    #[serde(default)]
    pub image_url: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub text_boxes: Vec<TextBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MemeTemplate {
    pub fn new(name: impl Into<String>, image_url: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: TemplateId::new(),
            name: name.into(),
            image_url: image_url.into(),
            width,
            height,
            text_boxes: Vec::new(),
            category: None,
            created_at: Utc::now(),
        }
    }

    /// Build the element list for a project started from this template:
    /// a full-canvas background image followed by one text element per box.
    pub fn instantiate(&self) -> Vec<CanvasElement> {
        let mut elements = Vec::with_capacity(self.text_boxes.len() + 1);

        if !self.image_url.is_empty() {
            let background = ImageData {
                src: self.image_url.clone(),
                original_width: Some(self.width),
                original_height: Some(self.height),
                resizable: true,
                is_background: true,
            };
            elements.push(CanvasElement::new(
                ElementKind::Image(background),
                Rect::new(0.0, 0.0, self.width as f64, self.height as f64),
            ));
        }

        for text_box in &self.text_boxes {
            let mut element = CanvasElement::new(
                ElementKind::Text(text_box.content.clone()),
                Rect::new(text_box.x, text_box.y, text_box.width, text_box.height),
            );
            element.rotation = text_box.rotation;
            element.opacity = text_box.opacity;
            elements.push(element);
        }

        elements
    }

    /// Capture the text elements of a project as text box presets.
    pub fn text_boxes_from(elements: &[CanvasElement]) -> Vec<TextBox> {
        elements
            .iter()
            .filter_map(|element| match &element.kind {
                ElementKind::Text(content) => Some(TextBox {
                    x: element.x,
                    y: element.y,
                    width: element.width,
                    height: element.height,
                    rotation: element.rotation,
                    opacity: element.opacity,
                    content: content.clone(),
                }),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::element::{ElementType, ShapeKind};

    fn caption(y: f64, text: &str) -> TextBox {
        TextBox {
            x: 10.0,
            y,
            width: 480.0,
            height: 60.0,
            rotation: 0.0,
            opacity: 1.0,
            content: TextData { text: text.to_string(), ..TextData::default() },
        }
    }

    #[test]
    fn test_instantiate_background_then_text() {
        let mut template = MemeTemplate::new("Drake", "templates/drake.png", 500, 500);
        template.text_boxes = vec![caption(10.0, "top"), caption(400.0, "bottom")];

        let elements = template.instantiate();
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[0].element_type(), ElementType::Image);
        assert_eq!(elements[0].rect(), Rect::new(0.0, 0.0, 500.0, 500.0));
        match &elements[0].kind {
            ElementKind::Image(image) => assert!(image.is_background),
            other => panic!("unexpected kind {other:?}"),
        }
        assert_eq!(elements[2].y, 400.0);
    }

    #[test]
    fn test_text_boxes_from_skips_other_kinds() {
        let elements = vec![
            CanvasElement::shape(ShapeKind::Circle),
            CanvasElement::text(),
        ];
        let boxes = MemeTemplate::text_boxes_from(&elements);
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].width, 200.0);
    }
}
