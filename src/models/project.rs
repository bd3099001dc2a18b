// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project state management.
//!
//! A project is the aggregate root of the editor: canvas settings, the
//! ordered element list (back-to-front paint order) and the group overlay.

use super::element::{CanvasElement, ElementId};
use super::group::{GroupId, LayerGroup};
use super::template::MemeTemplate;
use super::uuid_id;
use crate::util::geometry::Bounds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

uuid_id!(
    /// Identifier of a saved project.
    ProjectId
);

pub const MIN_CANVAS_SIZE: u32 = 100;
pub const MAX_CANVAS_SIZE: u32 = 5000;

/// Canvas dimensions and background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasSettings {
    pub width: u32,
    pub height: u32,
    pub background_color: String,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            background_color: "#ffffff".to_string(),
        }
    }
}

impl CanvasSettings {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.width as f64, self.height as f64)
    }

    /// Clamp a requested canvas size into the supported range.
    pub fn clamp_size(width: u32, height: u32) -> (u32, u32) {
        (
            width.clamp(MIN_CANVAS_SIZE, MAX_CANVAS_SIZE),
            height.clamp(MIN_CANVAS_SIZE, MAX_CANVAS_SIZE),
        )
    }
}

/// Canvas size preset for common social media formats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRatio {
    pub name: &'static str,
    /// Width over height; 0 for the free-form preset.
    pub ratio: f64,
    pub width: u32,
    pub height: u32,
}

pub const CROP_RATIOS: [CropRatio; 10] = [
    CropRatio { name: "Custom", ratio: 0.0, width: 800, height: 600 },
    CropRatio { name: "Square (1:1)", ratio: 1.0, width: 800, height: 800 },
    CropRatio { name: "Facebook Post (1.91:1)", ratio: 1.91, width: 1200, height: 628 },
    CropRatio { name: "Instagram Post (1:1)", ratio: 1.0, width: 1080, height: 1080 },
    CropRatio { name: "Instagram Story (9:16)", ratio: 0.5625, width: 1080, height: 1920 },
    CropRatio { name: "Twitter Post (16:9)", ratio: 1.78, width: 1200, height: 675 },
    CropRatio { name: "LinkedIn Post (1.91:1)", ratio: 1.91, width: 1200, height: 628 },
    CropRatio { name: "YouTube Thumbnail (16:9)", ratio: 1.78, width: 1280, height: 720 },
    CropRatio { name: "Pinterest Pin (2:3)", ratio: 0.67, width: 1000, height: 1500 },
    CropRatio { name: "TikTok Video (9:16)", ratio: 0.5625, width: 1080, height: 1920 },
];

/// Broken relation between groups and elements.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    #[error("element {0} appears more than once in the element list")]
    DuplicateElement(ElementId),
    #[error("group {group} references missing element {element}")]
    StaleReference { group: GroupId, element: ElementId },
    #[error("element {0} is a member of more than one group")]
    MultipleGroups(ElementId),
}

/// Complete project data for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemeProject {
    pub id: ProjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<MemeTemplate>,
    pub canvas: CanvasSettings,
    pub elements: Vec<CanvasElement>,
    #[serde(default)]
    pub groups: Vec<LayerGroup>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for MemeProject {
    fn default() -> Self {
        Self::new(CanvasSettings::default())
    }
}

impl MemeProject {
    /// Create an empty project on the given canvas.
    pub fn new(canvas: CanvasSettings) -> Self {
        let now = Utc::now();
        Self {
            id: ProjectId::new(),
            name: format!("Untitled Project {}", now.timestamp_millis()),
            template: None,
            canvas,
            elements: Vec::new(),
            groups: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Stamp the modification time.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn bounds(&self) -> Bounds {
        self.canvas.bounds()
    }

    pub fn index_of(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    pub fn element(&self, id: ElementId) -> Option<&CanvasElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut CanvasElement> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    pub fn group(&self, id: GroupId) -> Option<&LayerGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut LayerGroup> {
        self.groups.iter_mut().find(|g| g.id == id)
    }

    /// The group holding `element`, if any.
    pub fn group_of(&self, element: ElementId) -> Option<GroupId> {
        self.groups.iter().find(|g| g.contains(element)).map(|g| g.id)
    }

    /// Element ids in paint order that belong to no group.
    pub fn ungrouped(&self) -> Vec<ElementId> {
        let grouped: HashSet<ElementId> = self
            .groups
            .iter()
            .flat_map(|g| g.elements.iter().copied())
            .collect();
        self.elements
            .iter()
            .map(|e| e.id)
            .filter(|id| !grouped.contains(id))
            .collect()
    }

    /// Verify that groups and the ungrouped list partition the elements.
    pub fn check_integrity(&self) -> Result<(), IntegrityError> {
        let mut ids = HashSet::new();
        for element in &self.elements {
            if !ids.insert(element.id) {
                return Err(IntegrityError::DuplicateElement(element.id));
            }
        }

        let mut grouped = HashSet::new();
        for group in &self.groups {
            for &member in &group.elements {
                if !ids.contains(&member) {
                    return Err(IntegrityError::StaleReference { group: group.id, element: member });
                }
                if !grouped.insert(member) {
                    return Err(IntegrityError::MultipleGroups(member));
                }
            }
        }
        Ok(())
    }

    /// Pull the canvas size into the supported range and every element back
    /// onto the canvas. Returns the number of values changed.
    pub fn normalize_geometry(&mut self) -> usize {
        let mut repairs = 0;
        let (width, height) = CanvasSettings::clamp_size(self.canvas.width, self.canvas.height);
        if (width, height) != (self.canvas.width, self.canvas.height) {
            self.canvas.width = width;
            self.canvas.height = height;
            repairs += 1;
        }
        let bounds = self.bounds();
        for element in &mut self.elements {
            if element.normalize(bounds) {
                repairs += 1;
            }
        }
        repairs
    }

    /// Repair a project loaded from storage: drop duplicate elements,
    /// stale group references and second memberships. Returns the number
    /// of repairs made.
    pub fn sanitize(&mut self) -> usize {
        let mut repairs = 0;

        let mut ids = HashSet::new();
        let before = self.elements.len();
        self.elements.retain(|e| ids.insert(e.id));
        repairs += before - self.elements.len();

        let mut grouped = HashSet::new();
        for group in &mut self.groups {
            let before = group.elements.len();
            group
                .elements
                .retain(|member| ids.contains(member) && grouped.insert(*member));
            repairs += before - group.elements.len();
        }

        repairs += self.normalize_geometry();

        if repairs > 0 {
            log::warn!("Repaired {} inconsistencies in project {}", repairs, self.id);
        }
        repairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::geometry::Rect;

    #[test]
    fn test_new_project_defaults() {
        let project = MemeProject::default();
        assert_eq!(project.canvas.width, 800);
        assert_eq!(project.canvas.height, 600);
        assert_eq!(project.canvas.background_color, "#ffffff");
        assert!(project.elements.is_empty());
        assert!(project.name.starts_with("Untitled Project "));
        assert!(project.check_integrity().is_ok());
    }

    #[test]
    fn test_canvas_size_clamp() {
        assert_eq!(CanvasSettings::clamp_size(10, 9000), (100, 5000));
        assert_eq!(CanvasSettings::clamp_size(640, 480), (640, 480));
    }

    #[test]
    fn test_integrity_detects_stale_and_double_membership() {
        let mut project = MemeProject::default();
        let a = CanvasElement::text();
        let a_id = a.id;
        project.elements.push(a);

        project.groups.push(LayerGroup::new("one", vec![a_id]));
        project.groups.push(LayerGroup::new("two", vec![a_id]));
        assert_eq!(project.check_integrity(), Err(IntegrityError::MultipleGroups(a_id)));

        let ghost = ElementId::new();
        project.groups[1].elements = vec![ghost];
        assert!(matches!(
            project.check_integrity(),
            Err(IntegrityError::StaleReference { element, .. }) if element == ghost
        ));
    }

    #[test]
    fn test_sanitize_repairs_loaded_project() {
        let mut project = MemeProject::default();
        let a = CanvasElement::text();
        let a_id = a.id;
        project.elements.push(a.clone());
        project.elements.push(a);
        project.groups.push(LayerGroup::new("one", vec![a_id, ElementId::new()]));
        project.groups.push(LayerGroup::new("two", vec![a_id]));

        assert_eq!(project.sanitize(), 3);
        assert!(project.check_integrity().is_ok());
        assert_eq!(project.elements.len(), 1);
        assert_eq!(project.group_of(a_id), Some(project.groups[0].id));
        assert!(project.ungrouped().is_empty());
    }

    #[test]
    fn test_normalize_geometry_clamps_canvas_and_elements() {
        let mut project = MemeProject::default();
        project.canvas.width = 20;
        project.canvas.height = 9000;
        let mut element = CanvasElement::text();
        element.x = 5000.0;
        element.y = -300.0;
        element.width = 2.0;
        element.opacity = 7.0;
        project.elements.push(element);

        assert_eq!(project.normalize_geometry(), 2);
        assert_eq!((project.canvas.width, project.canvas.height), (100, 5000));
        let element = &project.elements[0];
        assert_eq!(element.rect(), Rect::new(80.0, 0.0, 20.0, 50.0));
        assert_eq!(element.opacity, 1.0);
        assert_eq!(project.normalize_geometry(), 0);
    }
}
