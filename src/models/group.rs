// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Layer groups.
//!
//! A group is a named overlay over element ids, not a container: it never
//! owns elements, and deleting a group leaves its elements in place.

use super::element::ElementId;
use super::uuid_id;
use serde::{Deserialize, Serialize};

uuid_id!(
    /// Identifier of a layer group.
    GroupId
);

pub const DEFAULT_GROUP_NAME: &str = "New Group";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerGroup {
    pub id: GroupId,
    pub name: String,
    /// Layers panel state only.
    #[serde(default = "default_expanded")]
    pub expanded: bool,
    pub elements: Vec<ElementId>,
}

fn default_expanded() -> bool {
    true
}

impl LayerGroup {
    pub fn new(name: impl Into<String>, elements: Vec<ElementId>) -> Self {
        let name = name.into();
        Self {
            id: GroupId::new(),
            name: if name.trim().is_empty() { DEFAULT_GROUP_NAME.to_string() } else { name },
            expanded: true,
            elements,
        }
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains(&id)
    }

    /// Drop `id` from the membership list. Returns whether it was present.
    pub fn remove(&mut self, id: ElementId) -> bool {
        let before = self.elements.len();
        self.elements.retain(|member| *member != id);
        self.elements.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_name_gets_default() {
        let group = LayerGroup::new("  ", Vec::new());
        assert_eq!(group.name, DEFAULT_GROUP_NAME);
        assert!(group.expanded);
    }

    #[test]
    fn test_remove_member() {
        let a = ElementId::new();
        let b = ElementId::new();
        let mut group = LayerGroup::new("Top", vec![a, b]);
        assert!(group.remove(a));
        assert!(!group.remove(a));
        assert_eq!(group.elements, vec![b]);
    }
}
