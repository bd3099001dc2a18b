// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project file import and export.
//!
//! Projects are written as YAML or JSON. The format follows the file
//! extension; anything other than `.yaml`/`.yml` is treated as JSON.

use crate::models::project::MemeProject;
use anyhow::{Context, Result};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectFormat {
    Yaml,
    Json,
}

impl ProjectFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                ProjectFormat::Yaml
            }
            _ => ProjectFormat::Json,
        }
    }
}

/// Export a project to YAML format.
pub fn export_yaml(project: &MemeProject, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(project)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

/// Export a project to JSON format.
pub fn export_json(project: &MemeProject, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(project)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Import a project from YAML format.
pub fn import_yaml(path: &Path) -> Result<MemeProject> {
    let yaml = std::fs::read_to_string(path)?;
    let project = serde_yaml::from_str(&yaml)?;
    Ok(project)
}

/// Import a project from JSON format.
pub fn import_json(path: &Path) -> Result<MemeProject> {
    let json = std::fs::read_to_string(path)?;
    let project = serde_json::from_str(&json)?;
    Ok(project)
}

/// Export using the format implied by the file extension.
pub fn export_project(project: &MemeProject, path: &Path) -> Result<()> {
    match ProjectFormat::from_path(path) {
        ProjectFormat::Yaml => export_yaml(project, path),
        ProjectFormat::Json => export_json(project, path),
    }
    .with_context(|| format!("Failed to export project to {}", path.display()))
}

/// Import using the format implied by the file extension.
pub fn import_project(path: &Path) -> Result<MemeProject> {
    match ProjectFormat::from_path(path) {
        ProjectFormat::Yaml => import_yaml(path),
        ProjectFormat::Json => import_json(path),
    }
    .with_context(|| format!("Failed to import project from {}", path.display()))
}
