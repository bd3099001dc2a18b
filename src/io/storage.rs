// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project and template persistence.
//!
//! [`Storage`] is the capability the application saves through;
//! [`FileStorage`] implements it over a data directory:
//!
//! ```text
//! <data_dir>/
//!   meme_projects.json     saved projects (JSON array)
//!   currentProject.json    autosave slot
//!   templates/
//!     <id>.<ext>           template image
//!     <id>.json            template metadata
//! ```

use super::templates::validate_upload;
use crate::models::project::{MemeProject, ProjectId};
use crate::models::template::{MemeTemplate, TemplateId};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const PROJECTS_FILE: &str = "meme_projects.json";
pub const CURRENT_PROJECT_FILE: &str = "currentProject.json";
pub const TEMPLATES_DIR: &str = "templates";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid upload: {0}")]
    Validation(String),

    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed stored data: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

pub trait Storage {
    fn list_projects(&self) -> StorageResult<Vec<MemeProject>>;

    /// Insert or replace by id. Returns the stored copy, stamped with the
    /// save time.
    fn save_project(&self, project: &MemeProject) -> StorageResult<MemeProject>;

    /// Returns whether a project was removed.
    fn delete_project(&self, id: ProjectId) -> StorageResult<bool>;

    fn list_templates(&self) -> StorageResult<Vec<MemeTemplate>>;

    /// Write template metadata. The image it points at must already exist.
    fn save_template(&self, template: &MemeTemplate) -> StorageResult<()>;

    /// Validate and store an uploaded template image with its metadata.
    fn upload_template(
        &self,
        bytes: &[u8],
        file_name: &str,
        name: &str,
        width: Option<u32>,
        height: Option<u32>,
    ) -> StorageResult<MemeTemplate>;

    /// Remove every stored file belonging to the template. Returns the
    /// number of files removed.
    fn delete_template(&self, id: TemplateId) -> StorageResult<usize>;

    /// Read the autosave slot. `Ok(None)` when nothing has been saved.
    fn load_current(&self) -> StorageResult<Option<MemeProject>>;

    fn save_current(&self, project: &MemeProject) -> StorageResult<()>;
}

/// Restore the autosaved project, falling back to a fresh one when there is
/// none or it cannot be read.
pub fn restore_current(storage: &dyn Storage) -> Option<MemeProject> {
    match storage.load_current() {
        Ok(project) => project,
        Err(e) => {
            log::warn!("Ignoring unreadable autosave: {}", e);
            None
        }
    }
}

/// [`Storage`] over a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn projects_path(&self) -> PathBuf {
        self.root.join(PROJECTS_FILE)
    }

    fn current_path(&self) -> PathBuf {
        self.root.join(CURRENT_PROJECT_FILE)
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.root.join(TEMPLATES_DIR)
    }

    fn sidecar_path(&self, id: TemplateId) -> PathBuf {
        self.templates_dir().join(format!("{id}.json"))
    }

    fn write_projects(&self, projects: &[MemeProject]) -> StorageResult<()> {
        fs::create_dir_all(&self.root)?;
        let json = serde_json::to_string_pretty(projects)?;
        fs::write(self.projects_path(), json)?;
        Ok(())
    }
}

/// Read a JSON file, treating a missing file as `None`.
fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> StorageResult<Option<T>> {
    match fs::read_to_string(path) {
        Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl Storage for FileStorage {
    fn list_projects(&self) -> StorageResult<Vec<MemeProject>> {
        Ok(read_json(&self.projects_path())?.unwrap_or_default())
    }

    fn save_project(&self, project: &MemeProject) -> StorageResult<MemeProject> {
        let mut projects = self.list_projects()?;
        let mut stored = project.clone();
        stored.updated_at = Utc::now();

        match projects.iter_mut().find(|p| p.id == stored.id) {
            Some(existing) => *existing = stored.clone(),
            None => projects.push(stored.clone()),
        }
        self.write_projects(&projects)?;
        log::info!("Saved project {} ({} stored)", stored.name, projects.len());
        Ok(stored)
    }

    fn delete_project(&self, id: ProjectId) -> StorageResult<bool> {
        let mut projects = self.list_projects()?;
        let before = projects.len();
        projects.retain(|p| p.id != id);
        if projects.len() == before {
            return Ok(false);
        }
        self.write_projects(&projects)?;
        log::info!("Deleted project {}", id);
        Ok(true)
    }

    fn list_templates(&self) -> StorageResult<Vec<MemeTemplate>> {
        let entries = match fs::read_dir(self.templates_dir()) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut templates = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match read_json::<MemeTemplate>(&path) {
                Ok(Some(template)) => templates.push(template),
                Ok(None) => {}
                Err(e) => log::warn!("Skipping template {}: {}", path.display(), e),
            }
        }
        templates.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(templates)
    }

    fn save_template(&self, template: &MemeTemplate) -> StorageResult<()> {
        fs::create_dir_all(self.templates_dir())?;
        let json = serde_json::to_string_pretty(template)?;
        fs::write(self.sidecar_path(template.id), json)?;
        log::info!("Saved template {} ({})", template.name, template.id);
        Ok(())
    }

    fn upload_template(
        &self,
        bytes: &[u8],
        file_name: &str,
        name: &str,
        width: Option<u32>,
        height: Option<u32>,
    ) -> StorageResult<MemeTemplate> {
        let upload = validate_upload(bytes, file_name, name, width, height)?;

        let mut template = MemeTemplate::new(upload.name, String::new(), upload.width, upload.height);
        let image_path = self
            .templates_dir()
            .join(format!("{}.{}", template.id, upload.extension));
        template.image_url = image_path.to_string_lossy().into_owned();

        fs::create_dir_all(self.templates_dir())?;
        fs::write(&image_path, bytes)?;
        if let Err(e) = self.save_template(&template) {
            // Don't leave an orphaned image behind.
            let _ = fs::remove_file(&image_path);
            return Err(e);
        }
        log::info!(
            "Uploaded template {} as {} ({}x{})",
            template.name,
            upload.mime_type,
            template.width,
            template.height
        );
        Ok(template)
    }

    fn delete_template(&self, id: TemplateId) -> StorageResult<usize> {
        let prefix = id.to_string();
        let entries = match fs::read_dir(self.templates_dir()) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        for entry in entries {
            let entry = entry?;
            if entry.file_name().to_string_lossy().starts_with(&prefix) {
                fs::remove_file(entry.path())?;
                removed += 1;
            }
        }
        log::info!("Deleted template {} ({} files)", id, removed);
        Ok(removed)
    }

    fn load_current(&self) -> StorageResult<Option<MemeProject>> {
        read_json(&self.current_path())
    }

    fn save_current(&self, project: &MemeProject) -> StorageResult<()> {
        fs::create_dir_all(&self.root)?;
        let json = serde_json::to_string(project)?;
        fs::write(self.current_path(), json)?;
        log::debug!("Autosaved project {}", project.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::templates::tests::encoded_image;
    use crate::models::element::CanvasElement;
    use image::ImageFormat;

    /// Unique scratch directory, removed on drop.
    struct TempDir(PathBuf);

    impl TempDir {
        fn new() -> Self {
            let path = std::env::temp_dir().join(format!("memecraft-test-{}", uuid::Uuid::new_v4()));
            Self(path)
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    #[test]
    fn test_project_round_trip() {
        let dir = TempDir::new();
        let storage = FileStorage::new(&dir.0);
        assert!(storage.list_projects().unwrap().is_empty());

        let mut project = MemeProject::default();
        project.elements.push(CanvasElement::text());
        let stored = storage.save_project(&project).unwrap();
        assert!(stored.updated_at >= project.updated_at);

        project.name = "Renamed".to_string();
        storage.save_project(&project).unwrap();
        storage.save_project(&MemeProject::default()).unwrap();

        let projects = storage.list_projects().unwrap();
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].name, "Renamed");
        assert_eq!(projects[0].elements, project.elements);

        assert!(storage.delete_project(project.id).unwrap());
        assert!(!storage.delete_project(project.id).unwrap());
        assert_eq!(storage.list_projects().unwrap().len(), 1);
    }

    #[test]
    fn test_autosave_slot() {
        let dir = TempDir::new();
        let storage = FileStorage::new(&dir.0);
        assert!(storage.load_current().unwrap().is_none());

        let project = MemeProject::default();
        storage.save_current(&project).unwrap();
        assert_eq!(restore_current(&storage), Some(project));
    }

    #[test]
    fn test_corrupt_autosave_falls_back() {
        let dir = TempDir::new();
        let storage = FileStorage::new(&dir.0);
        fs::create_dir_all(&dir.0).unwrap();
        fs::write(dir.0.join(CURRENT_PROJECT_FILE), "{ not json").unwrap();

        assert!(matches!(storage.load_current(), Err(StorageError::Json(_))));
        assert_eq!(restore_current(&storage), None);
    }

    #[test]
    fn test_upload_list_and_delete_templates() {
        let dir = TempDir::new();
        let storage = FileStorage::new(&dir.0);
        let bytes = encoded_image(32, 16, ImageFormat::Png);

        let template = storage.upload_template(&bytes, "wave.png", "Wave", None, None).unwrap();
        assert_eq!((template.width, template.height), (32, 16));
        assert!(Path::new(&template.image_url).exists());

        // An unreadable sidecar is skipped, not fatal.
        fs::write(storage.templates_dir().join("broken.json"), "[]").unwrap();
        let templates = storage.list_templates().unwrap();
        assert_eq!(templates, vec![template.clone()]);

        assert_eq!(storage.delete_template(template.id).unwrap(), 2);
        assert!(storage.list_templates().unwrap().is_empty());
    }

    #[test]
    fn test_rejected_upload_writes_nothing() {
        let dir = TempDir::new();
        let storage = FileStorage::new(&dir.0);
        let result = storage.upload_template(b"%PDF-1.4", "doc.pdf", "Doc", None, None);
        assert!(matches!(result, Err(StorageError::Validation(_))));
        assert!(!storage.templates_dir().exists());
    }
}
