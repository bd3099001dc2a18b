// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application configuration.
//!
//! Read from `memecraft.yaml` in the working directory, or from the file
//! named by `MEMECRAFT_CONFIG`. Every field is optional. `MEMECRAFT_DATA_DIR`
//! overrides the data directory.

use crate::models::project::CanvasSettings;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "memecraft.yaml";
pub const CONFIG_ENV: &str = "MEMECRAFT_CONFIG";
pub const DATA_DIR_ENV: &str = "MEMECRAFT_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root of project, autosave and template storage.
    pub data_dir: PathBuf,
    pub autosave_delay_ms: u64,
    /// Canvas used for new projects.
    pub default_canvas: CanvasSettings,
    /// Initial window size in logical pixels.
    pub window_size: [f32; 2],
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("memecraft-data"),
            autosave_delay_ms: 1000,
            default_canvas: CanvasSettings::default(),
            window_size: [1400.0, 900.0],
        }
    }
}

impl AppConfig {
    /// Load the configuration from the environment. Never fails: problems
    /// are logged and defaults used instead.
    pub fn load() -> Self {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

        let mut config = if path.exists() {
            match Self::from_file(&path) {
                Ok(config) => {
                    log::info!("Loaded configuration from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("{:#}; using defaults", e);
                    Self::default()
                }
            }
        } else {
            Self::default()
        };

        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(dir);
        }
        config.normalized()
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml(&yaml).with_context(|| format!("Failed to parse config {}", path.display()))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config.normalized())
    }

    /// Pull out-of-range values back to something usable.
    fn normalized(mut self) -> Self {
        let (width, height) = CanvasSettings::clamp_size(self.default_canvas.width, self.default_canvas.height);
        self.default_canvas.width = width;
        self.default_canvas.height = height;
        self.window_size = [self.window_size[0].max(640.0), self.window_size[1].max(480.0)];
        self
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }
}
