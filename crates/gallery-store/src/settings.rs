//! Small persisted wall settings.

use std::path::{Path, PathBuf};

use gallery_core::{GridColor, Result};
use serde::{Deserialize, Serialize};

use crate::fs::{read_json, write_json_atomic};

/// File name used inside a data directory.
pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsDocument {
    #[serde(default)]
    grid_color: Option<GridColor>,
}

/// Settings file with a fallback for values never written.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    default_grid_color: GridColor,
}

impl SettingsStore {
    pub fn new(data_dir: impl AsRef<Path>, default_grid_color: GridColor) -> Self {
        Self {
            path: data_dir.as_ref().join(SETTINGS_FILE),
            default_grid_color,
        }
    }

    pub fn grid_color(&self) -> Result<GridColor> {
        let document: Option<SettingsDocument> = read_json(&self.path)?;
        Ok(document
            .and_then(|doc| doc.grid_color)
            .unwrap_or_else(|| self.default_grid_color.clone()))
    }

    pub fn set_grid_color(&self, color: GridColor) -> Result<()> {
        let mut document: SettingsDocument = read_json(&self.path)?.unwrap_or_default();
        document.grid_color = Some(color);
        write_json_atomic(&self.path, &document)
    }
}
