//! Server configuration.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use gallery_core::GridColor;
use gallery_wall::DEFAULT_UNDO_DEPTH;
use serde::{Deserialize, Serialize};

/// Everything needed to start the server. Every field has a default, so a
/// config file only lists what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Placements, asset metadata and settings.
    pub data_dir: PathBuf,
    /// Uploaded images, served under `/uploads`.
    pub upload_dir: PathBuf,
    /// Front-end files served at `/`.
    pub static_dir: PathBuf,
    /// SVG diagram of the wall.
    pub diagram: PathBuf,
    /// Value required in the `X-Admin-Pin` header. Without one, every guarded
    /// route answers 401.
    pub admin_pin: Option<String>,
    pub undo_depth: usize,
    pub default_grid_color: GridColor,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5000)),
            data_dir: PathBuf::from("data"),
            upload_dir: PathBuf::from("uploads"),
            static_dir: PathBuf::from("static"),
            diagram: PathBuf::from("static/grid_full.svg"),
            admin_pin: None,
            undo_depth: DEFAULT_UNDO_DEPTH,
            default_grid_color: GridColor::default(),
        }
    }
}

impl ServerConfig {
    /// Load a JSON config file.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }
}
