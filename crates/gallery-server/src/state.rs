//! Shared server state.

use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use gallery_core::Result;
use gallery_layout::{DiagramSource, LayoutCache};
use gallery_store::{
    AssetCatalog, FileStore, FsFileStore, JsonFileBackend, OccupancyStore, SettingsStore,
};
use gallery_wall::Wall;

use crate::config::ServerConfig;
use crate::error::ApiError;

/// Header carrying the admin pin.
pub const ADMIN_PIN_HEADER: &str = "x-admin-pin";

/// State injected into every handler.
///
/// Placement mutations are serialized by the wall lock. When both locks are
/// needed, the wall lock is taken first.
pub struct AppState {
    wall: Mutex<Wall>,
    catalog: Mutex<AssetCatalog>,
    pub files: Box<dyn FileStore>,
    pub settings: SettingsStore,
    pub admin_pin: Option<String>,
    pub upload_dir: PathBuf,
    pub static_dir: PathBuf,
}

impl AppState {
    /// Open the data directory and wire up the wall described by `config`.
    pub fn open(config: &ServerConfig) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;
        fs::create_dir_all(&config.upload_dir)?;

        let store = OccupancyStore::new(Box::new(JsonFileBackend::in_dir(&config.data_dir)));
        let layout = LayoutCache::new(DiagramSource::File(config.diagram.clone()));
        let mut wall = Wall::new(store, layout).with_undo_depth(config.undo_depth);

        if !wall.is_layout_current()? {
            tracing::warn!(
                stale_tiles = wall.stale_tiles()?.len(),
                "stored placements were written for a different layout, mutations are blocked until reconcile"
            );
        }
        if config.admin_pin.is_none() {
            tracing::warn!("no admin pin configured, guarded routes will refuse every request");
        }

        Ok(Self {
            wall: Mutex::new(wall),
            catalog: Mutex::new(AssetCatalog::open(&config.data_dir)?),
            files: Box::new(FsFileStore::new(&config.upload_dir)),
            settings: SettingsStore::new(&config.data_dir, config.default_grid_color.clone()),
            admin_pin: config.admin_pin.clone(),
            upload_dir: config.upload_dir.clone(),
            static_dir: config.static_dir.clone(),
        })
    }

    pub fn wall(&self) -> std::result::Result<MutexGuard<'_, Wall>, ApiError> {
        self.wall
            .lock()
            .map_err(|_| ApiError::internal("Wall lock poisoned"))
    }

    pub fn catalog(&self) -> std::result::Result<MutexGuard<'_, AssetCatalog>, ApiError> {
        self.catalog
            .lock()
            .map_err(|_| ApiError::internal("Asset catalog lock poisoned"))
    }

    fn pin_matches(&self, presented: Option<&str>) -> bool {
        match (&self.admin_pin, presented) {
            (Some(expected), Some(presented)) => expected == presented,
            _ => false,
        }
    }
}

/// Extractor that only succeeds when the request carries the admin pin.
pub struct AdminPin;

impl FromRequestParts<std::sync::Arc<AppState>> for AdminPin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &std::sync::Arc<AppState>,
    ) -> std::result::Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(ADMIN_PIN_HEADER)
            .and_then(|value| value.to_str().ok());
        if state.pin_matches(presented) {
            Ok(AdminPin)
        } else {
            tracing::debug!(path = %parts.uri.path(), "admin pin rejected");
            Err(ApiError::unauthorized())
        }
    }
}
