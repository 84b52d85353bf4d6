//! Artwork metadata and uploaded image files.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use gallery_core::{Asset, AssetId, AssetPatch, Error, Result};
use uuid::Uuid;

use crate::fs::{read_json, write_json_atomic};

/// File name used inside a data directory.
pub const ASSETS_FILE: &str = "assets.json";

/// URL prefix under which uploaded files are served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// Metadata for every uploaded artwork, persisted as one JSON object keyed by
/// asset id.
#[derive(Debug)]
pub struct AssetCatalog {
    path: PathBuf,
    assets: BTreeMap<AssetId, Asset>,
}

impl AssetCatalog {
    /// Open the catalog in `data_dir`, starting empty if none was written yet.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let path = data_dir.as_ref().join(ASSETS_FILE);
        let assets: BTreeMap<AssetId, Asset> = read_json(&path)?.unwrap_or_default();
        tracing::debug!(path = %path.display(), assets = assets.len(), "asset catalog loaded");
        Ok(Self { path, assets })
    }

    /// A fresh, random asset id.
    pub fn mint_id() -> Result<AssetId> {
        AssetId::new(Uuid::new_v4().to_string())
    }

    pub fn get(&self, id: &AssetId) -> Option<&Asset> {
        self.assets.get(id)
    }

    pub fn contains(&self, id: &AssetId) -> bool {
        self.assets.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn list(&self) -> impl Iterator<Item = &Asset> {
        self.assets.values()
    }

    /// Add or overwrite an asset record.
    pub fn insert(&mut self, asset: Asset) -> Result<()> {
        let mut next = self.assets.clone();
        next.insert(asset.asset_id.clone(), asset);
        self.commit(next)
    }

    /// Edit an existing asset's metadata and return the updated record.
    pub fn update(&mut self, id: &AssetId, patch: AssetPatch) -> Result<Asset> {
        let mut next = self.assets.clone();
        let asset = next
            .get_mut(id)
            .ok_or_else(|| Error::AssetNotFound(id.to_string()))?;
        asset.apply(patch);
        let updated = asset.clone();
        self.commit(next)?;
        Ok(updated)
    }

    fn commit(&mut self, next: BTreeMap<AssetId, Asset>) -> Result<()> {
        write_json_atomic(&self.path, &next)?;
        tracing::debug!(assets = next.len(), "asset catalog saved");
        self.assets = next;
        Ok(())
    }
}

/// Write-once storage for uploaded image bytes.
pub trait FileStore: Send + Sync {
    /// Store `bytes` under `name` and return the URL it is served from.
    fn put(&self, name: &str, bytes: &[u8]) -> Result<String>;

    /// Delete the file stored under `name`. Removing a missing file is not an
    /// error.
    fn remove(&self, name: &str) -> Result<()>;
}

/// Stores files in a directory that is served under `/uploads`.
#[derive(Debug, Clone)]
pub struct FsFileStore {
    dir: PathBuf,
}

impl FsFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_path(&self, name: &str) -> Result<PathBuf> {
        let plain = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\']);
        if !plain {
            return Err(Error::Other(format!("Invalid upload file name: {name}")));
        }
        Ok(self.dir.join(name))
    }
}

impl FileStore for FsFileStore {
    fn put(&self, name: &str, bytes: &[u8]) -> Result<String> {
        let path = self.file_path(name)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(path, bytes)?;
        tracing::debug!(file = name, bytes = bytes.len(), "upload stored");
        Ok(format!("{UPLOADS_URL_PREFIX}/{name}"))
    }

    fn remove(&self, name: &str) -> Result<()> {
        match fs::remove_file(self.file_path(name)?) {
            Ok(()) => {
                tracing::debug!(file = name, "upload removed");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
