//! Artwork upload.

use std::path::Path;
use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::Json;
use gallery_core::{unix_millis, Asset, Error, SizeClass};
use gallery_store::AssetCatalog;
use serde_json::{json, Value};

use crate::api::ApiResult;
use crate::error::ApiError;
use crate::state::{AdminPin, AppState};

/// Largest accepted multipart body.
pub const UPLOAD_LIMIT_BYTES: usize = 32 * 1024 * 1024;

const DEFAULT_ARTWORK_NAME: &str = "Untitled";
const DEFAULT_ARTIST_NAME: &str = "Anonymous";

struct UploadedFile {
    file_name: String,
    bytes: Vec<u8>,
}

impl UploadedFile {
    /// Lowercased extension of the client's file name, if it is a plain one.
    fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| ext.len() <= 8 && ext.bytes().all(|b| b.is_ascii_alphanumeric()))
            .map(str::to_ascii_lowercase)
    }
}

#[derive(Default)]
struct UploadForm {
    tile_image: Option<UploadedFile>,
    popup_image: Option<UploadedFile>,
    artwork_name: Option<String>,
    artist_name: Option<String>,
    size: Option<String>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = UploadForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|err| ApiError::bad_request(err.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "tile_image" | "popup_image" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|err| ApiError::bad_request(err.to_string()))?;
                    let file = UploadedFile {
                        file_name,
                        bytes: bytes.to_vec(),
                    };
                    if name == "tile_image" {
                        form.tile_image = Some(file);
                    } else {
                        form.popup_image = Some(file);
                    }
                }
                "artwork_name" | "artist_name" | "size" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|err| ApiError::bad_request(err.to_string()))?;
                    let text = text.trim().to_string();
                    let slot = match name.as_str() {
                        "artwork_name" => &mut form.artwork_name,
                        "artist_name" => &mut form.artist_name,
                        _ => &mut form.size,
                    };
                    *slot = Some(text).filter(|t| !t.is_empty());
                }
                other => tracing::debug!(field = other, "ignoring unknown upload field"),
            }
        }
        Ok(form)
    }
}

fn stored_name(prefix: &str, asset_id: &str, file: &UploadedFile) -> String {
    match file.extension() {
        Some(ext) => format!("{prefix}_{asset_id}.{ext}"),
        None => format!("{prefix}_{asset_id}"),
    }
}

/// Write both images off the async runtime. The tile image is removed again
/// if the popup image cannot be stored.
async fn store_files(
    state: Arc<AppState>,
    tile: (String, Vec<u8>),
    popup: (String, Vec<u8>),
) -> ApiResult<(String, String)> {
    let stored = tokio::task::spawn_blocking(move || -> gallery_core::Result<(String, String)> {
        let tile_url = state.files.put(&tile.0, &tile.1)?;
        match state.files.put(&popup.0, &popup.1) {
            Ok(popup_url) => Ok((tile_url, popup_url)),
            Err(err) => {
                if let Err(cleanup) = state.files.remove(&tile.0) {
                    tracing::warn!(file = %tile.0, error = %cleanup, "orphaned upload left behind");
                }
                Err(err)
            }
        }
    })
    .await
    .map_err(|err| ApiError::internal(err.to_string()))?;
    Ok(stored?)
}

async fn discard_files(state: Arc<AppState>, names: Vec<String>) {
    let removal = tokio::task::spawn_blocking(move || {
        for name in &names {
            if let Err(err) = state.files.remove(name) {
                tracing::warn!(file = %name, error = %err, "orphaned upload left behind");
            }
        }
    })
    .await;
    if let Err(err) = removal {
        tracing::warn!(error = %err, "upload cleanup did not finish");
    }
}

pub(crate) async fn upload_assets(
    _pin: AdminPin,
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let form = UploadForm::read(multipart).await?;
    let (Some(tile_image), Some(popup_image)) = (form.tile_image, form.popup_image) else {
        return Err(ApiError::bad_request("Missing required files"));
    };
    if tile_image.file_name.is_empty() || popup_image.file_name.is_empty() {
        return Err(ApiError::bad_request("Empty filename"));
    }
    let size = form
        .size
        .as_deref()
        .map(str::parse::<SizeClass>)
        .transpose()?;

    let asset_id = AssetCatalog::mint_id()?;
    let tile_name = stored_name("tile", asset_id.as_str(), &tile_image);
    let popup_name = stored_name("popup", asset_id.as_str(), &popup_image);
    let (tile_url, popup_url) = store_files(
        state.clone(),
        (tile_name.clone(), tile_image.bytes),
        (popup_name.clone(), popup_image.bytes),
    )
    .await?;

    let asset = Asset::new(
        asset_id.clone(),
        tile_url,
        popup_url,
        form.artwork_name.as_deref().unwrap_or(DEFAULT_ARTWORK_NAME),
        form.artist_name.as_deref().unwrap_or(DEFAULT_ARTIST_NAME),
        unix_millis(),
    );

    let inserted = state
        .catalog()
        .and_then(|mut catalog| catalog.insert(asset.clone()).map_err(ApiError::from));
    if let Err(err) = inserted {
        discard_files(state, vec![tile_name, popup_name]).await;
        return Err(err);
    }
    tracing::info!(asset = %asset_id, artwork = %asset.artwork_name, "artwork uploaded");

    let placed = match size {
        Some(size) => Some(state.wall()?.place(asset_id, size)?),
        None => None,
    };

    let mut body = serde_json::to_value(&asset).map_err(Error::from)?;
    if let Value::Object(map) = &mut body {
        map.insert("ok".into(), json!(true));
        map.insert("tile_id".into(), json!(placed));
    }
    Ok(Json(body))
}
