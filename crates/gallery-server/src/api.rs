//! Public and lightly guarded wall endpoints.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use gallery_core::{AssetId, Error, GridColor, SizeClass, Tile, TileId};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::{AdminPin, AppState};

pub(crate) type ApiResult<T> = Result<T, ApiError>;

pub(crate) async fn health() -> &'static str {
    "ok"
}

/// One visible artwork.
#[derive(Debug, Serialize)]
pub(crate) struct WallEntry {
    tile_id: TileId,
    asset_id: AssetId,
    tile_url: String,
    popup_url: String,
    artwork_name: String,
    artist_name: String,
}

pub(crate) async fn wall_state(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let placements = state.wall()?.ordered_placements()?;
    let catalog = state.catalog()?;

    let assignments: Vec<WallEntry> = placements
        .into_iter()
        .filter_map(|(tile_id, asset_id)| {
            let asset = catalog.get(&asset_id)?;
            Some(WallEntry {
                tile_url: asset.tile_url.clone(),
                popup_url: asset.popup_url.clone(),
                artwork_name: asset.artwork_name.clone(),
                artist_name: asset.artist_name.clone(),
                tile_id,
                asset_id,
            })
        })
        .collect();

    Ok(Json(json!({ "assignments": assignments })))
}

#[derive(Debug, Serialize)]
pub(crate) struct LayoutResponse {
    fingerprint: String,
    counts: BTreeMap<SizeClass, usize>,
    tiles: Vec<Tile>,
}

pub(crate) async fn layout(State(state): State<Arc<AppState>>) -> ApiResult<Json<LayoutResponse>> {
    let layout = state.wall()?.layout();
    Ok(Json(LayoutResponse {
        fingerprint: layout.fingerprint().to_string(),
        counts: layout.count_by_size(),
        tiles: layout.tiles().to_vec(),
    }))
}

pub(crate) async fn get_grid_color(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let color = state.settings.grid_color()?;
    Ok(Json(json!({ "color": color })))
}

#[derive(Debug, Deserialize)]
pub(crate) struct GridColorRequest {
    color: Option<String>,
}

pub(crate) async fn set_grid_color(
    _pin: AdminPin,
    State(state): State<Arc<AppState>>,
    Json(input): Json<GridColorRequest>,
) -> ApiResult<Json<Value>> {
    let color = GridColor::new(input.color.ok_or(Error::MissingField("color"))?)?;
    state.settings.set_grid_color(color.clone())?;
    tracing::info!(color = %color, "grid color updated");
    Ok(Json(json!({ "ok": true, "color": color })))
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssignTileRequest {
    tile_id: Option<String>,
    asset_id: Option<String>,
}

impl AssignTileRequest {
    pub(crate) fn parse(self) -> Result<(TileId, AssetId), Error> {
        let tile = TileId::new(self.tile_id.ok_or(Error::MissingField("tile_id"))?)?;
        let asset = AssetId::new(self.asset_id.ok_or(Error::MissingField("asset_id"))?)?;
        Ok((tile, asset))
    }
}

pub(crate) async fn assign_tile(
    _pin: AdminPin,
    State(state): State<Arc<AppState>>,
    Json(input): Json<AssignTileRequest>,
) -> ApiResult<Json<Value>> {
    let (tile, asset) = input.parse()?;
    let mut wall = state.wall()?;
    if !state.catalog()?.contains(&asset) {
        return Err(Error::AssetNotFound(asset.to_string()).into());
    }
    wall.assign(tile, asset)?;
    Ok(Json(json!({ "ok": true })))
}
