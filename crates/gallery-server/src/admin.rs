//! Admin endpoints. Every handler requires the admin pin.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use gallery_core::{AssetId, AssetPatch, Error, TileId};
use gallery_wall::{HistoryStatus, UndoKind};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::{ApiResult, AssignTileRequest};
use crate::state::{AdminPin, AppState};

#[derive(Debug, Deserialize)]
pub(crate) struct AssignManyRequest {
    #[serde(default)]
    assignments: Vec<AssignTileRequest>,
}

pub(crate) async fn assign_many(
    _pin: AdminPin,
    State(state): State<Arc<AppState>>,
    Json(input): Json<AssignManyRequest>,
) -> ApiResult<Json<Value>> {
    let pairs = input
        .assignments
        .into_iter()
        .map(AssignTileRequest::parse)
        .collect::<Result<Vec<_>, _>>()?;

    let mut wall = state.wall()?;
    {
        let catalog = state.catalog()?;
        if let Some((_, missing)) = pairs.iter().find(|(_, asset)| !catalog.contains(asset)) {
            return Err(Error::AssetNotFound(missing.to_string()).into());
        }
    }
    let count = wall.assign_many(pairs)?;
    Ok(Json(json!({
        "ok": true,
        "count": count,
        "history_count": wall.history_status().history_count,
    })))
}

#[derive(Debug, Deserialize)]
pub(crate) struct TileRequest {
    tile_id: Option<String>,
}

impl TileRequest {
    fn parse(self) -> Result<TileId, Error> {
        TileId::new(self.tile_id.ok_or(Error::MissingField("tile_id"))?)
    }
}

pub(crate) async fn clear_tile(
    _pin: AdminPin,
    State(state): State<Arc<AppState>>,
    Json(input): Json<TileRequest>,
) -> ApiResult<Json<Value>> {
    let tile = input.parse()?;
    if state.wall()?.clear(tile)? {
        Ok(Json(json!({ "ok": true })))
    } else {
        Ok(Json(json!({ "ok": true, "message": "Tile already empty" })))
    }
}

pub(crate) async fn clear_all_tiles(
    _pin: AdminPin,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Value>> {
    if state.wall()?.clear_all()? {
        Ok(Json(json!({ "ok": true })))
    } else {
        Ok(Json(json!({ "ok": true, "message": "Already empty" })))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MoveRequest {
    from_tile_id: Option<String>,
    to_tile_id: Option<String>,
}

pub(crate) async fn move_tile_asset(
    _pin: AdminPin,
    State(state): State<Arc<AppState>>,
    Json(input): Json<MoveRequest>,
) -> ApiResult<Json<Value>> {
    let from = TileId::new(input.from_tile_id.ok_or(Error::MissingField("from_tile_id"))?)?;
    let to = TileId::new(input.to_tile_id.ok_or(Error::MissingField("to_tile_id"))?)?;
    let history_count = state.wall()?.move_tile(from, to)?;
    Ok(Json(json!({ "ok": true, "history_count": history_count })))
}

pub(crate) async fn shuffle(
    _pin: AdminPin,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Value>> {
    let shuffle_count = state.wall()?.shuffle()?;
    Ok(Json(json!({ "ok": true, "shuffle_count": shuffle_count })))
}

fn undo_response(kind: UndoKind, state: &AppState) -> ApiResult<Json<Value>> {
    match state.wall()?.undo(kind)? {
        Some(action) => Ok(Json(json!({ "ok": true, "action": action.to_string() }))),
        None => Ok(Json(json!({ "ok": false, "message": "No undo available" }))),
    }
}

pub(crate) async fn undo(
    _pin: AdminPin,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Value>> {
    undo_response(UndoKind::Edit, &state)
}

pub(crate) async fn undo_shuffle(
    _pin: AdminPin,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Value>> {
    undo_response(UndoKind::Shuffle, &state)
}

pub(crate) async fn history_status(
    _pin: AdminPin,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<HistoryStatus>> {
    Ok(Json(state.wall()?.history_status()))
}

pub(crate) async fn tile_info(
    _pin: AdminPin,
    State(state): State<Arc<AppState>>,
    Query(query): Query<TileRequest>,
) -> ApiResult<Json<Value>> {
    let tile = query.parse()?;
    let (asset_id, in_layout) = {
        let mut wall = state.wall()?;
        let in_layout = wall.layout().contains(&tile);
        (wall.occupancy()?.get(&tile).cloned(), in_layout)
    };

    let Some(asset_id) = asset_id else {
        return Ok(Json(json!({
            "ok": true,
            "tile_id": tile,
            "occupied": false,
            "in_layout": in_layout,
        })));
    };

    let catalog = state.catalog()?;
    let body = match catalog.get(&asset_id) {
        Some(asset) => json!({
            "ok": true,
            "tile_id": tile,
            "occupied": true,
            "in_layout": in_layout,
            "asset_id": asset_id,
            "artwork_name": asset.artwork_name,
            "artist_name": asset.artist_name,
            "tile_url": asset.tile_url,
            "popup_url": asset.popup_url,
            "notes": asset.notes,
            "paid": asset.paid,
        }),
        None => json!({
            "ok": true,
            "tile_id": tile,
            "occupied": true,
            "in_layout": in_layout,
            "asset_id": asset_id,
            "artwork_name": "Unknown",
            "artist_name": "Unknown",
            "tile_url": "",
            "popup_url": "",
        }),
    };
    Ok(Json(body))
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssetMetaRequest {
    asset_id: Option<String>,
    #[serde(flatten)]
    patch: AssetPatch,
}

pub(crate) async fn asset_meta(
    _pin: AdminPin,
    State(state): State<Arc<AppState>>,
    Json(input): Json<AssetMetaRequest>,
) -> ApiResult<Json<Value>> {
    let id = AssetId::new(input.asset_id.ok_or(Error::MissingField("asset_id"))?)?;
    let asset = state.catalog()?.update(&id, input.patch)?;
    Ok(Json(json!({ "ok": true, "asset": asset })))
}

pub(crate) async fn reload_layout(
    _pin: AdminPin,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Value>> {
    let mut wall = state.wall()?;
    let layout = wall.reload_layout();
    let stale_tiles = wall.stale_tiles()?;
    Ok(Json(json!({
        "ok": true,
        "tiles": layout.len(),
        "fingerprint": layout.fingerprint(),
        "layout_current": wall.is_layout_current()?,
        "stale_tiles": stale_tiles,
    })))
}

pub(crate) async fn reconcile(
    _pin: AdminPin,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Value>> {
    let report = state.wall()?.reconcile()?;
    let dropped: Vec<Value> = report
        .dropped
        .iter()
        .map(|(tile, asset)| json!({ "tile_id": tile, "asset_id": asset }))
        .collect();
    Ok(Json(json!({
        "ok": true,
        "fingerprint": report.fingerprint,
        "dropped": dropped,
    })))
}
