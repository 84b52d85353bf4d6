use thiserror::Error;

use crate::tile::{SizeClass, TileId};

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid tile ID: {0}")]
    InvalidTileId(String),

    #[error("Invalid asset ID: {0}")]
    InvalidAssetId(String),

    #[error("Invalid size class: {0}")]
    InvalidSizeClass(String),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Tile {0} is not part of the current layout")]
    UnknownTile(TileId),

    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    #[error("Source tile {0} is empty")]
    SourceTileEmpty(TileId),

    #[error("Destination tile {0} is occupied")]
    DestinationOccupied(TileId),

    #[error("Asset {asset} is already placed on tile {tile}")]
    AssetAlreadyPlaced { asset: String, tile: TileId },

    #[error("No free {0} tile")]
    NoFreeTile(SizeClass),

    #[error("No artwork to shuffle")]
    NothingToShuffle,

    #[error("No tiles available")]
    NoTilesAvailable,

    #[error("Not enough tiles available: {assets} artworks, {tiles} tiles")]
    NotEnoughTiles { assets: usize, tiles: usize },

    #[error("Stored placements belong to layout {stored}, current layout is {current}")]
    LayoutMismatch { stored: String, current: String },

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the error was caused by the caller's input or the wall's state,
    /// as opposed to a storage failure.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Error::Io(_) | Error::Serialization(_) | Error::Other(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
