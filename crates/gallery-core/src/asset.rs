use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const MAX_ASSET_ID_LEN: usize = 64;

/// Opaque artwork reference. Uploads mint UUIDs, but any short token of
/// ASCII alphanumerics, `-` and `_` is accepted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetId(String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let well_formed = !id.is_empty()
            && id.len() <= MAX_ASSET_ID_LEN
            && id
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if well_formed {
            Ok(Self(id))
        } else {
            Err(Error::InvalidAssetId(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AssetId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<AssetId> for String {
    fn from(id: AssetId) -> Self {
        id.0
    }
}

/// Stored representation of an uploaded artwork.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub asset_id: AssetId,
    pub tile_url: String,
    pub popup_url: String,
    pub artwork_name: String,
    pub artist_name: String,
    /// Unix timestamp in milliseconds.
    pub created_at: u64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub paid: bool,
}

impl Asset {
    pub fn new(
        asset_id: AssetId,
        tile_url: impl Into<String>,
        popup_url: impl Into<String>,
        artwork_name: impl Into<String>,
        artist_name: impl Into<String>,
        created_at: u64,
    ) -> Self {
        Self {
            asset_id,
            tile_url: tile_url.into(),
            popup_url: popup_url.into(),
            artwork_name: artwork_name.into(),
            artist_name: artist_name.into(),
            created_at,
            notes: None,
            paid: false,
        }
    }

    /// Apply the fields present in `patch`. Urls and ids never change.
    pub fn apply(&mut self, patch: AssetPatch) {
        if let Some(name) = patch.artwork_name {
            self.artwork_name = name;
        }
        if let Some(artist) = patch.artist_name {
            self.artist_name = artist;
        }
        if let Some(notes) = patch.notes {
            self.notes = Some(notes);
        }
        if let Some(paid) = patch.paid {
            self.paid = paid;
        }
    }
}

/// Metadata edit for an existing asset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetPatch {
    pub artwork_name: Option<String>,
    pub artist_name: Option<String>,
    pub notes: Option<String>,
    pub paid: Option<bool>,
}
