use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

static TILE_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(XL|X|S|M|L)([1-9][0-9]*)$").expect("tile id pattern is valid")
});

/// Size bucket of a tile, ordered from smallest to largest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    Xs,
    S,
    M,
    Lg,
    Xlg,
}

impl SizeClass {
    /// Every size class, smallest first.
    pub const ALL: [SizeClass; 5] = [
        SizeClass::Xs,
        SizeClass::S,
        SizeClass::M,
        SizeClass::Lg,
        SizeClass::Xlg,
    ];

    /// Prefix used when numbering tiles of this class.
    pub const fn prefix(self) -> &'static str {
        match self {
            SizeClass::Xs => "X",
            SizeClass::S => "S",
            SizeClass::M => "M",
            SizeClass::Lg => "L",
            SizeClass::Xlg => "XL",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            SizeClass::Xs => "xs",
            SizeClass::S => "s",
            SizeClass::M => "m",
            SizeClass::Lg => "lg",
            SizeClass::Xlg => "xlg",
        }
    }

    /// Bucket a width in design units. Returns `None` for widths outside
    /// every bucket.
    pub fn from_design_width(width: f64) -> Option<Self> {
        match width {
            w if (60.0..128.0).contains(&w) => Some(SizeClass::Xs),
            w if (128.0..213.0).contains(&w) => Some(SizeClass::S),
            w if (213.0..298.0).contains(&w) => Some(SizeClass::M),
            w if (298.0..425.0).contains(&w) => Some(SizeClass::Lg),
            w if (425.0..600.0).contains(&w) => Some(SizeClass::Xlg),
            _ => None,
        }
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SizeClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SizeClass::ALL
            .into_iter()
            .find(|class| class.name() == s)
            .ok_or_else(|| Error::InvalidSizeClass(s.to_string()))
    }
}

/// Identifier of a placement slot, e.g. `X12` or `XL3`.
///
/// Construction validates the `prefix + ordinal` shape, so a `TileId` that
/// exists is always well formed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TileId(String);

impl TileId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if TILE_ID_PATTERN.is_match(&id) {
            Ok(Self(id))
        } else {
            Err(Error::InvalidTileId(id))
        }
    }

    /// Build the id of the `ordinal`-th tile of a size class.
    pub fn numbered(size: SizeClass, ordinal: usize) -> Self {
        debug_assert!(ordinal > 0);
        Self(format!("{}{}", size.prefix(), ordinal))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Size class encoded in the id prefix.
    pub fn size_class(&self) -> SizeClass {
        let prefix = self.0.trim_end_matches(|c: char| c.is_ascii_digit());
        match prefix {
            "X" => SizeClass::Xs,
            "S" => SizeClass::S,
            "M" => SizeClass::M,
            "L" => SizeClass::Lg,
            "XL" => SizeClass::Xlg,
            other => unreachable!("tile id {} validated with prefix {other:?}", self.0),
        }
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TileId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for TileId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<TileId> for String {
    fn from(id: TileId) -> Self {
        id.0
    }
}

/// A classified tile of the wall.
///
/// Geometry is in design units, shifted so the top-left-most rectangle of the
/// diagram sits at the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub size: SizeClass,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}
