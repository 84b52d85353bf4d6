use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Grid line colour shared by every visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GridColor(String);

impl GridColor {
    pub const DEFAULT: &'static str = "#aa6655";

    /// Accepts `#rgb` and `#rrggbb`.
    pub fn new(color: impl Into<String>) -> Result<Self> {
        let color = color.into();
        let valid = match color.strip_prefix('#') {
            Some(hex) => {
                matches!(hex.len(), 3 | 6) && hex.bytes().all(|b| b.is_ascii_hexdigit())
            }
            None => false,
        };
        if valid {
            Ok(Self(color))
        } else {
            Err(Error::InvalidColor(color))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for GridColor {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for GridColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for GridColor {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<GridColor> for String {
    fn from(color: GridColor) -> Self {
        color.0
    }
}
