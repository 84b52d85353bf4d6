//! Rectangle extraction from the SVG wall diagram.
//!
//! Every `<rect>` element is read regardless of namespace prefix or nesting
//! depth, in document order. Document order matters: tile numbering follows it.

use std::sync::LazyLock;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use thiserror::Error;

static TRANSLATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"translate\(\s*([-+0-9.eE]+)(?:\s*,\s*|\s+)([-+0-9.eE]+)\s*\)")
        .expect("translate pattern is valid")
});

#[derive(Error, Debug)]
pub enum DiagramError {
    #[error("Malformed diagram at byte {position}: {message}")]
    Xml { position: u64, message: String },
}

/// Position and size of one rectangle, in diagram units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectGeometry {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Read every rectangle in the diagram.
///
/// A rectangle carrying an unparsable number is skipped; malformed XML fails
/// the whole diagram.
pub fn extract_rects(svg: &str) -> Result<Vec<RectGeometry>, DiagramError> {
    let mut reader = Reader::from_str(svg);
    let mut rects = Vec::new();

    loop {
        let event = reader.read_event().map_err(|err| DiagramError::Xml {
            position: reader.buffer_position() as u64,
            message: err.to_string(),
        })?;

        match event {
            Event::Start(element) | Event::Empty(element) => {
                if element.local_name().as_ref() != b"rect" {
                    continue;
                }
                match read_rect(&element) {
                    Ok(Some(rect)) => rects.push(rect),
                    Ok(None) => {
                        tracing::debug!(
                            position = reader.buffer_position(),
                            "skipping rect with unparsable geometry"
                        );
                    }
                    Err(message) => {
                        return Err(DiagramError::Xml {
                            position: reader.buffer_position() as u64,
                            message,
                        })
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(rects)
}

/// Attributes of a single rect as raw strings.
#[derive(Default)]
struct RectAttrs {
    width: Option<String>,
    height: Option<String>,
    x: Option<String>,
    y: Option<String>,
    transform: Option<String>,
}

fn read_rect(element: &BytesStart<'_>) -> Result<Option<RectGeometry>, String> {
    let mut attrs = RectAttrs::default();

    for attr in element.attributes() {
        let attr = attr.map_err(|err| err.to_string())?;
        let value = String::from_utf8_lossy(&attr.value).into_owned();
        match attr.key.local_name().as_ref() {
            b"width" => attrs.width = Some(value),
            b"height" => attrs.height = Some(value),
            b"x" => attrs.x = Some(value),
            b"y" => attrs.y = Some(value),
            b"transform" => attrs.transform = Some(value),
            _ => {}
        }
    }

    Ok(geometry(&attrs))
}

fn geometry(attrs: &RectAttrs) -> Option<RectGeometry> {
    let width = number_or_zero(attrs.width.as_deref())?;
    let height = number_or_zero(attrs.height.as_deref())?;

    let center = match attrs.transform.as_deref().and_then(|t| TRANSLATE.captures(t)) {
        Some(captures) => Some((parse_number(&captures[1])?, parse_number(&captures[2])?)),
        None => None,
    };

    let (left, top) = match center {
        Some((cx, cy)) => (cx - width / 2.0, cy - height / 2.0),
        None => (
            number_or_zero(attrs.x.as_deref())?,
            number_or_zero(attrs.y.as_deref())?,
        ),
    };

    Some(RectGeometry {
        left,
        top,
        width,
        height,
    })
}

/// Missing or empty attributes read as zero; anything else must be a finite
/// number.
fn number_or_zero(value: Option<&str>) -> Option<f64> {
    match value.map(str::trim) {
        None | Some("") => Some(0.0),
        Some(text) => parse_number(text),
    }
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}
