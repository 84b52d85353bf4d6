//! Scale inference, size classification and tile numbering.

use std::collections::HashMap;
use std::ops::RangeInclusive;

use gallery_core::{SizeClass, Tile, TileId};

use crate::diagram::{extract_rects, RectGeometry};

/// Width of the smallest tile in design units.
pub const DESIGN_XS_WIDTH: f64 = 85.0;

/// Diagram widths that are taken as instances of the smallest tile when
/// inferring the scale.
pub const SCALE_CANDIDATE_WIDTHS: RangeInclusive<f64> = 40.0..=90.0;

/// Classify the rectangles of an SVG diagram into tiles.
///
/// Malformed diagrams and diagrams without any smallest-tile candidate yield
/// an empty list rather than an error.
pub fn classify(svg: &str) -> Vec<Tile> {
    match extract_rects(svg) {
        Ok(rects) => classify_rects(&rects),
        Err(err) => {
            tracing::warn!(error = %err, "diagram could not be parsed, layout is empty");
            Vec::new()
        }
    }
}

/// Diagram units per design unit, from the mean width of the smallest-tile
/// candidates.
pub fn infer_scale(rects: &[RectGeometry]) -> Option<f64> {
    let candidates: Vec<f64> = rects
        .iter()
        .map(|r| r.width)
        .filter(|w| SCALE_CANDIDATE_WIDTHS.contains(w))
        .collect();

    if candidates.is_empty() {
        return None;
    }

    let mean = candidates.iter().sum::<f64>() / candidates.len() as f64;
    Some(mean / DESIGN_XS_WIDTH)
}

/// Normalize, bucket and number rectangles, keeping their order.
pub fn classify_rects(rects: &[RectGeometry]) -> Vec<Tile> {
    let Some(scale) = infer_scale(rects) else {
        if !rects.is_empty() {
            tracing::warn!(
                rects = rects.len(),
                "no smallest-tile candidates in diagram, layout is empty"
            );
        }
        return Vec::new();
    };

    let design: Vec<RectGeometry> = rects
        .iter()
        .map(|r| RectGeometry {
            left: r.left / scale,
            top: r.top / scale,
            width: r.width / scale,
            height: r.height / scale,
        })
        .collect();

    let min_left = design.iter().map(|r| r.left).fold(f64::INFINITY, f64::min);
    let min_top = design.iter().map(|r| r.top).fold(f64::INFINITY, f64::min);

    let mut counters: HashMap<SizeClass, usize> = HashMap::new();
    let mut tiles = Vec::new();
    let mut unknown = 0usize;

    for rect in &design {
        let Some(size) = SizeClass::from_design_width(rect.width) else {
            unknown += 1;
            continue;
        };
        let ordinal = counters.entry(size).or_insert(0);
        *ordinal += 1;

        tiles.push(Tile {
            id: TileId::numbered(size, *ordinal),
            size,
            left: rect.left - min_left,
            top: rect.top - min_top,
            width: rect.width,
            height: rect.height,
        });
    }

    tracing::debug!(
        scale,
        tiles = tiles.len(),
        unknown,
        "classified diagram rectangles"
    );

    tiles
}
