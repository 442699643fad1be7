//! Drawing primitives for visualising a layer.

use serde::Serialize;

use crate::{geometry::TilePos, grid::Layer};

pub const OVERLAY_OPACITY: f32 = 0.2;

/// One translucent circle centred on a cell, sized by the cell's strength
/// relative to the strongest cell of the layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayCircle {
    pub pos: TilePos,
    pub radius: f32,
    pub opacity: f32,
    pub color: String,
}

/// One circle per non-zero cell in row-major order; empty for an empty layer.
pub fn overlay(layer: &Layer, color: &str) -> Vec<OverlayCircle> {
    let max = layer.max();
    if max == 0 {
        return Vec::new();
    }
    layer
        .iter()
        .filter(|&(_, value)| value > 0)
        .map(|(pos, value)| OverlayCircle {
            pos,
            radius: value as f32 / max as f32 / 2.0,
            opacity: OVERLAY_OPACITY,
            color: color.to_string(),
        })
        .collect()
}
