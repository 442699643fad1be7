use crate::{
    config::DissipationConfig,
    grid::{proportional_step, Layer, PheromoneGrid},
};

/// Evaporates every non-zero cell by `max(floor(value * rate), 1)`.
///
/// Returns the total amount removed from the layer.
pub fn dissipate(layer: &mut Layer, params: &DissipationConfig) -> u64 {
    let mut removed = 0u64;
    for value in layer.cells_mut().iter_mut().filter(|value| **value > 0) {
        let amount = proportional_step(*value, params.rate).min(*value);
        *value -= amount;
        removed += amount as u64;
    }
    removed
}

/// Dissipates every layer of `grid` and marks each one dirty.
pub fn dissipate_grid(grid: &mut PheromoneGrid, params: &DissipationConfig) -> u64 {
    let mut removed = 0u64;
    let mut touched = Vec::with_capacity(grid.layer_count());
    for (name, layer) in grid.iter_mut() {
        removed += dissipate(layer, params);
        touched.push(name.clone());
    }
    for name in &touched {
        grid.mark_dirty(name);
    }
    removed
}
