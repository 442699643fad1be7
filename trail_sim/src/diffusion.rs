//! Downhill spreading of trail strength.
//!
//! Each pass walks the layer in row-major order and moves a small slice of
//! every strong cell into its weakest strictly-lower neighbour. The pass is in
//! place: a cell visited later sees whatever earlier cells already pushed into
//! it. Ties between equally weak neighbours are broken uniformly with the
//! caller's generator.

use rand::{seq::SliceRandom, Rng};

use crate::{
    config::DiffusionConfig,
    geometry::{TilePos, GRID_CELLS},
    grid::{proportional_step, Layer, PheromoneGrid},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffusionStats {
    /// Number of cells that pushed value into a neighbour.
    pub transfers: u32,
    /// Sum of the amounts removed from source cells.
    pub moved: u64,
}

impl DiffusionStats {
    fn merge(&mut self, other: DiffusionStats) {
        self.transfers += other.transfers;
        self.moved += other.moved;
    }
}

/// Runs one diffusion pass over a single layer.
pub fn diffuse<R: Rng + ?Sized>(
    layer: &mut Layer,
    params: &DiffusionConfig,
    rng: &mut R,
) -> DiffusionStats {
    let mut stats = DiffusionStats::default();
    let mut lowest: Vec<TilePos> = Vec::with_capacity(8);

    for index in 0..GRID_CELLS {
        let Some(source) = TilePos::from_index(index) else {
            continue;
        };
        let current = layer.get(source);
        if current < params.min_source {
            continue;
        }

        lowest.clear();
        let mut lowest_value = u8::MAX;
        for (_, neighbor) in source.neighbors() {
            let value = layer.get(neighbor);
            if value >= current {
                continue;
            }
            if value < lowest_value {
                lowest_value = value;
                lowest.clear();
            }
            if value == lowest_value {
                lowest.push(neighbor);
            }
        }

        let Some(&target) = lowest.choose(rng) else {
            continue;
        };
        let amount = proportional_step(current, params.rate);
        layer.set_clamped(target, lowest_value as i32 + amount as i32);
        layer.set_clamped(source, current as i32 - amount as i32);
        stats.transfers += 1;
        stats.moved += amount as u64;
    }

    stats
}

/// Diffuses every layer of `grid` in name order and marks each one dirty.
pub fn diffuse_grid<R: Rng + ?Sized>(
    grid: &mut PheromoneGrid,
    params: &DiffusionConfig,
    rng: &mut R,
) -> DiffusionStats {
    let mut stats = DiffusionStats::default();
    let mut touched = Vec::with_capacity(grid.layer_count());
    for (name, layer) in grid.iter_mut() {
        stats.merge(diffuse(layer, params, rng));
        touched.push(name.clone());
    }
    for name in &touched {
        grid.mark_dirty(name);
    }
    stats
}
