//! Named pheromone layers over a fixed 50x50 region grid.
//!
//! Every layer stores one `u8` per cell, so values can never leave `[0, 255]`;
//! writers that compute in wider integers go through [`Layer::set_clamped`].
//! Layers live in an ordered map, which keeps per-tick iteration (and the
//! random draws it performs) stable across runs.

use std::collections::{btree_map, BTreeMap, BTreeSet};

use crate::geometry::{TilePos, GRID_CELLS};

/// Layer routing agents back to their base.
pub const HOME_LAYER: &str = "home";
/// Layer laid by agents returning from a resource node.
pub const ENERGY_LAYER: &str = "energy";
/// Layer laid by agents returning from an upgrade target.
pub const CONTROLLER_LAYER: &str = "controller";

/// Per-tick decrement shared by diffusion and dissipation:
/// `max(floor(value * rate), 1)`.
pub fn proportional_step(value: u8, rate: f64) -> u8 {
    let scaled = (value as f64 * rate).floor();
    scaled.clamp(1.0, u8::MAX as f64) as u8
}

/// One dense scalar field.
#[derive(Clone, PartialEq, Eq)]
pub struct Layer {
    cells: Vec<u8>,
}

impl Default for Layer {
    fn default() -> Self {
        Self::new()
    }
}

impl Layer {
    pub fn new() -> Self {
        Self {
            cells: vec![0; GRID_CELLS],
        }
    }

    /// Wraps row-major cell values; `None` unless exactly 2500 values are given.
    pub fn from_cells(cells: Vec<u8>) -> Option<Self> {
        if cells.len() == GRID_CELLS {
            Some(Self { cells })
        } else {
            None
        }
    }

    #[inline]
    pub fn get(&self, pos: TilePos) -> u8 {
        self.cells[pos.index()]
    }

    #[inline]
    pub fn set(&mut self, pos: TilePos, value: u8) {
        self.cells[pos.index()] = value;
    }

    /// Writes `value` after clamping it into `[0, 255]`.
    #[inline]
    pub fn set_clamped(&mut self, pos: TilePos, value: i32) {
        self.set(pos, value.clamp(0, u8::MAX as i32) as u8);
    }

    /// Row-major view of all cells.
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [u8] {
        &mut self.cells
    }

    pub fn total(&self) -> u64 {
        self.cells.iter().map(|&value| value as u64).sum()
    }

    pub fn max(&self) -> u8 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    pub fn non_zero_cells(&self) -> usize {
        self.cells.iter().filter(|&&value| value > 0).count()
    }

    /// Iterates `(position, value)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (TilePos, u8)> + '_ {
        self.cells.iter().enumerate().filter_map(|(index, &value)| {
            TilePos::from_index(index).map(|pos| (pos, value))
        })
    }
}

impl std::fmt::Debug for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layer")
            .field("total", &self.total())
            .field("max", &self.max())
            .field("non_zero", &self.non_zero_cells())
            .finish()
    }
}

/// All pheromone layers of one region plus the set of layers written since
/// the last persistence sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PheromoneGrid {
    layers: BTreeMap<String, Layer>,
    dirty: BTreeSet<String>,
}

impl PheromoneGrid {
    /// Empty grid without any layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grid pre-populated with the `controller`, `energy` and `home` layers.
    pub fn with_default_layers() -> Self {
        let mut grid = Self::new();
        for name in [CONTROLLER_LAYER, ENERGY_LAYER, HOME_LAYER] {
            grid.layers.insert(name.to_string(), Layer::new());
        }
        grid
    }

    /// Returns the named layer, creating an empty one on first reference.
    pub fn ensure_layer(&mut self, name: &str) -> &mut Layer {
        self.layers.entry(name.to_string()).or_default()
    }

    /// Replaces (or adds) a layer wholesale without marking it dirty; used when
    /// restoring persisted state.
    pub fn insert_layer(&mut self, name: impl Into<String>, layer: Layer) {
        self.layers.insert(name.into(), layer);
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.get(name)
    }

    pub fn contains_layer(&self, name: &str) -> bool {
        self.layers.contains_key(name)
    }

    /// Value of `name` at `pos`; unknown layers read as 0.
    pub fn level(&self, name: &str, pos: TilePos) -> u8 {
        self.layers.get(name).map(|layer| layer.get(pos)).unwrap_or(0)
    }

    /// Writes one cell, creating the layer if needed, and marks it dirty.
    pub fn set_level(&mut self, name: &str, pos: TilePos, value: u8) {
        self.ensure_layer(name).set(pos, value);
        self.mark_dirty(name);
    }

    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(String::as_str)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Layer> {
        self.layers.iter()
    }

    /// Mutable access to every layer in name order. Callers that change cell
    /// values are responsible for [`PheromoneGrid::mark_dirty`].
    pub fn iter_mut(&mut self) -> btree_map::IterMut<'_, String, Layer> {
        self.layers.iter_mut()
    }

    pub fn mark_dirty(&mut self, name: &str) {
        if !self.dirty.contains(name) {
            self.dirty.insert(name.to_string());
        }
    }

    pub fn mark_all_dirty(&mut self) {
        self.dirty = self.layers.keys().cloned().collect();
    }

    pub fn is_dirty(&self, name: &str) -> bool {
        self.dirty.contains(name)
    }

    pub fn dirty_layers(&self) -> impl Iterator<Item = &str> {
        self.dirty.iter().map(String::as_str)
    }

    /// Drains the dirty set, returning the layer names in order.
    pub fn take_dirty(&mut self) -> Vec<String> {
        std::mem::take(&mut self.dirty).into_iter().collect()
    }
}
