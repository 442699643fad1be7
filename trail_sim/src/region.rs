use tracing::debug;

use crate::{
    grid::{PheromoneGrid, CONTROLLER_LAYER, ENERGY_LAYER, HOME_LAYER},
    persistence::{encode_layer, PersistenceError, RegionRecord, RegionStore},
};

/// One 50x50 area of the world and its trail layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    name: String,
    pub grid: PheromoneGrid,
}

impl Region {
    /// Fresh region with the default layer set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            grid: PheromoneGrid::with_default_layers(),
        }
    }

    /// Restores a region from `store`, or starts a fresh one if it was never
    /// stored. Layers missing from the record are created empty.
    pub fn load<S: RegionStore + ?Sized>(name: &str, store: &S) -> Result<Self, PersistenceError> {
        let Some(record) = store.load_region(name)? else {
            debug!(target: "trail_sim::persistence", region = name, "region.fresh");
            return Ok(Self::new(name));
        };
        let mut grid = record.to_grid()?;
        for layer in [CONTROLLER_LAYER, ENERGY_LAYER, HOME_LAYER] {
            grid.ensure_layer(layer);
        }
        debug!(
            target: "trail_sim::persistence",
            region = name,
            layers = grid.layer_count(),
            "region.loaded"
        );
        Ok(Self {
            name: name.to_string(),
            grid,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Writes every layer changed since the last sync. Returns the number of
    /// layers written; on error the dirty set is left intact for a retry.
    pub fn sync<S: RegionStore + ?Sized>(&mut self, store: &mut S) -> Result<usize, PersistenceError> {
        let mut written = 0;
        for layer_name in self.grid.dirty_layers() {
            if let Some(layer) = self.grid.layer(layer_name) {
                store.store_layer(&self.name, layer_name, &encode_layer(layer))?;
                written += 1;
            }
        }
        self.grid.take_dirty();
        debug!(
            target: "trail_sim::persistence",
            region = %self.name,
            layers = written,
            "region.synced"
        );
        Ok(written)
    }

    pub fn record(&self) -> RegionRecord {
        RegionRecord::from_grid(&self.name, &self.grid)
    }
}
