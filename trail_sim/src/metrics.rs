use std::collections::BTreeMap;

use serde::Serialize;

use crate::{diffusion::DiffusionStats, grid::Layer, region::Region};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LayerMetrics {
    pub total: u64,
    pub max: u8,
    pub non_zero: usize,
}

impl LayerMetrics {
    pub fn of(layer: &Layer) -> Self {
        Self {
            total: layer.total(),
            max: layer.max(),
            non_zero: layer.non_zero_cells(),
        }
    }
}

/// Summary of one region tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegionMetrics {
    pub region: String,
    pub transfers: u32,
    pub diffused: u64,
    pub dissipated: u64,
    pub layers: BTreeMap<String, LayerMetrics>,
}

impl RegionMetrics {
    pub fn collect(region: &Region, diffusion: DiffusionStats, dissipated: u64) -> Self {
        Self {
            region: region.name().to_string(),
            transfers: diffusion.transfers,
            diffused: diffusion.moved,
            dissipated,
            layers: region
                .grid
                .iter()
                .map(|(name, layer)| (name.clone(), LayerMetrics::of(layer)))
                .collect(),
        }
    }

    /// Sum of all cells over all layers after the tick.
    pub fn total_trail(&self) -> u64 {
        self.layers.values().map(|layer| layer.total).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::TilePos;

    #[test]
    fn collects_every_layer() {
        let mut region = Region::new("W1N1");
        region
            .grid
            .set_level("home", TilePos::new(1, 1).unwrap(), 30);
        region
            .grid
            .set_level("home", TilePos::new(2, 1).unwrap(), 12);
        let metrics = RegionMetrics::collect(&region, DiffusionStats::default(), 0);
        assert_eq!(metrics.layers.len(), 3);
        assert_eq!(
            metrics.layers["home"],
            LayerMetrics {
                total: 42,
                max: 30,
                non_zero: 2
            }
        );
        assert_eq!(metrics.total_trail(), 42);
    }
}
