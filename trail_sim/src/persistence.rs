//! Storage seam for region layers and agent records.
//!
//! A layer is stored as exactly 2500 bytes in row-major order
//! (`index = y * 50 + x`). Anything else is rejected on load; a region is
//! either restored completely or not at all.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    agent::{Agent, AgentId},
    geometry::GRID_CELLS,
    grid::{Layer, PheromoneGrid},
};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("layer `{layer}` of region `{region}` has {found} cells, expected {expected}")]
    LayerLength {
        region: String,
        layer: String,
        expected: usize,
        found: usize,
    },
    #[error("failed to decode {what}: {source}")]
    Decode {
        what: String,
        #[source]
        source: bincode::Error,
    },
    #[error("failed to encode {what}: {source}")]
    Encode {
        what: String,
        #[source]
        source: bincode::Error,
    },
}

/// Serialized trail state of one region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRecord {
    pub name: String,
    pub layers: BTreeMap<String, Vec<u8>>,
}

impl RegionRecord {
    pub fn from_grid(name: &str, grid: &PheromoneGrid) -> Self {
        Self {
            name: name.to_string(),
            layers: grid
                .iter()
                .map(|(layer, values)| (layer.clone(), encode_layer(values)))
                .collect(),
        }
    }

    /// Rebuilds the grid, failing on the first malformed layer.
    pub fn to_grid(&self) -> Result<PheromoneGrid, PersistenceError> {
        let mut grid = PheromoneGrid::new();
        for (layer, cells) in &self.layers {
            grid.insert_layer(layer.clone(), decode_layer(&self.name, layer, cells)?);
        }
        Ok(grid)
    }
}

pub fn encode_layer(layer: &Layer) -> Vec<u8> {
    layer.cells().to_vec()
}

pub fn decode_layer(region: &str, layer: &str, cells: &[u8]) -> Result<Layer, PersistenceError> {
    Layer::from_cells(cells.to_vec()).ok_or_else(|| PersistenceError::LayerLength {
        region: region.to_string(),
        layer: layer.to_string(),
        expected: GRID_CELLS,
        found: cells.len(),
    })
}

/// Durable home of region layers and agent records, provided by the host.
pub trait RegionStore {
    /// Returns `Ok(None)` for a region that was never stored.
    fn load_region(&self, region: &str) -> Result<Option<RegionRecord>, PersistenceError>;

    fn store_layer(
        &mut self,
        region: &str,
        layer: &str,
        cells: &[u8],
    ) -> Result<(), PersistenceError>;

    fn load_agent(&self, id: AgentId) -> Result<Option<Agent>, PersistenceError>;

    fn store_agent(&mut self, agent: &Agent) -> Result<(), PersistenceError>;

    /// Drops the record of an agent the host no longer has.
    fn forget_agent(&mut self, id: AgentId) -> Result<(), PersistenceError>;
}

/// In-memory store keeping every record bincode-encoded, so round trips go
/// through the same serialization a real backend would.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    regions: BTreeMap<String, Vec<u8>>,
    agents: BTreeMap<AgentId, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a whole record as-is, without validating layer lengths.
    pub fn put_record(&mut self, record: &RegionRecord) -> Result<(), PersistenceError> {
        let bytes = bincode::serialize(record).map_err(|source| PersistenceError::Encode {
            what: format!("region `{}`", record.name),
            source,
        })?;
        self.regions.insert(record.name.clone(), bytes);
        Ok(())
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Total encoded size of everything held, in bytes.
    pub fn encoded_len(&self) -> usize {
        self.regions.values().map(Vec::len).sum::<usize>()
            + self.agents.values().map(Vec::len).sum::<usize>()
    }
}

impl RegionStore for MemoryStore {
    fn load_region(&self, region: &str) -> Result<Option<RegionRecord>, PersistenceError> {
        let Some(bytes) = self.regions.get(region) else {
            return Ok(None);
        };
        let record = bincode::deserialize(bytes).map_err(|source| PersistenceError::Decode {
            what: format!("region `{region}`"),
            source,
        })?;
        Ok(Some(record))
    }

    fn store_layer(
        &mut self,
        region: &str,
        layer: &str,
        cells: &[u8],
    ) -> Result<(), PersistenceError> {
        if cells.len() != GRID_CELLS {
            return Err(PersistenceError::LayerLength {
                region: region.to_string(),
                layer: layer.to_string(),
                expected: GRID_CELLS,
                found: cells.len(),
            });
        }
        let mut record = self.load_region(region)?.unwrap_or_else(|| RegionRecord {
            name: region.to_string(),
            layers: BTreeMap::new(),
        });
        record.layers.insert(layer.to_string(), cells.to_vec());
        self.put_record(&record)
    }

    fn load_agent(&self, id: AgentId) -> Result<Option<Agent>, PersistenceError> {
        let Some(bytes) = self.agents.get(&id) else {
            return Ok(None);
        };
        let agent = bincode::deserialize(bytes).map_err(|source| PersistenceError::Decode {
            what: format!("agent {id}"),
            source,
        })?;
        Ok(Some(agent))
    }

    fn store_agent(&mut self, agent: &Agent) -> Result<(), PersistenceError> {
        let bytes = bincode::serialize(agent).map_err(|source| PersistenceError::Encode {
            what: format!("agent {}", agent.id),
            source,
        })?;
        self.agents.insert(agent.id, bytes);
        Ok(())
    }

    fn forget_agent(&mut self, id: AgentId) -> Result<(), PersistenceError> {
        self.agents.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::LayerConfig, geometry::TilePos};

    fn pos(x: u8, y: u8) -> TilePos {
        TilePos::new(x, y).unwrap()
    }

    #[test]
    fn layer_bytes_are_row_major() {
        let mut layer = Layer::new();
        layer.set(pos(3, 2), 77);
        let bytes = encode_layer(&layer);
        assert_eq!(bytes.len(), 2500);
        assert_eq!(bytes[2 * 50 + 3], 77);
        assert_eq!(bytes.iter().filter(|&&b| b > 0).count(), 1);
    }

    #[test]
    fn short_layer_is_rejected() {
        let err = decode_layer("W1N1", "home", &[0; 2499]).expect_err("short layer");
        assert!(matches!(
            err,
            PersistenceError::LayerLength {
                expected: 2500,
                found: 2499,
                ..
            }
        ));
    }

    #[test]
    fn one_bad_layer_fails_the_whole_region() {
        let mut store = MemoryStore::new();
        let mut record = RegionRecord {
            name: "W2N2".to_string(),
            layers: BTreeMap::new(),
        };
        record.layers.insert("energy".to_string(), vec![1; 2500]);
        record.layers.insert("home".to_string(), vec![1; 12]);
        store.put_record(&record).unwrap();

        let loaded = store.load_region("W2N2").unwrap().unwrap();
        assert!(loaded.to_grid().is_err());
    }

    #[test]
    fn store_layer_validates_length() {
        let mut store = MemoryStore::new();
        assert!(store.store_layer("W1N1", "home", &[0; 10]).is_err());
        assert_eq!(store.region_count(), 0);
        store.store_layer("W1N1", "home", &[3; 2500]).unwrap();
        let record = store.load_region("W1N1").unwrap().unwrap();
        assert_eq!(record.layers["home"][0], 3);
    }

    #[test]
    fn agents_round_trip_and_can_be_forgotten() {
        let mut store = MemoryStore::new();
        let mut agent = Agent::spawn(AgentId(4), pos(9, 9), &LayerConfig::default());
        agent.set_searching(false);
        agent.steps_since_event = 31;
        store.store_agent(&agent).unwrap();
        assert_eq!(store.load_agent(AgentId(4)).unwrap(), Some(agent));
        store.forget_agent(AgentId(4)).unwrap();
        assert_eq!(store.load_agent(AgentId(4)).unwrap(), None);
        assert_eq!(store.agent_count(), 0);
    }

    #[test]
    fn off_grid_agent_record_fails_to_load() {
        let mut store = MemoryStore::new();
        let agent = Agent::spawn(AgentId(5), pos(9, 3), &LayerConfig::default());
        store.store_agent(&agent).unwrap();

        // Fixed-width layout: the 8-byte id, then `pos.x`.
        let bytes = store.agents.get_mut(&AgentId(5)).unwrap();
        assert_eq!(bytes[8], 9);
        bytes[8] = 60;

        let err = store.load_agent(AgentId(5)).unwrap_err();
        assert!(matches!(err, PersistenceError::Decode { .. }), "{err}");
        assert!(err.to_string().contains("agent 5"), "{err}");
    }

    #[test]
    fn record_json_round_trip() {
        let mut grid = PheromoneGrid::with_default_layers();
        grid.set_level("energy", pos(40, 1), 200);
        let record = RegionRecord::from_grid("W3N3", &grid);
        let json = serde_json::to_string(&record).unwrap();
        let back: RegionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_grid().unwrap().level("energy", pos(40, 1)), 200);
    }
}
