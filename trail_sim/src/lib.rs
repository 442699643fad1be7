//! Stigmergic trail simulation core.
//!
//! Agents coordinate through scalar trail layers laid over a 50x50 region
//! grid instead of talking to each other. A host calls [`update_region`]
//! once per tick and [`update_agent`] / [`complete_move`] for every agent;
//! terrain and persistence come in through the [`WorldQuery`] and
//! [`RegionStore`] traits.

pub mod agent;
pub mod config;
pub mod deposit;
pub mod diffusion;
pub mod dissipation;
pub mod geometry;
pub mod grid;
pub mod metrics;
pub mod navigation;
pub mod overlay;
pub mod persistence;
pub mod region;
pub mod rng;
pub mod sandbox;
pub mod state_machine;
mod systems;
pub mod world;

pub use agent::{Agent, AgentId, AgentMode, AgentVitals};
pub use config::{
    load_simulation_config_from_env, ConfigError, ConfigSource, DepositConfig, DiffusionConfig,
    DissipationConfig, LayerConfig, NavigationConfig, SimulationConfig, CONFIG_PATH_ENV,
};
pub use deposit::{deposit, deposit_at_boundary};
pub use diffusion::{diffuse, diffuse_grid, DiffusionStats};
pub use dissipation::{dissipate, dissipate_grid};
pub use geometry::{Direction, OutOfGrid, TilePos, GRID_CELLS, GRID_SIZE};
pub use grid::{Layer, PheromoneGrid, CONTROLLER_LAYER, ENERGY_LAYER, HOME_LAYER};
pub use metrics::{LayerMetrics, RegionMetrics};
pub use navigation::{choose_direction, direction_priorities, walkable_candidates, Candidate};
pub use overlay::{overlay, OverlayCircle};
pub use persistence::{MemoryStore, PersistenceError, RegionRecord, RegionStore};
pub use region::Region;
pub use rng::{seeded_rng, SimRng};
pub use sandbox::{Sandbox, SandboxReport, SandboxWorld};
pub use state_machine::{update_mode, AgentAction};
pub use systems::{complete_move, update_agent, update_region, AgentTick, MoveOutcome, MoveRequest};
pub use world::{Neighborhood, PointOfInterest, TileLook, TileTraits, WorldQuery};
