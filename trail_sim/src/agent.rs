use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    config::LayerConfig,
    geometry::{Direction, TilePos},
};

/// Host-assigned identifier of a mobile agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Goal the agent pursued on its most recent tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentMode {
    /// Wandering away from base looking for something to work on.
    #[default]
    Searching,
    /// Heading back towards base.
    Returning,
    /// Parked next to a resource node.
    Harvesting,
    /// Parked next to an upgrade target.
    Upgrading,
}

impl AgentMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            AgentMode::Searching => "searching",
            AgentMode::Returning => "returning",
            AgentMode::Harvesting => "harvesting",
            AgentMode::Upgrading => "upgrading",
        }
    }

    /// Whether the agent works on an adjacent target instead of moving.
    pub const fn is_stationary(self) -> bool {
        matches!(self, AgentMode::Harvesting | AgentMode::Upgrading)
    }
}

impl fmt::Display for AgentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trail bookkeeping for one agent. The host owns the agent's body; this is
/// the state the core keeps between ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub pos: TilePos,
    pub last_direction: Option<Direction>,
    searching: bool,
    pub search_layer: String,
    pub deposit_layer: Option<String>,
    /// Steps walked since the last goal change; drives deposit strength.
    pub steps_since_event: u32,
    /// Amount written by the most recent deposit (diagnostic only).
    pub last_deposit_amount: u8,
    pub last_move_succeeded: bool,
    pub mode: AgentMode,
}

impl Agent {
    /// Freshly spawned agent: searching outward, laying the home trail.
    pub fn spawn(id: AgentId, pos: TilePos, layers: &LayerConfig) -> Self {
        Self {
            id,
            pos,
            last_direction: None,
            searching: true,
            search_layer: layers.energy.clone(),
            deposit_layer: Some(layers.home.clone()),
            steps_since_event: 0,
            last_deposit_amount: 0,
            last_move_succeeded: true,
            mode: AgentMode::Searching,
        }
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    /// Flips the search flag. Any goal change restarts trail strength, so the
    /// step counter is reset even when the flag keeps its value.
    pub fn set_searching(&mut self, searching: bool) {
        self.searching = searching;
        self.steps_since_event = 0;
    }

    /// Points the agent at new layers and drops its heading.
    pub fn retarget(&mut self, deposit_layer: Option<&str>, search_layer: &str) {
        self.deposit_layer = deposit_layer.map(str::to_string);
        self.search_layer = search_layer.to_string();
        self.last_direction = None;
    }
}

/// Per-tick facts about the agent's body supplied by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentVitals {
    /// Resource units currently carried.
    pub carried: u32,
    pub carry_capacity: u32,
    /// Host-side movement cooldown is active.
    pub fatigued: bool,
    /// The agent is still being produced and must not act.
    pub spawning: bool,
}

impl AgentVitals {
    pub fn is_carrying(&self) -> bool {
        self.carried > 0
    }

    pub fn has_capacity(&self) -> bool {
        self.carried < self.carry_capacity
    }
}
